use std::collections::HashSet;
use std::sync::Arc;
use widgetlist_core::snapshot::codec::{decode, encode};
use widgetlist_core::{
    ListModel, ListService, MemoryStore, SerializedStore, StorageError, SyncStatus, SyncWriter,
};

const KEY: &str = "widget_todos";

fn shared_service() -> (Arc<MemoryStore>, ListService<Arc<MemoryStore>>) {
    let store = Arc::new(MemoryStore::new("group.com.example.todo"));
    let writer = SyncWriter::new(Arc::clone(&store), KEY).unwrap();
    (store, ListService::new(writer))
}

fn replica(store: &MemoryStore) -> ListModel {
    let blob = store.read(KEY).unwrap().expect("snapshot should be written");
    decode(&blob).unwrap()
}

#[test]
fn add_toggle_remove_clear_scenario() {
    let (store, mut service) = shared_service();

    let milk = service.add("Buy milk").unwrap();
    assert_eq!(milk.items.len(), 1);
    assert!(!milk.value.completed);

    let toggled = service.toggle(&milk.value.id);
    assert_eq!(toggled.value, Some(true));
    assert!(service.model().get(&milk.value.id).unwrap().completed);

    let mom = service.add("Call mom").unwrap();
    assert_eq!(mom.items.len(), 2);
    assert_eq!(mom.items[0].id, milk.value.id);
    assert_eq!(mom.items[1].id, mom.value.id);

    let removed = service.remove(&milk.value.id);
    assert_eq!(removed.items.len(), 1);
    assert_eq!(removed.items[0], mom.value);

    let cleared = service.clear();
    assert_eq!(cleared.value, 1);
    assert!(cleared.items.is_empty());
    assert_eq!(store.read(KEY).unwrap(), Some(b"[]".to_vec()));
    assert!(replica(&store).is_empty());
}

#[test]
fn replica_matches_host_after_every_successful_write() {
    let (store, mut service) = shared_service();

    let a = service.add("a").unwrap().value;
    assert_eq!(&replica(&store), service.model());
    service.add("b").unwrap();
    assert_eq!(&replica(&store), service.model());
    service.toggle(&a.id);
    assert_eq!(&replica(&store), service.model());
    service.remove(&a.id);
    assert_eq!(&replica(&store), service.model());
}

#[test]
fn remove_and_toggle_on_unknown_id_leave_model_unchanged() {
    let (_store, mut service) = shared_service();
    service.add("a").unwrap();
    let before = service.model().clone();

    assert_eq!(service.remove("missing").value, None);
    assert_eq!(service.toggle("missing").value, None);
    assert_eq!(service.model(), &before);
}

#[test]
fn storage_error_does_not_roll_back_host_list() {
    let (store, mut service) = shared_service();
    service.add("kept").unwrap();
    let replica_before = replica(&store);

    store.fail_next_write(StorageError::QuotaExceeded);
    let mutation = service.add("written later").unwrap();

    assert!(matches!(mutation.sync, Err(StorageError::QuotaExceeded)));
    assert_eq!(service.model().len(), 2);
    assert_eq!(mutation.items.len(), 2);
    assert_eq!(replica(&store), replica_before);
    assert!(matches!(service.sync_status(), SyncStatus::Stale { .. }));

    // The next mutation's full write is the retry.
    let first_id = service.items()[0].id.clone();
    service.toggle(&first_id);
    assert_eq!(&replica(&store), service.model());
    assert_eq!(service.sync_status(), &SyncStatus::Synced);
}

#[test]
fn ids_stay_unique_across_random_operation_sequences() {
    let (_store, mut service) = shared_service();
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);

    for step in 0..2_000 {
        let ids = service.ids();
        let pick = |rng: &mut XorShift| -> String {
            if ids.is_empty() || rng.next() % 5 == 0 {
                "missing".to_string()
            } else {
                ids[(rng.next() as usize) % ids.len()].clone()
            }
        };
        match rng.next() % 10 {
            0..=4 => {
                service.add(&format!("item {step}")).unwrap();
            }
            5..=6 => {
                let id = pick(&mut rng);
                service.remove(&id);
            }
            7..=8 => {
                let id = pick(&mut rng);
                service.toggle(&id);
            }
            _ => {
                service.clear();
            }
        }

        let ids = service.ids();
        let unique = ids.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), ids.len(), "duplicate id after step {step}");
    }
}

#[test]
fn consecutive_adds_never_collide_across_ten_thousand_trials() {
    let mut model = ListModel::new();
    let mut seen = HashSet::new();
    for trial in 0..10_000 {
        let item = model.add("collision check").unwrap();
        assert!(seen.insert(item.id), "id collision at trial {trial}");
    }
    assert_eq!(model.len(), 10_000);
}

#[test]
fn codec_roundtrip_holds_for_empty_and_populated_lists() {
    let empty = ListModel::new();
    assert_eq!(decode(&encode(&empty)).unwrap(), empty);

    let mut model = ListModel::new();
    for index in 0..25 {
        let item = model.add(&format!("item {index}")).unwrap();
        if index % 3 == 0 {
            model.toggle(&item.id);
        }
    }
    assert_eq!(decode(&encode(&model)).unwrap(), model);
}

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}
