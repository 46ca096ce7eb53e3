//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `widgetlist_core` linkage without the Flutter runtime.
//! - Optionally print the list a widget would render for a namespace:
//!   `widgetlist_cli <namespace> <container_dir> [sqlite|file]`.

use widgetlist_core::{read_widget_snapshot, StoreBackend, SyncConfig};

fn main() {
    println!("widgetlist_core ping={}", widgetlist_core::ping());
    println!("widgetlist_core version={}", widgetlist_core::core_version());

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return;
    }
    if let Err(message) = print_widget_snapshot(&args) {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn print_widget_snapshot(args: &[String]) -> Result<(), String> {
    let [namespace, container_dir, rest @ ..] = args else {
        return Err("usage: widgetlist_cli <namespace> <container_dir> [sqlite|file]".to_string());
    };
    let backend = match rest.first() {
        Some(raw) => raw.parse::<StoreBackend>().map_err(|err| err.to_string())?,
        None => StoreBackend::default(),
    };
    let config = SyncConfig::new(namespace.as_str(), container_dir.as_str())
        .map_err(|err| err.to_string())?
        .with_backend(backend);

    let snapshot = read_widget_snapshot(&config).map_err(|err| err.to_string())?;
    println!(
        "namespace={} key={} items={} remaining={}",
        config.namespace,
        config.storage_key,
        snapshot.items.len(),
        snapshot.remaining
    );
    for item in &snapshot.items {
        let mark = if item.completed { "x" } else { " " };
        println!("[{mark}] {} {}", item.id, item.title);
    }
    Ok(())
}
