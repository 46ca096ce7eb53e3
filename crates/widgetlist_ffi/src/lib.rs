//! Flutter-facing bindings for the widget list core.

pub mod api;
