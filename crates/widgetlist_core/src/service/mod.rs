//! Core use-case services.
//!
//! # Responsibility
//! - Compose the list model, snapshot writer and lifecycle monitor into
//!   host-facing entry points.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod list_service;
pub mod session;
