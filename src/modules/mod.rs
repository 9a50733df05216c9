//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for external resources like blob storage.

pub mod storage;
