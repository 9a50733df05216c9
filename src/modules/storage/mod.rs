//! Storage module for paper blobs
//!
//! Provides a local filesystem store for uploaded PDFs: directory
//! provisioning, unique key generation, writes and public URLs.

mod local_storage;

pub use local_storage::LocalStorage;
