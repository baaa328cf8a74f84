//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the catalog database store and the image object store.

pub mod catalog;
pub mod storage;
