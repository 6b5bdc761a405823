// src/storage/mod.rs

//! Storage operations for collected records.

pub mod local;

pub use local::LocalStorage;
