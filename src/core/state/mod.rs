#![forbid(unsafe_code)]

//! Persistent state.

pub mod store;
