#![forbid(unsafe_code)]

//! Core protocol primitives.

pub mod curl;
pub mod hash;
pub mod message;
pub mod queue;
pub mod state;
pub mod trinary;
pub mod types;
