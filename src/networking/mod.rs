#![forbid(unsafe_code)]

//! Networking: UDP gossip and the recency cache in front of validation.

pub mod cache;
pub mod gossip;
