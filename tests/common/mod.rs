// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![allow(dead_code)]

use tangle_node::core::message::{layout, Message, TRANSACTION_TRITS};
use tangle_node::core::trinary::{trits_from_trytes, Trit};

/// Nonce that gives the otherwise all-zero transaction a weight magnitude of 14.
pub const MINED_NONCE: &str = "EZMBB9999999999999999999999";
/// Curl-P-81 hash of the mined transaction.
pub const MINED_HASH: &str =
    "TIGORSLYKVKCCYOZGK9WV9UPENJEGRPNJWRUNMWZQTAW9LGKZRXJEYDZWMTQWON9AHSSWY9ZG9HLA9999";
/// Weight magnitude of [`MINED_HASH`].
pub const MINED_WEIGHT: usize = 14;

pub fn mined_trits() -> Vec<Trit> {
    let mut trits = vec![0; TRANSACTION_TRITS];
    let nonce = trits_from_trytes(MINED_NONCE).unwrap();
    trits[layout::NONCE.range()].copy_from_slice(&nonce);
    trits
}

pub fn mined() -> Message {
    Message::from_trits(mined_trits()).unwrap()
}

/// Mined transaction with the tag changed, so it hashes differently.
pub fn carrier_trits() -> Vec<Trit> {
    let mut trits = mined_trits();
    trits[layout::TAG.offset] = 1;
    trits[layout::TAG.offset + 1] = -1;
    trits
}

pub fn with_trit(mut trits: Vec<Trit>, index: usize, value: Trit) -> Vec<Trit> {
    trits[index] = value;
    trits
}
