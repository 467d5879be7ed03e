// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

mod common;

use common::{mined, mined_trits, with_trit, MINED_HASH, MINED_WEIGHT};
use tangle_node::core::hash::TxHash;
use tangle_node::core::message::{
    layout, Message, MessageError, StoreTxError, ValidationError, HASHES_INVALID_BEFORE,
    PACKET_BYTES, TRAILER_BYTES, TRANSACTION_BYTES, TRANSACTION_TRITS,
};
use tangle_node::core::state::store::{Bucket, NullStore, SledStore, Store};
use tangle_node::core::trinary::encode_int64;

const LAST_ADDRESS_TRIT: usize = 6803;
const FIRST_VALUE_TRIT: usize = 6804;
const FIRST_VALUE_TRAILER_TRIT: usize = 6837;
const LAST_VALUE_TRIT: usize = 6884;

#[test]
fn layout_matches_wire_offsets() {
    assert_eq!(layout::ADDRESS.end() - 1, LAST_ADDRESS_TRIT);
    assert_eq!(layout::VALUE.offset, FIRST_VALUE_TRIT);
    assert_eq!(layout::VALUE.end() - 1, LAST_VALUE_TRIT);
    assert_eq!(layout::TIMESTAMP.offset, 6966);
    assert_eq!(layout::TRUNK.offset, 7290);
    assert_eq!(layout::NONCE.end(), TRANSACTION_TRITS);
}

#[test]
fn rejects_wrong_lengths() {
    assert_eq!(
        Message::from_packet(&[0u8; PACKET_BYTES - 1]).unwrap_err(),
        MessageError::MessageTooShort
    );
    assert_eq!(
        Message::from_packet(&[0u8; PACKET_BYTES + 1]).unwrap_err(),
        MessageError::MessageTooShort
    );
    assert_eq!(
        Message::from_tx_bytes(&[0u8; TRANSACTION_BYTES - 1]).unwrap_err(),
        MessageError::MessageTooShort
    );
    assert_eq!(
        Message::from_trits(vec![0; TRANSACTION_TRITS - 1]).unwrap_err(),
        MessageError::MessageTooShort
    );
    assert_eq!(
        Message::from_trits(with_trit(vec![0; TRANSACTION_TRITS], 5, 2)).unwrap_err(),
        MessageError::InvalidTrits
    );
}

#[test]
fn mined_transaction_passes_its_weight() {
    let m = mined();
    assert_eq!(m.hash().to_trytes(), MINED_HASH);
    assert_eq!(m.weight_magnitude(), MINED_WEIGHT);
    assert_eq!(m.validate(MINED_WEIGHT), Ok(()));
    assert_eq!(m.validate(MINED_WEIGHT + 1), Err(ValidationError::InvalidHash));
}

#[test]
fn zero_transaction_is_rejected_on_timestamp() {
    let m = Message::from_tx_bytes(&[0u8; TRANSACTION_BYTES]).unwrap();
    assert!(m.hash().is_zero());
    assert_eq!(m.weight_magnitude(), 242);
    assert_eq!(m.timestamp(), 0);
    assert_eq!(m.validate(0), Err(ValidationError::InvalidTimestamp));
    assert_eq!(m.validate(242), Err(ValidationError::InvalidTimestamp));
    assert_eq!(m.validate(243), Err(ValidationError::InvalidHash));
}

#[test]
fn timestamp_at_cutoff_decodes() {
    let mut trits = vec![0; TRANSACTION_TRITS];
    encode_int64(&mut trits[layout::TIMESTAMP.range()], HASHES_INVALID_BEFORE).unwrap();
    let m = Message::from_trits(trits).unwrap();
    assert_eq!(m.timestamp(), HASHES_INVALID_BEFORE);
    assert!(!m.hash().is_zero());
    assert_eq!(m.validate(0), Ok(()));
}

#[test]
fn value_trailer_must_be_zero() {
    let first = Message::from_trits(with_trit(mined_trits(), FIRST_VALUE_TRAILER_TRIT, 1)).unwrap();
    assert_eq!(first.validate(0), Err(ValidationError::InvalidValue));

    let last = Message::from_trits(with_trit(mined_trits(), LAST_VALUE_TRIT, -1)).unwrap();
    assert_eq!(last.validate(0), Err(ValidationError::InvalidValue));
    assert_eq!(last.value(), 0);
}

#[test]
fn value_bearing_address_needs_zero_last_trit() {
    let addr_only = with_trit(mined_trits(), LAST_ADDRESS_TRIT, 1);
    let m = Message::from_trits(addr_only.clone()).unwrap();
    assert_eq!(m.value(), 0);
    assert_eq!(m.validate(0), Ok(()));

    let with_value = Message::from_trits(with_trit(addr_only, FIRST_VALUE_TRIT, 1)).unwrap();
    assert_eq!(with_value.value(), 1);
    assert_eq!(with_value.validate(0), Err(ValidationError::InvalidAddress));
}

#[test]
fn decodes_integer_fields() {
    let mut trits = mined_trits();
    encode_int64(&mut trits[layout::VALUE.offset..layout::VALUE.offset + 33], -1_000_000).unwrap();
    encode_int64(&mut trits[layout::CURRENT_INDEX.range()], 3).unwrap();
    encode_int64(&mut trits[layout::LAST_INDEX.range()], 7).unwrap();
    encode_int64(&mut trits[layout::ATTACHMENT_TIMESTAMP.range()], 1_600_000_000).unwrap();
    let m = Message::from_trits(trits).unwrap();
    assert_eq!(m.value(), -1_000_000);
    assert_eq!(m.current_index(), 3);
    assert_eq!(m.last_index(), 7);
    assert_eq!(m.attachment_timestamp(), 1_600_000_000);
    assert_eq!(m.attachment_timestamp_lower(), 0);
    assert_eq!(m.attachment_timestamp_upper(), 0);
}

#[test]
fn packet_trailer_carries_the_request() {
    let m = mined();
    let packet = m.to_packet(m.hash());
    assert_eq!(packet.len(), PACKET_BYTES);

    let parsed = Message::from_packet(&packet).unwrap();
    assert_eq!(parsed.tx_bytes(), m.tx_bytes());
    assert_eq!(parsed.trailer().map(|t| t.len()), Some(TRAILER_BYTES));
    // The mined hash ends in zeros, so the 230 trailer trits hold all of it.
    assert_eq!(parsed.trailer_hash(), Some(*m.hash()));
    assert_eq!(parsed.digest(), m.digest());
    assert!(m.trailer().is_none());

    let zero = Message::from_packet(&m.to_packet(&TxHash::ZERO)).unwrap();
    assert_eq!(zero.trailer_hash(), Some(TxHash::ZERO));
}

#[test]
fn digest_tracks_bytes() {
    let a = mined();
    let b = Message::from_trits(with_trit(mined_trits(), 0, 1)).unwrap();
    assert_ne!(a.digest(), b.digest());
    assert_eq!(a.digest(), mined().digest());
}

#[test]
fn store_refuses_zero_hash_and_duplicates() {
    let zero = Message::from_tx_bytes(&[0u8; TRANSACTION_BYTES]).unwrap();
    assert!(matches!(zero.store(&NullStore), Err(StoreTxError::InvalidHash)));

    let dir = tempfile::tempdir().unwrap();
    let store = SledStore::open(dir.path().to_str().unwrap()).unwrap();
    let m = mined();
    assert_eq!(m.store(&store).unwrap(), *m.hash());
    assert!(matches!(m.store(&store), Err(StoreTxError::AlreadyExists)));

    let stored = store
        .read(Bucket::Transaction, &m.hash().to_key_bytes())
        .unwrap()
        .unwrap();
    assert_eq!(stored, m.tx_bytes());
}

#[test]
fn debug_is_one_line() {
    let s = format!("{:?}", mined());
    assert!(s.starts_with("Message {"));
    assert!(!s.contains('\n'));
}
