// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Fixed-layout transaction view over a trit buffer, with consensus checks.
//!
//! ## Wire packet (UDP, 1650 bytes)
//! ```text
//! [0, 1604)     transaction, 8019 trits at 5 trits per byte
//! [1604, 1650)  trailer: requested hash, 230 trits (zero-padded to 243)
//! ```
//!
//! Fields are views into one owned trit buffer. The hash and the cache digest
//! are computed on first use and memoized.

use crate::core::curl::Mode;
use crate::core::hash::{self, curl_hash, TxHash, HASH_LENGTH_BYTES, HASH_LENGTH_TRITS};
use crate::core::state::store::{Bucket, Store, StoreError};
use crate::core::trinary::{self, Trit};
use siphasher::sip128::{Hasher128, SipHasher13};
use std::fmt;
use std::hash::Hasher;
use std::ops::Range;
use std::sync::OnceLock;
use thiserror::Error;

/// Trits in a serialized transaction.
pub const TRANSACTION_TRITS: usize = 8019;
/// Bytes in a UDP gossip packet.
pub const PACKET_BYTES: usize = 1650;
/// Bytes in the requested-hash trailer.
pub const TRAILER_BYTES: usize = 46;
/// Bytes carrying the transaction.
pub const TRANSACTION_BYTES: usize = PACKET_BYTES - TRAILER_BYTES;
/// Usable trits at the start of the value field; the rest must be zero.
pub const VALUE_USABLE_TRITS: usize = 33;
/// Zero-hash transactions timestamped before this (2017-10-23 12:00 UTC) are invalid.
pub const HASHES_INVALID_BEFORE: i64 = 1_508_760_000;

/// 128-bit SipHash-1-3 of the transaction bytes. Cache key only.
pub type Digest = [u8; 16];

/// A named trit range of the transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Offset in trits.
    pub offset: usize,
    /// Length in trits.
    pub len: usize,
}

impl Field {
    const fn after(prev: Field, len: usize) -> Field {
        Field {
            offset: prev.offset + prev.len,
            len,
        }
    }

    /// One past the last trit.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Trit range.
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Transaction trit layout.
pub mod layout {
    use super::Field;

    /// Signature or message fragment.
    pub const SIGNATURE_FRAGMENT: Field = Field { offset: 0, len: 6561 };
    /// Address.
    pub const ADDRESS: Field = Field::after(SIGNATURE_FRAGMENT, 243);
    /// Value (33 usable + 48 must-be-zero).
    pub const VALUE: Field = Field::after(ADDRESS, 81);
    /// Obsolete tag.
    pub const OBSOLETE_TAG: Field = Field::after(VALUE, 81);
    /// Timestamp (seconds).
    pub const TIMESTAMP: Field = Field::after(OBSOLETE_TAG, 27);
    /// Index within the bundle.
    pub const CURRENT_INDEX: Field = Field::after(TIMESTAMP, 27);
    /// Last index within the bundle.
    pub const LAST_INDEX: Field = Field::after(CURRENT_INDEX, 27);
    /// Bundle hash.
    pub const BUNDLE: Field = Field::after(LAST_INDEX, 243);
    /// Trunk transaction hash.
    pub const TRUNK: Field = Field::after(BUNDLE, 243);
    /// Branch transaction hash.
    pub const BRANCH: Field = Field::after(TRUNK, 243);
    /// Tag.
    pub const TAG: Field = Field::after(BRANCH, 81);
    /// Attachment timestamp.
    pub const ATTACHMENT_TIMESTAMP: Field = Field::after(TAG, 27);
    /// Attachment timestamp lower bound.
    pub const ATTACHMENT_TIMESTAMP_LOWER: Field = Field::after(ATTACHMENT_TIMESTAMP, 27);
    /// Attachment timestamp upper bound.
    pub const ATTACHMENT_TIMESTAMP_UPPER: Field = Field::after(ATTACHMENT_TIMESTAMP_LOWER, 27);
    /// Nonce.
    pub const NONCE: Field = Field::after(ATTACHMENT_TIMESTAMP_UPPER, 81);
}

const _: () = assert!(layout::NONCE.end() == TRANSACTION_TRITS);
const _: () = assert!(trinary::len_bytes(TRANSACTION_TRITS) == TRANSACTION_BYTES);

const VALUE_TRAILER: Field = Field {
    offset: layout::VALUE.offset + VALUE_USABLE_TRITS,
    len: layout::VALUE.len - VALUE_USABLE_TRITS,
};

/// Parse errors. Parsing only fails on length (or invalid trits when built from trits).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Input length differs from the fixed layout.
    #[error("message too short")]
    MessageTooShort,
    /// Trit input contains values outside {-1, 0, 1}.
    #[error("invalid trits")]
    InvalidTrits,
}

/// Consensus rule violations, checked in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Weight magnitude below the configured minimum.
    #[error("invalid transaction hash")]
    InvalidHash,
    /// Zero hash on a transaction timestamped before the cutoff.
    #[error("invalid transaction timestamp")]
    InvalidTimestamp,
    /// Nonzero trit past the usable value range.
    #[error("invalid transaction value")]
    InvalidValue,
    /// Value-bearing address whose last trit is nonzero.
    #[error("invalid transaction address")]
    InvalidAddress,
}

/// Storage outcome errors.
#[derive(Debug, Error)]
pub enum StoreTxError {
    /// Refusing to store under the zero hash.
    #[error("invalid transaction hash")]
    InvalidHash,
    /// Transaction hash already present.
    #[error("transaction already exists")]
    AlreadyExists,
    /// Underlying store failure.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// Parsed transaction. Owns its bytes and trits.
pub struct Message {
    bytes: Vec<u8>,
    trits: Vec<Trit>,
    trailer: Option<[u8; TRAILER_BYTES]>,
    hash: OnceLock<TxHash>,
    digest: OnceLock<Digest>,
}

impl Message {
    /// Parse a 1650-byte gossip packet (transaction + trailer).
    pub fn from_packet(packet: &[u8]) -> Result<Self, MessageError> {
        if packet.len() != PACKET_BYTES {
            return Err(MessageError::MessageTooShort);
        }
        let (tx, tail) = packet.split_at(TRANSACTION_BYTES);
        let mut msg = Self::from_tx_bytes(tx)?;
        let mut trailer = [0u8; TRAILER_BYTES];
        trailer.copy_from_slice(tail);
        msg.trailer = Some(trailer);
        Ok(msg)
    }

    /// Parse 1604 transaction bytes without trailer.
    pub fn from_tx_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        if bytes.len() != TRANSACTION_BYTES {
            return Err(MessageError::MessageTooShort);
        }
        let mut trits = vec![0; trinary::len_trits(bytes.len())];
        trinary::trits_from_bytes(&mut trits, bytes).map_err(|_| MessageError::MessageTooShort)?;
        Ok(Self {
            bytes: bytes.to_vec(),
            trits,
            trailer: None,
            hash: OnceLock::new(),
            digest: OnceLock::new(),
        })
    }

    /// Build from exactly 8019 trits.
    pub fn from_trits(trits: Vec<Trit>) -> Result<Self, MessageError> {
        if trits.len() != TRANSACTION_TRITS {
            return Err(MessageError::MessageTooShort);
        }
        if !trinary::is_valid(&trits) {
            return Err(MessageError::InvalidTrits);
        }
        let mut bytes = vec![0u8; TRANSACTION_BYTES];
        trinary::bytes_from_trits(&mut bytes, &trits).map_err(|_| MessageError::MessageTooShort)?;
        Ok(Self {
            bytes,
            trits,
            trailer: None,
            hash: OnceLock::new(),
            digest: OnceLock::new(),
        })
    }

    /// The 1604 transaction bytes.
    pub fn tx_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 8019 transaction trits.
    pub fn trits(&self) -> &[Trit] {
        &self.trits[..TRANSACTION_TRITS]
    }

    /// Trailer bytes, when parsed from a packet.
    pub fn trailer(&self) -> Option<&[u8; TRAILER_BYTES]> {
        self.trailer.as_ref()
    }

    /// Trits of `field`.
    pub fn field(&self, field: Field) -> &[Trit] {
        &self.trits[field.range()]
    }

    fn field_int(&self, field: Field) -> i64 {
        trinary::decode_int64(self.field(field))
    }

    /// Signature or message fragment trits.
    pub fn signature_fragment(&self) -> &[Trit] {
        self.field(layout::SIGNATURE_FRAGMENT)
    }
    /// Address trits.
    pub fn address(&self) -> &[Trit] {
        self.field(layout::ADDRESS)
    }
    /// Obsolete tag trits.
    pub fn obsolete_tag(&self) -> &[Trit] {
        self.field(layout::OBSOLETE_TAG)
    }
    /// Bundle hash trits.
    pub fn bundle(&self) -> &[Trit] {
        self.field(layout::BUNDLE)
    }
    /// Trunk hash trits.
    pub fn trunk(&self) -> &[Trit] {
        self.field(layout::TRUNK)
    }
    /// Branch hash trits.
    pub fn branch(&self) -> &[Trit] {
        self.field(layout::BRANCH)
    }
    /// Tag trits.
    pub fn tag(&self) -> &[Trit] {
        self.field(layout::TAG)
    }
    /// Nonce trits.
    pub fn nonce(&self) -> &[Trit] {
        self.field(layout::NONCE)
    }
    /// The 48 value trits that must be zero.
    pub fn value_trailer(&self) -> &[Trit] {
        self.field(VALUE_TRAILER)
    }

    /// Value decoded from the 33 usable trits.
    pub fn value(&self) -> i64 {
        trinary::decode_int64(&self.field(layout::VALUE)[..VALUE_USABLE_TRITS])
    }
    /// Timestamp in seconds.
    pub fn timestamp(&self) -> i64 {
        self.field_int(layout::TIMESTAMP)
    }
    /// Current index.
    pub fn current_index(&self) -> i64 {
        self.field_int(layout::CURRENT_INDEX)
    }
    /// Last index.
    pub fn last_index(&self) -> i64 {
        self.field_int(layout::LAST_INDEX)
    }
    /// Attachment timestamp.
    pub fn attachment_timestamp(&self) -> i64 {
        self.field_int(layout::ATTACHMENT_TIMESTAMP)
    }
    /// Attachment timestamp lower bound.
    pub fn attachment_timestamp_lower(&self) -> i64 {
        self.field_int(layout::ATTACHMENT_TIMESTAMP_LOWER)
    }
    /// Attachment timestamp upper bound.
    pub fn attachment_timestamp_upper(&self) -> i64 {
        self.field_int(layout::ATTACHMENT_TIMESTAMP_UPPER)
    }

    /// Curl-P-81 hash of the transaction trits.
    pub fn hash(&self) -> &TxHash {
        // Every constructor yields valid trits; the zero hash is refused by `store`.
        self.hash.get_or_init(|| {
            curl_hash(Mode::CurlP81, self.trits()).unwrap_or(TxHash::ZERO)
        })
    }

    /// Weight magnitude of [`Message::hash`].
    pub fn weight_magnitude(&self) -> usize {
        self.hash().weight_magnitude()
    }

    /// Hash requested by the sender: trailer trits zero-padded to 243.
    pub fn trailer_hash(&self) -> Option<TxHash> {
        let trailer = self.trailer.as_ref()?;
        let mut trits = [0; HASH_LENGTH_TRITS];
        trinary::trits_from_bytes(&mut trits, trailer).ok()?;
        TxHash::from_trits(&trits)
    }

    /// Cheap digest of the transaction bytes.
    pub fn digest(&self) -> &Digest {
        self.digest.get_or_init(|| {
            let mut h = SipHasher13::new();
            h.write(&self.bytes);
            h.finish128().as_bytes()
        })
    }

    /// Check consensus rules against `min_weight_magnitude`.
    pub fn validate(&self, min_weight_magnitude: usize) -> Result<(), ValidationError> {
        let tx_hash = self.hash();

        if tx_hash.weight_magnitude() < min_weight_magnitude {
            return Err(ValidationError::InvalidHash);
        }

        if self.timestamp() < HASHES_INVALID_BEFORE && tx_hash.is_zero() {
            return Err(ValidationError::InvalidTimestamp);
        }

        if self.value_trailer().iter().any(|&t| t != 0) {
            return Err(ValidationError::InvalidValue);
        }

        if self.value() != 0 && self.address()[HASH_LENGTH_TRITS - 1] != 0 {
            return Err(ValidationError::InvalidAddress);
        }

        Ok(())
    }

    /// Insert the transaction bytes under its hash, unless already stored.
    pub fn store(&self, store: &dyn Store) -> Result<TxHash, StoreTxError> {
        let tx_hash = *self.hash();
        let key = tx_hash.to_key_bytes();
        if !hash::hash_bytes_valid(&key) {
            return Err(StoreTxError::InvalidHash);
        }
        if !store.insert_if_absent(Bucket::Transaction, &key, &self.bytes)? {
            return Err(StoreTxError::AlreadyExists);
        }
        Ok(tx_hash)
    }

    /// Outbound packet: this transaction followed by `requested` as trailer.
    pub fn to_packet(&self, requested: &TxHash) -> Vec<u8> {
        let mut packet = Vec::with_capacity(PACKET_BYTES);
        packet.extend_from_slice(&self.bytes);
        let key: [u8; HASH_LENGTH_BYTES] = requested.to_key_bytes();
        packet.extend_from_slice(&key[..TRAILER_BYTES]);
        packet
    }
}

fn trytes(t: &[Trit]) -> String {
    trinary::trytes_from_trits(t).unwrap_or_default()
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message {{ address: {}, bundle: {}, trunk: {}, branch: {}, tag: {}, value: {}, ts: {}, index: {}/{}, trailer: {}, digest: {} }}",
            trytes(self.address()),
            trytes(self.bundle()),
            trytes(self.trunk()),
            trytes(self.branch()),
            trytes(self.tag()),
            self.value(),
            self.timestamp(),
            self.current_index(),
            self.last_index(),
            self.trailer.map(hex::encode).unwrap_or_default(),
            hex::encode(self.digest()),
        )
    }
}
