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

//! Transaction hash type and weight magnitude.
//!
//! The all-zero hash weighs 242, the maximum. A zero requested hash (a random
//! tip request) therefore outranks every specific request in the reply queue.

use crate::core::curl::{Curl, Mode, Sponge};
use crate::core::trinary::{self, Trit, TritError};
use std::fmt;

/// Digest length in trits.
pub const HASH_LENGTH_TRITS: usize = 243;
/// Digest length in bytes (5 trits per byte, rounded up).
pub const HASH_LENGTH_BYTES: usize = trinary::len_bytes(HASH_LENGTH_TRITS);

/// 243-trit Curl digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash([Trit; HASH_LENGTH_TRITS]);

impl TxHash {
    /// The all-zero hash ("send me a random tip" when requested).
    pub const ZERO: TxHash = TxHash([0; HASH_LENGTH_TRITS]);

    /// Copy from a 243-trit slice. `None` on wrong length or invalid trits.
    pub fn from_trits(trits: &[Trit]) -> Option<Self> {
        if trits.len() != HASH_LENGTH_TRITS || !trinary::is_valid(trits) {
            return None;
        }
        let mut out = [0; HASH_LENGTH_TRITS];
        out.copy_from_slice(trits);
        Some(Self(out))
    }

    /// Raw trits.
    pub fn as_trits(&self) -> &[Trit; HASH_LENGTH_TRITS] {
        &self.0
    }

    /// True if every trit is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&t| t == 0)
    }

    /// Trailing zero trits; see [`weight_magnitude`].
    pub fn weight_magnitude(&self) -> usize {
        weight_magnitude(&self.0)
    }

    /// Tryte rendering (81 symbols).
    pub fn to_trytes(&self) -> String {
        trinary::trytes_from_trits(&self.0).unwrap_or_default()
    }

    /// 49-byte form used as the store key.
    pub fn to_key_bytes(&self) -> [u8; HASH_LENGTH_BYTES] {
        let mut out = [0u8; HASH_LENGTH_BYTES];
        // Sizes are fixed by the constants above.
        let _ = trinary::bytes_from_trits(&mut out, &self.0);
        out
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_trytes())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_trytes())
    }
}

/// Count zero trits scanning back from the end.
///
/// Index 0 is never inspected: for length `L` the result is `(L - 1) - i` for
/// the highest nonzero index `i >= 1`, else `L - 1`. An all-zero hash weighs
/// 242, not 243. Empty input weighs 0.
pub fn weight_magnitude(trits: &[Trit]) -> usize {
    let Some(last) = trits.len().checked_sub(1) else {
        return 0;
    };
    match (1..=last).rev().find(|&i| trits[i] != 0) {
        Some(i) => last - i,
        None => last,
    }
}

/// True if `hash` has the 49-byte length and is not all zero.
pub fn hash_bytes_valid(hash: &[u8]) -> bool {
    hash.len() == HASH_LENGTH_BYTES && hash.iter().any(|&b| b != 0)
}

/// Absorb `trits` into a fresh sponge and squeeze one digest.
///
/// Fails with `TritError::InvalidTrit` when `trits` holds a value outside {-1, 0, 1}.
pub fn curl_hash(mode: Mode, trits: &[Trit]) -> Result<TxHash, TritError> {
    let mut curl = Curl::new(mode);
    curl.absorb(trits)?;
    let mut out = [0; HASH_LENGTH_TRITS];
    curl.squeeze(&mut out);
    Ok(TxHash(out))
}
