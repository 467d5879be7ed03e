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

//! Balanced-ternary codec.
//!
//! A trit is one of {-1, 0, 1}. Bytes carry 5 trits each, least significant
//! trit first; trytes group 3 trits into one symbol of `9ABCDEFGHIJKLMNOPQRSTUVWXYZ`.
//!
//! ## Byte mapping
//! A byte is read as a signed value `s` in `[-128, 127]` and shifted to
//! `x = s + 243` when negative. The 5 emitted trits are the balanced-ternary
//! digits of `x` when `x <= 121`, otherwise of `x - 243`:
//!
//! | signed byte | decodes to |
//! |---|---|
//! | `-121..=121` | itself |
//! | `122..=127` | `-121..=-116` |
//! | `-128..=-122` | `115..=121` |
//!
//! Only bytes in the first row survive a `trits_from_bytes` / `bytes_from_trits`
//! round trip. The others are never produced by the encoder.

use thiserror::Error;

/// A single balanced-ternary digit.
pub type Trit = i8;

/// Trits carried by one byte.
pub const TRITS_PER_BYTE: usize = 5;
/// Trits grouped into one tryte.
pub const TRITS_PER_TRYTE: usize = 3;
/// Tryte symbols, indexed by tryte value (negative values wrap by +27).
pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BYTE_RADIX: usize = 243;
const MAX_TRIT: Trit = 1;
const MIN_TRIT: Trit = -1;

/// Codec errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TritError {
    /// Destination buffer cannot hold the output.
    #[error("buffer too small")]
    BufferTooSmall,
    /// Trit count is not a multiple of 3.
    #[error("invalid trit length")]
    InvalidLength,
    /// Value outside {-1, 0, 1}.
    #[error("invalid trit")]
    InvalidTrit,
    /// Character outside the tryte alphabet.
    #[error("invalid tryte")]
    InvalidTryte,
}

static BYTES_TO_TRITS: [[Trit; TRITS_PER_BYTE]; BYTE_RADIX] = bytes_to_trits_table();

// Row `x` holds the balanced counter after `x` increments from zero.
const fn bytes_to_trits_table() -> [[Trit; TRITS_PER_BYTE]; BYTE_RADIX] {
    let mut table = [[0; TRITS_PER_BYTE]; BYTE_RADIX];
    let mut trits = [0 as Trit; TRITS_PER_BYTE];
    let mut row = 0;
    while row < BYTE_RADIX {
        table[row] = trits;
        let mut k = 0;
        while k < TRITS_PER_BYTE {
            trits[k] += 1;
            if trits[k] > MAX_TRIT {
                trits[k] = MIN_TRIT;
                k += 1;
            } else {
                break;
            }
        }
        row += 1;
    }
    table
}

/// Number of trits encoded by `bytes` bytes.
pub const fn len_trits(bytes: usize) -> usize {
    bytes * TRITS_PER_BYTE
}

/// Number of bytes needed to encode `trits` trits.
pub const fn len_bytes(trits: usize) -> usize {
    (trits + TRITS_PER_BYTE - 1) / TRITS_PER_BYTE
}

/// True if every element is in {-1, 0, 1}. Empty input is valid.
pub fn is_valid(trits: &[Trit]) -> bool {
    trits.iter().all(|t| (MIN_TRIT..=MAX_TRIT).contains(t))
}

/// Expand `src` into `dst`, 5 trits per byte, zero-filling the rest of `dst`.
///
/// Returns the number of trits written (`src.len() * 5`).
pub fn trits_from_bytes(dst: &mut [Trit], src: &[u8]) -> Result<usize, TritError> {
    let n = len_trits(src.len());
    if dst.len() < n {
        return Err(TritError::BufferTooSmall);
    }
    let (head, tail) = dst.split_at_mut(n);
    for (group, &b) in head.chunks_exact_mut(TRITS_PER_BYTE).zip(src) {
        let signed = i16::from(b as i8);
        let row = if signed < 0 { signed + BYTE_RADIX as i16 } else { signed };
        group.copy_from_slice(&BYTES_TO_TRITS[row as usize]);
    }
    tail.fill(0);
    Ok(n)
}

/// Pack `src` into `dst`, one byte per group of up to 5 trits.
///
/// Each byte is `sum(trit[j] * 3^j)` truncated to a signed byte; a final short
/// group uses only the trits present. Returns the number of bytes written.
pub fn bytes_from_trits(dst: &mut [u8], src: &[Trit]) -> Result<usize, TritError> {
    let n = len_bytes(src.len());
    if dst.len() < n {
        return Err(TritError::BufferTooSmall);
    }
    for (out, group) in dst.iter_mut().zip(src.chunks(TRITS_PER_BYTE)) {
        let v = group
            .iter()
            .rev()
            .fold(0i8, |v, &t| v.wrapping_mul(3).wrapping_add(t));
        *out = v as u8;
    }
    Ok(n)
}

/// Encode trits as a tryte string.
pub fn trytes_from_trits(src: &[Trit]) -> Result<String, TritError> {
    if src.len() % TRITS_PER_TRYTE != 0 {
        return Err(TritError::InvalidLength);
    }
    let mut out = String::with_capacity(src.len() / TRITS_PER_TRYTE);
    for group in src.chunks_exact(TRITS_PER_TRYTE) {
        if !is_valid(group) {
            return Err(TritError::InvalidTrit);
        }
        let mut v = group[0] + group[1] * 3 + group[2] * 9;
        if v < 0 {
            v += TRYTE_ALPHABET.len() as i8;
        }
        out.push(TRYTE_ALPHABET[v as usize] as char);
    }
    Ok(out)
}

/// Decode a tryte string back into trits (3 per symbol).
pub fn trits_from_trytes(trytes: &str) -> Result<Vec<Trit>, TritError> {
    let mut out = Vec::with_capacity(trytes.len() * TRITS_PER_TRYTE);
    for c in trytes.bytes() {
        let pos = TRYTE_ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or(TritError::InvalidTryte)?;
        // Symbols past 'M' are the negative values -13..=-1; the table row for
        // a small value carries its 3 trits in the low positions.
        let row = if pos <= 13 { pos } else { pos + BYTE_RADIX - TRYTE_ALPHABET.len() };
        out.extend_from_slice(&BYTES_TO_TRITS[row][..TRITS_PER_TRYTE]);
    }
    Ok(out)
}

/// Decode a little-endian trit sequence as a signed integer.
///
/// Wraps on overflow; fields decoded by the node are at most 33 trits.
pub fn decode_int64(trits: &[Trit]) -> i64 {
    trits
        .iter()
        .rev()
        .fold(0i64, |v, &t| v.wrapping_mul(3).wrapping_add(i64::from(t)))
}

/// Encode `value` into `dst` as little-endian balanced trits.
///
/// Fails with `BufferTooSmall` when `value` does not fit in `dst.len()` trits.
pub fn encode_int64(dst: &mut [Trit], value: i64) -> Result<(), TritError> {
    let mut v = i128::from(value);
    for t in dst.iter_mut() {
        let mut r = (v % 3) as Trit;
        v /= 3;
        if r > MAX_TRIT {
            r -= 3;
            v += 1;
        } else if r < MIN_TRIT {
            r += 3;
            v -= 1;
        }
        *t = r;
    }
    if v != 0 {
        return Err(TritError::BufferTooSmall);
    }
    Ok(())
}
