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

//! Curl: a raw ternary sponge over a 729-trit state.
//!
//! absorb: state[0..n] = block; permute   (per 243-trit block)
//! squeeze: out = state[0..n]; permute    (per 243-trit block)
//!
//! No length field and no padding. Every digest depends on the exact index
//! walk and substitution table below.

use crate::core::hash::HASH_LENGTH_TRITS;
use crate::core::trinary::{self, Trit, TritError};

/// Sponge state length in trits.
pub const STATE_LENGTH: usize = 3 * HASH_LENGTH_TRITS;

// Indexed by old[j] + 4 * old[i] + 5.
const TRUTH_TABLE: [Trit; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

/// Permutation strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// 27 rounds.
    CurlP27,
    /// 81 rounds, used for transaction hashes.
    CurlP81,
}

impl Mode {
    /// Number of permutation rounds.
    pub const fn rounds(self) -> usize {
        match self {
            Mode::CurlP27 => 27,
            Mode::CurlP81 => 81,
        }
    }
}

/// Absorb/squeeze duplex over trits.
pub trait Sponge {
    /// Zero the state and select the round count.
    fn reset(&mut self, mode: Mode);
    /// Absorb trits in 243-trit blocks.
    ///
    /// Rejects input outside {-1, 0, 1} with `TritError::InvalidTrit`,
    /// leaving the state untouched.
    fn absorb(&mut self, trits: &[Trit]) -> Result<(), TritError>;
    /// Fill `out` from the state, permuting after each 243-trit block.
    fn squeeze(&mut self, out: &mut [Trit]);
}

/// Curl sponge instance. Cheap to create; one per hash computation.
#[derive(Clone)]
pub struct Curl {
    mode: Mode,
    state: [Trit; STATE_LENGTH],
}

impl Curl {
    /// A zeroed sponge ready to absorb.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            state: [0; STATE_LENGTH],
        }
    }

    /// Current round mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn permute(&mut self) {
        let mut scratch = [0 as Trit; STATE_LENGTH];
        let mut i = 0usize;
        for _ in 0..self.mode.rounds() {
            scratch.copy_from_slice(&self.state);
            for cell in self.state.iter_mut() {
                let j = i;
                if i < 365 {
                    i += 364;
                } else {
                    i -= 365;
                }
                let idx = scratch[j] + (scratch[i] << 2) + 5;
                *cell = TRUTH_TABLE[idx as usize];
            }
        }
    }
}

impl Sponge for Curl {
    fn reset(&mut self, mode: Mode) {
        self.mode = mode;
        self.state.fill(0);
    }

    fn absorb(&mut self, trits: &[Trit]) -> Result<(), TritError> {
        if !trinary::is_valid(trits) {
            return Err(TritError::InvalidTrit);
        }
        for block in trits.chunks(HASH_LENGTH_TRITS) {
            self.state[..block.len()].copy_from_slice(block);
            self.permute();
        }
        Ok(())
    }

    fn squeeze(&mut self, out: &mut [Trit]) {
        for block in out.chunks_mut(HASH_LENGTH_TRITS) {
            block.copy_from_slice(&self.state[..block.len()]);
            self.permute();
        }
    }
}
