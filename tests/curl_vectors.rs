// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;

use tangle_node::core::curl::{Curl, Mode, Sponge};
use tangle_node::core::hash::{curl_hash, weight_magnitude, TxHash, HASH_LENGTH_TRITS};
use tangle_node::core::trinary::{trytes_from_trits, Trit, TritError};

fn pattern() -> Vec<Trit> {
    (0..HASH_LENGTH_TRITS).map(|k| (k % 3) as Trit - 1).collect()
}

fn squeeze_trytes(mode: Mode, input: &[Trit], out_len: usize) -> String {
    let mut curl = Curl::new(mode);
    curl.absorb(input).unwrap();
    let mut out = vec![0; out_len];
    curl.squeeze(&mut out);
    trytes_from_trits(&out).unwrap()
}

#[test]
fn zero_input_is_a_fixed_point() {
    let zero = [0; HASH_LENGTH_TRITS];
    for mode in [Mode::CurlP27, Mode::CurlP81] {
        let h = curl_hash(mode, &zero).unwrap();
        assert!(h.is_zero());
        assert_eq!(h.to_trytes(), "9".repeat(81));
    }
}

#[test]
fn known_digests() {
    assert_eq!(
        squeeze_trytes(Mode::CurlP81, &pattern(), HASH_LENGTH_TRITS),
        "MWVUBBTUGUZFISS9EQZCZSDFPQMEHWHSUCWZF9GRFCRVPWFUCVUTUCUMJRDEANBASOXAOYBHUDECEYKFI"
    );
    assert_eq!(
        squeeze_trytes(Mode::CurlP27, &pattern(), HASH_LENGTH_TRITS),
        "GZFPXLSZBP9EQIHBVMBHJCUNTVCIR9KWMDTU9VNYJAIOITTMFBJIPNL9LRIE9UOYKHOWKFRNWMSESHYOX"
    );

    let mut one = [0; HASH_LENGTH_TRITS];
    one[0] = 1;
    assert_eq!(
        curl_hash(Mode::CurlP81, &one).unwrap().to_trytes(),
        "TJVKPMTAMIZVBVHIVQUPTKEMPROEKV9SB9COEDQYRHYPTYSKQIAN9PQKMZHCPO9TS9BHCORFKW9CQXZEE"
    );
}

#[test]
fn squeeze_continues_past_one_digest() {
    let two = squeeze_trytes(Mode::CurlP81, &pattern(), 2 * HASH_LENGTH_TRITS);
    assert_eq!(
        two,
        concat!(
            "MWVUBBTUGUZFISS9EQZCZSDFPQMEHWHSUCWZF9GRFCRVPWFUCVUTUCUMJRDEANBASOXAOYBHUDECEYKFI",
            "9V9ALFIQHRLCS9AZBNAZZOR9Y9OZUMSXSRNVTEONVKWIPSKPEHWSAILEBFNO9YNOGRYSXVQINBBVWLYQN"
        )
    );
}

#[test]
fn partial_final_block() {
    let long: Vec<Trit> = (0..500).map(|k| ((k * 7) % 3) as Trit - 1).collect();
    assert_eq!(
        curl_hash(Mode::CurlP81, &long).unwrap().to_trytes(),
        "P9QXYUZUUPHHWTEUZMSERRKRLWYCESLROOVJSRMIZNYZOIRDLTKWDZJQZKTJGPJCPDIWIIFWTLJTZMDT9"
    );
}

#[test]
fn absorb_rejects_out_of_range_trits() {
    let mut input = pattern();
    input[5] = 2;
    let mut curl = Curl::new(Mode::CurlP81);
    assert_eq!(curl.absorb(&input), Err(TritError::InvalidTrit));
    input[5] = -2;
    assert_eq!(curl.absorb(&input), Err(TritError::InvalidTrit));
    assert_eq!(curl_hash(Mode::CurlP27, &[0, 3]), Err(TritError::InvalidTrit));

    // Rejected input leaves the state as it was.
    let mut out = [0; HASH_LENGTH_TRITS];
    curl.squeeze(&mut out);
    assert!(out.iter().all(|&t| t == 0));
}

#[test]
fn reset_clears_state_and_switches_mode() {
    let mut curl = Curl::new(Mode::CurlP81);
    curl.absorb(&pattern()).unwrap();
    curl.reset(Mode::CurlP27);
    assert_eq!(curl.mode(), Mode::CurlP27);
    curl.absorb(&pattern()).unwrap();
    let mut out = [0; HASH_LENGTH_TRITS];
    curl.squeeze(&mut out);
    assert_eq!(TxHash::from_trits(&out), Some(curl_hash(Mode::CurlP27, &pattern()).unwrap()));
}

#[test]
fn weight_magnitude_edges() {
    assert_eq!(weight_magnitude(&[]), 0);
    assert_eq!(weight_magnitude(&[1]), 0);
    assert_eq!(weight_magnitude(&[0; 243]), 242);
    assert_eq!(TxHash::ZERO.weight_magnitude(), 242);

    let mut t = [0; 243];
    t[0] = 1;
    assert_eq!(weight_magnitude(&t), 242);
    t[242] = -1;
    assert_eq!(weight_magnitude(&t), 0);
    t[242] = 0;
    t[228] = 1;
    assert_eq!(weight_magnitude(&t), 14);
}

fn trit() -> impl Strategy<Value = Trit> {
    prop_oneof![Just(-1i8), Just(0i8), Just(1i8)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn hashing_is_deterministic(input in proptest::collection::vec(trit(), 1..800)) {
        prop_assert_eq!(curl_hash(Mode::CurlP81, &input).unwrap(), curl_hash(Mode::CurlP81, &input).unwrap());
    }

    #[test]
    fn block_aligned_split_absorb_matches(
        blocks in proptest::collection::vec(proptest::collection::vec(trit(), HASH_LENGTH_TRITS), 2..5),
        split in 1usize..4,
    ) {
        let whole: Vec<Trit> = blocks.concat();
        let at = split.min(blocks.len() - 1) * HASH_LENGTH_TRITS;

        let mut curl = Curl::new(Mode::CurlP81);
        curl.absorb(&whole[..at]).unwrap();
        curl.absorb(&whole[at..]).unwrap();
        let mut out = [0; HASH_LENGTH_TRITS];
        curl.squeeze(&mut out);

        prop_assert_eq!(TxHash::from_trits(&out), Some(curl_hash(Mode::CurlP81, &whole).unwrap()));
    }

    #[test]
    fn single_trit_flip_changes_digest(input in proptest::collection::vec(trit(), HASH_LENGTH_TRITS), pos in 0usize..HASH_LENGTH_TRITS) {
        let mut flipped = input.clone();
        flipped[pos] = if flipped[pos] == 1 { -1 } else { flipped[pos] + 1 };
        let a = curl_hash(Mode::CurlP81, &input).unwrap();
        let b = curl_hash(Mode::CurlP81, &flipped).unwrap();
        prop_assert_ne!(a, b);
        let differing = a.as_trits().iter().zip(b.as_trits()).filter(|(x, y)| x != y).count();
        prop_assert!(differing > 60, "only {} trits differ", differing);
    }
}
