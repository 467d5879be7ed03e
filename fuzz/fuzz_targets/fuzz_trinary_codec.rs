#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tangle_node::core::trinary::{
    bytes_from_trits, len_bytes, len_trits, trits_from_bytes, trits_from_trytes,
    trytes_from_trits, Trit,
};

#[derive(Arbitrary, Debug)]
struct Input {
    bytes: Vec<u8>,
    trytes: String,
}

fuzz_target!(|input: Input| {
    let mut trits: Vec<Trit> = vec![0; len_trits(input.bytes.len())];
    if trits_from_bytes(&mut trits, &input.bytes).is_err() {
        return;
    }
    let mut back = vec![0u8; len_bytes(trits.len())];
    if bytes_from_trits(&mut back, &trits).is_ok() {
        // Re-expanding the packed bytes is stable.
        let mut again: Vec<Trit> = vec![0; len_trits(back.len())];
        let _ = trits_from_bytes(&mut again, &back);
        assert_eq!(again, trits);
    }

    if let Ok(t) = trits_from_trytes(&input.trytes) {
        assert_eq!(trytes_from_trits(&t).as_deref(), Ok(input.trytes.as_str()));
    }
});
