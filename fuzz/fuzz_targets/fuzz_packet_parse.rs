#![no_main]
use libfuzzer_sys::fuzz_target;

use tangle_node::core::message::{Message, PACKET_BYTES};

fuzz_target!(|data: &[u8]| {
    // Any input must parse or fail cleanly; parsed packets must validate without panicking.
    let mut packet = data.to_vec();
    packet.resize(PACKET_BYTES, 0);
    for input in [data, &packet[..]] {
        if let Ok(m) = Message::from_packet(input) {
            let _ = m.validate(0);
            let _ = m.trailer_hash();
            let _ = m.to_packet(m.hash());
            let _ = format!("{m:?}");
        }
    }
});
