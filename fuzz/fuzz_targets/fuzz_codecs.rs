#![no_main]

use bsbi::index::CodecKind;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail cleanly under every codec
    for kind in CodecKind::ALL {
        let codec = kind.codec();
        let mut input = data;
        while let Ok(Some(posting)) = codec.read_posting(&mut input) {
            assert!(posting.is_sorted());
        }
    }
});
