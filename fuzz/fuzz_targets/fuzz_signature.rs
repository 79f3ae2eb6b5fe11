#![no_main]

use libfuzzer_sys::fuzz_target;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sr25519::keys_management::KeyPair;
use sr25519::schnorr_single_signature::{Signature, Verifier};

fuzz_target!(|data: &[u8]| {
    let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(123));

    // Decoding never panics, and decoded garbage never verifies as an error
    if let Ok(signature) = Signature::from_bytes(data) {
        assert_eq!(&signature.to_bytes()[..], data);
        let _ = keys
            .public_key
            .verify_simple(b"fuzz", b"Hello world", &signature)
            .expect("Error");
    }
});
