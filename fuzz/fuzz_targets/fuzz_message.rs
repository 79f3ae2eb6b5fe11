#![no_main]

use libfuzzer_sys::fuzz_target;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sr25519::keys_management::KeyPair;
use sr25519::schnorr_single_signature::{Signer, Verifier};
use sr25519::signing_transcript::SigningContext;

fuzz_target!(|data: &[u8]| {
    // Randomness source
    let mut seeded_rng = StdRng::seed_from_u64(123);

    let keys = KeyPair::generate_with(&mut seeded_rng);
    let context = SigningContext::new(b"fuzz").expect("Error");

    // Arbitrary messages must sign and verify
    let signature = keys
        .sign_rng(context.bytes(data).expect("Error"), &mut seeded_rng)
        .expect("Error");
    let result = keys
        .public_key
        .verify(context.bytes(data).expect("Error"), &signature)
        .expect("Error");

    assert!(result);
});
