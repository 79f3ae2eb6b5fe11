#![no_main]

use libfuzzer_sys::fuzz_target;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sr25519::derivation::ChainCode;
use sr25519::keys_management::{ExpansionMode, MiniSecretKey};
use sr25519::schnorr_single_signature::{Signer, Verifier};

fuzz_target!(|data: &[u8]| {
    // Message to be signed
    let message_to_sign = b"Hello world";

    // Randomness source
    let mut seeded_rng = StdRng::seed_from_u64(123);

    // Any 32 byte seed is a valid mini secret key
    let Some(seed) = data.get(..32) else {
        return;
    };
    let keys = MiniSecretKey::from_bytes(seed)
        .expect("Error")
        .expand_to_keypair(ExpansionMode::Uniform)
        .expect("Error");

    let signature = keys
        .sign_rng(
            sr25519::SigningContext::new(b"fuzz")
                .expect("Error")
                .bytes(message_to_sign)
                .expect("Error"),
            &mut seeded_rng,
        )
        .expect("Error");
    assert!(keys
        .verify_simple(b"fuzz", message_to_sign, &signature)
        .expect("Error"));

    // Secret and public simple derivations agree for any chain code
    if let Ok(cc) = ChainCode::from_bytes(&data[32..]) {
        let child = keys.derive_simple_rng(Some(&cc), &mut seeded_rng).expect("Error");
        let watched = keys.public_key.derive_simple(Some(&cc)).expect("Error");
        assert_eq!(child.public_key, watched.public_key);
    }
});
