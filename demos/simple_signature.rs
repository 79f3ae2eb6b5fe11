use rand_core::OsRng;
use sr25519::keys_management::{ExpansionMode, MiniSecretKey};
use sr25519::schnorr_single_signature::{Signature, Signer, Verifier};

fn main() {
    // Create the seed and expand it into a key pair
    let mini_secret_key = MiniSecretKey::generate_with(&mut OsRng);
    let keys = mini_secret_key
        .expand_to_keypair(ExpansionMode::Ed25519)
        .expect("Error");

    // Message to be signed, and the role the signature plays
    let context = b"demo";
    let message = b"Hello World";

    // Signature generation
    let signature = keys
        .sign_simple_double_check(context, message)
        .expect("Error");

    // Signatures travel as 64 bytes
    let bytes = signature.to_bytes();
    let received = Signature::from_bytes(&bytes).expect("Error");

    // Verification of the signature
    let result = keys
        .public_key
        .verify_simple(context, message, &received)
        .expect("Error");

    println!("Verification result: {:?}", result);
    assert!(result);
}
