use sr25519::derivation::ChainCode;
use sr25519::keys_management::{ExpansionMode, MiniSecretKey};
use sr25519::schnorr_single_signature::{Signer, Verifier};

fn main() {
    let root = MiniSecretKey::generate()
        .expand_to_keypair(ExpansionMode::Ed25519)
        .expect("Error");

    // Hard derivation: the child public key needs the parent secret key
    let stash_code = ChainCode::from_bytes(b"stash").expect("Error");
    let stash = root
        .derive_hard(Some(&stash_code), ExpansionMode::Ed25519)
        .expect("Error");
    println!("Hard derived public key: {:?}", stash.public_key);

    // Simple derivation: the parent public key alone yields the same child
    let account_code = ChainCode::from_bytes(b"account").expect("Error");
    let account = stash.derive_simple(Some(&account_code)).expect("Error");
    let watched = stash
        .public_key
        .derive_simple(Some(&account_code))
        .expect("Error");
    assert_eq!(account.public_key, watched.public_key);

    // The derived key signs like any other
    let signature = account.sign_simple(b"demo", b"Hello World").expect("Error");
    let result = watched
        .public_key
        .verify_simple(b"demo", b"Hello World", &signature)
        .expect("Error");

    println!("Verification result: {:?}", result);
    assert!(result);
}
