//! # sr25519
//!
//! This Rust library provides Schnorr signatures over the Ristretto group, as used by Substrate,
//! built on the curve25519_dalek library.
//!
//! ## Overview of sr25519
//!
//! sr25519 signatures bind everything they sign to a Merlin transcript: a STROBE-128 sponge on
//! top of Keccak-f[1600] that absorbs labeled messages and squeezes labeled challenges. The same
//! transcript machinery drives nonce generation and hierarchical key derivation.
//!
//! - Key Generation: a 32 byte mini secret key (seed) is expanded into a secret scalar `a` and a
//!   32 byte nonce seed, either ed25519-compatibly (SHA-512, clamping, division by the cofactor)
//!   or uniformly from a transcript. The public key is `A = a * G`.
//! - Signing: the transcript over the context and message commits to `A`, a hedged nonce
//!   `r` is witnessed from it, `R = r * G` is committed, and the challenge `k` is squeezed.
//!   The signature is `(R, s)` with `s = k * a + r`.
//! - Verification: the verifier replays the transcript and checks `R == s * G - k * A`.
//!
//! ## Encodings
//!
//! - Mini secret key: 32 bytes.
//! - Secret key: 64 bytes, `scalar || nonce`.
//! - Public key: 32 bytes, compressed Ristretto.
//! - Key pair: 96 bytes, `secret key || public key`.
//! - Signature: 64 bytes, `R || s`, with the top bit of the last byte set to mark it as sr25519.
//!
//! ## Key Derivation
//!
//! - Hard derivation maps a secret key and a chain code to a new mini secret key. It needs the
//!   secret key and is one way.
//! - Simple derivation adds a transcript-derived scalar to the key, so the child public key can
//!   also be computed from the parent public key and chain code.
//!
//! ## Usage
//!
//! ```
//! use sr25519::keys_management::KeyPair;
//! use sr25519::schnorr_single_signature::{Signer, Verifier};
//!
//! let keys = KeyPair::generate();
//! let signature = keys.sign_simple(b"my context", b"Hello World").unwrap();
//! assert!(keys.public_key.verify_simple(b"my context", b"Hello World", &signature).unwrap());
//! ```
//!
//! With the `tracing` feature, the `telemetry` module wires the crate's spans and logs into a
//! bunyan JSON subscriber.

pub mod derivation;
pub mod errors;
pub mod keys_management;
pub mod merlin;
pub mod scalars;
pub mod schnorr_single_signature;
pub mod signing_transcript;

#[cfg(feature = "tracing")]
pub mod telemetry;

pub use crate::derivation::{ChainCode, HardDerivationResult, SimpleDerivationResult};
pub use crate::errors::{SignatureError, TranscriptError};
pub use crate::keys_management::{ExpansionMode, KeyPair, MiniSecretKey, PublicKey, SecretKey};
pub use crate::schnorr_single_signature::{Signature, Signer, Verifier};
pub use crate::signing_transcript::{SigningContext, SigningTranscript};
