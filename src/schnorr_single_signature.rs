use crate::errors::{serde_error_from_signature_error, SignatureError};
use crate::keys_management::{KeyPair, PublicKey, SecretKey};
use crate::signing_transcript::{SigningContext, SigningTranscript};
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use secrecy::zeroize::Zeroize;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The length of a `Signature`, in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Schnorr signature structure: (R, s).
///
/// Detached from the signed message. These cannot be converted to ed25519
/// signatures because the challenge hashes Ristretto encodings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub cap_r_compressed: CompressedRistretto,
    pub s: Scalar,
}

impl Signature {
    const DESCRIPTION: &'static str = "A 64 byte Ristretto Schnorr signature";

    /// Encodes as `R || s` with the high bit of the last byte set, which
    /// marks the bytes as sr25519 rather than ed25519.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..32].copy_from_slice(self.cap_r_compressed.as_bytes());
        bytes[32..].copy_from_slice(self.s.as_bytes());
        bytes[63] |= 128;
        bytes
    }

    /// Decodes `R || s`, requiring the sr25519 marker bit and a canonical
    /// scalar. `R` is not decompressed here; verification compares
    /// encodings.
    pub fn from_bytes(bytes: &[u8]) -> Result<Signature, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::BytesLength {
                name: "Signature",
                description: Signature::DESCRIPTION,
                length: SIGNATURE_LENGTH,
            });
        }

        let mut lower = [0u8; 32];
        let mut upper = [0u8; 32];
        lower.copy_from_slice(&bytes[..32]);
        upper.copy_from_slice(&bytes[32..]);

        if upper[31] & 128 == 0 {
            return Err(SignatureError::NotMarkedSchnorrkel);
        }
        upper[31] &= 127;

        let s = Option::<Scalar>::from(Scalar::from_canonical_bytes(upper))
            .ok_or(SignatureError::ScalarFormat)?;

        Ok(Signature {
            cap_r_compressed: CompressedRistretto(lower),
            s,
        })
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'d> Deserialize<'d> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'d>,
    {
        struct SignatureVisitor;

        impl<'d> Visitor<'d> for SignatureVisitor {
            type Value = Signature;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str(Signature::DESCRIPTION)
            }

            fn visit_bytes<E>(self, bytes: &[u8]) -> Result<Signature, E>
            where
                E: serde::de::Error,
            {
                Signature::from_bytes(bytes).map_err(serde_error_from_signature_error)
            }
        }
        deserializer.deserialize_bytes(SignatureVisitor)
    }
}

/// Signs a transcript with the following protocol:
/// (R,s) = (rG, r + H(A,R,t)a)
///
/// The nonce `r` is hedged: it is drawn from the transcript after it has
/// committed to the public key, keyed with the secret nonce seed and fresh
/// entropy. A failing RNG or a wrong public key alone does not leak the key.
fn sign_transcript<R>(
    secret_key: &SecretKey,
    public_key: &PublicKey,
    mut t: SigningTranscript,
    rng: &mut R,
) -> Result<Signature, SignatureError>
where
    R: RngCore + CryptoRng,
{
    t.proto_name(b"Schnorr-sig")?;
    t.commit_point(b"sign:pk", public_key.as_compressed())?;

    let mut r = t.witness_scalar_rng(b"signing", &[secret_key.nonce_bytes().as_slice()], rng)?;
    let cap_r_compressed = RistrettoPoint::mul_base(&r).compress();
    t.commit_point(b"sign:R", &cap_r_compressed)?;

    let k = t.challenge_scalar(b"sign:c")?;
    let s = k * secret_key.scalar() + r;
    r.zeroize();

    Ok(Signature {
        cap_r_compressed,
        s,
    })
}

/// Verifies a signature using the following formula:
/// R = sG - H(A,R,t)A
fn verify_transcript(
    public_key: &PublicKey,
    mut t: SigningTranscript,
    signature: &Signature,
) -> Result<bool, SignatureError> {
    t.proto_name(b"Schnorr-sig")?;
    t.commit_point(b"sign:pk", public_key.as_compressed())?;
    t.commit_point(b"sign:R", &signature.cap_r_compressed)?;

    let k = t.challenge_scalar(b"sign:c")?;
    let cap_r = RistrettoPoint::vartime_double_scalar_mul_basepoint(
        &(-k),
        public_key.as_point(),
        &signature.s,
    );

    Ok(cap_r.compress() == signature.cap_r_compressed)
}

/// Types that can produce sr25519 signatures.
pub trait Signer {
    /// The public key signatures are checked against by the double-check
    /// variants.
    fn verifying_key(&self) -> PublicKey;

    /// Signs a transcript, hedging the nonce with entropy from `rng`.
    fn sign_rng<R>(&self, t: SigningTranscript, rng: &mut R) -> Result<Signature, SignatureError>
    where
        R: RngCore + CryptoRng;

    fn sign(&self, t: SigningTranscript) -> Result<Signature, SignatureError> {
        self.sign_rng(t, &mut rand::thread_rng())
    }

    /// Signs a clone of the transcript, then verifies the result against
    /// the original. Fails with `EquationFalse` if the check does not hold.
    #[tracing::instrument(name = "Signing with self-check", skip_all)]
    fn sign_double_check_rng<R>(
        &self,
        t: SigningTranscript,
        rng: &mut R,
    ) -> Result<Signature, SignatureError>
    where
        R: RngCore + CryptoRng,
    {
        let signature = self.sign_rng(t.clone(), rng)?;
        let signature = Signature::from_bytes(&signature.to_bytes())?;
        if !verify_transcript(&self.verifying_key(), t, &signature)? {
            tracing::error!("freshly produced signature failed verification");
            return Err(SignatureError::EquationFalse);
        }
        Ok(signature)
    }

    fn sign_double_check(&self, t: SigningTranscript) -> Result<Signature, SignatureError> {
        self.sign_double_check_rng(t, &mut rand::thread_rng())
    }

    /// Signs `message` under the signing context `context`.
    fn sign_simple(&self, context: &[u8], message: &[u8]) -> Result<Signature, SignatureError> {
        let t = SigningContext::new(context)?.bytes(message)?;
        self.sign(t)
    }

    fn sign_simple_double_check(
        &self,
        context: &[u8],
        message: &[u8],
    ) -> Result<Signature, SignatureError> {
        let t = SigningContext::new(context)?.bytes(message)?;
        self.sign_double_check(t)
    }
}

/// Types that can check sr25519 signatures.
///
/// A signature that is well formed but wrong yields `Ok(false)`.
pub trait Verifier {
    fn verify(&self, t: SigningTranscript, signature: &Signature) -> Result<bool, SignatureError>;

    fn verify_simple(
        &self,
        context: &[u8],
        message: &[u8],
        signature: &Signature,
    ) -> Result<bool, SignatureError> {
        let t = SigningContext::new(context)?.bytes(message)?;
        self.verify(t, signature)
    }
}

impl Signer for SecretKey {
    fn verifying_key(&self) -> PublicKey {
        self.to_public_key()
    }

    #[tracing::instrument(name = "Signing the transcript with the secret key", skip_all)]
    fn sign_rng<R>(&self, t: SigningTranscript, rng: &mut R) -> Result<Signature, SignatureError>
    where
        R: RngCore + CryptoRng,
    {
        sign_transcript(self, &self.to_public_key(), t, rng)
    }
}

impl Signer for KeyPair {
    fn verifying_key(&self) -> PublicKey {
        self.public_key
    }

    #[tracing::instrument(name = "Signing the transcript with the key pair", skip_all, fields(public_key = ?self.public_key))]
    fn sign_rng<R>(&self, t: SigningTranscript, rng: &mut R) -> Result<Signature, SignatureError>
    where
        R: RngCore + CryptoRng,
    {
        sign_transcript(&self.secret_key, &self.public_key, t, rng)
    }
}

impl Verifier for PublicKey {
    #[tracing::instrument(name = "Verifying the sr25519 signature", skip(t))]
    fn verify(&self, t: SigningTranscript, signature: &Signature) -> Result<bool, SignatureError> {
        verify_transcript(self, t, signature)
    }
}

impl Verifier for KeyPair {
    fn verify(&self, t: SigningTranscript, signature: &Signature) -> Result<bool, SignatureError> {
        self.public_key.verify(t, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys_management::{ExpansionMode, MiniSecretKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const GOOD_CONTEXT: &[u8] = b"good";

    fn transcript(message: &[u8]) -> SigningTranscript {
        SigningContext::new(GOOD_CONTEXT)
            .unwrap()
            .bytes(message)
            .unwrap()
    }

    #[test]
    fn test_valid_simple_signature() {
        // Create participant keys
        let keys = KeyPair::generate();

        // Message to be signed
        let message = b"Hello World";

        let signature = keys.sign_simple(GOOD_CONTEXT, message).unwrap();

        assert!(keys.verify_simple(GOOD_CONTEXT, message, &signature).unwrap());
    }

    #[test]
    fn test_invalid_simple_signature() {
        let keys = KeyPair::generate();
        let message = b"Hello World";
        let invalid_message = b"Send 0.000001 BTC to Bob";

        let signature = keys.sign_simple(GOOD_CONTEXT, message).unwrap();

        assert!(!keys
            .verify_simple(GOOD_CONTEXT, invalid_message, &signature)
            .unwrap());
    }

    #[test]
    fn test_wrong_context_fails() {
        let keys = KeyPair::generate();
        let signature = keys.sign_simple(GOOD_CONTEXT, b"message").unwrap();

        assert!(!keys.verify_simple(b"bad", b"message", &signature).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let keys = KeyPair::generate_with(&mut rng);
        let other = KeyPair::generate_with(&mut rng);

        let signature = keys.sign(transcript(b"message")).unwrap();

        assert!(!other.verify(transcript(b"message"), &signature).unwrap());
    }

    #[test]
    fn test_transcript_signatures_verify() {
        let mut rng = StdRng::seed_from_u64(2);
        let keys = KeyPair::generate_with(&mut rng);

        for i in 0..8u8 {
            let message = [i; 40];

            let signature = keys.sign(transcript(&message)).unwrap();
            let checked = keys.sign_double_check(transcript(&message)).unwrap();
            let simple_checked = keys.sign_simple_double_check(GOOD_CONTEXT, &message).unwrap();

            assert!(keys.verify(transcript(&message), &signature).unwrap());
            assert!(keys.verify(transcript(&message), &checked).unwrap());
            assert!(keys
                .verify_simple(GOOD_CONTEXT, &message, &simple_checked)
                .unwrap());
        }
    }

    #[test]
    fn test_secret_key_and_keypair_signatures_agree() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(3));

        let by_secret = keys
            .secret_key()
            .sign_rng(transcript(b"m"), &mut StdRng::seed_from_u64(4))
            .unwrap();
        let by_pair = keys
            .sign_rng(transcript(b"m"), &mut StdRng::seed_from_u64(4))
            .unwrap();

        assert_eq!(by_secret, by_pair);
        assert!(keys.public_key.verify(transcript(b"m"), &by_secret).unwrap());
    }

    #[test]
    fn test_signatures_are_hedged() {
        let keys = KeyPair::generate();

        let first = keys.sign(transcript(b"same message")).unwrap();
        let second = keys.sign(transcript(b"same message")).unwrap();

        assert_ne!(first, second);
        assert!(keys.verify(transcript(b"same message"), &first).unwrap());
        assert!(keys.verify(transcript(b"same message"), &second).unwrap());
    }

    #[test]
    fn test_flipping_any_signature_bit_breaks_verification() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(5));
        let signature = keys.sign(transcript(b"message")).unwrap();
        let bytes = signature.to_bytes();

        for bit in 0..(SIGNATURE_LENGTH * 8) {
            let mut tampered = bytes;
            tampered[bit / 8] ^= 1 << (bit % 8);

            // Tampered bytes either fail to decode or fail to verify
            if let Ok(tampered) = Signature::from_bytes(&tampered) {
                assert!(!keys.verify(transcript(b"message"), &tampered).unwrap());
            }
        }
    }

    #[test]
    fn test_flipping_message_bit_breaks_verification() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(6));
        let message = *b"a message of some length";
        let signature = keys.sign(transcript(&message)).unwrap();

        for bit in 0..(message.len() * 8) {
            let mut tampered = message;
            tampered[bit / 8] ^= 1 << (bit % 8);
            assert!(!keys.verify(transcript(&tampered), &signature).unwrap());
        }
    }

    #[test]
    fn test_signature_bytes_round_trip() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(7));
        let signature = keys.sign(transcript(b"message")).unwrap();

        let bytes = signature.to_bytes();

        assert_eq!(bytes[63] & 128, 128);
        assert_eq!(Signature::from_bytes(&bytes).unwrap(), signature);
    }

    #[test]
    fn test_unmarked_signature_is_rejected() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(8));
        let mut bytes = keys.sign(transcript(b"message")).unwrap().to_bytes();
        bytes[63] &= 127;

        assert_eq!(
            Signature::from_bytes(&bytes),
            Err(SignatureError::NotMarkedSchnorrkel)
        );
    }

    #[test]
    fn test_non_canonical_scalar_is_rejected() {
        let mut bytes = [0xffu8; SIGNATURE_LENGTH];
        bytes[63] = 0xff;

        assert_eq!(
            Signature::from_bytes(&bytes),
            Err(SignatureError::ScalarFormat)
        );
    }

    #[test]
    fn test_wrong_signature_length_is_rejected() {
        assert!(matches!(
            Signature::from_bytes(&[0u8; 63]),
            Err(SignatureError::BytesLength { length: 64, .. })
        ));
    }

    #[test]
    fn test_signature_serde_round_trip() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(9));
        let signature = keys.sign(transcript(b"message")).unwrap();

        let encoded = bincode::serialize(&signature).unwrap();
        let decoded: Signature = bincode::deserialize(&encoded).unwrap();

        assert_eq!(decoded, signature);
    }

    fn counting_seed_keypair() -> KeyPair {
        let seed: Vec<u8> = (0u8..32).collect();
        MiniSecretKey::from_bytes(&seed)
            .unwrap()
            .expand_to_keypair(ExpansionMode::Uniform)
            .unwrap()
    }

    #[test]
    fn test_reference_signature_verifies() {
        let keys = counting_seed_keypair();
        let signature = Signature::from_bytes(
            &hex::decode(
                "4e91a6d5b7f2e10a69eb7d231107893f3ce54fd115ebdd2be466852b3296ce42\
                 f89506948da8501368ed95be44ca7cf38bdfa173e0d7da755d62652f78234e84",
            )
            .unwrap(),
        )
        .unwrap();

        assert!(keys
            .public_key
            .verify_simple(b"substrate", b"reference message", &signature)
            .unwrap());
        assert!(!keys
            .public_key
            .verify_simple(b"substrate", b"other message", &signature)
            .unwrap());
    }

    #[test]
    fn test_signature_under_seeded_rng_known_vector() {
        let keys = counting_seed_keypair();

        let signature = keys
            .sign_rng(transcript(b"Hello World"), &mut StdRng::seed_from_u64(42))
            .unwrap();

        assert_eq!(
            hex::encode(signature.to_bytes()),
            "6a7dc8c2461f1090a9dd5e6dc9bbfd02fd993d977d99dbc5326d71286408996b\
             fef75f282b966b799f100fd61db34f2aa6f3f0b06fc52f4e2fb1a3e56f07918a"
        );
    }

    #[test]
    fn test_garbage_r_does_not_verify() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(10));
        let mut signature = keys.sign(transcript(b"message")).unwrap();
        signature.cap_r_compressed = CompressedRistretto([0xffu8; 32]);

        assert!(!keys.verify(transcript(b"message"), &signature).unwrap());
    }
}
