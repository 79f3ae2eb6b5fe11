//! Key types: mini secret keys, expanded secret keys, public keys and key
//! pairs, together with their byte encodings.

use crate::errors::{serde_error_from_signature_error, SignatureError};
use crate::merlin::{Transcript, TranscriptProtocol};
use crate::scalars::{
    divide_scalar_bytes_by_cofactor, multiply_scalar_bytes_by_cofactor, scalar_from_bits,
};
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, Secret};
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use std::fmt;

/// The length of a `MiniSecretKey`, in bytes.
pub const MINI_SECRET_KEY_LENGTH: usize = 32;

/// The length of the scalar portion of a `SecretKey`, in bytes.
pub const SECRET_KEY_KEY_LENGTH: usize = 32;

/// The length of the nonce portion of a `SecretKey`, in bytes.
pub const SECRET_KEY_NONCE_LENGTH: usize = 32;

/// The length of a `SecretKey`, in bytes.
pub const SECRET_KEY_LENGTH: usize = SECRET_KEY_KEY_LENGTH + SECRET_KEY_NONCE_LENGTH;

/// The length of a compressed `PublicKey`, in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// The length of a `KeyPair`, in bytes.
pub const KEYPAIR_LENGTH: usize = SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH;

/// Methods for expanding a `MiniSecretKey` into a `SecretKey`.
///
/// The mode must be chosen consistently: the same mini secret key expands to
/// unrelated secret keys under the two modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpansionMode {
    /// Expand through a Merlin transcript, giving a uniform scalar.
    Uniform,
    /// Expand with SHA-512 and ed25519-style clamping, for compatibility
    /// with deployments that derive keys that way.
    Ed25519,
}

fn check_length(
    bytes: &[u8],
    name: &'static str,
    description: &'static str,
    length: usize,
) -> Result<(), SignatureError> {
    if bytes.len() != length {
        return Err(SignatureError::BytesLength {
            name,
            description,
            length,
        });
    }
    Ok(())
}

fn array32(bytes: &[u8]) -> [u8; 32] {
    let mut array = [0u8; 32];
    array.copy_from_slice(&bytes[..32]);
    array
}

/// A 32 byte seed from which a `SecretKey` is expanded.
pub struct MiniSecretKey {
    seed: Secret<[u8; MINI_SECRET_KEY_LENGTH]>,
}

impl fmt::Debug for MiniSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MiniSecretKey {{ .. }}")
    }
}

impl Clone for MiniSecretKey {
    fn clone(&self) -> Self {
        MiniSecretKey {
            seed: Secret::new(*self.seed.expose_secret()),
        }
    }
}

impl MiniSecretKey {
    const DESCRIPTION: &'static str = "Analogous to ed25519 secret key as 32 bytes, see RFC8032.";

    pub fn from_bytes(bytes: &[u8]) -> Result<MiniSecretKey, SignatureError> {
        check_length(
            bytes,
            "MiniSecretKey",
            Self::DESCRIPTION,
            MINI_SECRET_KEY_LENGTH,
        )?;
        Ok(MiniSecretKey {
            seed: Secret::new(array32(bytes)),
        })
    }

    pub fn generate_with<R>(rng: &mut R) -> MiniSecretKey
    where
        R: RngCore + CryptoRng,
    {
        let mut seed = [0u8; MINI_SECRET_KEY_LENGTH];
        rng.fill_bytes(&mut seed);
        MiniSecretKey {
            seed: Secret::new(seed),
        }
    }

    pub fn generate() -> MiniSecretKey {
        Self::generate_with(&mut rand::thread_rng())
    }

    pub fn to_bytes(&self) -> [u8; MINI_SECRET_KEY_LENGTH] {
        *self.seed.expose_secret()
    }

    fn expand_uniform(&self) -> Result<SecretKey, SignatureError> {
        let mut t = Transcript::new(b"ExpandSecretKeys")?;
        t.append_message(b"mini", self.seed.expose_secret())?;

        let mut scalar_bytes = [0u8; 64];
        t.challenge_bytes(b"sk", &mut scalar_bytes)?;
        let key = Scalar::from_bytes_mod_order_wide(&scalar_bytes).to_bytes();
        scalar_bytes.zeroize();

        let mut nonce = [0u8; SECRET_KEY_NONCE_LENGTH];
        t.challenge_bytes(b"no", &mut nonce)?;

        Ok(SecretKey::from_parts(key, nonce))
    }

    fn expand_ed25519(&self) -> SecretKey {
        let mut r = [0u8; 64];
        r.copy_from_slice(&Sha512::digest(self.seed.expose_secret()));

        // Clamping is not needed in a prime order group, but keeps the
        // scalar identical to the one ed25519 derives from this seed
        r[0] &= 248;
        r[31] &= 63;
        r[31] |= 64;

        let key = divide_scalar_bytes_by_cofactor(array32(&r[..32]));
        let nonce = array32(&r[32..]);
        r.zeroize();

        SecretKey::from_parts(key, nonce)
    }

    /// Expands this seed into a `SecretKey`.
    #[tracing::instrument(name = "Expanding the mini secret key", skip(self))]
    pub fn expand(&self, mode: ExpansionMode) -> Result<SecretKey, SignatureError> {
        match mode {
            ExpansionMode::Uniform => self.expand_uniform(),
            ExpansionMode::Ed25519 => Ok(self.expand_ed25519()),
        }
    }

    pub fn expand_to_keypair(&self, mode: ExpansionMode) -> Result<KeyPair, SignatureError> {
        Ok(self.expand(mode)?.to_keypair())
    }

    pub fn expand_to_public(&self, mode: ExpansionMode) -> Result<PublicKey, SignatureError> {
        Ok(self.expand(mode)?.to_public_key())
    }
}

/// An expanded secret key: a scalar plus a seed for signing nonces.
///
/// The scalar bytes are kept as given and read with `from_bits` semantics,
/// so they need not be canonically reduced.
pub struct SecretKey {
    key: Secret<[u8; SECRET_KEY_KEY_LENGTH]>,
    nonce: Secret<[u8; SECRET_KEY_NONCE_LENGTH]>,
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SecretKey {{ .. }}")
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        SecretKey::from_parts(*self.key.expose_secret(), *self.nonce.expose_secret())
    }
}

impl SecretKey {
    const DESCRIPTION: &'static str =
        "An ed25519-like expanded secret key as 64 bytes, as specified in RFC8032.";

    pub(crate) fn from_parts(
        key: [u8; SECRET_KEY_KEY_LENGTH],
        nonce: [u8; SECRET_KEY_NONCE_LENGTH],
    ) -> SecretKey {
        SecretKey {
            key: Secret::new(key),
            nonce: Secret::new(nonce),
        }
    }

    /// Decodes `scalar || nonce`.
    pub fn from_bytes(bytes: &[u8]) -> Result<SecretKey, SignatureError> {
        check_length(bytes, "SecretKey", Self::DESCRIPTION, SECRET_KEY_LENGTH)?;
        Ok(SecretKey::from_parts(
            array32(&bytes[..SECRET_KEY_KEY_LENGTH]),
            array32(&bytes[SECRET_KEY_KEY_LENGTH..]),
        ))
    }

    /// Decodes an ed25519 expanded secret key, whose scalar is a multiple
    /// of the cofactor.
    pub fn from_ed25519_bytes(bytes: &[u8]) -> Result<SecretKey, SignatureError> {
        check_length(bytes, "SecretKey", Self::DESCRIPTION, SECRET_KEY_LENGTH)?;
        let key = divide_scalar_bytes_by_cofactor(array32(&bytes[..SECRET_KEY_KEY_LENGTH]));
        Ok(SecretKey::from_parts(
            key,
            array32(&bytes[SECRET_KEY_KEY_LENGTH..]),
        ))
    }

    /// Generates a secret key directly, bypassing the `MiniSecretKey` layer.
    pub fn generate_with<R>(rng: &mut R) -> SecretKey
    where
        R: RngCore + CryptoRng,
    {
        let mut scalar_bytes = [0u8; 64];
        rng.fill_bytes(&mut scalar_bytes);
        let key = Scalar::from_bytes_mod_order_wide(&scalar_bytes).to_bytes();
        scalar_bytes.zeroize();

        let mut nonce = [0u8; SECRET_KEY_NONCE_LENGTH];
        rng.fill_bytes(&mut nonce);

        SecretKey::from_parts(key, nonce)
    }

    pub fn generate() -> SecretKey {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Encodes as `scalar || nonce`.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        let mut bytes = [0u8; SECRET_KEY_LENGTH];
        bytes[..SECRET_KEY_KEY_LENGTH].copy_from_slice(self.key.expose_secret());
        bytes[SECRET_KEY_KEY_LENGTH..].copy_from_slice(self.nonce.expose_secret());
        bytes
    }

    /// Encodes with the scalar multiplied by the cofactor, as ed25519
    /// expanded secret keys are.
    pub fn to_ed25519_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        let mut bytes = [0u8; SECRET_KEY_LENGTH];
        bytes[..SECRET_KEY_KEY_LENGTH]
            .copy_from_slice(&multiply_scalar_bytes_by_cofactor(*self.key.expose_secret()));
        bytes[SECRET_KEY_KEY_LENGTH..].copy_from_slice(self.nonce.expose_secret());
        bytes
    }

    pub(crate) fn key_bytes(&self) -> &[u8; SECRET_KEY_KEY_LENGTH] {
        self.key.expose_secret()
    }

    pub(crate) fn nonce_bytes(&self) -> &[u8; SECRET_KEY_NONCE_LENGTH] {
        self.nonce.expose_secret()
    }

    pub(crate) fn scalar(&self) -> Scalar {
        scalar_from_bits(*self.key.expose_secret())
    }

    pub fn to_public_key(&self) -> PublicKey {
        PublicKey::from_point(RistrettoPoint::mul_base(&self.scalar()))
    }

    pub fn to_keypair(&self) -> KeyPair {
        KeyPair {
            public_key: self.to_public_key(),
            secret_key: self.clone(),
        }
    }
}

/// A Ristretto public key, kept in both compressed and decompressed form.
#[derive(Copy, Clone)]
pub struct PublicKey {
    compressed: CompressedRistretto,
    point: RistrettoPoint,
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PublicKey({:?})", self.compressed)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.compressed == other.compressed
    }
}

impl Eq for PublicKey {}

impl PublicKey {
    const DESCRIPTION: &'static str = "A Ristretto Schnorr public key represented as a 32-byte Ristretto compressed point";

    pub fn from_point(point: RistrettoPoint) -> PublicKey {
        PublicKey {
            compressed: point.compress(),
            point,
        }
    }

    pub fn from_compressed(compressed: CompressedRistretto) -> Result<PublicKey, SignatureError> {
        let point = compressed
            .decompress()
            .ok_or(SignatureError::PointDecompression)?;
        Ok(PublicKey { compressed, point })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<PublicKey, SignatureError> {
        check_length(bytes, "PublicKey", Self::DESCRIPTION, PUBLIC_KEY_LENGTH)?;
        PublicKey::from_compressed(CompressedRistretto(array32(bytes)))
    }

    pub fn as_compressed(&self) -> &CompressedRistretto {
        &self.compressed
    }

    pub fn as_point(&self) -> &RistrettoPoint {
        &self.point
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.compressed.to_bytes()
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.compressed.as_bytes())
    }
}

impl<'d> Deserialize<'d> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'d>,
    {
        struct PublicKeyVisitor;

        impl<'d> Visitor<'d> for PublicKeyVisitor {
            type Value = PublicKey;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str(PublicKey::DESCRIPTION)
            }

            fn visit_bytes<E>(self, bytes: &[u8]) -> Result<PublicKey, E>
            where
                E: serde::de::Error,
            {
                PublicKey::from_bytes(bytes).map_err(serde_error_from_signature_error)
            }
        }
        deserializer.deserialize_bytes(PublicKeyVisitor)
    }
}

/// A secret key together with its public key.
///
/// The public key is trusted to match the secret key; it is not
/// recomputed when decoding.
#[derive(Clone)]
pub struct KeyPair {
    pub(crate) secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Format the KeyPair struct without including secret_key
        write!(f, "KeyPair {{ public_key: {:?} }}", self.public_key)
    }
}

impl From<SecretKey> for KeyPair {
    fn from(secret_key: SecretKey) -> KeyPair {
        KeyPair {
            public_key: secret_key.to_public_key(),
            secret_key,
        }
    }
}

impl KeyPair {
    const DESCRIPTION: &'static str = "A 96 bytes Ristretto Schnorr keypair";

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Generates a key pair directly, bypassing the `MiniSecretKey` layer.
    pub fn generate_with<R>(rng: &mut R) -> KeyPair
    where
        R: RngCore + CryptoRng,
    {
        KeyPair::from(SecretKey::generate_with(rng))
    }

    pub fn generate() -> KeyPair {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Decodes `secret key || public key`.
    pub fn from_bytes(bytes: &[u8]) -> Result<KeyPair, SignatureError> {
        check_length(bytes, "KeyPair", Self::DESCRIPTION, KEYPAIR_LENGTH)?;
        Ok(KeyPair {
            secret_key: SecretKey::from_bytes(&bytes[..SECRET_KEY_LENGTH])?,
            public_key: PublicKey::from_bytes(&bytes[SECRET_KEY_LENGTH..])?,
        })
    }

    /// Decodes `secret key || public key` with an ed25519-style secret key.
    pub fn from_ed25519_bytes(bytes: &[u8]) -> Result<KeyPair, SignatureError> {
        check_length(bytes, "KeyPair", Self::DESCRIPTION, KEYPAIR_LENGTH)?;
        Ok(KeyPair {
            secret_key: SecretKey::from_ed25519_bytes(&bytes[..SECRET_KEY_LENGTH])?,
            public_key: PublicKey::from_bytes(&bytes[SECRET_KEY_LENGTH..])?,
        })
    }

    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        let mut bytes = [0u8; KEYPAIR_LENGTH];
        bytes[..SECRET_KEY_LENGTH].copy_from_slice(&self.secret_key.to_bytes());
        bytes[SECRET_KEY_LENGTH..].copy_from_slice(&self.public_key.to_bytes());
        bytes
    }

    pub fn to_ed25519_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        let mut bytes = [0u8; KEYPAIR_LENGTH];
        bytes[..SECRET_KEY_LENGTH].copy_from_slice(&self.secret_key.to_ed25519_bytes());
        bytes[SECRET_KEY_LENGTH..].copy_from_slice(&self.public_key.to_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_public_key_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let keys = KeyPair::generate_with(&mut rng);

        let from_bytes = PublicKey::from_bytes(&keys.public_key.to_bytes()).unwrap();
        let from_compressed = PublicKey::from_compressed(*keys.public_key.as_compressed()).unwrap();

        assert_eq!(from_bytes, keys.public_key);
        assert_eq!(from_compressed, keys.public_key);
    }

    #[test]
    fn test_secret_key_round_trips() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..16 {
            let secret = SecretKey::generate_with(&mut rng);

            let canonical = SecretKey::from_bytes(&secret.to_bytes()).unwrap();
            let ed25519 = SecretKey::from_ed25519_bytes(&secret.to_ed25519_bytes()).unwrap();

            assert_eq!(canonical.to_bytes(), secret.to_bytes());
            assert_eq!(ed25519.to_bytes(), secret.to_bytes());
            assert_eq!(ed25519.to_public_key(), secret.to_public_key());
        }
    }

    #[test]
    fn test_keypair_round_trips() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            let keys = KeyPair::generate_with(&mut rng);

            let canonical = KeyPair::from_bytes(&keys.to_bytes()).unwrap();
            let ed25519 = KeyPair::from_ed25519_bytes(&keys.to_ed25519_bytes()).unwrap();

            assert_eq!(canonical.to_bytes(), keys.to_bytes());
            assert_eq!(ed25519.to_bytes(), keys.to_bytes());
            assert_eq!(ed25519.to_ed25519_bytes(), keys.to_ed25519_bytes());
        }
    }

    #[test]
    fn test_wrong_lengths_are_rejected() {
        assert!(matches!(
            MiniSecretKey::from_bytes(&[0u8; 31]),
            Err(SignatureError::BytesLength { length: 32, .. })
        ));
        assert!(matches!(
            SecretKey::from_bytes(&[0u8; 63]),
            Err(SignatureError::BytesLength { length: 64, .. })
        ));
        assert!(matches!(
            PublicKey::from_bytes(&[0u8; 33]),
            Err(SignatureError::BytesLength { length: 32, .. })
        ));
        assert!(matches!(
            KeyPair::from_bytes(&[0u8; 95]),
            Err(SignatureError::BytesLength { length: 96, .. })
        ));
    }

    #[test]
    fn test_invalid_point_is_rejected() {
        // Not a canonical field element encoding
        let bytes = [0xffu8; 32];

        assert_eq!(
            PublicKey::from_bytes(&bytes),
            Err(SignatureError::PointDecompression)
        );
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let mini = MiniSecretKey::from_bytes(&[3u8; 32]).unwrap();

        for mode in [ExpansionMode::Uniform, ExpansionMode::Ed25519] {
            let first = mini.expand(mode).unwrap();
            let second = mini.clone().expand(mode).unwrap();
            assert_eq!(first.to_bytes(), second.to_bytes());
        }
    }

    #[test]
    fn test_expansion_modes_differ() {
        let mini = MiniSecretKey::generate_with(&mut StdRng::seed_from_u64(9));

        let uniform = mini.expand_to_public(ExpansionMode::Uniform).unwrap();
        let ed25519 = mini.expand_to_public(ExpansionMode::Ed25519).unwrap();

        assert_ne!(uniform, ed25519);
    }

    #[test]
    fn test_ed25519_expansion_matches_clamped_hash() {
        let seed = [11u8; 32];
        let mini = MiniSecretKey::from_bytes(&seed).unwrap();
        let hash = Sha512::digest(seed);

        let secret = mini.expand(ExpansionMode::Ed25519).unwrap();
        let ed25519_bytes = secret.to_ed25519_bytes();

        let mut clamped = [0u8; 32];
        clamped.copy_from_slice(&hash[..32]);
        clamped[0] &= 248;
        clamped[31] &= 63;
        clamped[31] |= 64;

        assert_eq!(&ed25519_bytes[..32], &clamped);
        assert_eq!(&ed25519_bytes[32..], &hash[32..]);
    }

    fn counting_seed() -> MiniSecretKey {
        let seed: Vec<u8> = (0u8..32).collect();
        MiniSecretKey::from_bytes(&seed).unwrap()
    }

    #[test]
    fn test_uniform_expansion_known_vector() {
        let keys = counting_seed()
            .expand_to_keypair(ExpansionMode::Uniform)
            .unwrap();

        assert_eq!(
            hex::encode(keys.secret_key().to_bytes()),
            "4f873cb6af2c665040eaba646b6a68697c69100139cd505fb2a8a380b275a601\
             278a2221c1bb1f35c7dc8ddff570fd8f26a8bbeecac3dbbb4a354bdd539ae799"
        );
        assert_eq!(
            hex::encode(keys.public_key.to_bytes()),
            "84eb3e0a00861c1137383d4134b5d4d98420480dd8c8e3d6daefaa651fd09414"
        );
    }

    #[test]
    fn test_ed25519_expansion_known_public_key() {
        let public = counting_seed()
            .expand_to_public(ExpansionMode::Ed25519)
            .unwrap();

        assert_eq!(
            hex::encode(public.to_bytes()),
            "e2111779981618705ecacea1af6ff9350bce2b2dccd03e0c3e01eb0c823d2666"
        );
    }

    #[test]
    fn test_expand_to_keypair_matches_public() {
        let mini = MiniSecretKey::generate_with(&mut StdRng::seed_from_u64(10));

        let keys = mini.expand_to_keypair(ExpansionMode::Uniform).unwrap();

        assert_eq!(
            keys.public_key,
            mini.expand_to_public(ExpansionMode::Uniform).unwrap()
        );
    }

    #[test]
    fn test_public_key_serde_round_trip() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(11));

        let encoded = bincode::serialize(&keys.public_key).unwrap();
        let decoded: PublicKey = bincode::deserialize(&encoded).unwrap();

        assert_eq!(decoded, keys.public_key);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let keys = KeyPair::generate_with(&mut StdRng::seed_from_u64(12));

        let rendered = format!("{:?} {:?}", keys, keys.secret_key());

        assert!(rendered.contains("KeyPair"));
        assert!(rendered.contains("SecretKey { .. }"));
    }
}
