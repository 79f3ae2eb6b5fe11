use super::{challenge_chain_code, derivation_transcript, ChainCode};
use crate::errors::SignatureError;
use crate::keys_management::{
    ExpansionMode, KeyPair, MiniSecretKey, PublicKey, SecretKey, SECRET_KEY_NONCE_LENGTH,
};
use crate::signing_transcript::SigningTranscript;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use secrecy::zeroize::Zeroize;

/// Output of a simple derivation on the secret side.
#[derive(Debug, Clone)]
pub struct SimpleDerivationResult {
    pub secret_key: SecretKey,
    pub chain_code: ChainCode,
}

/// Output of a simple derivation on the public side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PublicDerivationResult {
    pub public_key: PublicKey,
    pub chain_code: ChainCode,
}

/// Runs the part of a simple derivation both sides share: the transcript
/// over `public_key` and `cc`, the tweak scalar, and the next chain code.
fn derive_scalar_and_chain_code(
    public_key: &CompressedRistretto,
    cc: Option<&ChainCode>,
) -> Result<(SigningTranscript, Scalar, ChainCode), SignatureError> {
    let mut t = derivation_transcript(cc)?;
    t.commit_point(b"public-key", public_key)?;
    let scalar = t.challenge_scalar(b"HDKD-scalar")?;
    let chain_code = challenge_chain_code(&mut t)?;
    Ok((t, scalar, chain_code))
}

impl SecretKey {
    /// Derives a child secret key whose public key equals
    /// `PublicKey::derive_simple` applied to this key's public key.
    ///
    /// The child's nonce is drawn as a witness, so `rng` only affects the
    /// nonce and never the child public key.
    #[tracing::instrument(name = "Simple derivation of a secret key", skip_all)]
    pub fn derive_simple_rng<R>(
        &self,
        cc: Option<&ChainCode>,
        rng: &mut R,
    ) -> Result<SimpleDerivationResult, SignatureError>
    where
        R: RngCore + CryptoRng,
    {
        let (t, scalar, chain_code) =
            derive_scalar_and_chain_code(self.to_public_key().as_compressed(), cc)?;

        let mut secret_bytes = self.to_bytes();
        let mut nonce = [0u8; SECRET_KEY_NONCE_LENGTH];
        let witnessed = t.witness_bytes_rng(
            b"HDKD-nonce",
            &mut nonce,
            &[self.nonce_bytes().as_slice(), secret_bytes.as_slice()],
            rng,
        );
        secret_bytes.zeroize();
        witnessed?;

        let key = (self.scalar() + scalar).to_bytes();
        let secret_key = SecretKey::from_parts(key, nonce);
        nonce.zeroize();

        Ok(SimpleDerivationResult {
            secret_key,
            chain_code,
        })
    }

    pub fn derive_simple(
        &self,
        cc: Option<&ChainCode>,
    ) -> Result<SimpleDerivationResult, SignatureError> {
        self.derive_simple_rng(cc, &mut rand::thread_rng())
    }
}

impl PublicKey {
    /// Derives the child public key of a simple derivation without any
    /// secret material.
    #[tracing::instrument(name = "Simple derivation of a public key", skip(cc))]
    pub fn derive_simple(
        &self,
        cc: Option<&ChainCode>,
    ) -> Result<PublicDerivationResult, SignatureError> {
        let (_, scalar, chain_code) = derive_scalar_and_chain_code(self.as_compressed(), cc)?;
        let point = self.as_point() + RistrettoPoint::mul_base(&scalar);

        Ok(PublicDerivationResult {
            public_key: PublicKey::from_point(point),
            chain_code,
        })
    }
}

impl MiniSecretKey {
    /// Expands this seed with `mode`, then simple-derives from the result.
    pub fn derive_simple(
        &self,
        cc: Option<&ChainCode>,
        mode: ExpansionMode,
    ) -> Result<SimpleDerivationResult, SignatureError> {
        self.expand(mode)?.derive_simple(cc)
    }
}

impl KeyPair {
    pub fn derive_simple_rng<R>(
        &self,
        cc: Option<&ChainCode>,
        rng: &mut R,
    ) -> Result<KeyPair, SignatureError>
    where
        R: RngCore + CryptoRng,
    {
        Ok(KeyPair::from(
            self.secret_key.derive_simple_rng(cc, rng)?.secret_key,
        ))
    }

    pub fn derive_simple(&self, cc: Option<&ChainCode>) -> Result<KeyPair, SignatureError> {
        self.derive_simple_rng(cc, &mut rand::thread_rng())
    }
}
