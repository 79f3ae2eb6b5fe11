//! Schnorr vocabulary on top of a Merlin transcript, and signing contexts.

use crate::errors::TranscriptError;
use crate::merlin::{Transcript, TranscriptProtocol, TranscriptRngBuilder};
use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use secrecy::zeroize::Zeroize;

/// A transcript for Schnorr signatures and key derivation.
///
/// Cloning yields an independent transcript, so a signature can be checked
/// against the same statement it was produced on.
#[derive(Clone, Debug)]
pub struct SigningTranscript {
    transcript: Transcript,
}

impl From<Transcript> for SigningTranscript {
    fn from(transcript: Transcript) -> Self {
        SigningTranscript { transcript }
    }
}

impl SigningTranscript {
    pub fn new(label: &'static [u8]) -> Result<SigningTranscript, TranscriptError> {
        Ok(SigningTranscript {
            transcript: Transcript::new(label)?,
        })
    }

    /// Names the protocol the following commitments belong to.
    pub fn proto_name(&mut self, label: &'static [u8]) -> Result<(), TranscriptError> {
        self.transcript.append_message(b"proto-name", label)
    }

    pub fn commit_point(
        &mut self,
        label: &'static [u8],
        compressed: &CompressedRistretto,
    ) -> Result<(), TranscriptError> {
        self.transcript.append_message(label, compressed.as_bytes())
    }

    /// Produces the public challenge scalar from 64 challenge bytes reduced
    /// modulo the group order.
    pub fn challenge_scalar(&mut self, label: &'static [u8]) -> Result<Scalar, TranscriptError> {
        let mut buffer = [0u8; 64];
        self.transcript.challenge_bytes(label, &mut buffer)?;
        let scalar = Scalar::from_bytes_mod_order_wide(&buffer);
        buffer.zeroize();
        Ok(scalar)
    }

    /// Produces a secret witness scalar, aka nonce, from the transcript, the
    /// `nonce_seeds` kept with the secret key, and entropy from `rng`.
    pub fn witness_scalar_rng<R>(
        &self,
        label: &'static [u8],
        nonce_seeds: &[&[u8]],
        rng: &mut R,
    ) -> Result<Scalar, TranscriptError>
    where
        R: RngCore + CryptoRng,
    {
        let mut scalar_bytes = [0u8; 64];
        self.witness_bytes_rng(label, &mut scalar_bytes, nonce_seeds, rng)?;
        let scalar = Scalar::from_bytes_mod_order_wide(&scalar_bytes);
        scalar_bytes.zeroize();
        Ok(scalar)
    }

    pub fn witness_scalar(
        &self,
        label: &'static [u8],
        nonce_seeds: &[&[u8]],
    ) -> Result<Scalar, TranscriptError> {
        self.witness_scalar_rng(label, nonce_seeds, &mut rand::thread_rng())
    }

    /// Fills `dest` with secret witness bytes. The transcript itself is not
    /// modified: the witness is drawn from a fork of it.
    pub fn witness_bytes_rng<R>(
        &self,
        label: &'static [u8],
        dest: &mut [u8],
        nonce_seeds: &[&[u8]],
        rng: &mut R,
    ) -> Result<(), TranscriptError>
    where
        R: RngCore + CryptoRng,
    {
        let mut builder = self.transcript.build_rng();
        for seed in nonce_seeds {
            builder = builder.rekey_with_witness_bytes(label, seed)?;
        }
        builder.finalize_with(rng)?.fill_bytes(dest)
    }

    pub fn witness_bytes(
        &self,
        label: &'static [u8],
        dest: &mut [u8],
        nonce_seeds: &[&[u8]],
    ) -> Result<(), TranscriptError> {
        self.witness_bytes_rng(label, dest, nonce_seeds, &mut rand::thread_rng())
    }
}

impl TranscriptProtocol for SigningTranscript {
    fn append_message(
        &mut self,
        label: &'static [u8],
        message: &[u8],
    ) -> Result<(), TranscriptError> {
        self.transcript.append_message(label, message)
    }

    fn append_u64(&mut self, label: &'static [u8], x: u64) -> Result<(), TranscriptError> {
        self.transcript.append_u64(label, x)
    }

    fn challenge_bytes(
        &mut self,
        label: &'static [u8],
        dest: &mut [u8],
    ) -> Result<(), TranscriptError> {
        self.transcript.challenge_bytes(label, dest)
    }

    fn build_rng(&self) -> TranscriptRngBuilder {
        self.transcript.build_rng()
    }
}

/// Schnorr signing context.
///
/// Protocols should use a separate context for each role signatures play in
/// them. A context turns a message into the [`SigningTranscript`] that gets
/// signed or verified.
#[derive(Clone, Debug)]
pub struct SigningContext {
    transcript: SigningTranscript,
}

impl SigningContext {
    /// Initializes a signing context from bytes identifying the signature's
    /// role in the larger protocol.
    pub fn new(context: &[u8]) -> Result<SigningContext, TranscriptError> {
        let mut transcript = SigningTranscript::new(b"SigningContext")?;
        transcript.append_message(b"", context)?;
        Ok(SigningContext { transcript })
    }

    /// Uses `label` directly as the transcript's protocol label.
    pub fn from_label(label: &'static [u8]) -> Result<SigningContext, TranscriptError> {
        Ok(SigningContext {
            transcript: SigningTranscript::new(label)?,
        })
    }

    /// Creates a signing transcript over `message`.
    ///
    /// Merlin is built for domain separation, not throughput, so very large
    /// messages should be hashed by the caller first.
    pub fn bytes(&self, message: &[u8]) -> Result<SigningTranscript, TranscriptError> {
        let mut transcript = self.transcript.clone();
        transcript.append_message(b"sign-bytes", message)?;
        Ok(transcript)
    }
}
