//! Hierarchical deterministic key derivation.
//!
//! Both modes run a transcript labeled `SchnorrRistrettoHDKD` that commits
//! to an empty message and, if given, a chain code.
//!
//! - Hard derivation commits the parent secret scalar and yields a new
//!   `MiniSecretKey`. The child public key has no algebraic relation to the
//!   parent public key.
//! - Simple (soft) derivation commits the parent public key and adds a
//!   challenge scalar to the parent key, so the child public key can also
//!   be derived from the parent public key and chain code alone.

mod hard;
mod simple;

pub use hard::HardDerivationResult;
pub use simple::{PublicDerivationResult, SimpleDerivationResult};

use crate::errors::{SignatureError, TranscriptError};
use crate::merlin::TranscriptProtocol;
use crate::signing_transcript::SigningTranscript;

/// Length in bytes of chain codes.
pub const CHAIN_CODE_LENGTH: usize = 32;

/// A 32 byte chain code, mixed into derivations so that low-entropy
/// derivation paths still produce unpredictable keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChainCode(pub [u8; CHAIN_CODE_LENGTH]);

impl ChainCode {
    /// Builds a chain code, zero-padding shorter inputs on the right.
    /// Inputs longer than 32 bytes are rejected, never truncated.
    pub fn from_bytes(bytes: &[u8]) -> Result<ChainCode, SignatureError> {
        if bytes.len() > CHAIN_CODE_LENGTH {
            return Err(SignatureError::ChainCodeTooLong {
                length: bytes.len(),
            });
        }
        let mut cc = [0u8; CHAIN_CODE_LENGTH];
        cc[..bytes.len()].copy_from_slice(bytes);
        Ok(ChainCode(cc))
    }

    pub fn as_bytes(&self) -> &[u8; CHAIN_CODE_LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for ChainCode {
    type Error = SignatureError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        ChainCode::from_bytes(bytes)
    }
}

fn derivation_transcript(cc: Option<&ChainCode>) -> Result<SigningTranscript, TranscriptError> {
    let mut t = SigningTranscript::new(b"SchnorrRistrettoHDKD")?;
    t.append_message(b"sign-bytes", b"")?;
    if let Some(cc) = cc {
        t.append_message(b"chain-code", cc.as_bytes())?;
    }
    Ok(t)
}

fn challenge_chain_code(t: &mut SigningTranscript) -> Result<ChainCode, TranscriptError> {
    let mut chain_code = [0u8; CHAIN_CODE_LENGTH];
    t.challenge_bytes(b"HDKD-chaincode", &mut chain_code)?;
    Ok(ChainCode(chain_code))
}
