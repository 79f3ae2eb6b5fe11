use super::strobe::Strobe128;
use super::transcript_rng::TranscriptRngBuilder;
use crate::errors::TranscriptError;

const MERLIN_PROTOCOL_LABEL: &[u8] = b"Merlin v1.0";

/// Encodes a length as the 32-bit little-endian prefix Merlin frames data with.
pub(crate) fn encode_length(length: usize) -> Result<[u8; 4], TranscriptError> {
    u32::try_from(length)
        .map(u32::to_le_bytes)
        .map_err(|_| TranscriptError::LengthOverflow { length })
}

/// The operations shared by every Merlin-style transcript.
///
/// Implemented by the bare [`Transcript`] and by wrappers that add protocol
/// vocabulary on top of it, such as
/// [`SigningTranscript`](crate::signing_transcript::SigningTranscript).
pub trait TranscriptProtocol {
    /// Appends a labeled message.
    fn append_message(&mut self, label: &'static [u8], message: &[u8])
        -> Result<(), TranscriptError>;

    /// Appends a `u64` as 8 little-endian bytes.
    fn append_u64(&mut self, label: &'static [u8], x: u64) -> Result<(), TranscriptError> {
        self.append_message(label, &x.to_le_bytes())
    }

    /// Fills `dest` with challenge bytes bound to everything appended so far.
    fn challenge_bytes(&mut self, label: &'static [u8], dest: &mut [u8])
        -> Result<(), TranscriptError>;

    /// Forks the transcript state into a builder for witness randomness.
    fn build_rng(&self) -> TranscriptRngBuilder;
}

/// A Merlin transcript: a domain-separated, append-only log over STROBE-128.
#[derive(Clone, Debug)]
pub struct Transcript {
    strobe: Strobe128,
}

impl Transcript {
    /// Starts a transcript for the protocol identified by `label`.
    pub fn new(label: &'static [u8]) -> Result<Transcript, TranscriptError> {
        let mut transcript = Transcript {
            strobe: Strobe128::new(MERLIN_PROTOCOL_LABEL)?,
        };
        transcript.append_message(b"dom-sep", label)?;
        Ok(transcript)
    }
}

impl TranscriptProtocol for Transcript {
    fn append_message(
        &mut self,
        label: &'static [u8],
        message: &[u8],
    ) -> Result<(), TranscriptError> {
        let length = encode_length(message.len())?;
        self.strobe.meta_ad(label, false)?;
        self.strobe.meta_ad(&length, true)?;
        self.strobe.ad(message, false)
    }

    fn challenge_bytes(
        &mut self,
        label: &'static [u8],
        dest: &mut [u8],
    ) -> Result<(), TranscriptError> {
        let length = encode_length(dest.len())?;
        self.strobe.meta_ad(label, false)?;
        self.strobe.meta_ad(&length, true)?;
        self.strobe.prf(dest, false)
    }

    fn build_rng(&self) -> TranscriptRngBuilder {
        TranscriptRngBuilder::new(self.strobe.clone())
    }
}
