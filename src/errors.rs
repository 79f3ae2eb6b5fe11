//! Error types for the transcript layer and the signature scheme.

use thiserror::Error;

/// Errors raised by the STROBE sponge and the Merlin transcript built on it.
///
/// Every variant indicates a misuse of the sponge by its caller; none of them
/// can be triggered by untrusted input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    /// An operation was continued (`more = true`) with flags that differ
    /// from the operation currently open on the sponge.
    #[error("tried to continue operation {current:#04x} with flags {requested:#04x}")]
    FlagMismatch { current: u8, requested: u8 },

    /// The transport (`T`) flag was requested. Only `AD`, `KEY` and `PRF`
    /// are implemented.
    #[error("the transport flag is not supported by this sponge")]
    UnsupportedTransportFlag,

    /// A message or output length does not fit in the 32-bit length prefix.
    #[error("length {length} does not fit in a 32-bit transcript length prefix")]
    LengthOverflow { length: usize },
}

/// Errors which may occur while decoding keys and signatures, or while
/// signing and deriving keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// A fixed-size field received the wrong number of bytes.
    #[error("{name} must be {length} bytes in length ({description})")]
    BytesLength {
        /// Name of the type being decoded.
        name: &'static str,
        /// Human-readable description of the expected encoding.
        description: &'static str,
        /// Expected length in bytes.
        length: usize,
    },

    /// A chain code longer than 32 bytes was supplied.
    #[error("chain code must be at most 32 bytes, got {length}")]
    ChainCodeTooLong { length: usize },

    /// The high bit of the last signature byte is clear, so the bytes are
    /// not an sr25519 signature.
    #[error("signature not marked as schnorrkel, maybe try ed25519 instead")]
    NotMarkedSchnorrkel,

    /// The scalar half of a signature is not canonically reduced.
    #[error("signature scalar is not canonical")]
    ScalarFormat,

    /// Bytes do not encode a valid compressed Ristretto point.
    #[error("cannot decompress Ristretto point")]
    PointDecompression,

    /// A freshly produced signature failed its own verification.
    #[error("verification equation was not satisfied")]
    EquationFalse,

    /// The underlying transcript was misused.
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

/// Converts a [`SignatureError`] into the error type of a serde deserializer.
pub(crate) fn serde_error_from_signature_error<E>(err: SignatureError) -> E
where
    E: serde::de::Error,
{
    E::custom(err)
}
