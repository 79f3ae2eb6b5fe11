//! Merlin transcripts over a STROBE-128 sponge.
//!
//! A [`Transcript`] absorbs labeled messages and squeezes challenges that
//! depend on everything absorbed so far. [`TranscriptRngBuilder`] forks a
//! transcript to derive hedged witness randomness without mutating it.

pub mod strobe;
pub mod transcript;
pub mod transcript_rng;

pub use strobe::Strobe128;
pub use transcript::{Transcript, TranscriptProtocol};
pub use transcript_rng::{TranscriptRng, TranscriptRngBuilder};
