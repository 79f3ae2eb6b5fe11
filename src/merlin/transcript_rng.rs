use super::strobe::Strobe128;
use super::transcript::encode_length;
use crate::errors::TranscriptError;
use rand_core::{CryptoRng, RngCore};
use secrecy::zeroize::Zeroize;

/// Builds a [`TranscriptRng`] from a fork of a transcript's sponge.
///
/// The builder owns its own copy of the sponge, so rekeying it never touches
/// the transcript it was forked from.
#[derive(Debug)]
pub struct TranscriptRngBuilder {
    strobe: Strobe128,
}

impl TranscriptRngBuilder {
    pub(crate) fn new(strobe: Strobe128) -> TranscriptRngBuilder {
        TranscriptRngBuilder { strobe }
    }

    /// Rekeys the forked sponge with secret witness bytes.
    pub fn rekey_with_witness_bytes(
        mut self,
        label: &'static [u8],
        witness: &[u8],
    ) -> Result<TranscriptRngBuilder, TranscriptError> {
        let length = encode_length(witness.len())?;
        self.strobe.meta_ad(label, false)?;
        self.strobe.meta_ad(&length, true)?;
        self.strobe.key(witness, false)?;
        Ok(self)
    }

    /// Mixes 32 bytes of fresh entropy from `rng` into the sponge and
    /// returns the resulting generator.
    pub fn finalize_with<R>(mut self, rng: &mut R) -> Result<TranscriptRng, TranscriptError>
    where
        R: RngCore + CryptoRng,
    {
        let mut random_bytes = [0u8; 32];
        rng.fill_bytes(&mut random_bytes);

        let keyed = self
            .strobe
            .meta_ad(b"rng", false)
            .and_then(|_| self.strobe.key(&random_bytes, false));
        random_bytes.zeroize();
        keyed?;

        Ok(TranscriptRng {
            strobe: self.strobe,
        })
    }

    /// Like [`finalize_with`](Self::finalize_with), drawing entropy from
    /// the thread-local CSPRNG.
    pub fn finalize(self) -> Result<TranscriptRng, TranscriptError> {
        self.finalize_with(&mut rand::thread_rng())
    }
}

/// A hedged random number generator keyed by transcript state, witness
/// bytes and external entropy.
#[derive(Debug)]
pub struct TranscriptRng {
    strobe: Strobe128,
}

impl TranscriptRng {
    /// Fills `dest` with pseudorandom bytes. Each call frames its output
    /// length, so successive draws are independent.
    pub fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), TranscriptError> {
        let length = encode_length(dest.len())?;
        self.strobe.meta_ad(&length, false)?;
        self.strobe.prf(dest, false)
    }
}

impl RngCore for TranscriptRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        // Same contract as `OsRng`: an infallible draw panics on failure
        if let Err(err) = TranscriptRng::fill_bytes(self, dest) {
            panic!("transcript rng failed: {err}");
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        TranscriptRng::fill_bytes(self, dest).map_err(rand_core::Error::new)
    }
}

impl CryptoRng for TranscriptRng {}
