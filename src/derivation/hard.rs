use super::{challenge_chain_code, derivation_transcript, ChainCode};
use crate::errors::SignatureError;
use crate::keys_management::{
    ExpansionMode, KeyPair, MiniSecretKey, SecretKey, MINI_SECRET_KEY_LENGTH,
};
use crate::merlin::TranscriptProtocol;
use secrecy::zeroize::Zeroize;

/// Output of a hard derivation: the child seed and the next chain code.
#[derive(Debug, Clone)]
pub struct HardDerivationResult {
    pub mini_secret_key: MiniSecretKey,
    pub chain_code: ChainCode,
}

impl SecretKey {
    /// Derives a child `MiniSecretKey` and chain code from this secret key.
    ///
    /// Fully deterministic: no entropy is consumed.
    #[tracing::instrument(name = "Hard derivation of a mini secret key", skip_all)]
    pub fn derive_hard(
        &self,
        cc: Option<&ChainCode>,
    ) -> Result<HardDerivationResult, SignatureError> {
        let mut t = derivation_transcript(cc)?;
        t.append_message(b"secret-key", self.key_bytes())?;

        let mut msk = [0u8; MINI_SECRET_KEY_LENGTH];
        t.challenge_bytes(b"HDKD-hard", &mut msk)?;
        let mini_secret_key = MiniSecretKey::from_bytes(&msk);
        msk.zeroize();

        Ok(HardDerivationResult {
            mini_secret_key: mini_secret_key?,
            chain_code: challenge_chain_code(&mut t)?,
        })
    }
}

impl MiniSecretKey {
    /// Expands this seed with `mode`, then hard-derives from the result.
    pub fn derive_hard(
        &self,
        cc: Option<&ChainCode>,
        mode: ExpansionMode,
    ) -> Result<HardDerivationResult, SignatureError> {
        self.expand(mode)?.derive_hard(cc)
    }
}

impl KeyPair {
    /// Hard-derives a child key pair, expanding the derived seed with `mode`.
    pub fn derive_hard(
        &self,
        cc: Option<&ChainCode>,
        mode: ExpansionMode,
    ) -> Result<KeyPair, SignatureError> {
        self.secret_key
            .derive_hard(cc)?
            .mini_secret_key
            .expand_to_keypair(mode)
    }
}
