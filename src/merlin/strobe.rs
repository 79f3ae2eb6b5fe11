//! A minimal STROBE-128 duplex sponge over Keccak-f[1600].
//!
//! Only the operations Merlin needs are implemented: `meta-AD`, `AD`, `KEY`
//! and `PRF`. Transport operations are rejected.

use crate::errors::TranscriptError;
use secrecy::zeroize::Zeroize;
use std::fmt;

/// Size of the Keccak-f[1600] state in bytes.
const STROBE_STATE_LEN: usize = 200;

/// Sponge rate for a 128-bit security level: `200 - 2 * 128 / 8 - 2`.
const STROBE_R: u8 = 166;

const FLAG_I: u8 = 1;
const FLAG_A: u8 = 1 << 1;
const FLAG_C: u8 = 1 << 2;
const FLAG_T: u8 = 1 << 3;
const FLAG_M: u8 = 1 << 4;
const FLAG_K: u8 = 1 << 5;

/// The operation currently open on the sponge.
///
/// `begin` is the position right after the operation header, recorded so
/// the next `run_f` can frame the block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Operation {
    flags: u8,
    begin: u8,
}

/// Applies Keccak-f[1600] to the state, read as 25 little-endian lanes.
fn keccak_f1600(state: &mut [u8; STROBE_STATE_LEN]) {
    let mut lanes = [0u64; 25];
    for (lane, chunk) in lanes.iter_mut().zip(state.chunks_exact(8)) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        *lane = u64::from_le_bytes(bytes);
    }

    keccak::f1600(&mut lanes);

    for (chunk, lane) in state.chunks_exact_mut(8).zip(lanes.iter()) {
        chunk.copy_from_slice(&lane.to_le_bytes());
    }
    lanes.zeroize();
}

/// STROBE-128 sponge state.
///
/// Cloning yields a fully independent copy of the state and cursors without
/// re-running the protocol domain separation.
#[derive(Clone)]
pub struct Strobe128 {
    state: [u8; STROBE_STATE_LEN],
    pos: u8,
    op: Operation,
}

impl fmt::Debug for Strobe128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The state may hold keyed material
        write!(f, "Strobe128 {{ .. }}")
    }
}

impl Drop for Strobe128 {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

impl Strobe128 {
    /// Initializes the sponge and absorbs `protocol_label` as metadata.
    pub fn new(protocol_label: &[u8]) -> Result<Strobe128, TranscriptError> {
        let mut state = [0u8; STROBE_STATE_LEN];
        state[0..6].copy_from_slice(&[1, STROBE_R + 2, 1, 0, 1, 96]);
        state[6..18].copy_from_slice(b"STROBEv1.0.2");
        keccak_f1600(&mut state);

        let mut strobe = Strobe128 {
            state,
            pos: 0,
            op: Operation::default(),
        };
        strobe.meta_ad(protocol_label, false)?;
        Ok(strobe)
    }

    /// Absorbs framing metadata.
    pub fn meta_ad(&mut self, data: &[u8], more: bool) -> Result<(), TranscriptError> {
        self.begin_op(FLAG_M | FLAG_A, more)?;
        self.absorb(data);
        Ok(())
    }

    /// Absorbs associated data.
    pub fn ad(&mut self, data: &[u8], more: bool) -> Result<(), TranscriptError> {
        self.begin_op(FLAG_A, more)?;
        self.absorb(data);
        Ok(())
    }

    /// Squeezes pseudorandom output into `data`, overwriting it.
    pub fn prf(&mut self, data: &mut [u8], more: bool) -> Result<(), TranscriptError> {
        self.begin_op(FLAG_I | FLAG_A | FLAG_C, more)?;
        self.squeeze(data);
        Ok(())
    }

    /// Rekeys the sponge by overwriting its state with `data`.
    pub fn key(&mut self, data: &[u8], more: bool) -> Result<(), TranscriptError> {
        self.begin_op(FLAG_A | FLAG_C, more)?;
        self.overwrite(data);
        Ok(())
    }

    fn run_f(&mut self) {
        self.state[self.pos as usize] ^= self.op.begin;
        self.state[self.pos as usize + 1] ^= 0x04;
        self.state[STROBE_R as usize + 1] ^= 0x80;
        keccak_f1600(&mut self.state);
        self.pos = 0;
        self.op.begin = 0;
    }

    fn advance(&mut self) {
        self.pos += 1;
        if self.pos == STROBE_R {
            self.run_f();
        }
    }

    fn absorb(&mut self, data: &[u8]) {
        for byte in data {
            self.state[self.pos as usize] ^= byte;
            self.advance();
        }
    }

    fn overwrite(&mut self, data: &[u8]) {
        for byte in data {
            self.state[self.pos as usize] = *byte;
            self.advance();
        }
    }

    fn squeeze(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte = self.state[self.pos as usize];
            self.state[self.pos as usize] = 0;
            self.advance();
        }
    }

    fn begin_op(&mut self, flags: u8, more: bool) -> Result<(), TranscriptError> {
        if more {
            if self.op.flags != flags {
                log::error!(
                    "strobe operation {:#04x} continued with flags {:#04x}",
                    self.op.flags,
                    flags
                );
                return Err(TranscriptError::FlagMismatch {
                    current: self.op.flags,
                    requested: flags,
                });
            }
            return Ok(());
        }

        if flags & FLAG_T != 0 {
            log::error!("strobe transport flag requested with flags {:#04x}", flags);
            return Err(TranscriptError::UnsupportedTransportFlag);
        }

        let old_begin = self.op.begin;
        self.op = Operation {
            flags,
            begin: self.pos + 1,
        };
        self.absorb(&[old_begin, flags]);

        // Keyed operations start on a fresh block
        let force_f = flags & (FLAG_C | FLAG_K) != 0;
        if force_f && self.pos != 0 {
            self.run_f();
        }
        Ok(())
    }
}
