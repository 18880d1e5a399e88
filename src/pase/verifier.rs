// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-side verifier material, derived once from the setup code at
//! provisioning time. The device never stores the setup code itself
//! (§3.6).
//!
//! §3.6 describes an asymmetric verifier storing `W0` (HKDF of the setup
//! code) and `L` (a curve point derived from `W1`), for use with P-256
//! SPAKE2+. This crate runs symmetric SPAKE2 over `Ed25519Group` instead
//! (see `pase::handshake`'s doc comment for why), so `Verifier` holds a
//! single HKDF-derived password rather than a `W0`/`L` pair.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{Error, Result};

/// Setup codes are 8 decimal digits, zero-padded, `00000000..=99999999`
/// (§3.6, §6.4).
pub const SETUP_CODE_DIGITS: usize = 8;

/// HKDF-derived password material used to seed the SPAKE2+ exchange.
/// Constructing this consumes the setup code; only the derived bytes are
/// retained.
#[derive(Clone)]
pub struct Verifier {
    derived: [u8; 32],
}

impl Verifier {
    /// Derive verifier material from an 8-digit decimal setup code.
    pub fn from_setup_code(setup_code: &str) -> Result<Self> {
        if setup_code.len() != SETUP_CODE_DIGITS
            || !setup_code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::InvalidParameter(
                "setup code must be 8 decimal digits".into(),
            ));
        }
        let hk = Hkdf::<Sha256>::new(None, setup_code.as_bytes());
        let mut derived = [0u8; 32];
        hk.expand(b"mash-pase-verifier-v1", &mut derived)
            .map_err(|_| Error::InvalidParameter("HKDF expand failed".into()))?;
        Ok(Self { derived })
    }

    pub(crate) fn password_bytes(&self) -> &[u8] {
        &self.derived
    }
}
