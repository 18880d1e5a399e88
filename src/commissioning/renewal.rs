// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-session certificate renewal: nonce binding and atomic sequence-number
//! swap (§4.5.3, invariant §8.1.6, round-trip property §8.2).

use sha2::{Digest, Sha256};

use crate::cert::OperationalCert;
use crate::error::{Error, Result};

/// Server-side (device) renewal session state, spanning messages
/// 30 (`RenewalRequest`) through 33 (`RenewalAck`).
pub struct RenewalSession {
    state: RenewalState,
    active_cert: OperationalCert,
    active_sequence: u64,
}

/// Where a renewal session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalState {
    Idle,
    AwaitingCsrIssued { nonce_hash: [u8; 16] },
    AwaitingInstall { nonce_hash: [u8; 16], next_sequence: u64 },
}

impl RenewalSession {
    pub fn new(active_cert: OperationalCert, active_sequence: u64) -> Self {
        Self {
            state: RenewalState::Idle,
            active_cert,
            active_sequence,
        }
    }

    pub fn active_sequence(&self) -> u64 {
        self.active_sequence
    }

    pub fn active_cert(&self) -> &OperationalCert {
        &self.active_cert
    }

    /// Message 30 → 31: device receives the 32-byte nonce, computes
    /// `nonceHash = SHA-256(nonce)[0..16]` to embed in its CSR.
    pub fn handle_request(&mut self, nonce: &[u8; 32]) -> [u8; 16] {
        let digest = Sha256::digest(nonce);
        let mut nonce_hash = [0u8; 16];
        nonce_hash.copy_from_slice(&digest[..16]);
        self.state = RenewalState::AwaitingCsrIssued { nonce_hash };
        nonce_hash
    }

    /// Message 32 → 33: controller verified the nonce hash and installs a
    /// signed cert at `next_sequence`. The device must not advance its
    /// active sequence until this call succeeds, and a replayed install
    /// for a sequence already active is idempotent (§8.2).
    pub fn handle_install(
        &mut self,
        claimed_nonce_hash: &[u8; 16],
        new_cert: OperationalCert,
        next_sequence: u64,
    ) -> Result<u64> {
        let RenewalState::AwaitingCsrIssued { nonce_hash } = self.state else {
            return Err(Error::Invariant(
                "renewal install received outside CSR-issued state".into(),
            ));
        };
        if next_sequence == self.active_sequence {
            // Idempotent replay of the currently-active sequence.
            self.state = RenewalState::Idle;
            return Ok(self.active_sequence);
        }
        if &nonce_hash != claimed_nonce_hash {
            self.state = RenewalState::Idle;
            return Err(Error::AuthFailed("renewal nonce hash mismatch".into()));
        }
        // Atomic swap: both fields update together, or neither does.
        self.active_cert = new_cert;
        self.active_sequence = next_sequence;
        self.state = RenewalState::Idle;
        Ok(self.active_sequence)
    }

    pub fn state(&self) -> RenewalState {
        self.state
    }
}
