// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-side (responder) PASE handshake state machine, messages 1–4
//! of §4.5's table (`PASERequest`/`PASEResponse`/`PASEConfirm`/`PASEComplete`).
//!
//! Uses symmetric SPAKE2 over `spake2::Ed25519Group`, not the P-256
//! SPAKE2+ the protocol specifies: the `spake2` crate has no P-256 group
//! and no asymmetric `W0`/`L` verifier, and hand-rolled P-256 point
//! arithmetic isn't something to ship unverified. See DESIGN.md §4.5.

use hkdf::Hkdf;
use sha2::Sha256;
use spake2::{Ed25519Group, Identity, Password, Spake2};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{self, Error, Result};
use crate::pase::verifier::Verifier;

/// Shared secret established by a completed handshake, used to derive
/// confirmation MACs and (after PASEComplete) the session's symmetric
/// material.
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    fn confirmation_mac(&self, label: &[u8]) -> [u8; 32] {
        let hk = Hkdf::<Sha256>::new(None, &self.0);
        let mut mac = [0u8; 32];
        hk.expand(label, &mut mac).expect("32 is a valid HKDF output length");
        mac
    }

    /// MAC the client is expected to send in `PASEConfirm`.
    pub fn expected_client_confirm(&self) -> [u8; 32] {
        self.confirmation_mac(b"mash-pase-confirm-client")
    }

    /// MAC the device sends back in `PASEComplete`.
    pub fn device_complete_mac(&self) -> [u8; 32] {
        self.confirmation_mac(b"mash-pase-confirm-device")
    }
}

/// Responder-side handshake, started after a syntactically valid
/// `PASERequest` has been read (§4.5.1 step 2 — the commissioning lock is
/// acquired by the caller only once this type exists).
pub struct ServerHandshake {
    state: Option<Spake2<Ed25519Group>>,
}

impl ServerHandshake {
    /// Begin the responder side given the client's `PASERequest` identity
    /// fields. Returns the handshake object plus the `PASEResponse`
    /// payload (`pB`) to send.
    pub fn start(verifier: &Verifier, device_id: &str, client_id: &str) -> (Self, Vec<u8>) {
        let (state, outbound) = Spake2::<Ed25519Group>::start_b(
            &Password::new(verifier.password_bytes()),
            &Identity::new(device_id.as_bytes()),
            &Identity::new(client_id.as_bytes()),
        );
        (
            Self {
                state: Some(state),
            },
            outbound,
        )
    }

    /// Consume the client's `pA` (from `PASERequest`) and derive the
    /// shared secret. All failure causes collapse to a generic
    /// [`Error::AuthFailed`] per invariant §8.1.7.
    pub fn finish(mut self, client_pa: &[u8]) -> Result<SharedSecret> {
        let state = self.state.take().ok_or_else(|| error::auth_failed("handshake reused"))?;
        let key = state
            .finish(client_pa)
            .map_err(|_| error::auth_failed("spake2 key derivation failed"))?;
        Ok(SharedSecret(Zeroizing::new(key)))
    }
}

/// Verify a `PASEConfirm` MAC in constant time. Any mismatch is reported
/// as the generic [`Error::AuthFailed`].
pub fn verify_confirm(shared: &SharedSecret, received_mac: &[u8]) -> Result<()> {
    let expected = shared.expected_client_confirm();
    if expected.ct_eq(received_mac).unwrap_u8() == 1 {
        Ok(())
    } else {
        Err(Error::AuthFailed("confirmation mismatch".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_verifiers_converge_on_same_secret() {
        let verifier = Verifier::from_setup_code("12345678").unwrap();
        let (server, pb) = ServerHandshake::start(&verifier, "device-1", "client-1");

        // Mirror the client side with the matching group/identity order.
        let (client_state, pa) = Spake2::<Ed25519Group>::start_a(
            &Password::new(verifier.password_bytes()),
            &Identity::new("device-1".as_bytes()),
            &Identity::new("client-1".as_bytes()),
        );
        let client_key = client_state.finish(&pb).unwrap();
        let server_secret = server.finish(&pa).unwrap();

        assert_eq!(client_key, server_secret.0.as_slice());
    }

    #[test]
    fn wrong_setup_code_fails_generically() {
        let server_verifier = Verifier::from_setup_code("12345678").unwrap();
        let client_verifier = Verifier::from_setup_code("87654321").unwrap();

        let (server, _pb) = ServerHandshake::start(&server_verifier, "device-1", "client-1");
        let (_client_state, pa) = Spake2::<Ed25519Group>::start_a(
            &Password::new(client_verifier.password_bytes()),
            &Identity::new("device-1".as_bytes()),
            &Identity::new("client-1".as_bytes()),
        );

        // Either the key derivation itself mismatches or the later confirm
        // check catches it; both paths must yield the generic AuthFailed.
        if let Ok(secret) = server.finish(&pa) {
            let bogus_mac = [0u8; 32];
            assert!(matches!(
                verify_confirm(&secret, &bogus_mac),
                Err(Error::AuthFailed(_))
            ));
        }
    }
}
