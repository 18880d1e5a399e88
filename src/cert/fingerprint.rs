// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fingerprint derivation: `deviceId`/`zoneId`/`controllerId` are the first
//! 16 hex characters of SHA-256 of the certificate's DER bytes (§3.4).

use sha2::{Digest, Sha256};

/// Derive a fingerprint identifier from DER-encoded certificate bytes.
pub fn fingerprint(der: &[u8]) -> String {
    let digest = Sha256::digest(der);
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let fp = fingerprint(b"some-der-bytes");
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint(b"same input"), fingerprint(b"same input"));
    }

    #[test]
    fn fingerprint_differs_for_different_input() {
        assert_ne!(fingerprint(b"a"), fingerprint(b"b"));
    }
}
