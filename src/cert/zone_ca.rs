// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zone CA: self-signed X.509 root generated once per zone by the
//! controller (§3.4).

use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair};

use crate::cert::fingerprint::fingerprint;
use crate::config::ZONE_CA_VALIDITY;
use crate::error::{Error, Result};

/// A self-signed Zone CA: 20-year validity, `CA:TRUE`.
#[derive(Debug, Clone)]
pub struct ZoneCaCert {
    /// PEM-encoded certificate.
    pub cert_pem: String,
    /// PEM-encoded private key. Sensitive — callers must not log it.
    pub key_pem: String,
    /// Fingerprint-derived zone id.
    pub zone_id: String,
}

impl ZoneCaCert {
    /// Generate a fresh self-signed Zone CA for `zone_name`.
    pub fn generate(zone_name: &str) -> Result<Self> {
        let key_pair =
            KeyPair::generate().map_err(|e| Error::CertInstallFailed(e.to_string()))?;

        let mut params = CertificateParams::new(Vec::<String>::new())
            .map_err(|e| Error::CertInstallFailed(e.to_string()))?;
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, format!("MASH Zone CA {zone_name}"));
        params.distinguished_name = dn;
        params.not_before = rcgen::date_time_ymd(2000, 1, 1);
        params.not_after = (std::time::SystemTime::now() + ZONE_CA_VALIDITY).into();

        let cert = params
            .self_signed(&key_pair)
            .map_err(|e| Error::CertInstallFailed(e.to_string()))?;

        let cert_pem = cert.pem();
        let zone_id = fingerprint(cert.der());

        Ok(Self {
            cert_pem,
            key_pem: key_pair.serialize_pem(),
            zone_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ca_has_a_fingerprint_derived_id() {
        let ca = ZoneCaCert::generate("kitchen").unwrap();
        assert_eq!(ca.zone_id.len(), 16);
        assert!(ca.cert_pem.starts_with("-----BEGIN CERTIFICATE-----"));
    }

    #[test]
    fn two_generations_produce_different_ids() {
        let a = ZoneCaCert::generate("a").unwrap();
        let b = ZoneCaCert::generate("b").unwrap();
        assert_ne!(a.zone_id, b.zone_id);
    }
}
