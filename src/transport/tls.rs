// SPDX-License-Identifier: Apache-2.0 OR MIT

//! rustls configuration for the two TLS modes the protocol uses:
//! commissioning (self-signed, peer verification skipped) and
//! operational (mutual TLS against a Zone CA) (§4.1, §6.2).

use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, UnixTime};
use rustls::{ClientConfig, RootCertStore, ServerConfig};

use crate::config::ALPN_PROTOCOL;
use crate::error::{Error, Result};

fn tls13_only() -> &'static [&'static rustls::SupportedProtocolVersion] {
    &[&rustls::version::TLS13]
}

/// Accepts any server certificate without verification. PASE
/// authenticates both ends over the resulting tunnel, so the transport
/// layer doesn't need to (§4.1 "Commissioning" mode).
#[derive(Debug)]
struct NoServerVerification;

impl rustls::client::danger::ServerCertVerifier for NoServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ED25519,
            rustls::SignatureScheme::RSA_PSS_SHA256,
        ]
    }
}

fn parse_cert_chain(pem: &str) -> Result<Vec<CertificateDer<'static>>> {
    rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::TlsHandshakeFailed(format!("cert parse: {e}")))
}

fn parse_private_key(pem: &str) -> Result<PrivateKeyDer<'static>> {
    rustls_pemfile::private_key(&mut pem.as_bytes())
        .map_err(|e| Error::TlsHandshakeFailed(format!("key parse: {e}")))?
        .ok_or_else(|| Error::TlsHandshakeFailed("no private key in PEM".into()))
}

/// Commissioning-mode server config: presents a self-signed ephemeral
/// cert, requests no client certificate (§4.1).
pub fn commissioning_server_config(cert_pem: &str, key_pem: &str) -> Result<Arc<ServerConfig>> {
    let chain = parse_cert_chain(cert_pem)?;
    let key = parse_private_key(key_pem)?;

    let mut config = ServerConfig::builder_with_protocol_versions(tls13_only())
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .map_err(|e| Error::TlsHandshakeFailed(e.to_string()))?;
    config.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];
    Ok(Arc::new(config))
}

/// Commissioning-mode client config: skips server verification (§4.1).
pub fn commissioning_client_config() -> Result<Arc<ClientConfig>> {
    let mut config = ClientConfig::builder_with_protocol_versions(tls13_only())
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(NoServerVerification))
        .with_no_client_auth();
    config.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];
    Ok(Arc::new(config))
}

/// Operational-mode server config: mutual TLS, client cert must chain to
/// `zone_ca_pem` (§4.1 "Operational" mode, §6.2).
pub fn operational_server_config(cert_pem: &str, key_pem: &str, zone_ca_pem: &str) -> Result<Arc<ServerConfig>> {
    let chain = parse_cert_chain(cert_pem)?;
    let key = parse_private_key(key_pem)?;
    let ca_chain = parse_cert_chain(zone_ca_pem)?;

    let mut roots = RootCertStore::empty();
    for cert in ca_chain {
        roots
            .add(cert)
            .map_err(|e| Error::TlsHandshakeFailed(format!("zone CA root: {e}")))?;
    }
    let client_verifier = rustls::server::WebPkiClientVerifier::builder(Arc::new(roots))
        .build()
        .map_err(|e| Error::TlsHandshakeFailed(format!("client verifier: {e}")))?;

    let mut config = ServerConfig::builder_with_protocol_versions(tls13_only())
        .with_client_cert_verifier(client_verifier)
        .with_single_cert(chain, key)
        .map_err(|e| Error::TlsHandshakeFailed(e.to_string()))?;
    config.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];
    Ok(Arc::new(config))
}

/// Operational-mode client config: presents its own operational cert,
/// verifies the server's cert chains to `zone_ca_pem` (§4.1, §6.2).
pub fn operational_client_config(cert_pem: &str, key_pem: &str, zone_ca_pem: &str) -> Result<Arc<ClientConfig>> {
    let chain = parse_cert_chain(cert_pem)?;
    let key = parse_private_key(key_pem)?;
    let ca_chain = parse_cert_chain(zone_ca_pem)?;

    let mut roots = RootCertStore::empty();
    for cert in ca_chain {
        roots
            .add(cert)
            .map_err(|e| Error::TlsHandshakeFailed(format!("zone CA root: {e}")))?;
    }

    let mut config = ClientConfig::builder_with_protocol_versions(tls13_only())
        .with_root_certificates(roots)
        .with_client_auth_cert(chain, key)
        .map_err(|e| Error::TlsHandshakeFailed(e.to_string()))?;
    config.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];
    Ok(Arc::new(config))
}
