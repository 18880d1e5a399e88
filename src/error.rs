// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Crate-wide error type.
//!
//! Errors are grouped by the three tiers the protocol distinguishes:
//! wire-level status codes (never fatal to a connection), commissioning
//! codes (fatal to a handshake), and transport faults (fatal to a
//! connection). See [`crate::wire::StatusCode`] and
//! [`crate::commissioning::ErrorCode`] for the wire-facing enumerations;
//! this [`Error`] type is the Rust-side `Result` error used by the crate's
//! own API surface.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
#[derive(Debug)]
pub enum Error {
    // ------------------------------------------------------------------
    // Transport faults (§7 tier 3)
    // ------------------------------------------------------------------
    /// Underlying I/O failure.
    Io(std::io::Error),
    /// The connection was closed or reset.
    ConnectionLost,
    /// A frame's length prefix exceeded the configured maximum.
    FrameTooLarge { len: usize, max: usize },
    /// TLS handshake failed (peer verification, cipher negotiation, ALPN).
    TlsHandshakeFailed(String),

    // ------------------------------------------------------------------
    // Commissioning faults (§7 tier 2) — mirrors commissioning::ErrorCode
    // ------------------------------------------------------------------
    /// SPAKE2+ verification, setup code, or renewal nonce check failed.
    /// Deliberately generic on the wire (§4.5.4); this variant may carry
    /// an internal-only cause string for local diagnostics.
    AuthFailed(String),
    /// The commissioning lock is held, the window is closed, or
    /// backoff/cooldown is in effect.
    Busy { retry_after_ms: u64 },
    /// Device already has an operational zone of the requested type.
    ZoneTypeExists,
    /// Certificate signing request was malformed or could not be produced.
    CsrFailed(String),
    /// Certificate installation failed (parse, chain, or store failure).
    CertInstallFailed(String),

    // ------------------------------------------------------------------
    // Protocol / invariant violations
    // ------------------------------------------------------------------
    /// A CBOR value did not decode into the expected wire message shape.
    InvalidParameter(String),
    /// Operation referenced an endpoint, feature, attribute, or command
    /// that does not exist.
    NotFound(String),
    /// Zone manager capacity or uniqueness invariant would be violated.
    ZoneCapacity(String),
    /// Internal invariant violation (e.g. duplicate subscription id).
    Invariant(String),
    /// Requested operation is not supported in the current state.
    Unsupported(String),

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------
    /// Configuration value out of range or internally inconsistent.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::ConnectionLost => write!(f, "connection lost"),
            Error::FrameTooLarge { len, max } => {
                write!(f, "frame too large: {len} bytes (max {max})")
            }
            Error::TlsHandshakeFailed(msg) => write!(f, "TLS handshake failed: {msg}"),
            Error::AuthFailed(_) => write!(f, "authentication failed"),
            Error::Busy { retry_after_ms } => {
                write!(f, "busy, retry after {retry_after_ms}ms")
            }
            Error::ZoneTypeExists => write!(f, "zone type already operational on this device"),
            Error::CsrFailed(msg) => write!(f, "CSR generation failed: {msg}"),
            Error::CertInstallFailed(msg) => write!(f, "certificate install failed: {msg}"),
            Error::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::ZoneCapacity(msg) => write!(f, "zone capacity: {msg}"),
            Error::Invariant(msg) => write!(f, "internal invariant violated: {msg}"),
            Error::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::ConnectionReset => {
                Error::ConnectionLost
            }
            _ => Error::Io(e),
        }
    }
}

/// Note on auth-failure collapsing: callers constructing [`Error::AuthFailed`]
/// may include an internal cause for local logs, but the `Display` impl
/// above never surfaces it — every distinct SPAKE2+/nonce-hash failure
/// renders identically on the wire and in logs reachable by a remote peer,
/// matching invariant §8.1.7.
pub(crate) fn auth_failed(cause: impl Into<String>) -> Error {
    Error::AuthFailed(cause.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failed_display_is_generic() {
        let a = auth_failed("wrong setup code");
        let b = auth_failed("nonce hash mismatch");
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "authentication failed");
    }

    #[test]
    fn io_error_maps_connection_lost_on_eof() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::ConnectionLost));
    }
}
