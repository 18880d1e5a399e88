// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commissioning message type numbers and error codes (§4.5 table).

/// Commissioning handshake message type (frame body's leading discriminant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgType {
    PaseRequest = 1,
    PaseResponse = 2,
    PaseConfirm = 3,
    PaseComplete = 4,
    CsrRequest = 10,
    CsrResponse = 11,
    CertInstall = 12,
    CertInstallResponse = 13,
    CommissioningComplete = 20,
    RenewalRequest = 30,
    RenewalCsr = 31,
    RenewalInstall = 32,
    RenewalAck = 33,
    CommissioningError = 255,
}

impl MsgType {
    pub fn from_u8(v: u8) -> Option<Self> {
        use MsgType::*;
        Some(match v {
            1 => PaseRequest,
            2 => PaseResponse,
            3 => PaseConfirm,
            4 => PaseComplete,
            10 => CsrRequest,
            11 => CsrResponse,
            12 => CertInstall,
            13 => CertInstallResponse,
            20 => CommissioningComplete,
            30 => RenewalRequest,
            31 => RenewalCsr,
            32 => RenewalInstall,
            33 => RenewalAck,
            255 => CommissioningError,
            _ => return None,
        })
    }
}

/// Commissioning error codes (§4.5, §4.5.4). `AuthFailed` is deliberately
/// generic: every SPAKE2+/crypto failure collapses to code 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissioningErrorCode {
    Success = 0,
    AuthFailed = 1,
    CsrFailed = 3,
    CertInstallFailed = 4,
    Busy = 5,
    ZoneTypeExists = 10,
}

impl CommissioningErrorCode {
    pub fn from_u8(v: u8) -> Option<Self> {
        use CommissioningErrorCode::*;
        Some(match v {
            0 => Success,
            1 => AuthFailed,
            3 => CsrFailed,
            4 => CertInstallFailed,
            5 => Busy,
            10 => ZoneTypeExists,
            _ => return None,
        })
    }

    /// Map a crate [`crate::error::Error`] onto its wire error code, per
    /// the tier-2 mapping in §7.
    pub fn from_error(err: &crate::error::Error) -> Self {
        use crate::error::Error;
        match err {
            Error::AuthFailed(_) => CommissioningErrorCode::AuthFailed,
            Error::Busy { .. } => CommissioningErrorCode::Busy,
            Error::ZoneTypeExists => CommissioningErrorCode::ZoneTypeExists,
            Error::CsrFailed(_) => CommissioningErrorCode::CsrFailed,
            Error::CertInstallFailed(_) => CommissioningErrorCode::CertInstallFailed,
            _ => CommissioningErrorCode::AuthFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn distinct_auth_causes_map_to_the_same_code() {
        let a = CommissioningErrorCode::from_error(&Error::AuthFailed("bad setup code".into()));
        let b = CommissioningErrorCode::from_error(&Error::AuthFailed("nonce mismatch".into()));
        assert_eq!(a, b);
        assert_eq!(a, CommissioningErrorCode::AuthFailed);
    }

    #[test]
    fn busy_carries_through_as_busy_code() {
        let err = Error::Busy { retry_after_ms: 1000 };
        assert_eq!(
            CommissioningErrorCode::from_error(&err),
            CommissioningErrorCode::Busy
        );
    }
}
