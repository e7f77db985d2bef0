//! Station disconnect reasons.
//!
//! Codes follow ESP-IDF `wifi_err_reason_t`. Only the ones that mean the
//! access point will keep refusing these credentials are named here.

/// 802.11 reason 15: the 4-way handshake timed out (usually a wrong
/// passphrase).
pub const REASON_4WAY_HANDSHAKE_TIMEOUT: u16 = 15;
/// Authentication rejected.
pub const REASON_AUTH_FAIL: u16 = 202;
/// Association rejected.
pub const REASON_ASSOC_FAIL: u16 = 203;
/// Handshake with the access point failed.
pub const REASON_HANDSHAKE_TIMEOUT: u16 = 204;
/// Connection refused by the access point.
pub const REASON_CONNECTION_FAIL: u16 = 205;
/// An access point with this SSID exists but its security is incompatible.
pub const REASON_NO_AP_FOUND_COMPAT_SECURITY: u16 = 210;
/// An access point with this SSID exists but is below the auth threshold.
pub const REASON_NO_AP_FOUND_AUTHMODE_THRESHOLD: u16 = 211;

/// True if a disconnect with `reason` during association means the
/// credentials were refused, so waiting longer cannot help.
///
/// Transient reasons (beacon timeout, AP not yet found) return `false`.
pub fn is_rejection(reason: u16) -> bool {
    matches!(
        reason,
        REASON_4WAY_HANDSHAKE_TIMEOUT
            | REASON_AUTH_FAIL
            | REASON_ASSOC_FAIL
            | REASON_HANDSHAKE_TIMEOUT
            | REASON_CONNECTION_FAIL
            | REASON_NO_AP_FOUND_COMPAT_SECURITY
            | REASON_NO_AP_FOUND_AUTHMODE_THRESHOLD
    )
}
