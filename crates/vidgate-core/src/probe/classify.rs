//! Classify HTTP status and curl errors into probe error kinds.

use super::ProbeError;

/// Classify the status of a visible HEAD probe. `Ok(())` means success.
///
/// Any status that was actually seen is a verdict from the gateway, never a
/// refusal: non-2xx is `Http`, so it does not earn an opaque retry.
pub fn classify_head_status(code: u32) -> Result<(), ProbeError> {
    match code {
        200..=299 => Ok(()),
        _ => Err(ProbeError::Http(code)),
    }
}

/// Classify a curl error. Exchanges the host dropped before a status line
/// arrived are `Blocked`; everything else is `Unreachable`.
pub fn classify_curl_error(e: &curl::Error) -> ProbeError {
    if e.is_got_nothing()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_read_error()
        || e.is_ssl_connect_error()
        || e.is_peer_failed_verification()
        || e.is_http2_error()
    {
        return ProbeError::Blocked(e.to_string());
    }
    ProbeError::Unreachable(e.to_string())
}

impl From<curl::Error> for ProbeError {
    fn from(e: curl::Error) -> Self {
        classify_curl_error(&e)
    }
}
