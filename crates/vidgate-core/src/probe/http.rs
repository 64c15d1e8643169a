//! libcurl-backed prober.

use std::time::Duration;

use super::classify::{classify_curl_error, classify_head_status};
use super::{ProbeError, ProbeMode, ProbeOutcome, Prober};
use crate::config::ProbeConfig;

/// Blocking prober using one curl Easy handle per request.
#[derive(Debug, Clone)]
pub struct CurlProber {
    connect_timeout: Duration,
    timeout: Duration,
}

impl Default for CurlProber {
    fn default() -> Self {
        Self::from_config(&ProbeConfig::default())
    }
}

impl CurlProber {
    pub fn from_config(cfg: &ProbeConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, ProbeError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        Ok(easy)
    }

    fn head(&self, url: &str) -> Result<ProbeOutcome, ProbeError> {
        let mut easy = self.easy(url)?;
        easy.nobody(true)?;
        easy.perform()?;
        let code = easy.response_code()?;
        classify_head_status(code)?;
        Ok(ProbeOutcome::visible(code))
    }

    /// GET that hangs up as soon as the first body bytes arrive.
    /// Returns the response status (0 if none was received).
    fn get_first_chunk(&self, url: &str) -> Result<u32, ProbeError> {
        let mut easy = self.easy(url)?;
        let mut got_body = false;
        let result = {
            let mut transfer = easy.transfer();
            transfer.write_function(|_data| {
                got_body = true;
                // Returning 0 aborts the transfer; the status line is already in.
                Ok(0)
            })?;
            transfer.perform()
        };
        if let Err(e) = result {
            if !(got_body && e.is_write_error()) {
                return Err(classify_curl_error(&e));
            }
        }
        Ok(easy.response_code()?)
    }
}

impl Prober for CurlProber {
    fn probe(&self, url: &str, mode: ProbeMode) -> Result<ProbeOutcome, ProbeError> {
        match mode {
            ProbeMode::Head => self.head(url),
            ProbeMode::Get => {
                let code = self.get_first_chunk(url)?;
                if (200..300).contains(&code) {
                    Ok(ProbeOutcome::visible(code))
                } else {
                    Err(ProbeError::Http(code))
                }
            }
            ProbeMode::Opaque => {
                self.get_first_chunk(url)?;
                Ok(ProbeOutcome::opaque())
            }
        }
    }

    fn fetch_prefix(&self, url: &str, max_bytes: usize) -> Result<Vec<u8>, ProbeError> {
        let mut easy = self.easy(url)?;
        if max_bytes > 0 {
            easy.range(&format!("0-{}", max_bytes - 1))?;
        }
        let mut buf: Vec<u8> = Vec::with_capacity(max_bytes.min(64 * 1024));
        let mut full = false;
        let result = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                let room = max_bytes.saturating_sub(buf.len());
                buf.extend_from_slice(&data[..data.len().min(room)]);
                if buf.len() >= max_bytes {
                    // Servers that ignore Range would keep streaming; stop here.
                    full = true;
                    return Ok(0);
                }
                Ok(data.len())
            })?;
            transfer.perform()
        };
        if let Err(e) = result {
            if !(full && e.is_write_error()) {
                return Err(classify_curl_error(&e));
            }
        }
        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(ProbeError::Http(code));
        }
        Ok(buf)
    }
}
