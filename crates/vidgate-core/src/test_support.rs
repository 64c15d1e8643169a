//! Scripted prober for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::probe::{ProbeError, ProbeMode, ProbeOutcome, Prober};

/// Prober answering from a script keyed by `(url, mode)`. Unscripted
/// requests fail as unreachable. Every call is recorded.
#[derive(Default)]
pub(crate) struct ScriptedProber {
    probes: HashMap<(String, ProbeMode), Result<ProbeOutcome, ProbeError>>,
    prefixes: HashMap<String, Result<Vec<u8>, ProbeError>>,
    prefix_delay: Option<Duration>,
    calls: Mutex<Vec<(String, Option<ProbeMode>)>>,
}

impl ScriptedProber {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, url: &str, mode: ProbeMode, result: Result<ProbeOutcome, ProbeError>) -> Self {
        self.probes.insert((url.to_string(), mode), result);
        self
    }

    pub(crate) fn ok(self, url: &str, mode: ProbeMode) -> Self {
        self.on(url, mode, Ok(ProbeOutcome::visible(200)))
    }

    pub(crate) fn prefix(mut self, url: &str, result: Result<Vec<u8>, ProbeError>) -> Self {
        self.prefixes.insert(url.to_string(), result);
        self
    }

    /// Make every prefix fetch stall before answering.
    pub(crate) fn prefix_delay(mut self, delay: Duration) -> Self {
        self.prefix_delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Option<ProbeMode>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn prefix_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, mode)| mode.is_none())
            .count()
    }
}

impl Prober for ScriptedProber {
    fn probe(&self, url: &str, mode: ProbeMode) -> Result<ProbeOutcome, ProbeError> {
        self.calls.lock().unwrap().push((url.to_string(), Some(mode)));
        self.probes
            .get(&(url.to_string(), mode))
            .cloned()
            .unwrap_or_else(|| Err(ProbeError::Unreachable(format!("unscripted {}", url))))
    }

    fn fetch_prefix(&self, url: &str, _max_bytes: usize) -> Result<Vec<u8>, ProbeError> {
        self.calls.lock().unwrap().push((url.to_string(), None));
        if let Some(d) = self.prefix_delay {
            std::thread::sleep(d);
        }
        self.prefixes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(ProbeError::Unreachable(format!("unscripted {}", url))))
    }
}

/// Minimal MP4 header: `ftyp` box with brand `isom`.
pub(crate) fn mp4_header() -> Vec<u8> {
    let mut v = vec![0x00, 0x00, 0x00, 0x18];
    v.extend_from_slice(b"ftypisom");
    v.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
    v.extend_from_slice(b"isomiso2");
    v
}
