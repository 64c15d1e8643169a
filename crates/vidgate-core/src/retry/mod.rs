//! Automatic retry and backoff policy for playback.
//!
//! The policy only answers "retry, and after how long?"; the playback
//! controller owns the attempt counter and the timer.

mod policy;

pub use policy::{RetryDecision, RetryPolicy};
