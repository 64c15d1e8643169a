pub mod cache;
pub mod config;
pub mod content_id;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod market;
pub mod pinning;
pub mod playback;
pub mod preload;
pub mod probe;
pub mod resolver;
pub mod retry;
pub mod session;

#[cfg(test)]
mod test_support;
