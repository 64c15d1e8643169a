//! Display helpers for amounts and accounts.

use crate::ledger::{Address, AmountError, Wei};

/// Ether amount with 18 decimals, trailing zeros trimmed (`"0.05"`, `"1.0"`).
pub fn format_ether(amount: Wei) -> String {
    amount.to_ether_string()
}

/// Parse a decimal ether amount as typed by a user.
pub fn parse_ether(raw: &str) -> Result<Wei, AmountError> {
    Wei::from_ether_str(raw)
}

/// `0x1234...abcd`
pub fn short_address(address: &Address) -> String {
    address.short()
}
