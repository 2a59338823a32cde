//! Readiness predicates that gate every query
//!
//! A closed gate is not an error: the query is skipped and reports neither
//! data nor loading.

/// Validate EVM-style address shape: `0x` prefix and 42 characters.
///
/// Only length and prefix are checked; the hex digits are the explorer's
/// business.
pub fn is_address_ready(address: &str) -> bool {
    address.starts_with("0x") && address.len() == 42
}

/// Free-text queries only need something to search for.
pub fn is_text_ready(text: &str) -> bool {
    !text.is_empty()
}

/// What must hold before a query may reach the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate<'a> {
    /// Unconditional (top accounts)
    Always,
    Address(&'a str),
    Text(&'a str),
}

impl Gate<'_> {
    pub fn is_open(&self) -> bool {
        match self {
            Gate::Always => true,
            Gate::Address(address) => is_address_ready(address),
            Gate::Text(text) => is_text_ready(text),
        }
    }
}
