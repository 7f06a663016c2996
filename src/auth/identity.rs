use ethers::types::Address;
use std::fmt;

/// Verified caller account.
///
/// Only the [`Authorizer`](crate::auth::Authorizer) creates one, and only
/// after the credential verifier accepted the caller's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(Address);

impl Identity {
    pub(crate) fn verified(address: Address) -> Self {
        Self(address)
    }

    pub fn address(&self) -> Address {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Validate Ethereum address format
pub fn is_valid_eth_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a `0x`-prefixed, 40 hex digit account address
pub fn parse_address(address: &str) -> Option<Address> {
    if !is_valid_eth_address(address) {
        return None;
    }
    address[2..].parse::<Address>().ok()
}
