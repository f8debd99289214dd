use thiserror::Error;

/// Construction errors for addresses, ranges, masks and blocks.
///
/// Every value type in this crate is validated when it is built, so these are
/// the only failures callers ever observe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Not a dotted-quad string or an integer that fits a 32 bit address
    #[error("Invalid IPv4 address: {0} (expected aaa.bbb.ccc.ddd)")]
    InvalidAddress(String),

    /// First endpoint is above the last one
    #[error("Invalid range: first address {first} is higher than last address {last}")]
    InvalidRange { first: String, last: String },

    /// CIDR prefix outside 1-31 or not a number
    #[error("Invalid CIDR prefix length: {0} (must be 1-31)")]
    InvalidPrefixLength(String),

    /// Second block parameter could not be turned into a subnet mask
    #[error("Could not derive a subnet mask from: {0:?}")]
    UnresolvableSubnetMask(String),
}

pub type Result<T> = std::result::Result<T, Error>;
