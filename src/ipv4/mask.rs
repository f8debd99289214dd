use super::address::Address;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::debug;

/// Prefix length arithmetic over a mask-shaped value.
pub trait PrefixMask {
    /// Number of leading network bits, i.e. the CIDR prefix length.
    fn network_bits_count(&self) -> u8;

    fn host_bits_count(&self) -> u8 {
        32 - self.network_bits_count()
    }

    fn cidr_prefix(&self) -> u8 {
        self.network_bits_count()
    }
}

/// A subnet mask in address form.
///
/// Masks built from a prefix length with [`SubnetMask::from_cidr_prefix`] are
/// always a run of set high bits followed by clear low bits. Masks parsed from
/// an arbitrary dotted string are taken as is; [`SubnetMask::is_contiguous`]
/// tells the two apart. For a non-contiguous mask the prefix length is still
/// computed but carries no subnetting meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubnetMask {
    address: Address,
}

impl SubnetMask {
    pub const fn new(address: Address) -> Self {
        SubnetMask { address }
    }

    /// Parse a mask in dotted form, e.g. `255.255.255.0`.
    pub fn parse(s: &str) -> Result<Self> {
        Address::parse(s).map(SubnetMask::new)
    }

    /// Build `prefix` set high bits followed by `32 - prefix` clear bits.
    ///
    /// Only 1 through 31 are accepted; `/0` and `/32` masks are refused.
    pub fn from_cidr_prefix(prefix: u8) -> Result<Self> {
        if !(1..=31).contains(&prefix) {
            let e = Error::InvalidPrefixLength(prefix.to_string());
            debug!(prefix, error = %e, "rejected CIDR prefix length");
            return Err(e);
        }
        Ok(SubnetMask::new(Address::new(u32::MAX << (32 - prefix))))
    }

    /// Largest prefix length whose block can hold both addresses.
    ///
    /// The highest differing bit between the two decides how many host bits
    /// are needed. Identical addresses give 32.
    pub fn calculate_cidr_to_fit(address1: &Address, address2: &Address) -> u8 {
        (address1.get() ^ address2.get()).leading_zeros() as u8
    }

    pub const fn get(&self) -> u32 {
        self.address.get()
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    /// True when the set bits form one unbroken run from the top.
    pub fn is_contiguous(&self) -> bool {
        let host = !self.get();
        host & host.wrapping_add(1) == 0
    }
}

impl PrefixMask for SubnetMask {
    // floor(32 - log2((mask ^ 0xFFFFFFFF) + 1)) reduces to the leading zeros
    // of the inverted mask.
    fn network_bits_count(&self) -> u8 {
        (!self.get()).leading_zeros() as u8
    }
}

impl Display for SubnetMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.address, f)
    }
}

impl FromStr for SubnetMask {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        SubnetMask::parse(s)
    }
}

impl From<Address> for SubnetMask {
    fn from(address: Address) -> Self {
        SubnetMask::new(address)
    }
}

impl From<u32> for SubnetMask {
    fn from(value: u32) -> Self {
        SubnetMask::new(Address::new(value))
    }
}

impl From<SubnetMask> for Address {
    fn from(mask: SubnetMask) -> Self {
        mask.address
    }
}

impl From<SubnetMask> for String {
    fn from(mask: SubnetMask) -> Self {
        mask.to_string()
    }
}

impl TryFrom<String> for SubnetMask {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> {
        SubnetMask::parse(&s)
    }
}
