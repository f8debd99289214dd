use super::address::Address;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

/// Anything bounded by an inclusive pair of addresses.
///
/// Implemented by [`Range`] and by [`Block`](super::block::Block), so a block
/// can be used wherever a plain range is expected.
pub trait AddressRange {
    fn first_address(&self) -> Address;
    fn last_address(&self) -> Address;

    /// Inclusive on both ends.
    fn contains(&self, address: &Address) -> bool {
        self.first_address() <= *address && *address <= self.last_address()
    }
}

/// An inclusive interval of addresses with `first <= last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeRepr")]
pub struct Range {
    first: Address,
    last: Address,
}

#[derive(Deserialize)]
struct RangeRepr {
    first: Address,
    last: Address,
}

impl Range {
    /// Endpoints are never swapped; an inverted pair is an error.
    pub fn new(first: Address, last: Address) -> Result<Self> {
        if first > last {
            let e = Error::InvalidRange {
                first: first.to_string(),
                last: last.to_string(),
            };
            debug!(%first, %last, error = %e, "rejected inverted range");
            return Err(e);
        }
        Ok(Range { first, last })
    }

    /// Caller guarantees `first <= last`.
    pub(crate) fn from_ordered(first: Address, last: Address) -> Self {
        debug_assert!(first <= last);
        Range { first, last }
    }

    /// Number of addresses covered, `last - first + 1`.
    pub fn address_count(&self) -> u64 {
        u64::from(self.last.get()) - u64::from(self.first.get()) + 1
    }
}

impl AddressRange for Range {
    fn first_address(&self) -> Address {
        self.first
    }

    fn last_address(&self) -> Address {
        self.last
    }
}

impl TryFrom<RangeRepr> for Range {
    type Error = Error;
    fn try_from(repr: RangeRepr) -> Result<Self> {
        Range::new(repr.first, repr.last)
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}
