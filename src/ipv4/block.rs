use super::address::Address;
use super::mask::{PrefixMask, SubnetMask};
use super::range::{AddressRange, Range};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::{debug, trace};

/// The second parameter of a [`Block`], in every shape it can be given.
///
/// Resolution into a [`SubnetMask`] goes through [`MaskSpec::resolve`] in
/// variant order:
///
/// | variant            | mask                                          |
/// |--------------------|-----------------------------------------------|
/// | `Mask`             | used as is                                    |
/// | `FitTo`            | smallest block holding the base and the other |
/// | `DottedMaskString` | parsed as a mask in address form              |
/// | `CidrPrefix`       | built from the prefix length                  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskSpec {
    Mask(SubnetMask),
    FitTo(Address),
    DottedMaskString(String),
    CidrPrefix(u8),
}

impl MaskSpec {
    pub fn resolve(&self, base: &Address) -> Result<SubnetMask> {
        match self {
            MaskSpec::Mask(mask) => Ok(*mask),
            MaskSpec::FitTo(other) => {
                SubnetMask::from_cidr_prefix(SubnetMask::calculate_cidr_to_fit(base, other))
            }
            MaskSpec::DottedMaskString(s) => SubnetMask::parse(s),
            MaskSpec::CidrPrefix(prefix) => SubnetMask::from_cidr_prefix(*prefix),
        }
    }
}

/// Text with four dot separated parts is a dotted mask. Anything else has its
/// non-digit characters dropped and the rest read as a prefix length, so
/// `24`, `/24` and ` 24 ` are all the same.
impl FromStr for MaskSpec {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if trimmed.split('.').count() == 4 {
            return Ok(MaskSpec::DottedMaskString(trimmed.to_owned()));
        }

        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            let e = Error::UnresolvableSubnetMask(s.to_owned());
            debug!(input = s, error = %e, "no subnet mask in input");
            return Err(e);
        }
        digits.parse::<u8>().map(MaskSpec::CidrPrefix).map_err(|_| {
            let e = Error::InvalidPrefixLength(digits.clone());
            debug!(input = s, error = %e, "prefix length out of range");
            e
        })
    }
}

impl From<SubnetMask> for MaskSpec {
    fn from(mask: SubnetMask) -> Self {
        MaskSpec::Mask(mask)
    }
}

impl From<Address> for MaskSpec {
    fn from(address: Address) -> Self {
        MaskSpec::FitTo(address)
    }
}

impl From<u8> for MaskSpec {
    fn from(prefix: u8) -> Self {
        MaskSpec::CidrPrefix(prefix)
    }
}

/// A CIDR aligned block: the range from `base & mask` to `base | !mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BlockRepr", into = "BlockRepr")]
pub struct Block {
    range: Range,
    mask: SubnetMask,
}

#[derive(Serialize, Deserialize)]
struct BlockRepr {
    network: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    broadcast: Option<Address>,
    mask: SubnetMask,
}

impl Block {
    /// Derive the block around `base` from any accepted mask shape.
    ///
    /// ```
    /// use ipv4_block::{Address, Block};
    ///
    /// let block = Block::new(Address::parse("192.168.0.77").unwrap(), 24u8).unwrap();
    /// assert_eq!("192.168.0.0", block.network_address().to_string());
    /// assert_eq!("192.168.0.255", block.broadcast_address().to_string());
    /// ```
    pub fn new<M: Into<MaskSpec>>(base: Address, spec: M) -> Result<Self> {
        let spec = spec.into();
        let mask = spec.resolve(&base).map_err(|e| {
            debug!(%base, ?spec, error = %e, "could not resolve subnet mask");
            e
        })?;
        trace!(%base, ?spec, %mask, "resolved subnet mask");
        Ok(Block::from_subnet_mask(base, mask))
    }

    /// Build from a dotted base, optionally carrying a `/suffix`.
    ///
    /// A suffix on `base` takes priority and `spec` is then ignored. Without
    /// either there is nothing to derive a mask from.
    ///
    /// ```
    /// use ipv4_block::{Block, MaskSpec};
    ///
    /// let a = Block::parse("10.0.0.0/8", None).unwrap();
    /// let b = Block::parse("10.0.0.0", Some(MaskSpec::CidrPrefix(8))).unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn parse(base: &str, spec: Option<MaskSpec>) -> Result<Self> {
        match base.split_once('/') {
            Some((address, suffix)) => {
                if spec.is_some() {
                    trace!(base, "slash suffix overrides explicit mask");
                }
                Block::new(Address::parse(address)?, suffix.parse::<MaskSpec>()?)
            }
            None => {
                let address = Address::parse(base)?;
                match spec {
                    Some(spec) => Block::new(address, spec),
                    None => {
                        let e = Error::UnresolvableSubnetMask(base.to_owned());
                        debug!(base, error = %e, "no subnet mask given");
                        Err(e)
                    }
                }
            }
        }
    }

    pub fn from_subnet_mask(address: Address, mask: SubnetMask) -> Self {
        let network = Block::calculate_network_address(&address, &mask);
        let broadcast = Block::calculate_broadcast_address(&address, &mask);
        Block {
            range: Range::from_ordered(network, broadcast),
            mask,
        }
    }

    pub fn from_cidr_prefix(address: Address, prefix: u8) -> Result<Self> {
        Ok(Block::from_subnet_mask(
            address,
            SubnetMask::from_cidr_prefix(prefix)?,
        ))
    }

    /// Clear every host bit.
    pub fn calculate_network_address(address: &Address, mask: &SubnetMask) -> Address {
        Address::new(address.get() & mask.get())
    }

    /// Set every host bit.
    pub fn calculate_broadcast_address(address: &Address, mask: &SubnetMask) -> Address {
        Address::new(address.get() | !mask.get())
    }

    pub fn network_address(&self) -> Address {
        self.range.first_address()
    }

    pub fn broadcast_address(&self) -> Address {
        self.range.last_address()
    }

    pub fn subnet_mask(&self) -> SubnetMask {
        self.mask
    }

    pub fn prefix_len(&self) -> u8 {
        self.mask.cidr_prefix()
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn is_network_address(&self, address: &Address) -> bool {
        *address == self.network_address()
    }

    pub fn is_broadcast_address(&self, address: &Address) -> bool {
        *address == self.broadcast_address()
    }

    /// `2 ^ host bits`
    pub fn address_count(&self) -> u64 {
        1u64 << self.mask.host_bits_count()
    }

    /// Address count less the network and broadcast addresses.
    ///
    /// A /31 gives 0 and a single address block gives -1.
    pub fn usable_address_count(&self) -> i64 {
        self.address_count() as i64 - 2
    }
}

impl AddressRange for Block {
    fn first_address(&self) -> Address {
        self.network_address()
    }

    fn last_address(&self) -> Address {
        self.broadcast_address()
    }
}

impl FromStr for Block {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Block::parse(s, None)
    }
}

/// `network/prefix`, or `network/mask` when the mask has gaps.
impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.mask.is_contiguous() {
            write!(f, "{}/{}", self.network_address(), self.prefix_len())
        } else {
            write!(f, "{}/{}", self.network_address(), self.mask)
        }
    }
}

impl From<Block> for Range {
    fn from(block: Block) -> Self {
        block.range
    }
}

impl From<Block> for BlockRepr {
    fn from(block: Block) -> Self {
        BlockRepr {
            network: block.network_address(),
            broadcast: Some(block.broadcast_address()),
            mask: block.mask,
        }
    }
}

impl TryFrom<BlockRepr> for Block {
    type Error = Error;
    fn try_from(repr: BlockRepr) -> Result<Self> {
        Ok(Block::from_subnet_mask(repr.network, repr.mask))
    }
}
