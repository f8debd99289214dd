//! IPv4 addresses, inclusive address ranges, subnet masks and CIDR blocks.
//!
//! Every address is an unsigned 32 bit value. Ranges and blocks are built on
//! top of that and validated once, when constructed.
//!
//! ```
//! use ipv4_block::{Address, AddressRange, Block, PrefixMask};
//!
//! let block: Block = "192.168.0.0/24".parse().unwrap();
//! assert_eq!("192.168.0.255", block.broadcast_address().to_string());
//! assert_eq!(24, block.subnet_mask().network_bits_count());
//! assert_eq!(254, block.usable_address_count());
//! assert!(block.contains(&Address::parse("192.168.0.37").unwrap()));
//! ```

pub mod error;
pub mod ipv4;

pub use error::{Error, Result};
pub use ipv4::{
    Address, AddressFormat, AddressRange, Block, MaskSpec, PrefixMask, Range, SubnetMask,
};
