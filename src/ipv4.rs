//! IPv4 value types, leaf first: [`Address`], [`Range`], [`SubnetMask`] and
//! [`Block`].

pub mod address;
pub mod block;
pub mod mask;
pub mod range;

pub use address::{Address, AddressFormat};
pub use block::{Block, MaskSpec};
pub use mask::{PrefixMask, SubnetMask};
pub use range::{AddressRange, Range};
