use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Captures;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;
use tracing::debug;

/// Output notation for [`Address::get_as`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFormat {
    /// Unsigned integer, e.g. `3232235521`
    #[default]
    Long,
    /// Dotted quad, e.g. `192.168.0.1`
    Dotted,
}

/// An IPv4 address held as its unsigned 32 bit value.
///
/// Two addresses are equal iff their integer values are equal; ordering follows
/// the integer value too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    value: u32,
}

impl Address {
    pub const fn new(value: u32) -> Self {
        Address { value }
    }

    /// Parse `a.b.c.d`, each octet a decimal 0-255 without leading zeros.
    pub fn parse(s: &str) -> Result<Self> {
        lazy_static! {
            static ref RE: Regex = Regex::new(
                r"^(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$"
            )
            .expect("Not possible");
        }
        fn parse_octet(ind: usize, v: &Captures<'_>, s: &str) -> Result<u32> {
            v.get(ind)
                .and_then(|r| r.as_str().parse::<u8>().ok())
                .map(u32::from)
                .ok_or_else(|| Error::InvalidAddress(s.to_owned()))
        }

        match RE.captures(s) {
            Some(ref v) => Ok(Address::new(
                (parse_octet(1, v, s)? << 24)
                    | (parse_octet(2, v, s)? << 16)
                    | (parse_octet(3, v, s)? << 8)
                    | parse_octet(4, v, s)?,
            )),
            None => {
                let e = Error::InvalidAddress(s.to_owned());
                debug!(input = s, error = %e, "rejected IPv4 address");
                Err(e)
            }
        }
    }

    /// The unsigned integer value.
    pub const fn get(&self) -> u32 {
        self.value
    }

    pub fn get_as(&self, format: AddressFormat) -> String {
        match format {
            AddressFormat::Long => self.value.to_string(),
            AddressFormat::Dotted => self.to_dotted(),
        }
    }

    pub fn to_dotted(&self) -> String {
        self.to_string()
    }

    pub fn octets(&self) -> [u8; 4] {
        self.value.to_be_bytes()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            (self.value >> 24) & 0xFF,
            (self.value >> 16) & 0xFF,
            (self.value >> 8) & 0xFF,
            self.value & 0xFF
        )
    }
}

impl FromStr for Address {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Address::parse(s)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Address::new(value)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Address::new(u32::from(ip))
    }
}

impl From<Address> for Ipv4Addr {
    fn from(address: Address) -> Self {
        Ipv4Addr::from(address.value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Accepts the unsigned range and the signed 32 bit reading of it, so `-1`
/// is `255.255.255.255`.
impl TryFrom<i64> for Address {
    type Error = Error;
    fn try_from(value: i64) -> Result<Self> {
        if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
            let e = Error::InvalidAddress(value.to_string());
            debug!(input = value, error = %e, "rejected IPv4 address integer");
            return Err(e);
        }
        Ok(Address::new(value as u32))
    }
}

impl TryFrom<String> for Address {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> {
        Address::parse(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn from_dotted() {
        let address = Address::parse("192.168.0.1").unwrap();
        assert_eq!(3232235521, address.get());
        assert_eq!("3232235521", address.get_as(AddressFormat::Long));
        assert_eq!("192.168.0.1", address.get_as(AddressFormat::Dotted));
        assert_eq!("192.168.0.1", address.to_string());
    }

    #[test]
    fn from_long() {
        let address = Address::from(167901951u32);
        assert_eq!(167901951, address.get());
        assert_eq!("10.1.250.255", address.to_dotted());
        assert_eq!([10, 1, 250, 255], address.octets());
    }

    #[test]
    fn rejects_malformed_strings() {
        for s in &[
            "",
            "1.2.3",
            "1.2.3.4.5",
            "256.0.0.1",
            "1.2.3.-4",
            "a.b.c.d",
            "01.2.3.4",
            " 1.2.3.4",
            "1.2.3.4/24",
        ] {
            assert_eq!(
                Err(Error::InvalidAddress(s.to_string())),
                Address::parse(s),
                "{}",
                s
            );
        }
    }

    #[test]
    fn signed_integers_are_normalized() {
        assert_eq!("255.255.255.255", Address::try_from(-1i64).unwrap().to_dotted());
        assert_eq!(
            Address::parse("192.168.0.1").unwrap(),
            Address::try_from(3232235521i64 - (1i64 << 32)).unwrap()
        );
        assert_eq!(u32::MAX, Address::try_from(i64::from(u32::MAX)).unwrap().get());
        assert!(Address::try_from(1i64 << 32).is_err());
        assert!(Address::try_from(i64::from(i32::MIN) - 1).is_err());
    }

    #[test]
    fn std_conversions() {
        let ip = Ipv4Addr::new(10, 0, 0, 8);
        let address = Address::from(ip);
        assert_eq!("10.0.0.8", address.to_string());
        assert_eq!(ip, Ipv4Addr::from(address));
        assert_eq!(address, "10.0.0.8".parse::<Address>().unwrap());
    }

    #[test]
    fn serde_uses_dotted_notation() {
        let address = Address::parse("172.16.4.1").unwrap();
        assert_eq!("\"172.16.4.1\"", serde_json::to_string(&address).unwrap());
        assert_eq!(
            address,
            serde_json::from_str::<Address>("\"172.16.4.1\"").unwrap()
        );
        assert!(serde_json::from_str::<Address>("\"172.16.4\"").is_err());
    }

    #[quickcheck]
    fn dotted_round_trip(value: u32) -> bool {
        let dotted = Address::from(value).to_dotted();
        Address::parse(&dotted).map(|a| a.to_dotted()) == Ok(dotted)
    }

    #[quickcheck]
    fn long_round_trip(value: u32) -> bool {
        Address::from(value).get() == value
            && Address::try_from(i64::from(value)).map(|a| a.get()) == Ok(value)
    }
}
