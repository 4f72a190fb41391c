//! IP prefix parsing and containment.
//!
//! Accepts `address/length` notation for IPv4 and IPv6 as well as bare
//! addresses, which are treated as host prefixes.

use crate::error::ReportError;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// An IP prefix, stored with host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix {
    network: IpAddr,
    len: u8,
}

impl Prefix {
    /// Parse a prefix from string (e.g., "192.0.2.0/24" or "2001:db8::1").
    pub fn parse(input: &str) -> Result<Self, ReportError> {
        let trimmed = input.trim();
        let invalid = || ReportError::InvalidPrefix(input.to_string());

        let (addr_part, len_part) = match trimmed.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (trimmed, None),
        };

        let addr: IpAddr = addr_part.parse().map_err(|_| invalid())?;
        let max_len = max_len(&addr);

        let len = match len_part {
            Some(l) => {
                // u8 parsing alone would accept "+24"
                if l.is_empty() || !l.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                l.parse::<u8>().map_err(|_| invalid())?
            }
            None => max_len,
        };

        if len > max_len {
            return Err(invalid());
        }

        Ok(Self {
            network: mask(addr, len),
            len,
        })
    }

    #[cfg(test)]
    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Whether `other` is equal to or more specific than this prefix.
    pub fn contains(&self, other: &Prefix) -> bool {
        if other.len < self.len {
            return false;
        }

        match (self.network, other.network) {
            (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)) => {
                mask(other.network, self.len) == self.network
            }
            _ => false,
        }
    }
}

impl FromStr for Prefix {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.len)
    }
}

fn max_len(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Clear all bits past `len`. MSB-first, same as the `Ipv4Addr` octet order.
fn mask(addr: IpAddr, len: u8) -> IpAddr {
    match addr {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let m = if len == 0 { 0 } else { !0u32 << (32 - u32::from(len)) };
            IpAddr::V4((bits & m).into())
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let m = if len == 0 { 0 } else { !0u128 << (128 - u32::from(len)) };
            IpAddr::V6((bits & m).into())
        }
    }
}
