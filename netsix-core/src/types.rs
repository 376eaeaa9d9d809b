//! Common types used across the netsix stack

use std::fmt;

/// Well-known EtherType values
pub mod ethertypes {
    /// IPv4
    pub const IPV4: u16 = 0x0800;
    /// ARP
    pub const ARP: u16 = 0x0806;
    /// IPv6
    pub const IPV6: u16 = 0x86DD;
}

/// IP protocol numbers carried in the IPv6 next-header field
pub mod ip_proto {
    /// TCP
    pub const TCP: u8 = 6;
    /// UDP
    pub const UDP: u8 = 17;
    /// IPv6 fragment extension header
    pub const FRAGMENT: u8 = 44;
    /// ICMPv6
    pub const ICMPV6: u8 = 58;
}

/// Network interface identifier
///
/// Zero is never a valid identifier; collaborators use it internally to mean
/// "no owner", which the public traits express as `Option<NicId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NicId(pub u32);

impl fmt::Display for NicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nic{}", self.0)
    }
}

/// Link-layer (Ethernet) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAddr(pub [u8; 6]);

impl LinkAddr {
    /// Create a new link address
    pub const fn new(bytes: [u8; 6]) -> Self {
        LinkAddr(bytes)
    }

    /// Broadcast address (ff:ff:ff:ff:ff:ff)
    pub const fn broadcast() -> Self {
        LinkAddr([0xff; 6])
    }

    /// All-zero address
    pub const fn zero() -> Self {
        LinkAddr([0x00; 6])
    }

    /// Create a link address from a slice, if it is exactly 6 bytes
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(slice);
            Some(LinkAddr(bytes))
        } else {
            None
        }
    }

    /// Get the address as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the address as a byte array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Check for the group bit (bit 0 of the first octet)
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// Check whether this is a unicast address
    pub fn is_unicast(&self) -> bool {
        !self.is_multicast()
    }
}

impl fmt::Display for LinkAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl From<[u8; 6]> for LinkAddr {
    fn from(bytes: [u8; 6]) -> Self {
        LinkAddr(bytes)
    }
}

impl std::str::FromStr for LinkAddr {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(format!("Invalid link address: {}", s));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| format!("Invalid link address octet: {}", part))?;
        }

        Ok(LinkAddr(bytes))
    }
}
