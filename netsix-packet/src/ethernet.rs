//! Ethernet frame construction and parsing
//!
//! Ethernet II framing only; 802.2/LLC encapsulation is not used anywhere
//! in this stack.

use bytes::{BufMut, BytesMut};
use netsix_core::{Error, LinkAddr, Result};
use std::fmt;

/// EtherType values this stack cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// VLAN-tagged frame (0x8100)
    VLAN,
    /// IPv6 (0x86DD)
    IPv6,
    /// Any other EtherType
    Custom(u16),
}

impl EtherType {
    /// Convert to the wire value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => 0x0800,
            EtherType::ARP => 0x0806,
            EtherType::VLAN => 0x8100,
            EtherType::IPv6 => 0x86DD,
            EtherType::Custom(val) => val,
        }
    }

    /// Create from the wire value
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0800 => EtherType::IPv4,
            0x0806 => EtherType::ARP,
            0x8100 => EtherType::VLAN,
            0x86DD => EtherType::IPv6,
            val => EtherType::Custom(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::VLAN => write!(f, "VLAN"),
            EtherType::IPv6 => write!(f, "IPv6"),
            EtherType::Custom(val) => write!(f, "0x{:04x}", val),
        }
    }
}

/// Ethernet II frame
#[derive(Debug, Clone)]
pub struct EthernetFrame {
    /// Destination link address
    pub destination: LinkAddr,
    /// Source link address
    pub source: LinkAddr,
    /// EtherType of the payload
    pub ethertype: EtherType,
    /// Payload data
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    /// Minimum frame size on the wire, without FCS
    pub const MIN_FRAME_SIZE: usize = 60;

    /// Header size (destination + source + EtherType)
    pub const HEADER_SIZE: usize = 14;

    /// Create a new frame
    pub fn new(
        destination: LinkAddr,
        source: LinkAddr,
        ethertype: EtherType,
        payload: Vec<u8>,
    ) -> Self {
        EthernetFrame {
            destination,
            source,
            ethertype,
            payload,
        }
    }

    /// Serialize the frame, padding to the minimum frame size when needed
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer =
            BytesMut::with_capacity((Self::HEADER_SIZE + self.payload.len()).max(Self::MIN_FRAME_SIZE));

        buffer.put_slice(self.destination.as_bytes());
        buffer.put_slice(self.source.as_bytes());
        buffer.put_u16(self.ethertype.to_u16());
        buffer.put_slice(&self.payload);

        let mut result = buffer.to_vec();
        if result.len() < Self::MIN_FRAME_SIZE {
            result.resize(Self::MIN_FRAME_SIZE, 0);
        }
        result
    }

    /// Parse a frame from bytes
    ///
    /// Padding cannot be told apart from payload at this layer, so the
    /// payload carries everything after the header.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(Error::truncated("ethernet frame"));
        }

        // from_slice cannot fail on six-byte ranges
        let destination = LinkAddr::from_slice(&data[0..6]).unwrap();
        let source = LinkAddr::from_slice(&data[6..12]).unwrap();
        let ethertype = EtherType::from_u16(u16::from_be_bytes([data[12], data[13]]));

        Ok(EthernetFrame {
            destination,
            source,
            ethertype,
            payload: data[Self::HEADER_SIZE..].to_vec(),
        })
    }
}
