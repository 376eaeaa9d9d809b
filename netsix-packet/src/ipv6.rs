//! IPv6 fixed header and fragment extension header

use netsix_core::{Error, Result};
use std::net::Ipv6Addr;

/// Size of the IPv6 fixed header
pub const IPV6_HEADER_SIZE: usize = 40;

/// Size of the fragment extension header
pub const FRAGMENT_HEADER_SIZE: usize = 8;

/// Largest value representable in the 16-bit payload length field
pub const MAX_PAYLOAD_SIZE: u32 = 65535;

fn addr_from(slice: &[u8]) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    octets.copy_from_slice(slice);
    Ipv6Addr::from(octets)
}

/// Borrowed view of an IPv6 fixed header
#[derive(Debug, Clone, Copy)]
pub struct Ipv6Header<'a> {
    buffer: &'a [u8],
}

impl<'a> Ipv6Header<'a> {
    /// Wrap a buffer that starts with an IPv6 fixed header
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < IPV6_HEADER_SIZE {
            return Err(Error::truncated("IPv6 header"));
        }
        Ok(Ipv6Header { buffer })
    }

    /// IP version field; 6 for well-formed packets
    pub fn version(&self) -> u8 {
        self.buffer[0] >> 4
    }

    /// Traffic class
    pub fn traffic_class(&self) -> u8 {
        (self.buffer[0] << 4) | (self.buffer[1] >> 4)
    }

    /// Flow label (20 bits)
    pub fn flow_label(&self) -> u32 {
        (((self.buffer[1] & 0x0f) as u32) << 16)
            | ((self.buffer[2] as u32) << 8)
            | self.buffer[3] as u32
    }

    /// Length of the payload following this header
    pub fn payload_length(&self) -> u16 {
        u16::from_be_bytes([self.buffer[4], self.buffer[5]])
    }

    /// Protocol of the following header
    pub fn next_header(&self) -> u8 {
        self.buffer[6]
    }

    /// Hop limit
    pub fn hop_limit(&self) -> u8 {
        self.buffer[7]
    }

    /// Source address
    pub fn source(&self) -> Ipv6Addr {
        addr_from(&self.buffer[8..24])
    }

    /// Destination address
    pub fn destination(&self) -> Ipv6Addr {
        addr_from(&self.buffer[24..40])
    }
}

/// Builder for an outgoing IPv6 fixed header
#[derive(Debug, Clone)]
pub struct Ipv6HeaderBuilder {
    traffic_class: u8,
    flow_label: u32,
    payload_length: u16,
    next_header: u8,
    hop_limit: u8,
    source: Ipv6Addr,
    destination: Ipv6Addr,
}

impl Ipv6HeaderBuilder {
    /// Start a header with a zero flow label, default traffic class, and a
    /// hop limit of 64
    pub fn new(source: Ipv6Addr, destination: Ipv6Addr, next_header: u8, payload_length: u16) -> Self {
        Ipv6HeaderBuilder {
            traffic_class: 0,
            flow_label: 0,
            payload_length,
            next_header,
            hop_limit: 64,
            source,
            destination,
        }
    }

    /// Set the hop limit
    pub fn with_hop_limit(mut self, hop_limit: u8) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    /// Set the traffic class
    pub fn with_traffic_class(mut self, traffic_class: u8) -> Self {
        self.traffic_class = traffic_class;
        self
    }

    /// Serialize the header
    pub fn build(&self) -> [u8; IPV6_HEADER_SIZE] {
        let mut header = [0u8; IPV6_HEADER_SIZE];
        header[0] = 0x60 | (self.traffic_class >> 4);
        header[1] = (self.traffic_class << 4) | ((self.flow_label >> 16) as u8 & 0x0f);
        header[2] = (self.flow_label >> 8) as u8;
        header[3] = self.flow_label as u8;
        header[4..6].copy_from_slice(&self.payload_length.to_be_bytes());
        header[6] = self.next_header;
        header[7] = self.hop_limit;
        header[8..24].copy_from_slice(&self.source.octets());
        header[24..40].copy_from_slice(&self.destination.octets());
        header
    }
}

/// Borrowed view of a fragment extension header
#[derive(Debug, Clone, Copy)]
pub struct FragmentHeader<'a> {
    buffer: &'a [u8],
}

impl<'a> FragmentHeader<'a> {
    /// Wrap a buffer that starts with a fragment extension header
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < FRAGMENT_HEADER_SIZE {
            return Err(Error::truncated("fragment header"));
        }
        Ok(FragmentHeader { buffer })
    }

    /// Protocol of the fragmented packet's next header
    pub fn next_header(&self) -> u8 {
        self.buffer[0]
    }

    /// Fragment offset in eight-byte units; zero for the first fragment
    pub fn fragment_offset(&self) -> u16 {
        u16::from_be_bytes([self.buffer[2], self.buffer[3]]) >> 3
    }

    /// More-fragments flag
    pub fn more_fragments(&self) -> bool {
        self.buffer[3] & 0x01 != 0
    }

    /// Fragment identification
    pub fn identification(&self) -> u32 {
        u32::from_be_bytes([self.buffer[4], self.buffer[5], self.buffer[6], self.buffer[7]])
    }
}
