//! ICMPv6 message layer (RFC 4443)
//!
//! A message is {type, code, checksum, body}. The view here is zero-copy;
//! body interpretation beyond the common header is only defined once the
//! caller has confirmed the minimum size of the specific message type.

use netsix_core::{Error, Result};

/// Size of the common ICMPv6 header (type, code, checksum)
pub const ICMPV6_HEADER_SIZE: usize = 4;

/// Minimum size of any valid ICMPv6 message
pub const ICMPV6_MIN_SIZE: usize = 8;

/// Minimum size of an Echo Request/Reply message
pub const ECHO_MIN_SIZE: usize = 8;

/// Minimum size of a Destination Unreachable message
pub const DST_UNREACHABLE_MIN_SIZE: usize = 8;

/// Minimum size of a Packet Too Big message
pub const PACKET_TOO_BIG_MIN_SIZE: usize = 8;

/// Destination Unreachable codes
pub mod dst_unreachable {
    /// No transport endpoint listening on the destination port
    pub const PORT_UNREACHABLE: u8 = 4;
}

/// ICMPv6 message types handled by this stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Icmpv6Type {
    /// Destination Unreachable (1)
    DestinationUnreachable = 1,
    /// Packet Too Big (2)
    PacketTooBig = 2,
    /// Time Exceeded (3)
    TimeExceeded = 3,
    /// Parameter Problem (4)
    ParameterProblem = 4,
    /// Echo Request (128)
    EchoRequest = 128,
    /// Echo Reply (129)
    EchoReply = 129,
    /// Router Solicitation (133)
    RouterSolicitation = 133,
    /// Router Advertisement (134)
    RouterAdvertisement = 134,
    /// Neighbor Solicitation (135)
    NeighborSolicitation = 135,
    /// Neighbor Advertisement (136)
    NeighborAdvertisement = 136,
    /// Redirect (137)
    Redirect = 137,
}

impl Icmpv6Type {
    /// Create from the wire value; `None` for types outside the handled set
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Icmpv6Type::DestinationUnreachable),
            2 => Some(Icmpv6Type::PacketTooBig),
            3 => Some(Icmpv6Type::TimeExceeded),
            4 => Some(Icmpv6Type::ParameterProblem),
            128 => Some(Icmpv6Type::EchoRequest),
            129 => Some(Icmpv6Type::EchoReply),
            133 => Some(Icmpv6Type::RouterSolicitation),
            134 => Some(Icmpv6Type::RouterAdvertisement),
            135 => Some(Icmpv6Type::NeighborSolicitation),
            136 => Some(Icmpv6Type::NeighborAdvertisement),
            137 => Some(Icmpv6Type::Redirect),
            _ => None,
        }
    }

    /// Convert to the wire value
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Borrowed view of an ICMPv6 message
#[derive(Debug, Clone, Copy)]
pub struct Icmpv6Message<'a> {
    buffer: &'a [u8],
}

impl<'a> Icmpv6Message<'a> {
    /// Wrap a buffer that starts with an ICMPv6 common header
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < ICMPV6_HEADER_SIZE {
            return Err(Error::truncated("ICMPv6 header"));
        }
        Ok(Icmpv6Message { buffer })
    }

    /// Raw message type
    pub fn msg_type(&self) -> u8 {
        self.buffer[0]
    }

    /// Message code
    pub fn code(&self) -> u8 {
        self.buffer[1]
    }

    /// Embedded checksum field
    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.buffer[2], self.buffer[3]])
    }

    /// Whole message including the common header
    pub fn bytes(&self) -> &'a [u8] {
        self.buffer
    }

    /// Message body following the common header
    pub fn body(&self) -> &'a [u8] {
        &self.buffer[ICMPV6_HEADER_SIZE..]
    }

    /// Echo identifier; callers confirm [`ECHO_MIN_SIZE`] first
    pub fn echo_ident(&self) -> u16 {
        u16::from_be_bytes([self.buffer[4], self.buffer[5]])
    }

    /// Echo sequence number; callers confirm [`ECHO_MIN_SIZE`] first
    pub fn echo_sequence(&self) -> u16 {
        u16::from_be_bytes([self.buffer[6], self.buffer[7]])
    }

    /// Advertised MTU of a Packet Too Big message; callers confirm
    /// [`PACKET_TOO_BIG_MIN_SIZE`] first
    pub fn mtu(&self) -> u32 {
        u32::from_be_bytes([self.buffer[4], self.buffer[5], self.buffer[6], self.buffer[7]])
    }
}

/// Write `checksum` into a serialized message's checksum field
pub fn set_checksum(message: &mut [u8], checksum: u16) {
    message[2..4].copy_from_slice(&checksum.to_be_bytes());
}
