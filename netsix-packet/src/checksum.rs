//! Checksum calculation utilities
//!
//! This module implements the Internet Checksum (RFC 1071) and the ICMPv6
//! pseudo-header checksum (RFC 4443 §2.3). Received payloads may be split
//! across several segments, so the sum can be accumulated piecewise; the
//! accumulator keeps the dangling byte of an odd-length piece so segment
//! boundaries never change the result.

use netsix_core::types::ip_proto;
use netsix_core::RecvBuffer;
use std::net::Ipv6Addr;

/// Incremental Internet Checksum accumulator
///
/// Feed byte slices in logical stream order with [`add_bytes`], then read
/// the folded one's-complement result with [`checksum`].
///
/// [`add_bytes`]: Checksummer::add_bytes
/// [`checksum`]: Checksummer::checksum
#[derive(Debug, Default)]
pub struct Checksummer {
    sum: u32,
    pending: Option<u8>,
}

impl Checksummer {
    /// Create an accumulator with an empty sum
    pub fn new() -> Self {
        Checksummer::default()
    }

    /// Add a slice of the logical byte stream to the sum
    pub fn add_bytes(&mut self, mut data: &[u8]) {
        if data.is_empty() {
            return;
        }

        // Complete the 16-bit word left dangling by an odd-length slice.
        if let Some(hi) = self.pending.take() {
            self.sum += u16::from_be_bytes([hi, data[0]]) as u32;
            data = &data[1..];
        }

        let mut chunks = data.chunks_exact(2);
        for chunk in &mut chunks {
            self.sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
        }
        if let [byte] = chunks.remainder() {
            self.pending = Some(*byte);
        }
    }

    /// Fold the accumulated sum and return its one's complement
    pub fn checksum(&self) -> u16 {
        let mut sum = self.sum;
        if let Some(byte) = self.pending {
            sum += (byte as u32) << 8;
        }
        while (sum >> 16) != 0 {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }
        !(sum as u16)
    }
}

/// Calculate the Internet Checksum (RFC 1071) over one contiguous buffer
///
/// # Arguments
///
/// * `data` - The bytes to checksum; an odd trailing byte is padded with
///   zero on the right as the RFC prescribes
///
/// # Returns
///
/// The 16-bit one's complement of the one's complement sum
///
/// # Examples
///
/// ```
/// use netsix_packet::checksum::internet_checksum;
///
/// // Worked example from RFC 1071 §3.
/// let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
/// assert_eq!(internet_checksum(&data), 0x220d);
/// ```
pub fn internet_checksum(data: &[u8]) -> u16 {
    let mut checksummer = Checksummer::new();
    checksummer.add_bytes(data);
    checksummer.checksum()
}

/// Calculate the ICMPv6 checksum of a message
///
/// The sum covers the IPv6 pseudo-header (source, destination, upper-layer
/// length, next header 58), the message with its checksum field read as
/// zero, and any payload continuing beyond the message view. The payload
/// segments are treated as one logical stream; nothing is copied.
///
/// # Arguments
///
/// * `message` - The ICMPv6 message, starting at its type field
/// * `src` - Source address for the pseudo-header
/// * `dst` - Destination address for the pseudo-header
/// * `payload` - Payload bytes following `message`, possibly segmented
pub fn icmpv6_checksum(
    message: &[u8],
    src: &Ipv6Addr,
    dst: &Ipv6Addr,
    payload: &RecvBuffer,
) -> u16 {
    let mut checksummer = Checksummer::new();

    checksummer.add_bytes(&src.octets());
    checksummer.add_bytes(&dst.octets());
    let upper_len = (message.len() + payload.len()) as u32;
    checksummer.add_bytes(&upper_len.to_be_bytes());
    checksummer.add_bytes(&[0, 0, 0, ip_proto::ICMPV6]);

    if message.len() < 4 {
        checksummer.add_bytes(message);
    } else {
        checksummer.add_bytes(&message[..2]);
        checksummer.add_bytes(&[0, 0]);
        checksummer.add_bytes(&message[4..]);
    }

    for seg in payload.segments() {
        checksummer.add_bytes(seg);
    }

    checksummer.checksum()
}

/// Verify the checksum embedded in an ICMPv6 message
///
/// Returns `true` when the computed checksum matches the message's checksum
/// field. Messages shorter than the four-byte ICMPv6 header never verify.
pub fn verify_icmpv6_checksum(
    message: &[u8],
    src: &Ipv6Addr,
    dst: &Ipv6Addr,
    payload: &RecvBuffer,
) -> bool {
    if message.len() < 4 {
        return false;
    }
    let embedded = u16::from_be_bytes([message[2], message[3]]);
    icmpv6_checksum(message, src, dst, payload) == embedded
}
