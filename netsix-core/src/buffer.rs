//! Segmented receive buffers
//!
//! The link and reassembly layers may hand a packet's payload over as
//! several non-contiguous segments. [`RecvBuffer`] presents those segments
//! as one logical byte stream without copying: segments are reference
//! counted [`Bytes`], so cloning a buffer is cheap and trimming only moves
//! cursors.

use bytes::{Buf, Bytes};

/// Payload of a received packet, possibly spanning several segments
#[derive(Debug, Clone, Default)]
pub struct RecvBuffer {
    segments: Vec<Bytes>,
}

impl RecvBuffer {
    /// Create a buffer from pre-split segments, dropping empty ones
    pub fn new(segments: Vec<Bytes>) -> Self {
        RecvBuffer {
            segments: segments.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// Total number of bytes across all segments
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    /// Check whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first contiguous segment, or an empty slice
    ///
    /// Fixed-size headers are parsed out of this segment directly; a header
    /// split across segments is treated as truncation by callers.
    pub fn first(&self) -> &[u8] {
        self.segments.first().map(|s| s.as_ref()).unwrap_or(&[])
    }

    /// Discard `count` bytes from the front, crossing segment boundaries
    pub fn trim_front(&mut self, mut count: usize) {
        while count > 0 {
            let Some(seg) = self.segments.first_mut() else {
                return;
            };
            if seg.len() > count {
                seg.advance(count);
                return;
            }
            count -= seg.len();
            self.segments.remove(0);
        }
    }

    /// Discard the first segment entirely
    pub fn remove_first(&mut self) {
        if !self.segments.is_empty() {
            self.segments.remove(0);
        }
    }

    /// Iterate over the remaining segments in order
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> {
        self.segments.iter().map(|s| s.as_ref())
    }

    /// Copy the buffer out into one contiguous vector
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for seg in &self.segments {
            out.extend_from_slice(seg);
        }
        out
    }
}

impl From<Bytes> for RecvBuffer {
    fn from(bytes: Bytes) -> Self {
        RecvBuffer::new(vec![bytes])
    }
}

impl From<Vec<u8>> for RecvBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        RecvBuffer::from(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(segments: &[&[u8]]) -> RecvBuffer {
        RecvBuffer::new(segments.iter().map(|s| Bytes::copy_from_slice(s)).collect())
    }

    #[test]
    fn test_len_and_first() {
        let b = buf(&[b"abc", b"defg"]);
        assert_eq!(b.len(), 7);
        assert_eq!(b.first(), b"abc");
        assert!(!b.is_empty());
    }

    #[test]
    fn test_empty_segments_dropped() {
        let b = buf(&[b"", b"abc", b""]);
        assert_eq!(b.first(), b"abc");
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_trim_front_within_segment() {
        let mut b = buf(&[b"abcdef"]);
        b.trim_front(2);
        assert_eq!(b.first(), b"cdef");
    }

    #[test]
    fn test_trim_front_across_segments() {
        let mut b = buf(&[b"abc", b"def", b"gh"]);
        b.trim_front(4);
        assert_eq!(b.first(), b"ef");
        assert_eq!(b.to_vec(), b"efgh");
    }

    #[test]
    fn test_trim_front_past_end() {
        let mut b = buf(&[b"abc", b"de"]);
        b.trim_front(100);
        assert!(b.is_empty());
        assert_eq!(b.first(), b"");
    }

    #[test]
    fn test_remove_first() {
        let mut b = buf(&[b"abc", b"de"]);
        b.remove_first();
        assert_eq!(b.to_vec(), b"de");
        b.remove_first();
        b.remove_first();
        assert!(b.is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut b = buf(&[b"abcdef"]);
        let snapshot = b.clone();
        b.trim_front(3);
        assert_eq!(b.to_vec(), b"def");
        assert_eq!(snapshot.to_vec(), b"abcdef");
    }
}
