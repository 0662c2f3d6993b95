//! Growable accumulator for bytes that arrived from the peer but have not been
//! framed yet.
//!
//! [`ByteBuffer`] keeps its live bytes at the front of the backing storage.
//! Appending grows the storage by doubling (starting at 32 bytes) only when the
//! new bytes do not fit, and consuming shifts the remaining bytes back to
//! offset zero. The shift costs O(remaining), which stays cheap because framers
//! consume whole messages from the front and the live region is bounded by the
//! header and line limits.

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

/// Smallest capacity allocated once the buffer has to grow.
const MIN_CAPACITY: usize = 32;

/// A FIFO byte queue with explicit capacity management.
#[derive(Clone, Default)]
pub struct ByteBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl ByteBuffer {
    /// Creates an empty buffer without allocating.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: vec![0; capacity].into_boxed_slice(), len: 0 }
    }

    /// Number of live bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the backing storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Appends `src` after the live bytes, growing the storage if needed.
    pub fn append(&mut self, src: &[u8]) {
        let new_len = self.len + src.len();
        if self.data.len() < new_len {
            let mut capacity = self.data.len().max(MIN_CAPACITY);
            while capacity < new_len {
                capacity *= 2;
            }

            let mut grown = vec![0; capacity].into_boxed_slice();
            grown[..self.len].copy_from_slice(&self.data[..self.len]);
            self.data = grown;
        }

        self.data[self.len..new_len].copy_from_slice(src);
        self.len = new_len;
    }

    /// Removes the first `n` live bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` is greater than [`len`](Self::len).
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.len, "consume {n} bytes but only {} bytes buffered", self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// Copies the first `n` live bytes out and consumes them.
    ///
    /// # Panics
    ///
    /// Panics if `n` is greater than [`len`](Self::len).
    pub fn split_to(&mut self, n: usize) -> Bytes {
        let bytes = Bytes::copy_from_slice(&self[..n]);
        self.consume(n);
        bytes
    }

    /// Returns the offset of the first occurrence of `needle` in the live bytes.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        self.windows(needle.len()).position(|window| window == needle)
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl AsRef<[u8]> for ByteBuffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer").field("len", &self.len).field("capacity", &self.data.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn grows_by_doubling_from_min_capacity() {
        let mut buffer = ByteBuffer::new();
        assert_eq!(buffer.capacity(), 0);

        buffer.append(b"hello");
        assert_eq!(buffer.capacity(), 32);

        buffer.append(&[b'x'; 30]);
        assert_eq!(buffer.len(), 35);
        assert_eq!(buffer.capacity(), 64);

        buffer.append(&[b'y'; 100]);
        assert_eq!(buffer.len(), 135);
        assert_eq!(buffer.capacity(), 256);
        assert_eq!(&buffer[..5], b"hello");
    }

    #[test]
    fn keeps_capacity_when_data_fits() {
        let mut buffer = ByteBuffer::with_capacity(40);
        buffer.append(&[0; 40]);
        assert_eq!(buffer.capacity(), 40);

        buffer.consume(40);
        buffer.append(&[1; 40]);
        assert_eq!(buffer.capacity(), 40);

        buffer.append(&[2; 1]);
        assert_eq!(buffer.capacity(), 80);
    }

    #[test]
    fn consume_compacts_to_front() {
        let mut buffer = ByteBuffer::new();
        buffer.append(b"GET / HTTP/1.1\r\n\r\nrest");

        buffer.consume(18);
        assert_eq!(&buffer[..], b"rest");

        buffer.consume(4);
        assert!(buffer.is_empty());
    }

    #[test]
    #[should_panic(expected = "consume 5 bytes but only 4 bytes buffered")]
    fn consume_more_than_buffered_panics() {
        let mut buffer = ByteBuffer::new();
        buffer.append(b"1234");
        buffer.consume(5);
    }

    #[test]
    fn split_to_and_find() {
        let mut buffer = ByteBuffer::new();
        buffer.append(b"hello\nworld\n");

        assert_eq!(buffer.find(b"\n"), Some(5));
        assert_eq!(buffer.find(b"\r\n"), None);

        let line = buffer.split_to(6);
        assert_eq!(&line[..], b"hello\n");
        assert_eq!(&buffer[..], b"world\n");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append(Vec<u8>),
        Consume(prop::sample::Index),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            2 => proptest::collection::vec(any::<u8>(), 0..97).prop_map(Op::Append),
            1 => any::<prop::sample::Index>().prop_map(Op::Consume),
        ]
    }

    proptest! {
        #[test]
        fn behaves_like_a_queue(ops in proptest::collection::vec(op(), 1..200)) {
            let mut buffer = ByteBuffer::new();
            let mut model = VecDeque::new();

            for op in ops {
                match op {
                    Op::Append(chunk) => {
                        buffer.append(&chunk);
                        model.extend(chunk);
                    }
                    Op::Consume(index) => {
                        let n = index.index(model.len() + 1);
                        buffer.consume(n);
                        model.drain(..n);
                    }
                }

                prop_assert!(buffer.len() <= buffer.capacity());
                prop_assert_eq!(&buffer[..], model.make_contiguous());
            }
        }
    }
}
