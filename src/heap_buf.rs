//! The heap-allocated spill buffer backing [`SmallStr`].
//!
//! [`HeapBuf`] owns a growable byte buffer with an explicit doubling
//! policy. It is created lazily by [`SmallStr`] at the moment a byte
//! sequence first outgrows its inline capacity, and it holds only the
//! overflowing tail of the sequence from that point on.
//!
//! Growth is staged: a replacement buffer is allocated and fully
//! populated before it is swapped in, so a failed allocation leaves the
//! previous buffer, length, and capacity untouched.
//!
//! [`SmallStr`]: crate::SmallStr

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::error::Error;

/// Initial capacity, in bytes, of a freshly created [`HeapBuf`].
pub const HEAP_INITIAL_CAP: usize = 10;

/// Error raised by [`HeapBuf`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum HeapError {
  /// The configured initial capacity is zero. This is a configuration
  /// invariant check, not a runtime-data condition: a zero-capacity
  /// buffer could never accept its seed byte without growing, and
  /// doubling zero goes nowhere.
  #[display("invalid spill buffer capacity {_0}; must be at least 1")]
  InvalidCapacity(usize),
  /// The allocator could not provide the requested number of bytes.
  #[display("failed to allocate {_0} bytes for the spill buffer")]
  AllocFailed(usize),
}

impl Error for HeapError {}

/// An exclusively owned, growable byte buffer.
///
/// Capacity is the length of the boxed slice; `len` counts the bytes
/// logically stored in its prefix. Appending a byte to a full buffer
/// doubles the capacity first, amortizing to O(1) per append.
///
/// # Example
///
/// ```rust
/// use small_str::heap_buf::HeapBuf;
/// use small_str::heap_buf::HEAP_INITIAL_CAP;
///
/// # fn main() -> Result<(), small_str::HeapError> {
/// let mut buf = HeapBuf::new()?;
/// assert_eq!(buf.capacity(), HEAP_INITIAL_CAP);
///
/// for b in b"a dozen bytes".iter().copied() {
///   buf.push(b)?;
/// }
/// assert_eq!(buf.as_slice(), b"a dozen bytes");
/// assert_eq!(buf.capacity(), HEAP_INITIAL_CAP * 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HeapBuf {
  /// The owned allocation. Its length is the buffer's capacity; only
  /// the first `len` bytes are logically stored.
  buf: Box<[u8]>,
  len: usize,
}

impl HeapBuf {
  /// Creates an empty buffer with [`HEAP_INITIAL_CAP`] bytes of
  /// capacity.
  pub fn new() -> Result<Self, HeapError> {
    Self::with_capacity(HEAP_INITIAL_CAP)
  }

  /// Creates an empty buffer with the given capacity.
  ///
  /// Returns [`HeapError::InvalidCapacity`] when `cap` is zero and
  /// [`HeapError::AllocFailed`] when the allocator cannot satisfy the
  /// request.
  pub fn with_capacity(cap: usize) -> Result<Self, HeapError> {
    if cap == 0 {
      return Err(HeapError::InvalidCapacity(cap));
    }
    Ok(Self {
      buf: alloc_bytes(cap)?,
      len: 0,
    })
  }

  /// Creates a buffer seeded with exactly one byte.
  ///
  /// This is the overflow-transition constructor used by
  /// [`SmallStr::push`](crate::SmallStr::push) when a sequence first
  /// exceeds its inline capacity.
  pub fn with_byte(byte: u8) -> Result<Self, HeapError> {
    let mut buf = Self::new()?;
    buf.push(byte)?;
    Ok(buf)
  }

  /// Returns the number of bytes stored in the buffer.
  #[inline]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if no bytes are stored.
  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Returns the allocated capacity in bytes.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.buf.len()
  }

  /// Returns the stored bytes as a slice.
  #[inline]
  pub fn as_slice(&self) -> &[u8] {
    &self.buf[..self.len]
  }

  /// Appends a single byte, doubling the capacity first if the buffer
  /// is full.
  ///
  /// On error the buffer is unchanged: same capacity, same length,
  /// same contents.
  pub fn push(&mut self, byte: u8) -> Result<(), HeapError> {
    if self.len == self.capacity() {
      self.grow()?;
    }
    self.buf[self.len] = byte;
    self.len += 1;
    Ok(())
  }

  /// Doubles the capacity, preserving the stored bytes.
  ///
  /// The replacement buffer is allocated and fully populated before it
  /// is swapped in; `buf` and the capacity it implies change together,
  /// after the copy. A failed allocation returns with the old state
  /// intact and nothing leaked.
  fn grow(&mut self) -> Result<(), HeapError> {
    let new_cap = self.capacity() * 2;
    let mut staged = alloc_bytes(new_cap)?;
    staged[..self.len].copy_from_slice(&self.buf[..self.len]);
    self.buf = staged;
    Ok(())
  }
}

/// Fallibly allocates a zeroed boxed slice of `cap` bytes.
fn alloc_bytes(cap: usize) -> Result<Box<[u8]>, HeapError> {
  let mut bytes: Vec<u8> = Vec::new();
  bytes
    .try_reserve_exact(cap)
    .map_err(|_| HeapError::AllocFailed(cap))?;
  bytes.resize(cap, 0);
  Ok(bytes.into_boxed_slice())
}
