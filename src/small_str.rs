//! A byte string with inline storage.
//!
//! `SmallStr<N>` stores up to `N` bytes directly inside the value,
//! spilling the overflowing tail into a heap-allocated [`HeapBuf`] once
//! the length exceeds `N`. The first `N` bytes always stay inline; only
//! bytes at logical positions `N` and beyond live on the heap.
//!
//! The container is a byte sequence, not a text model: it performs no
//! UTF-8 validation and no encoding-aware operations.
//!
//! ## Examples
//!
//! Building a `SmallStr` and appending bytes:
//!
//! ```
//! use small_str::SmallStr;
//!
//! # fn main() -> Result<(), small_str::SmallStrError> {
//! let mut s: SmallStr<8> = SmallStr::new();
//! s.push_bytes(b"hi")?;
//! s.push(b'!')?;
//! assert_eq!(s, "hi!");
//! assert!(s.is_inline());
//! # Ok(())
//! # }
//! ```
//!
//! Exceeding the inline capacity spills the tail to the heap:
//!
//! ```
//! use small_str::SmallStr;
//!
//! # fn main() -> Result<(), small_str::SmallStrError> {
//! let mut s: SmallStr<4> = SmallStr::new();
//! s.push_bytes(b"abcdef")?;
//! // 6 bytes exceed the inline capacity of 4
//! assert!(!s.is_inline());
//! assert_eq!(s, "abcdef");
//! # Ok(())
//! # }
//! ```

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::error::Error;
use core::fmt;
use core::hash::Hash;
use core::hash::Hasher;
use core::mem;
use core::ops::Add;
use core::ops::Index;
use core::str::FromStr;

use crate::heap_buf::HeapBuf;
use crate::heap_buf::HeapError;

/// Error raised by [`SmallStr`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SmallStrError {
  /// A read past the logical length of the container.
  #[display("index {index} out of range for length {len}")]
  OutOfRange {
    /// The requested position.
    index: usize,
    /// The container's logical length at the time of the read.
    len:   usize,
  },
  /// The spill buffer could not be created or grown.
  #[display("{_0}")]
  Heap(HeapError),
}

impl Error for SmallStrError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      Self::Heap(err) => Some(err),
      Self::OutOfRange { .. } => None,
    }
  }
}

impl From<HeapError> for SmallStrError {
  #[inline]
  fn from(err: HeapError) -> Self {
    Self::Heap(err)
  }
}

/// Where the tail of the sequence lives.
///
/// `Inline` while the length is at most `N`; `Spilled` once it has
/// gone past, with the overflow held in an exclusively owned
/// [`HeapBuf`]. Keying the storage on this tag, rather than a nullable
/// handle, makes the length/handle consistency hold by construction.
#[derive(Debug, derive_more::IsVariant)]
pub(crate) enum Storage {
  Inline,
  Spilled(HeapBuf),
}

/// A byte string that stores up to `N` bytes inline before spilling to
/// the heap.
///
/// Bytes at positions `[0, N)` are embedded in the value itself; once
/// the length exceeds `N`, bytes at `[N, len)` live in a [`HeapBuf`]
/// owned exclusively by this container. Cloning always rebuilds the
/// spill buffer from scratch, so two containers never share one.
///
/// # Example
///
/// ```rust
/// use small_str::SmallStr;
///
/// # fn main() -> Result<(), small_str::SmallStrError> {
/// let s: SmallStr<22> = "Hello, world!".parse()?;
/// assert_eq!(s.len(), 13);
/// assert_eq!(s.get(4)?, b'o');
/// assert!(s.is_inline());
/// # Ok(())
/// # }
/// ```
pub struct SmallStr<const N: usize> {
  /// Total logical length, spanning the inline array and the spill
  /// buffer.
  len:     usize,
  /// Inline storage for the first `N` bytes of the sequence. Contents
  /// past `len` are irrelevant.
  buf:     [u8; N],
  /// The tail: inline while `len <= N`, spilled afterwards.
  storage: Storage,
}

impl<const N: usize> SmallStr<N> {
  /// Creates a new empty `SmallStr` with inline capacity `N`. Never
  /// allocates.
  pub const fn new() -> Self {
    Self {
      len:     0,
      buf:     [0; N],
      storage: Storage::Inline,
    }
  }

  /// Creates a `SmallStr` holding `bytes`, spilling to the heap if
  /// the slice is longer than `N`.
  pub fn from_bytes(bytes: &[u8]) -> Result<Self, SmallStrError> {
    let mut s = Self::new();
    s.push_bytes(bytes)?;
    Ok(s)
  }

  /// Returns the logical length in bytes.
  #[inline]
  pub const fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if the container is empty.
  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Returns `true` if all bytes are stored inline (no heap
  /// allocation exists).
  #[inline]
  pub fn is_inline(&self) -> bool {
    self.storage.is_inline()
  }

  /// Returns `true` if the tail of the sequence has spilled to the
  /// heap.
  #[inline]
  pub fn is_spilled(&self) -> bool {
    self.storage.is_spilled()
  }

  /// Returns the total capacity in bytes: `N` while inline, `N` plus
  /// the spill buffer's capacity once spilled.
  pub fn capacity(&self) -> usize {
    match &self.storage {
      Storage::Inline => N,
      Storage::Spilled(heap) => N + heap.capacity(),
    }
  }

  /// Appends a single byte, routing it to the correct store.
  ///
  /// While the length is below `N` the byte is written inline. The
  /// append that would make the length `N + 1` is the overflow
  /// transition: it creates the spill buffer, seeded with this byte.
  /// Every later append delegates to the existing spill buffer. The
  /// transition fires exactly once, at the boundary.
  ///
  /// On error the container is unchanged: the length has not been
  /// incremented and no partial byte appears.
  pub fn push(&mut self, byte: u8) -> Result<(), SmallStrError> {
    match &mut self.storage {
      Storage::Inline if self.len < N => {
        self.buf[self.len] = byte;
        self.len += 1;
      }
      Storage::Inline => {
        debug_assert_eq!(self.len, N);
        let heap = HeapBuf::with_byte(byte)?;
        self.storage = Storage::Spilled(heap);
        self.len += 1;
      }
      Storage::Spilled(heap) => {
        heap.push(byte)?;
        self.len += 1;
      }
    }
    Ok(())
  }

  /// Appends every byte of `bytes` in order.
  pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), SmallStrError> {
    for byte in bytes.iter().copied() {
      self.push(byte)?;
    }
    Ok(())
  }

  /// Returns the byte at logical position `index`, or
  /// [`SmallStrError::OutOfRange`] when `index >= len()`.
  pub fn get(&self, index: usize) -> Result<u8, SmallStrError> {
    if index >= self.len {
      return Err(SmallStrError::OutOfRange {
        index,
        len: self.len,
      });
    }
    if index < N {
      return Ok(self.buf[index]);
    }
    match &self.storage {
      Storage::Spilled(heap) => Ok(heap.as_slice()[index - N]),
      Storage::Inline => {
        unreachable!("length {} exceeds inline capacity with no spill", self.len)
      }
    }
  }

  /// Returns an iterator over the bytes of the sequence, in logical
  /// order, spanning both stores.
  pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
    let head = &self.buf[..self.len.min(N)];
    let tail: &[u8] = match &self.storage {
      Storage::Spilled(heap) => heap.as_slice(),
      Storage::Inline => &[],
    };
    head.iter().copied().chain(tail.iter().copied())
  }

  /// Empties the container, releasing the spill buffer if one exists.
  /// Safe to call on an already-empty container.
  pub fn clear(&mut self) {
    self.storage = Storage::Inline;
    self.len = 0;
  }

  /// Moves the contents out, leaving `self` empty.
  ///
  /// The returned container receives the length, a verbatim copy of
  /// the inline array, and ownership of the spill buffer by handle
  /// transfer; no byte of spilled data is copied. `self` is left with
  /// length 0 and no spill buffer, and can be reused immediately.
  /// Never allocates and never fails.
  pub fn take(&mut self) -> Self {
    Self {
      len:     mem::replace(&mut self.len, 0),
      buf:     self.buf,
      storage: mem::replace(&mut self.storage, Storage::Inline),
    }
  }

  /// Fallible deep copy: rebuilds the sequence through the normal
  /// append routing, so the copy's spill buffer (if any) is a fresh
  /// exclusive allocation, never shared with `self`.
  pub fn try_clone(&self) -> Result<Self, SmallStrError> {
    let mut copy = Self::new();
    for byte in self.bytes() {
      copy.push(byte)?;
    }
    Ok(copy)
  }

  /// Consumes the container and collects its bytes into a `Vec<u8>`.
  pub fn into_vec(self) -> Vec<u8> {
    self.bytes().collect()
  }
}

impl<const N: usize> Default for SmallStr<N> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl<const N: usize> Clone for SmallStr<N> {
  fn clone(&self) -> Self {
    self
      .try_clone()
      .expect("allocation failed while cloning a SmallStr")
  }

  fn clone_from(&mut self, source: &Self) {
    self.clear();
    for byte in source.bytes() {
      self
        .push(byte)
        .expect("allocation failed while cloning a SmallStr");
    }
  }
}

impl<const N: usize> fmt::Debug for SmallStr<N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "SmallStr<{N}> b\"")?;
    for byte in self.bytes() {
      write!(f, "{}", byte.escape_ascii())?;
    }
    f.write_str("\"")
  }
}

impl<const N: usize> FromStr for SmallStr<N> {
  type Err = SmallStrError;

  #[inline]
  fn from_str(s: &str) -> Result<Self, SmallStrError> {
    Self::from_bytes(s.as_bytes())
  }
}

impl<const N: usize> TryFrom<&[u8]> for SmallStr<N> {
  type Error = SmallStrError;

  #[inline]
  fn try_from(bytes: &[u8]) -> Result<Self, SmallStrError> {
    Self::from_bytes(bytes)
  }
}

impl<const N: usize> TryFrom<&str> for SmallStr<N> {
  type Error = SmallStrError;

  #[inline]
  fn try_from(s: &str) -> Result<Self, SmallStrError> {
    Self::from_bytes(s.as_bytes())
  }
}

impl<const N: usize> From<SmallStr<N>> for Vec<u8> {
  #[inline]
  fn from(s: SmallStr<N>) -> Self {
    s.into_vec()
  }
}

impl<const N: usize> Index<usize> for SmallStr<N> {
  type Output = u8;

  fn index(&self, index: usize) -> &u8 {
    assert!(index < self.len, "index out of bounds");
    if index < N {
      &self.buf[index]
    } else {
      match &self.storage {
        Storage::Spilled(heap) => &heap.as_slice()[index - N],
        Storage::Inline => {
          unreachable!("length {} exceeds inline capacity with no spill", self.len)
        }
      }
    }
  }
}

/// Concatenation. Takes the left operand by value and appends every
/// byte of the right operand through the normal routing.
impl<const N: usize> Add<&SmallStr<N>> for SmallStr<N> {
  type Output = SmallStr<N>;

  fn add(mut self, rhs: &SmallStr<N>) -> SmallStr<N> {
    for byte in rhs.bytes() {
      self
        .push(byte)
        .expect("allocation failed while concatenating SmallStrs");
    }
    self
  }
}

impl<const N: usize> PartialEq for SmallStr<N> {
  fn eq(&self, other: &Self) -> bool {
    self.len == other.len && self.bytes().eq(other.bytes())
  }
}

impl<const N: usize> Eq for SmallStr<N> {}

impl<const N: usize> PartialEq<[u8]> for SmallStr<N> {
  fn eq(&self, other: &[u8]) -> bool {
    self.len == other.len() && self.bytes().eq(other.iter().copied())
  }
}

impl<const N: usize> PartialEq<&[u8]> for SmallStr<N> {
  #[inline]
  fn eq(&self, other: &&[u8]) -> bool {
    *self == **other
  }
}

impl<const N: usize> PartialEq<str> for SmallStr<N> {
  #[inline]
  fn eq(&self, other: &str) -> bool {
    *self == *other.as_bytes()
  }
}

impl<const N: usize> PartialEq<&str> for SmallStr<N> {
  #[inline]
  fn eq(&self, other: &&str) -> bool {
    *self == *other.as_bytes()
  }
}

impl<const N: usize> PartialEq<SmallStr<N>> for str {
  #[inline]
  fn eq(&self, other: &SmallStr<N>) -> bool {
    *other == *self
  }
}

impl<const N: usize> PartialEq<SmallStr<N>> for &str {
  #[inline]
  fn eq(&self, other: &SmallStr<N>) -> bool {
    *other == **self
  }
}

impl<const N: usize> PartialOrd for SmallStr<N> {
  #[inline]
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<const N: usize> Ord for SmallStr<N> {
  fn cmp(&self, other: &Self) -> Ordering {
    self.bytes().cmp(other.bytes())
  }
}

impl<const N: usize> Hash for SmallStr<N> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.len.hash(state);
    for byte in self.bytes() {
      byte.hash(state);
    }
  }
}

#[cfg(feature = "serde")]
mod serde_impl {
  use super::*;

  impl<const N: usize> serde::Serialize for SmallStr<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
      S: serde::Serializer,
    {
      use serde::ser::SerializeSeq;
      let mut seq = serializer.serialize_seq(Some(self.len()))?;
      for byte in self.bytes() {
        seq.serialize_element(&byte)?;
      }
      seq.end()
    }
  }

  impl<'de, const N: usize> serde::Deserialize<'de> for SmallStr<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
      D: serde::Deserializer<'de>,
    {
      use serde::de::SeqAccess;
      use serde::de::Visitor;
      struct SmallStrVisitor<const N: usize>;
      impl<'de, const N: usize> Visitor<'de> for SmallStrVisitor<N> {
        type Value = SmallStr<N>;
        fn expecting(
          &self,
          formatter: &mut core::fmt::Formatter,
        ) -> core::fmt::Result {
          formatter.write_str("a sequence of bytes")
        }
        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
          A: SeqAccess<'de>,
        {
          let mut s = SmallStr::new();
          while let Some(byte) = seq.next_element::<u8>()? {
            s.push(byte).map_err(serde::de::Error::custom)?;
          }
          Ok(s)
        }
        fn visit_bytes<E>(self, bytes: &[u8]) -> Result<Self::Value, E>
        where
          E: serde::de::Error,
        {
          SmallStr::from_bytes(bytes).map_err(serde::de::Error::custom)
        }
      }
      deserializer.deserialize_seq(SmallStrVisitor::<N>)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_is_empty_and_inline() {
    let s: SmallStr<22> = SmallStr::new();
    assert!(s.is_empty());
    assert_eq!(s.len(), 0);
    assert!(s.is_inline());
    assert_eq!(s.capacity(), 22);
  }

  #[test]
  fn boundary_byte_stays_inline() {
    let s: SmallStr<22> =
      SmallStr::from_bytes(b"0123456789abcdefghijkl").unwrap();
    assert_eq!(s.len(), 22);
    assert!(s.is_inline());
  }

  #[test]
  fn byte_past_boundary_spills_once() {
    let mut s: SmallStr<22> =
      SmallStr::from_bytes(b"0123456789abcdefghijkl").unwrap();
    s.push(b'm').unwrap();
    assert_eq!(s.len(), 23);
    assert!(s.is_spilled());
    assert_eq!(s, "0123456789abcdefghijklm");
    // capacity reflects exactly one spill buffer at its initial size
    assert_eq!(s.capacity(), 22 + crate::heap_buf::HEAP_INITIAL_CAP);
  }

  #[test]
  fn round_trip_inline() {
    let src = b"small";
    let s: SmallStr<22> = SmallStr::from_bytes(src).unwrap();
    for (i, expected) in src.iter().enumerate() {
      assert_eq!(s.get(i).unwrap(), *expected);
    }
  }

  #[test]
  fn round_trip_across_boundary() {
    let src = b"abcdefghijklmnopqrstuvwxyz";
    let s: SmallStr<22> = SmallStr::from_bytes(src).unwrap();
    assert_eq!(s.len(), 26);
    assert!(s.is_spilled());
    for (i, expected) in src.iter().enumerate() {
      assert_eq!(s.get(i).unwrap(), *expected);
    }
    assert_eq!(s.get(25).unwrap(), b'z');
  }

  #[test]
  fn ten_thousand_pushes() {
    let mut s: SmallStr<22> = SmallStr::new();
    for i in 0..10_000usize {
      s.push((i % 251) as u8).unwrap();
    }
    assert_eq!(s.len(), 10_000);
    for i in 0..10_000usize {
      assert_eq!(s.get(i).unwrap(), (i % 251) as u8);
    }
  }

  #[test]
  fn get_out_of_range() {
    let empty: SmallStr<22> = SmallStr::new();
    assert_eq!(
      empty.get(0),
      Err(SmallStrError::OutOfRange { index: 0, len: 0 })
    );

    let s: SmallStr<22> = SmallStr::from_bytes(b"abc").unwrap();
    assert_eq!(
      s.get(3),
      Err(SmallStrError::OutOfRange { index: 3, len: 3 })
    );
    assert_eq!(
      s.get(100),
      Err(SmallStrError::OutOfRange { index: 100, len: 3 })
    );
  }

  #[test]
  fn index_operator() {
    let s: SmallStr<4> = SmallStr::from_bytes(b"abcdef").unwrap();
    assert_eq!(s[0], b'a');
    assert_eq!(s[3], b'd');
    assert_eq!(s[5], b'f');
  }

  #[test]
  #[should_panic(expected = "index out of bounds")]
  fn index_out_of_bounds_panics() {
    let s: SmallStr<4> = SmallStr::from_bytes(b"ab").unwrap();
    let _ = s[2];
  }

  #[test]
  fn clone_is_independent() {
    let a: SmallStr<4> = SmallStr::from_bytes(b"abcdef").unwrap();
    assert!(a.is_spilled());
    let mut b = a.clone();
    assert_eq!(a, b);

    b.push_bytes(b"gh").unwrap();
    assert_eq!(a, "abcdef");
    assert_eq!(b, "abcdefgh");

    let mut a = a;
    a.push(b'!').unwrap();
    assert_eq!(a, "abcdef!");
    assert_eq!(b, "abcdefgh");
  }

  #[test]
  fn clone_from_replaces_contents() {
    let src: SmallStr<4> = SmallStr::from_bytes(b"abcdef").unwrap();
    let mut dst: SmallStr<4> = SmallStr::from_bytes(b"old contents").unwrap();
    dst.clone_from(&src);
    assert_eq!(dst, src);

    // the rebuilt spill buffer is not shared with the source
    dst.push(b'g').unwrap();
    assert_eq!(src, "abcdef");
  }

  #[test]
  fn take_transfers_spilled_contents() {
    let mut a: SmallStr<4> = SmallStr::from_bytes(b"abcdefgh").unwrap();
    assert!(a.is_spilled());
    let b = a.take();

    assert_eq!(b, "abcdefgh");
    assert!(b.is_spilled());

    assert_eq!(a.len(), 0);
    assert!(a.is_empty());
    assert!(a.is_inline());

    // moved-from container is reusable
    a.push_bytes(b"fresh").unwrap();
    assert_eq!(a, "fresh");
    assert_eq!(b, "abcdefgh");
  }

  #[test]
  fn take_of_inline_contents() {
    let mut a: SmallStr<8> = SmallStr::from_bytes(b"tiny").unwrap();
    let b = a.take();
    assert_eq!(b, "tiny");
    assert!(a.is_empty());
    assert!(a.is_inline());
  }

  #[test]
  fn clear_releases_spill() {
    let mut s: SmallStr<4> = SmallStr::from_bytes(b"abcdef").unwrap();
    assert!(s.is_spilled());
    s.clear();
    assert!(s.is_empty());
    assert!(s.is_inline());
    assert_eq!(s.capacity(), 4);

    // safe on an already-empty container
    s.clear();
    assert!(s.is_empty());

    s.push_bytes(b"again").unwrap();
    assert_eq!(s, "again");
  }

  #[test]
  fn concatenation_and_equality() {
    let hello: SmallStr<22> = "Hello, ".parse().unwrap();
    let world: SmallStr<22> = "world!".parse().unwrap();
    let both = hello.clone() + &world;

    let expected: SmallStr<22> = "Hello, world!".parse().unwrap();
    assert_eq!(both, expected);
    assert_eq!(both, "Hello, world!");
    assert_eq!("Hello, world!", both);
    assert_eq!(both.len(), hello.len() + world.len());

    let twice = both.clone() + &world;
    assert_eq!(twice, "Hello, world!world!");
    assert_ne!(twice, expected);
  }

  #[test]
  fn concatenation_across_boundary() {
    let left: SmallStr<22> = "small".parse().unwrap();
    let right: SmallStr<22> = "abcdefghijklmnopqrstuvwxyz".parse().unwrap();
    let joined = left + &right;
    assert_eq!(joined.len(), 31);
    assert_eq!(joined, "smallabcdefghijklmnopqrstuvwxyz");
  }

  #[test]
  fn zero_inline_capacity_spills_immediately() {
    let mut s: SmallStr<0> = SmallStr::new();
    assert!(s.is_inline());
    s.push(b'a').unwrap();
    assert!(s.is_spilled());
    assert_eq!(s.len(), 1);
    assert_eq!(s.get(0).unwrap(), b'a');
  }

  #[test]
  fn ordering_and_hash() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let a: SmallStr<4> = SmallStr::from_bytes(b"apple").unwrap();
    let b: SmallStr<4> = SmallStr::from_bytes(b"banana").unwrap();
    assert!(a < b);

    let mut h1 = DefaultHasher::new();
    a.hash(&mut h1);
    let mut h2 = DefaultHasher::new();
    a.clone().hash(&mut h2);
    assert_eq!(h1.finish(), h2.finish());
  }

  #[test]
  fn debug_escapes_bytes() {
    let s: SmallStr<8> = SmallStr::from_bytes(b"a\nb").unwrap();
    assert_eq!(format!("{s:?}"), "SmallStr<8> b\"a\\nb\"");
  }

  #[test]
  fn error_display_and_source() {
    let err = SmallStrError::OutOfRange { index: 7, len: 3 };
    assert_eq!(err.to_string(), "index 7 out of range for length 3");
    assert!(err.source().is_none());

    let err = SmallStrError::from(HeapError::InvalidCapacity(0));
    assert_eq!(
      err.to_string(),
      "invalid spill buffer capacity 0; must be at least 1"
    );
    assert!(err.source().is_some());
  }

  #[test]
  fn into_vec_collects_both_stores() {
    let s: SmallStr<4> = SmallStr::from_bytes(b"abcdef").unwrap();
    let v: Vec<u8> = s.into_vec();
    assert_eq!(v, b"abcdef");
  }

  #[cfg(feature = "serde")]
  mod serde_tests {
    use super::*;
    use serde_json;

    #[test]
    fn serialize_and_deserialize_bytes() {
      let s: SmallStr<4> = SmallStr::from_bytes(b"abcdef").unwrap();
      let json = serde_json::to_string(&s).unwrap();
      assert_eq!(json, "[97,98,99,100,101,102]");
      let de: SmallStr<4> = serde_json::from_str(&json).unwrap();
      assert_eq!(de, s);
      assert!(de.is_spilled());
    }
  }
}
