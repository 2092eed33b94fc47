//! # small-str
//!
//! ### Small-buffer-optimized byte strings
//!
//! This crate provides [`SmallStr`], a byte-string container applying
//! the small-buffer optimization: sequences of up to `N` bytes are
//! stored directly inside the value with no heap allocation, and longer
//! sequences transparently spill their tail into a [`HeapBuf`], an
//! exclusively owned heap buffer that grows by doubling.
//!
//! ---
//!
//! ## [`SmallStr`]
//!
//! The container itself. The first `N` bytes of the sequence always
//! live in the inline array; bytes past position `N` live in the spill
//! buffer, which is created lazily on the first overflowing append.
//!
//! ### Example
//!
//! ```rust
//! use small_str::SmallStr;
//!
//! # fn main() -> Result<(), small_str::SmallStrError> {
//! let mut s: SmallStr<22> = "0123456789abcdefghijkl".parse()?;
//! assert!(s.is_inline()); // 22 bytes fit exactly
//!
//! s.push(b'm')?; // the 23rd byte spills to the heap
//! assert!(!s.is_inline());
//! assert_eq!(s.len(), 23);
//! assert_eq!(s.get(22)?, b'm');
//! # Ok(())
//! # }
//! ```
//!
//! ## [`HeapBuf`]
//!
//! The low-level spill buffer: an exclusively owned byte allocation
//! with an explicit doubling growth policy. Growth is staged: the
//! replacement buffer is allocated and populated before it is swapped
//! in, so a failed allocation leaves the buffer fully intact.
//!
//! ---
//!
//! ## Ownership
//!
//! A container exclusively owns its spill buffer. Cloning performs a
//! deep, byte-wise reconstruction through the normal append routing
//! (two containers never share an allocation), while
//! [`SmallStr::take`] transfers the buffer by handle, leaving the
//! source empty and reusable.
//!
//! ## `no_std` Support
//!
//! The crate is `no_std` by default (it requires `alloc`), making it
//! suitable for embedded and other resource-constrained environments.
//!
//! ---
//!
//! ## Features
//!
//! - `std`: Enables integration with the Rust standard library. When
//!   disabled, which is the default, the crate operates in `no_std`
//!   mode.
//! - `serde`†: Enables serialization and deserialization support via
//!   Serde; a `SmallStr` serializes as a sequence of bytes.
//!
//! > † enabled by default

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;
extern crate core;

pub mod heap_buf;
pub mod small_str;

pub use heap_buf::HeapBuf;
pub use heap_buf::HeapError;
pub use small_str::SmallStr;
pub use small_str::SmallStrError;
