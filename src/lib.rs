//! # Streaming LZW encoder for the `.Z` container
//!
//! This crate provides an [`Encoder`] that turns an unbounded byte stream into a `.Z` style
//! compressed stream: the two magic bytes `0x1f 0x9d`, one header byte and then a packed stream
//! of 9-bit codes, most significant bit first.
//!
//! The code space is fixed. Codes `0..=255` are the literal bytes, code `256` is reserved and
//! only ever used to pad the end of the stream to a full byte, codes `257..=511` refer to
//! learned dictionary entries. The dictionary is never cleared; once it is full the encoder
//! continues with the entries it has.
//!
//! Exemplary use of the encoder:
//!
//! ```
//! use zlzw::encode::Encoder;
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//! let mut compressed = vec![];
//!
//! let mut enc = Encoder::new();
//! let result = enc.into_stream(&mut compressed).encode_all(&data[..]);
//! result.status.unwrap();
//! assert_eq!(&compressed[..3], &[0x1f, 0x9d, 0x89]);
//! ```
//!
//! [`Encoder`]: encode/struct.Encoder.html
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(all(feature = "alloc", not(feature = "std")))]
extern crate alloc;
#[cfg(all(feature = "alloc", feature = "std"))]
use std as alloc;

/// The width of every code after the first one.
pub const CODE_SIZE: u8 = 9;
/// The number of codes in the code space, and the capacity of the dictionary.
pub const MAX_ENTRIES: usize = 1 << CODE_SIZE as usize;
/// The reserved code, used exclusively to pad the end of the stream.
pub const PAD_CODE: Code = 256;
/// The first code handed out to a learned dictionary entry.
pub const FIRST_LEARNED: Code = PAD_CODE + 1;
/// The magic bytes opening every container.
pub const MAGIC: [u8; 2] = [0x1f, 0x9d];
/// The header byte: block mode flag and the maximum code width.
pub const HEADER_FLAGS: u8 = 0x80 | CODE_SIZE;

/// Alias for a LZW code point
pub type Code = u16;

/// How the first code of a stream is framed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Every code, including the first, is packed with 9 bits.
    Uniform,
    /// The very first code is packed with 8 bits and all later ones with 9 bits.
    ///
    /// Only the 8-bit width of the first code follows the historic `lllzw` tool. Its output is
    /// not reproduced byte for byte since later codes come from exact dictionary matches.
    Legacy,
}

impl Default for Framing {
    fn default() -> Self {
        Framing::Uniform
    }
}

/// The result of a coding operation on a pair of buffer.
#[must_use = "Contains a status with potential error information"]
pub struct StreamResult {
    /// The number of bytes consumed from the input buffer.
    pub consumed_in: usize,
    /// The number of bytes written into the output buffer.
    pub consumed_out: usize,
    /// The status after returning from the write call.
    pub status: LzwStatus,
}

/// The result of a coding operation between a reader and a writer.
#[cfg(feature = "std")]
#[must_use = "Contains a status with potential error information"]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The possible error that occurred.
    ///
    /// Note that when writing into streams it is not in general possible to recover from an
    /// error.
    pub status: std::io::Result<()>,
}

/// The result of encoding into a vector.
#[cfg(feature = "alloc")]
#[must_use = "Contains a status with potential error information"]
pub struct VecResult {
    /// The number of bytes consumed from the input.
    pub consumed_in: usize,
    /// The number of bytes appended to the vector.
    pub consumed_out: usize,
    /// The status after encoding.
    pub status: LzwStatus,
}

/// The status after successful coding of an LZW stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwStatus {
    /// The input was consumed or the output buffer was filled.
    Ok,
    /// Neither input was consumed nor output produced.
    ///
    /// With the encoder this only happens when the output buffer has no room left at all.
    NoProgress,
    /// The stream was finished and all of it, padding included, has been written.
    Done,
}

#[cfg(feature = "alloc")]
pub mod dict;
#[cfg(feature = "alloc")]
pub mod encode;
pub mod pack;

#[cfg(feature = "alloc")]
pub use encode::{encode_to_vec, Encoder};
