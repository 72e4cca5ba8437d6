//! Decoding of flat big-endian memory images produced by external loaders.

use thiserror::Error;

use crate::memory::ADDRESS_SPACE_WORDS;

/// Exact byte length of a full code/data image.
pub const CODE_IMAGE_BYTES: usize = ADDRESS_SPACE_WORDS * 2;
/// Number of words in a character-tile map image.
pub const CHARMAP_IMAGE_WORDS: usize = 512;
/// Exact byte length of a character-tile map image.
pub const CHARMAP_IMAGE_BYTES: usize = CHARMAP_IMAGE_WORDS * 2;

/// Rejections for malformed memory images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ImageError {
    /// Byte buffer cannot be split into whole 16-bit words.
    #[error("image length {0} is not a multiple of 2")]
    OddLength(usize),
    /// Byte buffer does not have the exact size the target region requires.
    #[error("image is {actual} bytes, expected exactly {expected}")]
    WrongLength {
        /// Required byte length.
        expected: usize,
        /// Byte length supplied.
        actual: usize,
    },
}

/// Splits a byte buffer into big-endian 16-bit words.
///
/// # Errors
///
/// Returns [`ImageError::OddLength`] when `bytes` has an odd length.
pub fn words_from_be_bytes(bytes: &[u8]) -> Result<Vec<u16>, ImageError> {
    if bytes.len() % 2 != 0 {
        return Err(ImageError::OddLength(bytes.len()));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

fn decode_exact(bytes: &[u8], expected: usize) -> Result<Box<[u16]>, ImageError> {
    if bytes.len() != expected {
        return Err(ImageError::WrongLength {
            expected,
            actual: bytes.len(),
        });
    }
    words_from_be_bytes(bytes).map(Vec::into_boxed_slice)
}

/// Decodes a full code/data image (exactly 65536 bytes, 32768 words).
///
/// # Errors
///
/// Returns [`ImageError::WrongLength`] for any other size.
pub fn decode_code_image(bytes: &[u8]) -> Result<Box<[u16]>, ImageError> {
    decode_exact(bytes, CODE_IMAGE_BYTES)
}

/// Decodes a character-tile map image (exactly 1024 bytes, 512 words).
///
/// The map is consumed by an external renderer; the core only validates and
/// splits it.
///
/// # Errors
///
/// Returns [`ImageError::WrongLength`] for any other size.
pub fn decode_charmap_image(bytes: &[u8]) -> Result<Box<[u16]>, ImageError> {
    decode_exact(bytes, CHARMAP_IMAGE_BYTES)
}
