//! Memory model primitives and fixed address-space policies.

/// Bounds policy for fetch, data, and stack accesses.
pub mod access;
/// Big-endian memory-image decoding.
pub mod image;

pub use access::{
    read_word, validate_data_address, validate_fetch_address, validate_pc_register,
    validate_pop_sp, validate_push_sp, validate_return_sp, validate_sp_register, write_word,
};
pub use image::{
    decode_charmap_image, decode_code_image, words_from_be_bytes, ImageError,
    CHARMAP_IMAGE_BYTES, CHARMAP_IMAGE_WORDS, CODE_IMAGE_BYTES,
};

/// Number of 16-bit words in the unified code/data/stack address space.
pub const ADDRESS_SPACE_WORDS: usize = 1 << 15;

/// Highest address of the space. It is a reserved sentinel: fetches and
/// data accesses at or beyond it fault.
pub const LAST_VALID_ADDRESS: u16 = 0x7FFF;

/// Allocates a canonical zeroed 32768-word address-space backing store.
#[must_use]
pub fn new_address_space() -> Box<[u16]> {
    vec![0; ADDRESS_SPACE_WORDS].into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::{new_address_space, ADDRESS_SPACE_WORDS, LAST_VALID_ADDRESS};

    #[test]
    fn canonical_backing_store_size_is_32k_words() {
        let memory = new_address_space();
        assert_eq!(memory.len(), ADDRESS_SPACE_WORDS);
        assert!(memory.iter().all(|word| *word == 0));
    }

    #[test]
    fn sentinel_is_the_last_word_of_the_space() {
        assert_eq!(usize::from(LAST_VALID_ADDRESS), ADDRESS_SPACE_WORDS - 1);
    }
}
