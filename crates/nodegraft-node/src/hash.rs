//! Cheap string hashing for bucketing
//!
//! Not cryptographic and collision-prone.

/// Rolling 31-multiplier hash over UTF-16 code units
///
/// Arithmetic wraps at 32 bits (two's complement) and the absolute value
/// of the final signed result is returned.
#[must_use]
pub fn hash_code(s: &str) -> u32 {
    let hash = s
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
        });
    hash.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(hash_code(""), 0);
    }

    #[test]
    fn known_values() {
        assert_eq!(hash_code("a"), 97);
        assert_eq!(hash_code("ab"), 97 * 31 + 98);
        assert_eq!(hash_code("hello"), 99_162_322);
    }

    #[test]
    fn negative_results_are_folded() {
        // "polygenelubricants" hashes to i32::MIN
        assert_eq!(hash_code("polygenelubricants"), 2_147_483_648);
        // signed result is -670761447
        assert_eq!(hash_code("negative hash"), 670_761_447);
        assert_eq!(hash_code("hello world"), 1_794_106_052);
    }

    #[test]
    fn counts_utf16_units() {
        // U+1F600 is a surrogate pair: 0xD83D, 0xDE00
        let expected = (0xD83Di32 * 31 + 0xDE00) as u32;
        assert_eq!(hash_code("\u{1F600}"), expected);
    }

    #[test]
    fn deterministic() {
        assert_eq!(hash_code("bucket"), hash_code("bucket"));
    }
}
