//! Friend code derivation.
//!
//! A friend code is the 32-bit principal id with a 7-bit checksum stored in bits 32-38. The
//! checksum is the top seven bits of the first (big-endian) word of the SHA-1 digest of the
//! principal id's little-endian bytes.
//!
//! Local friend codes exchanged between consoles are additionally scrambled with a 16-bit xor
//! key; see [`unscramble_local_friend_code`].
//!
//! Going back from a friend code to a principal id is a plain truncation; the checksum is not
//! verified on that path. Use [`is_valid_friend_code`] when the caller needs that guarantee.

use sha1::{Digest, Sha1};

/// Shift applied to the first digest word to obtain the checksum.
const CHECKSUM_SHIFT: u32 = 25;

/// Computes the 7-bit checksum for a principal id.
pub fn friend_code_checksum(principal_id: u32) -> u8 {
    let digest = Sha1::digest(principal_id.to_le_bytes());
    let first_word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (first_word >> CHECKSUM_SHIFT) as u8
}

/// Derives the 64-bit friend code for a principal id.
pub fn principal_id_to_friend_code(principal_id: u32) -> u64 {
    u64::from(principal_id) | (u64::from(friend_code_checksum(principal_id)) << 32)
}

/// Extracts the principal id from a friend code.
#[inline]
pub const fn friend_code_to_principal_id(friend_code: u64) -> u32 {
    friend_code as u32
}

/// Returns true if the checksum bits of `friend_code` match its principal id.
pub fn is_valid_friend_code(friend_code: u64) -> bool {
    principal_id_to_friend_code(friend_code_to_principal_id(friend_code)) == friend_code
}

/// Size of a scrambled local friend code in bytes.
pub const SCRAMBLED_LOCAL_FRIEND_CODE_SIZE: usize = 12;

/// Recovers a local friend code from its scrambled form.
///
/// The scrambled form is six little-endian `u16` words; the first four, each xored with the
/// last, are the little-endian words of the plain code. Word 4 is not used.
pub fn unscramble_local_friend_code(scrambled: &[u8; SCRAMBLED_LOCAL_FRIEND_CODE_SIZE]) -> u64 {
    let word = |i: usize| u16::from_le_bytes([scrambled[i * 2], scrambled[i * 2 + 1]]);
    let key = word(5);
    (0..4).fold(0u64, |code, i| code | (u64::from(word(i) ^ key) << (i * 16)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors() {
        assert_eq!(principal_id_to_friend_code(1), 0x1E_0000_0001);
        assert_eq!(principal_id_to_friend_code(0x1234_5678), 0x60_1234_5678);
        assert_eq!(principal_id_to_friend_code(1_234_567_890), 0x01_4996_02D2);
        assert_eq!(principal_id_to_friend_code(0), 0x48_0000_0000);
    }

    #[test]
    fn test_principal_id_survives_round_trip() {
        for pid in [0u32, 1, 0x7FFF_FFFF, 0x8000_0000, u32::MAX, 1_700_000_000] {
            let code = principal_id_to_friend_code(pid);
            assert_eq!(friend_code_to_principal_id(code), pid);
            assert_eq!(friend_code_to_principal_id(code & 0xFFFF_FFFF), pid);
        }
    }

    #[test]
    fn test_checksum_is_seven_bits() {
        for pid in 0..512u32 {
            assert!(friend_code_checksum(pid) < 0x80);
        }
    }

    #[test]
    fn test_unscramble_local_friend_code() {
        let plain = 0x0123_4567_89AB_CDEFu64;
        let key = 0x5A5Au16;
        let mut scrambled = [0u8; 12];
        for i in 0..4 {
            let word = ((plain >> (i * 16)) as u16) ^ key;
            scrambled[i * 2..i * 2 + 2].copy_from_slice(&word.to_le_bytes());
        }
        scrambled[10..12].copy_from_slice(&key.to_le_bytes());

        assert_eq!(unscramble_local_friend_code(&scrambled), plain);
        assert_eq!(unscramble_local_friend_code(&[0; 12]), 0);
    }

    #[test]
    fn test_validity_check() {
        let code = principal_id_to_friend_code(0x1234_5678);
        assert!(is_valid_friend_code(code));
        assert!(!is_valid_friend_code(code ^ (1 << 32)));
        assert!(!is_valid_friend_code(0x1234_5678));
    }
}
