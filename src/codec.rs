use rand::{thread_rng, RngCore};
use sha2::{Digest, Sha256};

/// Number of random bytes in a key; the 16th byte is the checksum.
const RANDOM_BYTES: usize = 15;

/// Length of a normalized key in hex characters (16 bytes).
const KEY_HEX_LEN: usize = 32;

/// Codec for the fixed key format.
///
/// A key is 16 bytes rendered as 32 hex characters, hyphen-grouped as
/// `AAAAAAAA-BBBBBBBB-CCCCCCCC-DDDDDDCC`. The first 15 bytes come from a
/// cryptographically secure RNG; the last byte is the first byte of the
/// SHA-256 digest over the lowercase hex encoding of the random portion.
/// The checksum is a format-integrity check, not a MAC.
#[derive(Debug, Clone, Copy)]
pub struct KeyCodec {
    uppercase: bool,
}

impl KeyCodec {
    /// Create a codec with the given case policy for generated keys.
    pub fn new(uppercase: bool) -> Self {
        Self { uppercase }
    }

    /// Generate a fresh key.
    ///
    /// Every key returned by this method passes [`validate`].
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; RANDOM_BYTES];
        thread_rng().fill_bytes(&mut bytes);

        let body = hex::encode(bytes);
        let raw = format!("{body}{:02x}", checksum_byte(&body));

        let formatted = format!(
            "{}-{}-{}-{}",
            &raw[0..8],
            &raw[8..16],
            &raw[16..24],
            &raw[24..32]
        );

        if self.uppercase {
            formatted.to_uppercase()
        } else {
            formatted
        }
    }
}

/// Check whether a presented string is a well-formed key.
///
/// Strips hyphens, normalizes case, requires exactly 32 hex characters, then
/// recomputes the checksum over the first 30 characters and compares it to
/// the final byte. Pure predicate: malformed input returns `false`, it never
/// panics or errors for control flow.
pub fn validate(presented: &str) -> bool {
    let normalized: String = presented
        .chars()
        .filter(|c| *c != '-')
        .collect::<String>()
        .to_lowercase();

    if normalized.len() != KEY_HEX_LEN {
        return false;
    }

    if !normalized.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let (body, check) = normalized.split_at(KEY_HEX_LEN - 2);
    match u8::from_str_radix(check, 16) {
        Ok(expected) => checksum_byte(body) == expected,
        Err(_) => false,
    }
}

/// First byte of the SHA-256 digest over the hex-encoded random portion.
fn checksum_byte(body_hex: &str) -> u8 {
    Sha256::digest(body_hex.as_bytes())[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_validate() {
        for codec in [KeyCodec::new(false), KeyCodec::new(true)] {
            for _ in 0..1000 {
                let key = codec.generate();
                assert!(validate(&key), "generated key failed validation: {key}");
            }
        }
    }

    #[test]
    fn generated_keys_are_hyphen_grouped() {
        let key = KeyCodec::new(true).generate();
        let groups: Vec<&str> = key.split('-').collect();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].len(), 8);
        assert_eq!(groups[1].len(), 8);
        assert_eq!(groups[2].len(), 8);
        assert_eq!(groups[3].len(), 8);
    }

    #[test]
    fn validation_is_case_insensitive() {
        let key = KeyCodec::new(false).generate();
        assert!(validate(&key));
        assert!(validate(&key.to_uppercase()));
        assert!(validate(&key.to_lowercase()));
    }

    #[test]
    fn small_checksum_bytes_are_zero_padded() {
        // Roughly 1 in 16 keys has a checksum byte below 0x10; without
        // zero-padding those keys would be 31 characters and fail validation.
        let codec = KeyCodec::new(false);
        let mut found = false;
        for _ in 0..10_000 {
            let key = codec.generate();
            if key[key.len() - 2..].starts_with('0') {
                found = true;
                assert!(validate(&key));
            }
        }
        assert!(found, "no key with a small checksum byte in 10k draws");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!validate(""));
        assert!(!validate("abc123"));
        assert!(!validate(&"a".repeat(31)));
        assert!(!validate(&"a".repeat(33)));
    }

    #[test]
    fn rejects_non_hex_characters() {
        assert!(!validate(&"g".repeat(32)));
        assert!(!validate("zzzzzzzz-zzzzzzzz-zzzzzzzz-zzzzzzzz"));
        assert!(!validate(&format!("{} ", "a".repeat(31))));
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let key = KeyCodec::new(false).generate();
        let normalized: String = key.chars().filter(|c| *c != '-').collect();
        let (body, check) = normalized.split_at(30);
        let flipped = u8::from_str_radix(check, 16).unwrap() ^ 0xff;
        assert!(!validate(&format!("{body}{flipped:02x}")));
    }

    #[test]
    fn single_character_corruption_is_caught() {
        use rand::Rng;

        const TRIALS: usize = 10_000;
        const HEX: &[u8] = b"0123456789abcdef";

        let key = KeyCodec::new(false).generate();
        let normalized: String = key.chars().filter(|c| *c != '-').collect();

        let mut rng = thread_rng();
        let mut accepted = 0usize;
        for _ in 0..TRIALS {
            let pos = rng.gen_range(0..normalized.len());
            let mut bytes = normalized.clone().into_bytes();
            let replacement = loop {
                let candidate = HEX[rng.gen_range(0..HEX.len())];
                if candidate != bytes[pos] {
                    break candidate;
                }
            };
            bytes[pos] = replacement;
            let corrupted = String::from_utf8(bytes).unwrap();
            if validate(&corrupted) {
                accepted += 1;
            }
        }

        // Expected false-acceptance rate is about 1/256 for body corruption
        // and zero for checksum corruption, ~0.4% overall. 2% leaves a wide
        // statistical margin over 10k trials.
        let rate = accepted as f64 / TRIALS as f64;
        assert!(rate < 0.02, "false-acceptance rate too high: {rate}");
    }
}
