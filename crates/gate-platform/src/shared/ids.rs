//! Entity Id Generation
//!
//! Time-ordered identifiers encoded as Crockford Base32 strings.
//! Lexicographic order follows creation order, which keeps `_id` scans
//! in MongoDB roughly chronological.

use rand::Rng;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Crockford Base32 alphabet (excludes I, L, O, U)
const ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

static SEQUENCE: AtomicU16 = AtomicU16::new(0);

/// Generates unique, time-sorted entity ids.
pub struct IdGenerator;

impl IdGenerator {
    /// Generate a new id as a 13-character Crockford Base32 string.
    ///
    /// Layout (64 bits): 42-bit millisecond timestamp, 6 random bits,
    /// 16-bit rolling sequence. The sequence guarantees uniqueness for
    /// up to 65536 ids within the same millisecond.
    pub fn generate() -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_millis() as u64;

        let sequence = SEQUENCE.fetch_add(1, Ordering::SeqCst) as u64;
        let noise = rand::thread_rng().gen_range(0..64u64);

        let id = ((millis & 0x3FF_FFFF_FFFF) << 22) | (noise << 16) | sequence;

        encode_base32(id)
    }
}

fn encode_base32(mut value: u64) -> String {
    let mut out = [b'0'; 13];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value & 0x1F) as usize];
        value >>= 5;
    }
    String::from_utf8(out.to_vec()).expect("alphabet is ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_length() {
        assert_eq!(IdGenerator::generate().len(), 13);
    }

    #[test]
    fn test_uniqueness() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(IdGenerator::generate()), "duplicate id generated");
        }
    }

    #[test]
    fn test_time_ordering() {
        let first = IdGenerator::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = IdGenerator::generate();
        assert!(first < second, "ids should sort by creation time");
    }
}
