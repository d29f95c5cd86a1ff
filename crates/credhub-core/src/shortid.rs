//! Collision-resistant short subject identifiers.
//!
//! Identifiers are the join key between the credential service, the abuse
//! tracker, and the lifecycle scheduler, so their collision properties are
//! a correctness invariant. For length `L` and `N` issued identifiers the
//! collision probability is bounded by `N² / (2·62^L)` (birthday bound).
//! Uniqueness is statistical, not guaranteed: registration must check
//! ledger presence before accepting a generated identifier.

use rand::Rng;

use crate::error::AppError;
use crate::result::AppResult;

/// 62-symbol alphanumeric alphabet.
const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Minimum supported identifier length.
pub const MIN_LENGTH: usize = 7;
/// Maximum supported identifier length.
pub const MAX_LENGTH: usize = 10;

/// Generates a short identifier of the given length.
///
/// Each output character is selected by reducing one byte from a
/// cryptographically secure random source modulo the alphabet size. No
/// global state, no retries, no uniqueness check.
pub fn generate(length: usize) -> AppResult<String> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(AppError::validation(format!(
            "Identifier length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {length}"
        )));
    }

    let mut rng = rand::rng();
    let id = (0..length)
        .map(|_| {
            let byte: u8 = rng.random();
            ALPHABET[(byte % ALPHABET.len() as u8) as usize] as char
        })
        .collect();

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_requested_length() {
        for len in MIN_LENGTH..=MAX_LENGTH {
            assert_eq!(generate(len).unwrap().len(), len);
        }
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        assert!(generate(6).is_err());
        assert!(generate(11).is_err());
        assert!(generate(0).is_err());
    }

    #[test]
    fn output_is_alphanumeric() {
        let id = generate(10).unwrap();
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    // Birthday bound for 10k ids of length 10 is ~6e-11, so a single
    // collision here indicates a broken random source.
    #[test]
    fn ten_thousand_ids_do_not_collide() {
        let mut seen = HashSet::new();
        let mut collisions = 0u32;
        for _ in 0..10_000 {
            if !seen.insert(generate(10).unwrap()) {
                collisions += 1;
            }
        }
        assert!(collisions < 1, "unexpected collisions: {collisions}");
    }

    #[test]
    fn successive_ids_differ() {
        let a = generate(10).unwrap();
        let b = generate(10).unwrap();
        assert_ne!(a, b);
    }
}
