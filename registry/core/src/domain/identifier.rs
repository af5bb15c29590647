// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent Identifier Generation
//!
//! Agent identifiers double as externally visible account handles, so they
//! are short and human readable: two Latin letters followed by five digits
//! in `1..=9` (`0` is never emitted). Randomness comes from the operating
//! system CSPRNG.
//!
//! Generators never check uniqueness. The agent service retries against the
//! repository until an unused identifier comes out.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Produce candidate agent identifiers

use rand::rngs::OsRng;
use rand::Rng;

use crate::domain::agent::AgentId;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"123456789";

const LETTER_COUNT: usize = 2;
const DIGIT_COUNT: usize = 5;

/// Total identifier length in characters.
pub const IDENTIFIER_LEN: usize = LETTER_COUNT + DIGIT_COUNT;

pub trait IdentifierGenerator: Send + Sync {
    fn generate(&self) -> AgentId;
}

/// Default generator backed by `OsRng`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureIdentifierGenerator;

impl SecureIdentifierGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierGenerator for SecureIdentifierGenerator {
    fn generate(&self) -> AgentId {
        let mut rng = OsRng;
        let mut id = String::with_capacity(IDENTIFIER_LEN);

        for _ in 0..LETTER_COUNT {
            id.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
        }
        for _ in 0..DIGIT_COUNT {
            id.push(DIGITS[rng.gen_range(0..DIGITS.len())] as char);
        }

        AgentId(id)
    }
}

/// Whether `candidate` has the shape of a generated identifier.
pub fn is_well_formed(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    bytes.len() == IDENTIFIER_LEN
        && bytes[..LETTER_COUNT].iter().all(u8::is_ascii_alphabetic)
        && bytes[LETTER_COUNT..].iter().all(|b| (b'1'..=b'9').contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_well_formed() {
        let generator = SecureIdentifierGenerator::new();
        for _ in 0..5_000 {
            let id = generator.generate();
            assert_eq!(id.as_str().len(), IDENTIFIER_LEN);
            assert!(is_well_formed(id.as_str()), "malformed id: {}", id);
            assert!(!id.as_str().contains('0'), "zero digit in id: {}", id);
        }
    }

    #[test]
    fn test_generator_covers_both_letter_cases() {
        let generator = SecureIdentifierGenerator::new();
        let mut seen_upper = false;
        let mut seen_lower = false;
        for _ in 0..2_000 {
            let id = generator.generate();
            let head = &id.as_str()[..LETTER_COUNT];
            seen_upper |= head.chars().any(|c| c.is_ascii_uppercase());
            seen_lower |= head.chars().any(|c| c.is_ascii_lowercase());
        }
        assert!(seen_upper && seen_lower);
    }

    #[test]
    fn test_generator_uses_every_digit_except_zero() {
        let generator = SecureIdentifierGenerator::new();
        let mut digits = HashSet::new();
        for _ in 0..2_000 {
            digits.extend(generator.generate().as_str()[LETTER_COUNT..].chars());
        }
        let expected: HashSet<char> = "123456789".chars().collect();
        assert_eq!(digits, expected);
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("Ab12345"));
        assert!(is_well_formed("zz99999"));
        assert!(!is_well_formed("Ab12340"));
        assert!(!is_well_formed("A112345"));
        assert!(!is_well_formed("Ab1234"));
        assert!(!is_well_formed("Ab123456"));
        assert!(!is_well_formed("Éb12345"));
    }
}
