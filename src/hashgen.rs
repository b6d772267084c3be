/*
    This file is part of Donet.

    Copyright © 2024 Max Rodriguez

    Donet is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    Donet is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with Donet. If not, see <https://www.gnu.org/licenses/>.
*/

//! Deterministic 32-bit schema fingerprint generator.
//!
//! The accumulator and prime table are a stable, cross-language contract:
//! every implementation of this algorithm (Python, C++, Rust, ...) must
//! produce the same hash for the same DC schema, so the table is built
//! with a plain sieve of Eratosthenes rather than anything clever.

use crate::globals::{DCFileHash, HASH_GEN_SIEVE_UPPER_BOUND, MAX_PRIME_NUMBERS};
use std::sync::OnceLock;

fn prime_table() -> &'static [u32] {
    static TABLE: OnceLock<Vec<u32>> = OnceLock::new();
    TABLE.get_or_init(build_prime_table)
}

fn build_prime_table() -> Vec<u32> {
    let upper = HASH_GEN_SIEVE_UPPER_BOUND;
    let mut is_composite = vec![false; upper + 1];
    let mut primes = Vec::with_capacity(MAX_PRIME_NUMBERS);

    for n in 2..=upper {
        if is_composite[n] {
            continue;
        }
        primes.push(n as u32);
        if primes.len() == MAX_PRIME_NUMBERS {
            break;
        }

        let mut multiple = n * n;
        while multiple <= upper {
            is_composite[multiple] = true;
            multiple += n;
        }
    }

    debug_assert_eq!(primes.len(), MAX_PRIME_NUMBERS);
    primes
}

/// Accumulates a 32-bit fingerprint over a sequence of integers and
/// byte strings, used to hash the structure of a parsed DC schema.
#[derive(Debug, Clone, Copy)]
pub struct HashGenerator {
    index: usize,
    hash: u32,
}

impl Default for HashGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HashGenerator {
    pub fn new() -> Self {
        Self { index: 0, hash: 0 }
    }

    /// Folds a single 32-bit (two's-complement) integer into the hash.
    pub fn add_int(&mut self, n: i32) {
        let primes = prime_table();
        let prime = primes[self.index];
        let contribution = prime.wrapping_mul(n as u32);
        self.hash = self.hash.wrapping_add(contribution);
        self.index = (self.index + 1) % MAX_PRIME_NUMBERS;
    }

    /// Folds a length-prefixed byte string into the hash: the byte
    /// length first, then each byte in order.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.add_int(bytes.len() as i32);
        for byte in bytes {
            self.add_int(*byte as i32);
        }
    }

    /// Folds a length-prefixed UTF-8 string into the hash.
    pub fn add_string(&mut self, s: &str) {
        self.add_bytes(s.as_bytes());
    }

    pub fn get_hash(&self) -> DCFileHash {
        self.hash
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn prime_table_has_ten_thousand_entries() {
        assert_eq!(prime_table().len(), MAX_PRIME_NUMBERS);
    }

    #[test]
    fn prime_table_starts_at_two() {
        let primes = prime_table();
        assert_eq!(primes[0], 2);
        assert_eq!(primes[1], 3);
        assert_eq!(primes[2], 5);
    }

    #[test]
    fn ten_thousandth_prime_is_104729() {
        // A well known fact about the sequence of primes, independent
        // of this crate, used here only as a sanity check on the sieve.
        assert_eq!(prime_table()[MAX_PRIME_NUMBERS - 1], 104_729);
    }

    #[test]
    fn add_int_is_deterministic() {
        let mut a = HashGenerator::new();
        let mut b = HashGenerator::new();
        a.add_int(1);
        a.add_int(2828);
        b.add_int(1);
        b.add_int(2828);
        assert_eq!(a.get_hash(), b.get_hash());
    }

    #[test]
    fn add_string_folds_length_then_bytes() {
        let mut a = HashGenerator::new();
        a.add_string("hi");

        let mut b = HashGenerator::new();
        b.add_int(2);
        b.add_int(b'h' as i32);
        b.add_int(b'i' as i32);

        assert_eq!(a.get_hash(), b.get_hash());
    }
}
