//! Hash and modulo strategies for seeds.
//!
//! [`HashFunction`] and [`ModuloOp`] are the two strategy seams of the
//! partition hash tables: a table is parameterised by both and they are fixed
//! when the table is constructed. [`DeterministicHasher`] orders seeds for
//! minimizer selection using a seeded AHasher.

use ahash::RandomState;
use std::hash::{BuildHasher, Hasher};

use crate::constants::DEFAULT_SEED;

/// Maps a 64-bit key to a 64-bit hash
pub trait HashFunction: Clone + Send + Sync {
    /// Hash a key
    fn hash(&self, key: u64) -> u64;
}

/// Reduces a hash to a slot index in a table of a given size
pub trait ModuloOp: Clone + Copy + Send + Sync {
    /// Table size actually allocated for a requested number of slots
    fn table_size(&self, requested: usize) -> usize {
        requested
    }

    /// Reduce `hash` into `[0, size)`; `size` is a value returned by `table_size`
    fn reduce(&self, hash: u64, size: u64) -> u64;
}

/// MurmurHash3 64-bit finalizer
#[derive(Clone, Copy, Debug, Default)]
pub struct MurmurHash;

impl HashFunction for MurmurHash {
    #[inline]
    fn hash(&self, key: u64) -> u64 {
        let mut h = key;
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^= h >> 33;
        h
    }
}

/// Uses the key itself as its hash
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHash;

impl HashFunction for IdentityHash {
    #[inline]
    fn hash(&self, key: u64) -> u64 {
        key
    }
}

/// Plain remainder; any table size
#[derive(Clone, Copy, Debug, Default)]
pub struct Modulo;

impl ModuloOp for Modulo {
    #[inline]
    fn reduce(&self, hash: u64, size: u64) -> u64 {
        hash % size
    }
}

/// Bit mask; rounds table sizes up to a power of two
#[derive(Clone, Copy, Debug, Default)]
pub struct PowerOfTwo;

impl ModuloOp for PowerOfTwo {
    fn table_size(&self, requested: usize) -> usize {
        if requested == 0 {
            0
        } else {
            requested.next_power_of_two()
        }
    }

    #[inline]
    fn reduce(&self, hash: u64, size: u64) -> u64 {
        hash & (size - 1)
    }
}

/// A deterministic hasher with a seeded state
#[derive(Clone)]
pub struct DeterministicHasher {
    state: RandomState,
}

impl DeterministicHasher {
    /// Create a new deterministic hasher with the given seed
    pub fn new(seed: u64) -> Self {
        let state = RandomState::with_seeds(seed, !seed, seed, !seed);
        Self { state }
    }

    /// Hash a u64 value using a seeded AHasher
    #[inline]
    pub fn hash_u64(&self, value: u64) -> u64 {
        let mut hasher = self.state.build_hasher();
        hasher.write_u64(value);
        hasher.finish()
    }
}

impl Default for DeterministicHasher {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl HashFunction for DeterministicHasher {
    #[inline]
    fn hash(&self, key: u64) -> u64 {
        self.hash_u64(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_hashing() {
        let hasher1 = DeterministicHasher::new(42);
        let hasher2 = DeterministicHasher::new(42);
        let hasher3 = DeterministicHasher::new(43);

        let value = 0x123456789abcdef0u64;

        assert_eq!(hasher1.hash(value), hasher2.hash(value));
        assert_ne!(hasher1.hash(value), hasher3.hash(value));
    }

    #[test]
    fn test_murmur_finalizer() {
        let h = MurmurHash;
        assert_eq!(h.hash(0), 0);
        assert_ne!(h.hash(1), h.hash(2));
        // neighbouring keys must not land in neighbouring slots
        assert_ne!(h.hash(2).wrapping_sub(h.hash(1)), 1);
    }

    #[test]
    fn test_modulo_strategies() {
        assert_eq!(Modulo.table_size(10), 10);
        assert_eq!(Modulo.reduce(23, 10), 3);

        assert_eq!(PowerOfTwo.table_size(10), 16);
        assert_eq!(PowerOfTwo.table_size(16), 16);
        assert_eq!(PowerOfTwo.table_size(0), 0);
        assert_eq!(PowerOfTwo.reduce(23, 16), 7);
    }

    #[test]
    fn test_identity_hash() {
        assert_eq!(IdentityHash.hash(12345), 12345);
    }
}
