//! Open-addressing hash table for one seed partition
//!
//! Maps a partition-local seed key to the offset of its group in the sorted
//! partition. Collisions are resolved by linear probing with wraparound.
//!
//! Values are stored as `offset + 1` so that a stored 0 always means "blank"
//! and a group starting at offset 0 stays addressable.

use crate::hasher::{HashFunction, Modulo, ModuloOp, MurmurHash};
use crate::seed::SeedOffset;

/// One table slot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    /// Partition-local seed key
    pub key: SeedOffset,
    /// Group offset + 1, 0 when blank
    pub value: u32,
}

impl Slot {
    #[inline]
    fn is_blank(&self) -> bool {
        self.value == 0
    }
}

/// Every slot was probed without finding room for the key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableOverflow {
    /// Number of slots in the table
    pub capacity: usize,
}

/// Linear-probing hash table from seed key to group offset
pub struct HashTable<H: HashFunction = MurmurHash, M: ModuloOp = Modulo> {
    slots: Box<[Slot]>,
    len: usize,
    hash: H,
    modulo: M,
}

impl HashTable<MurmurHash, Modulo> {
    /// Table with `capacity` slots and the default strategies
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategies(capacity, MurmurHash, Modulo)
    }

    /// Table sized for `distinct` keys at the given load factor
    pub fn for_keys(distinct: usize, load_factor: f64) -> Self {
        Self::with_capacity(slots_for(distinct, load_factor))
    }
}

impl<H: HashFunction, M: ModuloOp> HashTable<H, M> {
    /// Table with at least `capacity` slots, rounded by the modulo strategy
    pub fn with_capacity_and_strategies(capacity: usize, hash: H, modulo: M) -> Self {
        let size = modulo.table_size(capacity);
        Self {
            slots: vec![Slot::default(); size].into_boxed_slice(),
            len: 0,
            hash,
            modulo,
        }
    }

    /// Table sized for `distinct` keys with explicit strategies
    pub fn for_keys_with_strategies(distinct: usize, load_factor: f64, hash: H, modulo: M) -> Self {
        Self::with_capacity_and_strategies(slots_for(distinct, load_factor), hash, modulo)
    }

    #[inline]
    fn home_slot(&self, key: SeedOffset) -> usize {
        let size = self.slots.len() as u64;
        self.modulo.reduce(self.hash.hash(key as u64), size) as usize
    }

    /// Insert `key -> offset`
    ///
    /// Probing stops at the first blank slot or at a slot already holding
    /// `key`, whose value is overwritten. Fails once the probe wraps back to
    /// the home slot.
    pub fn insert(&mut self, key: SeedOffset, offset: u32) -> Result<(), TableOverflow> {
        let capacity = self.slots.len();
        let value = match offset.checked_add(1) {
            Some(v) if capacity > 0 => v,
            _ => return Err(TableOverflow { capacity }),
        };

        let home = self.home_slot(key);
        let mut i = home;
        loop {
            let slot = &mut self.slots[i];
            if slot.is_blank() {
                *slot = Slot { key, value };
                self.len += 1;
                return Ok(());
            }
            if slot.key == key {
                slot.value = value;
                return Ok(());
            }
            i += 1;
            if i == capacity {
                i = 0;
            }
            if i == home {
                return Err(TableOverflow { capacity });
            }
        }
    }

    /// Group offset stored for `key`
    pub fn find(&self, key: SeedOffset) -> Option<u32> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.slots.len();
        let home = self.home_slot(key);
        let mut i = home;
        loop {
            let slot = &self.slots[i];
            if slot.is_blank() {
                return None;
            }
            if slot.key == key {
                return Some(slot.value - 1);
            }
            i += 1;
            if i == capacity {
                i = 0;
            }
            if i == home {
                return None;
            }
        }
    }

    /// Number of occupied slots
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no key has been inserted
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Fraction of occupied slots
    pub fn load(&self) -> f64 {
        if self.slots.is_empty() {
            0.0
        } else {
            self.len as f64 / self.slots.len() as f64
        }
    }

    /// Occupied `(key, offset)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (SeedOffset, u32)> + '_ {
        self.slots
            .iter()
            .filter(|s| !s.is_blank())
            .map(|s| (s.key, s.value - 1))
    }

    /// Bytes held by the slot array
    pub fn num_bytes(&self) -> usize {
        self.slots.len() * std::mem::size_of::<Slot>()
    }
}

fn slots_for(distinct: usize, load_factor: f64) -> usize {
    if distinct == 0 {
        return 0;
    }
    ((distinct as f64 * load_factor).ceil() as usize).max(distinct + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{IdentityHash, PowerOfTwo};

    fn identity(capacity: usize) -> HashTable<IdentityHash, Modulo> {
        HashTable::with_capacity_and_strategies(capacity, IdentityHash, Modulo)
    }

    #[test]
    fn test_insert_and_find() {
        let mut table = HashTable::for_keys(3, 1.2);
        assert_eq!(table.capacity(), 4);
        table.insert(10, 0).unwrap();
        table.insert(20, 5).unwrap();
        table.insert(30, 9).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.find(10), Some(0));
        assert_eq!(table.find(20), Some(5));
        assert_eq!(table.find(30), Some(9));
        assert_eq!(table.find(40), None);
    }

    #[test]
    fn test_offset_zero_is_not_blank() {
        let mut table = identity(2);
        table.insert(7, 0).unwrap();
        assert_eq!(table.find(7), Some(0));
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(7, 0)]);
    }

    #[test]
    fn test_collisions_probe_forward() {
        let mut table = identity(5);
        // 1, 6 and 11 share home slot 1
        table.insert(1, 100).unwrap();
        table.insert(6, 200).unwrap();
        table.insert(11, 300).unwrap();
        assert_eq!(table.find(1), Some(100));
        assert_eq!(table.find(6), Some(200));
        assert_eq!(table.find(11), Some(300));
        // home slot 1, probes 2, 3 and stops at the blank slot 4
        assert_eq!(table.find(16), None);
    }

    #[test]
    fn test_probe_wraps_around() {
        let mut table = identity(4);
        table.insert(3, 1).unwrap();
        table.insert(7, 2).unwrap(); // home 3 taken, wraps to 0
        assert_eq!(table.find(7), Some(2));
        let occupied: Vec<_> = table.iter().collect();
        assert_eq!(occupied, vec![(7, 2), (3, 1)]);
    }

    #[test]
    fn test_reinsert_same_key_overwrites() {
        let mut table = identity(3);
        table.insert(4, 1).unwrap();
        table.insert(4, 8).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.find(4), Some(8));
    }

    #[test]
    fn test_overflow_on_full_table() {
        let mut table = identity(2);
        table.insert(0, 0).unwrap();
        table.insert(1, 0).unwrap();
        assert_eq!(table.insert(2, 0), Err(TableOverflow { capacity: 2 }));
        // a full table still answers lookups for missing keys
        assert_eq!(table.find(2), None);
        assert_eq!(table.find(1), Some(0));
    }

    #[test]
    fn test_zero_capacity() {
        let mut table = HashTable::for_keys(0, 1.2);
        assert_eq!(table.capacity(), 0);
        assert!(table.is_empty());
        assert_eq!(table.find(1), None);
        assert!(table.insert(1, 0).is_err());
    }

    #[test]
    fn test_sizing_leaves_a_blank_slot() {
        for distinct in 1..50 {
            assert!(slots_for(distinct, 1.01) > distinct);
        }
        assert_eq!(slots_for(10, 1.2), 12);
    }

    #[test]
    fn test_power_of_two_strategy() {
        let mut table = HashTable::for_keys_with_strategies(5, 1.2, MurmurHash, PowerOfTwo);
        assert_eq!(table.capacity(), 8);
        for key in 0..5u32 {
            table.insert(key * 1000, key).unwrap();
        }
        for key in 0..5u32 {
            assert_eq!(table.find(key * 1000), Some(key));
        }
        assert!((table.load() - 5.0 / 8.0).abs() < 1e-12);
    }
}
