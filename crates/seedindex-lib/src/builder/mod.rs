//! Builder module for constructing seed indexes
//!
//! This module implements the build pipeline:
//! 1. Parse input sequences (FASTA/FASTQ) into a reference set
//! 2. Enumerate seeds and count them per chunk and partition
//! 3. Populate the partitioned seed array
//! 4. Sort partitions and group equal keys
//! 5. Build the per-partition hash tables

pub mod config;
pub mod enumerate;
pub mod groups;
pub mod histogram;
pub mod index_builder;
pub mod parse;
pub mod seed_array;
pub mod work_queue;

pub use config::{EnumConfig, IndexConfig, MaskingAlgo};
pub use enumerate::{SeedEncoder, SeedStats};
pub use groups::{Group, GroupStatistics, KeyGroups};
pub use index_builder::IndexBuilder;
pub use seed_array::SeedArray;
