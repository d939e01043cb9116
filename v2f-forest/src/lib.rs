//! V2F forest: the per-block entropy coding structure (spec 3-4.8).
//!
//! A forest is a set of root trees sharing node-pool arenas; coding walks
//! a root until the walk falls off a tree, emitting a fixed-size codeword
//! and transitioning to the root named by the entry that just emitted.

pub mod coder;
pub mod decoder;
pub mod entry;
pub mod minimal;
pub mod serializer;

pub use coder::{encode_block, EntropyEncoder};
pub use decoder::{decode_block, EntropyDecoder};
pub use entry::{Entry, Forest, IncludedEntry, Root};
pub use minimal::build_minimal_forest;
pub use serializer::{read_forest, write_forest};
