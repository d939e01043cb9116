//! The V2F forest data model: a forest of root trees sharing a common
//! node-pool-per-root arena (spec 3, design notes in spec 9).
//!
//! Children are stored as indices into the owning root's entry vector
//! rather than as pointers, so deserialization is a straightforward
//! two-pass arena build: allocate all entries, then resolve indices.

use std::sync::Arc;

/// A single node in a root's entry arena. Non-included entries are pure
/// interior nodes (`children_count == max_sample_value + 1`); included
/// entries carry a codeword and the samples it decodes to, and may still
/// have children for input symbols that continue rather than end the
/// phrase.
#[derive(Debug, Clone)]
pub struct Entry {
    pub children_count: u32,
    /// Indices into the owning root's `entries`, length `children_count`.
    pub children: Vec<u32>,
    pub included: Option<IncludedEntry>,
}

impl Entry {
    pub fn is_included(&self) -> bool {
        self.included.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct IncludedEntry {
    pub samples: Vec<u32>,
    pub word: u32,
}

/// One root tree: an entry arena plus the two lookup views spec 3
/// describes (`entries_by_index` is just `entries` itself; `entries_by_word`
/// is the codeword -> entry index map) plus the root-level symbol -> entry
/// map used whenever coding transitions into this root fresh.
#[derive(Debug, Clone)]
pub struct Root {
    pub entries: Vec<Entry>,
    /// Codeword -> index into `entries`. Length = `root_included_count`.
    pub entries_by_word: Vec<u32>,
    /// The first input symbol this root's `children_entries` map covers.
    /// Zero for a "full" root, `i` for a "missing-i" root at position `i`.
    pub start_symbol: u32,
    /// Root-level input-symbol -> entry index map, covering symbols
    /// `[start_symbol, max_sample_value]`.
    pub children_entries: Vec<u32>,
}

impl Root {
    pub fn root_included_count(&self) -> usize {
        self.entries_by_word.len()
    }

    pub fn entry_for_symbol(&self, max_sample_value: u32, symbol: u32) -> Option<u32> {
        if symbol < self.start_symbol || symbol > max_sample_value {
            return None;
        }
        self.children_entries
            .get((symbol - self.start_symbol) as usize)
            .copied()
    }
}

/// A forest: `max_sample_value + 1` root positions, each pointing at a
/// (possibly shared) root arena. Aliased positions point at the exact same
/// `Arc<Root>`, never a copy (spec 9, "do not copy arenas").
#[derive(Debug, Clone)]
pub struct Forest {
    pub(crate) roots: Vec<Arc<Root>>,
    pub(crate) max_sample_value: u32,
    pub(crate) bytes_per_word: u8,
    pub(crate) bytes_per_sample: u8,
}

impl Forest {
    pub(crate) fn new(
        roots: Vec<Arc<Root>>,
        max_sample_value: u32,
        bytes_per_word: u8,
        bytes_per_sample: u8,
    ) -> Self {
        Self {
            roots,
            max_sample_value,
            bytes_per_word,
            bytes_per_sample,
        }
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn root(&self, index: usize) -> Option<&Root> {
        self.roots.get(index).map(|arc| arc.as_ref())
    }

    pub fn max_sample_value(&self) -> u32 {
        self.max_sample_value
    }

    pub fn bytes_per_word(&self) -> u8 {
        self.bytes_per_word
    }

    pub fn bytes_per_sample(&self) -> u8 {
        self.bytes_per_sample
    }

    /// Total entry count across all *distinct* root arenas (aliased
    /// positions are not double-counted), matching the forest-level
    /// invariant that bounds `total_entry_count` (spec 3, invariant 3).
    pub fn total_entry_count(&self) -> usize {
        let mut counted = Vec::new();
        let mut total = 0;
        for root in &self.roots {
            let ptr = Arc::as_ptr(root);
            if !counted.contains(&ptr) {
                counted.push(ptr);
                total += root.entries.len();
            }
        }
        total
    }
}

pub(crate) fn word_to_bytes(word: u32, bytes_per_word: u8) -> Vec<u8> {
    match bytes_per_word {
        1 => vec![word as u8],
        2 => (word as u16).to_be_bytes().to_vec(),
        _ => unreachable!("bytes_per_word is validated to be 1 or 2 at construction"),
    }
}

pub(crate) fn word_from_bytes(bytes: &[u8]) -> u32 {
    match bytes.len() {
        1 => bytes[0] as u32,
        2 => u16::from_be_bytes([bytes[0], bytes[1]]) as u32,
        other => unreachable!("codeword chunk length {} is not 1 or 2", other),
    }
}
