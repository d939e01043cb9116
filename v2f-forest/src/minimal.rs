//! Minimal-forest builder: an identity V2F forest for sanity-checking the
//! codec and bootstrapping tests/fuzzers without a real header file (spec
//! 4.8).

use std::sync::Arc;

use v2f_io::{invalid_parameter, Result};

use crate::entry::{Entry, Forest, IncludedEntry, Root};

/// Builds a single-root identity forest for `bytes_per_word` (1 or 2):
/// every symbol maps directly to its own one-sample codeword, and every
/// root position aliases the same arena.
pub fn build_minimal_forest(bytes_per_word: u8) -> Result<Forest> {
    if bytes_per_word != 1 && bytes_per_word != 2 {
        return invalid_parameter(format!(
            "minimal forest bytes_per_word must be 1 or 2, got {}",
            bytes_per_word
        ));
    }

    let symbol_count = 1usize << (8 * bytes_per_word as u32);
    let max_sample_value = (symbol_count - 1) as u32;

    let mut entries = Vec::with_capacity(symbol_count);
    let mut children_entries = Vec::with_capacity(symbol_count);
    let mut entries_by_word = Vec::with_capacity(symbol_count);

    for index in 0..symbol_count as u32 {
        entries.push(Entry {
            children_count: 0,
            children: Vec::new(),
            included: Some(IncludedEntry {
                samples: vec![index],
                word: index,
            }),
        });
        children_entries.push(index);
        entries_by_word.push(index);
    }

    let root = Arc::new(Root {
        entries,
        entries_by_word,
        start_symbol: 0,
        children_entries,
    });

    let roots = vec![root; symbol_count];

    Ok(Forest::new(
        roots,
        max_sample_value,
        bytes_per_word,
        bytes_per_word,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_bytes_per_word() {
        assert!(build_minimal_forest(0).is_err());
        assert!(build_minimal_forest(3).is_err());
    }

    #[test]
    fn one_byte_forest_has_256_entries_and_aliases_all_roots() {
        let forest = build_minimal_forest(1).unwrap();
        assert_eq!(forest.max_sample_value(), 255);
        assert_eq!(forest.root_count(), 256);
        for k in 0..256 {
            let root = forest.root(k).unwrap();
            assert_eq!(root.entries.len(), 256);
        }
    }

    #[test]
    fn two_byte_forest_identity_mapping() {
        let forest = build_minimal_forest(2).unwrap();
        assert_eq!(forest.max_sample_value(), 65535);
        assert_eq!(forest.root_count(), 65536);
        let root = forest.root(0).unwrap();
        assert_eq!(root.root_included_count(), 65536);
        let entry_index = root.entries_by_word[12345] as usize;
        let entry = &root.entries[entry_index];
        assert_eq!(entry.included.as_ref().unwrap().samples, vec![12345]);
        assert_eq!(entry.included.as_ref().unwrap().word, 12345);
    }
}
