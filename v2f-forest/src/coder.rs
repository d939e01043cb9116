//! Entropy coder: walks the forest, emitting fixed-size codewords as the
//! walk falls off a tree (spec 4.5).

use v2f_io::{corrupted_data, Result};

use crate::entry::{word_to_bytes, Forest};

/// Mutable coding state for one block. Reset to root 0, unentered, at the
/// start of every block; this is the only mutable state the coder carries.
pub struct EntropyEncoder<'a> {
    forest: &'a Forest,
    current_root: usize,
    /// `None` means "just entered `current_root`, haven't consumed a
    /// symbol since" — the next symbol is looked up via the root's own
    /// `children_entries` map rather than an entry's children.
    current_entry: Option<usize>,
}

impl<'a> EntropyEncoder<'a> {
    pub fn new(forest: &'a Forest) -> Self {
        Self {
            forest,
            current_root: 0,
            current_entry: None,
        }
    }

    pub fn reset(&mut self) {
        self.current_root = 0;
        self.current_entry = None;
    }

    /// Feeds one input symbol. Returns the codeword bytes emitted, if the
    /// walk fell off the current tree.
    pub fn push_symbol(&mut self, symbol: u32) -> Result<Option<Vec<u8>>> {
        let root = self
            .forest
            .root(self.current_root)
            .expect("current_root is always kept in range");

        let entry_index = match self.current_entry {
            Some(index) => index,
            None => {
                let entry_index = root
                    .entry_for_symbol(self.forest.max_sample_value(), symbol)
                    .ok_or_else(|| {
                        v2f_io::Error::CorruptedData(format!(
                            "symbol {} not covered by root {}'s child map",
                            symbol, self.current_root
                        ))
                    })?;
                self.current_entry = Some(entry_index as usize);
                return Ok(None);
            }
        };

        let entry = &root.entries[entry_index];
        if symbol < entry.children_count {
            self.current_entry = Some(entry.children[symbol as usize] as usize);
            return Ok(None);
        }

        let included = entry.included.as_ref().ok_or_else(|| {
            v2f_io::Error::CorruptedData(
                "forest invariant violated: non-included entry with children_count <= symbol"
                    .to_string(),
            )
        })?;
        let word_bytes = word_to_bytes(included.word, self.forest.bytes_per_word());

        let next_root_index = entry.children_count as usize;
        let next_root = self.forest.root(next_root_index).ok_or_else(|| {
            v2f_io::Error::CorruptedData(format!(
                "transition root index {} out of range",
                next_root_index
            ))
        })?;
        let next_entry = next_root
            .entry_for_symbol(self.forest.max_sample_value(), symbol)
            .ok_or_else(|| {
                v2f_io::Error::CorruptedData(format!(
                    "symbol {} not covered by transition root {}'s child map",
                    symbol, next_root_index
                ))
            })?;

        self.current_root = next_root_index;
        self.current_entry = Some(next_entry as usize);

        Ok(Some(word_bytes))
    }

    /// Emits the final codeword of the block. If the walk is sitting on a
    /// non-included entry, repeatedly descends into the first child until
    /// an included entry is found.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        let root = self
            .forest
            .root(self.current_root)
            .expect("current_root is always kept in range");

        let mut index = match self.current_entry {
            Some(index) => index,
            None => {
                // No symbol was ever consumed (an empty block). Fall back
                // to the root's own first covered entry.
                root.entry_for_symbol(self.forest.max_sample_value(), root.start_symbol)
                    .ok_or_else(|| {
                        v2f_io::Error::CorruptedData("empty root has no entries to flush".into())
                    })? as usize
            }
        };

        loop {
            let entry = &root.entries[index];
            if let Some(included) = &entry.included {
                return Ok(word_to_bytes(included.word, self.forest.bytes_per_word()));
            }
            if entry.children.is_empty() {
                return corrupted_data("non-included entry has no children to descend into");
            }
            index = entry.children[0] as usize;
        }
    }
}

/// Encodes a full block of input symbols against `forest`, resetting coder
/// state at the start and flushing the final codeword at the end.
pub fn encode_block(forest: &Forest, symbols: &[u32]) -> Result<Vec<u8>> {
    let mut encoder = EntropyEncoder::new(forest);
    let mut out = Vec::new();
    for &symbol in symbols {
        if let Some(word) = encoder.push_symbol(symbol)? {
            out.extend(word);
        }
    }
    out.extend(encoder.finish()?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimal::build_minimal_forest;

    #[test]
    fn minimal_forest_emits_one_codeword_per_symbol() {
        let forest = build_minimal_forest(1).unwrap();
        let symbols = [0u32, 1, 2, 255];
        let encoded = encode_block(&forest, &symbols).unwrap();
        assert_eq!(encoded, vec![0u8, 1, 2, 255]);
    }

    #[test]
    fn minimal_forest_2_byte_words() {
        let forest = build_minimal_forest(2).unwrap();
        let symbols = [0u32, 256, 65535];
        let encoded = encode_block(&forest, &symbols).unwrap();
        assert_eq!(
            encoded,
            vec![0u8, 0, 1, 0, 0xFF, 0xFF]
        );
    }
}
