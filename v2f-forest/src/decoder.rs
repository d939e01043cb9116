//! Entropy decoder: reads fixed-size codewords, emits the decoded symbol
//! runs they stand for (spec 4.6).

use v2f_io::{corrupted_data, Result};

use crate::entry::{word_from_bytes, Forest};

/// Mutable decoding state for one block: the active root, reset to root 0
/// at the start of every block.
pub struct EntropyDecoder<'a> {
    forest: &'a Forest,
    current_root: usize,
}

impl<'a> EntropyDecoder<'a> {
    pub fn new(forest: &'a Forest) -> Self {
        Self {
            forest,
            current_root: 0,
        }
    }

    pub fn reset(&mut self) {
        self.current_root = 0;
    }

    /// Decodes one codeword, returning the samples it stands for.
    pub fn decode_word(&mut self, word: u32) -> Result<&[u32]> {
        let root = self
            .forest
            .root(self.current_root)
            .expect("current_root is always kept in range");

        if word as usize >= root.root_included_count() {
            return corrupted_data(format!(
                "codeword {} out of range for root {} (included_count {})",
                word,
                self.current_root,
                root.root_included_count()
            ));
        }

        let entry_index = root.entries_by_word[word as usize] as usize;
        let entry = &root.entries[entry_index];
        let included = entry
            .included
            .as_ref()
            .expect("entries_by_word only ever points at included entries");

        let next_root_index = entry.children_count as usize;
        if self.forest.root(next_root_index).is_none() {
            return corrupted_data(format!(
                "decoded transition root index {} out of range",
                next_root_index
            ));
        }
        self.current_root = next_root_index;

        Ok(&included.samples)
    }
}

/// Decodes a full block of codewords against `forest`, stopping once
/// `max_output_sample_count` samples have been produced or the codewords
/// are exhausted, whichever comes first.
pub fn decode_block(
    forest: &Forest,
    codewords: &[u8],
    max_output_sample_count: usize,
) -> Result<Vec<u32>> {
    let bytes_per_word = forest.bytes_per_word() as usize;
    if codewords.len() % bytes_per_word != 0 {
        return corrupted_data(format!(
            "compressed bitstream length {} is not a multiple of bytes_per_word {}",
            codewords.len(),
            bytes_per_word
        ));
    }

    let mut decoder = EntropyDecoder::new(forest);
    let mut out = Vec::new();
    for chunk in codewords.chunks(bytes_per_word) {
        if out.len() >= max_output_sample_count {
            break;
        }
        let word = word_from_bytes(chunk);
        let samples = decoder.decode_word(word)?;
        for &sample in samples {
            if out.len() >= max_output_sample_count {
                break;
            }
            out.push(sample);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::encode_block;
    use crate::minimal::build_minimal_forest;

    #[test]
    fn round_trips_with_minimal_forest() {
        let forest = build_minimal_forest(1).unwrap();
        let symbols: Vec<u32> = (0..=255).collect();
        let encoded = encode_block(&forest, &symbols).unwrap();
        let decoded = decode_block(&forest, &encoded, symbols.len()).unwrap();
        assert_eq!(decoded, symbols);
        assert_eq!(encoded.len(), symbols.len());
    }

    #[test]
    fn rejects_codeword_out_of_range() {
        let forest = build_minimal_forest(1).unwrap();
        let result = decode_block(&forest, &[0u8], 0);
        // max_output_sample_count 0 stops immediately without reading.
        assert_eq!(result.unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn rejects_misaligned_bitstream_length() {
        let forest = build_minimal_forest(2).unwrap();
        let result = decode_block(&forest, &[0u8, 0, 0], 10);
        assert!(matches!(result, Err(v2f_io::Error::CorruptedData(_))));
    }
}
