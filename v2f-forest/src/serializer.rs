//! Forest (de)serialization: the inline forest definition inside a header
//! file (spec 4.7, wire layout in spec 6.1).
//!
//! The reader is a three-pass parser: header + per-root scalars, then the
//! entry table per root (children stored as indices into that root's own
//! pool), then a resolution pass that builds each root's `entries_by_word`
//! inverse map. Because children are indices rather than pointers there is
//! no pointer-patching step — the "resolution" is purely building the
//! codeword lookup table and validating the shape invariants.

use std::io;
use std::sync::Arc;

use v2f_io::{corrupted_data, invalid_parameter, Result};

use crate::entry::{Entry, Forest, IncludedEntry, Root};

fn read_u32<R: io::Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u16<R: io::Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u8<R: io::Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_sample<R: io::Read>(reader: &mut R, bytes_per_sample: u8) -> Result<u32> {
    match bytes_per_sample {
        1 => Ok(read_u8(reader)? as u32),
        2 => Ok(read_u16(reader)? as u32),
        other => invalid_parameter(format!("bytes_per_sample must be 1 or 2, got {}", other)),
    }
}

fn read_word<R: io::Read>(reader: &mut R, bytes_per_word: u8) -> Result<u32> {
    match bytes_per_word {
        1 => Ok(read_u8(reader)? as u32),
        2 => Ok(read_u16(reader)? as u32),
        other => invalid_parameter(format!("bytes_per_word must be 1 or 2, got {}", other)),
    }
}

/// Parses the inline forest definition (everything after `forest_id` in
/// spec 6.1, starting at `total_entry_count`).
pub fn read_forest<R: io::Read>(reader: &mut R) -> Result<Forest> {
    let total_entry_count = read_u32(reader)?;
    if !(2..=(u32::MAX - 1)).contains(&total_entry_count) {
        return corrupted_data(format!(
            "total_entry_count {} out of range [2, 2^32-2]",
            total_entry_count
        ));
    }

    let bytes_per_word = read_u8(reader)?;
    if bytes_per_word != 1 && bytes_per_word != 2 {
        return corrupted_data(format!("bytes_per_word {} not in {{1,2}}", bytes_per_word));
    }
    let bytes_per_sample = read_u8(reader)?;
    if bytes_per_sample != 1 && bytes_per_sample != 2 {
        return corrupted_data(format!(
            "bytes_per_sample {} not in {{1,2}}",
            bytes_per_sample
        ));
    }

    let max_expected_value = read_u16(reader)? as u32;
    let root_count = read_u16(reader)? as u32 + 1;
    if root_count > max_expected_value + 1 {
        return corrupted_data(format!(
            "root_count {} exceeds max_expected_value + 1 ({})",
            root_count,
            max_expected_value + 1
        ));
    }

    let mut written_roots: Vec<Arc<Root>> = Vec::with_capacity(root_count as usize);
    let mut entry_count_sum: u64 = 0;

    for root_position in 0..root_count {
        let root = read_one_root(
            reader,
            root_position,
            max_expected_value,
            total_entry_count,
            bytes_per_word,
            bytes_per_sample,
        )?;
        entry_count_sum += root.entries.len() as u64;
        written_roots.push(Arc::new(root));
    }

    if entry_count_sum != total_entry_count as u64 {
        return corrupted_data(format!(
            "total_entry_count {} does not match sum of per-root entry counts {}",
            total_entry_count, entry_count_sum
        ));
    }

    // Alias handling: positions beyond root_count-1 all refer to the last
    // root actually written.
    let mut roots = written_roots.clone();
    let last = written_roots
        .last()
        .expect("root_count >= 1 guarantees at least one root was written")
        .clone();
    for _ in root_count..=max_expected_value {
        roots.push(last.clone());
    }

    Ok(Forest::new(
        roots,
        max_expected_value,
        bytes_per_word,
        bytes_per_sample,
    ))
}

fn read_one_root<R: io::Read>(
    reader: &mut R,
    root_position: u32,
    max_expected_value: u32,
    total_entry_count: u32,
    bytes_per_word: u8,
    bytes_per_sample: u8,
) -> Result<Root> {
    let root_entry_count = read_u32(reader)?;
    if root_entry_count > total_entry_count {
        return corrupted_data(format!(
            "root {} root_entry_count {} exceeds total_entry_count {}",
            root_position, root_entry_count, total_entry_count
        ));
    }
    let root_included_count = read_u32(reader)?;
    if root_included_count > root_entry_count {
        return corrupted_data(format!(
            "root_included_count {} exceeds root_entry_count {}",
            root_included_count, root_entry_count
        ));
    }

    let mut entries = Vec::with_capacity(root_entry_count as usize);
    for i in 0..root_entry_count {
        let index_i = read_u32(reader)?;
        if index_i != i {
            return corrupted_data(format!(
                "entry index mismatch: expected {}, got {}",
                i, index_i
            ));
        }

        let children_count = read_u32(reader)?;
        if children_count > max_expected_value + 1 {
            return corrupted_data(format!(
                "entry {} children_count {} exceeds max_expected_value + 1",
                i, children_count
            ));
        }

        let mut children = Vec::with_capacity(children_count as usize);
        for _ in 0..children_count {
            let child = read_u32(reader)?;
            if child >= root_entry_count {
                return corrupted_data(format!(
                    "entry {} child index {} out of range for root_entry_count {}",
                    i, child, root_entry_count
                ));
            }
            children.push(child);
        }

        let included = if children_count != max_expected_value + 1 {
            let sample_count = read_u16(reader)?;
            if sample_count == 0 {
                return corrupted_data(format!("entry {} has sample_count 0", i));
            }
            let mut samples = Vec::with_capacity(sample_count as usize);
            for _ in 0..sample_count {
                samples.push(read_sample(reader, bytes_per_sample)?);
            }
            let word = read_word(reader, bytes_per_word)?;
            Some(IncludedEntry { samples, word })
        } else {
            None
        };

        entries.push(Entry {
            children_count,
            children,
            included,
        });
    }

    let root_children_count = read_u32(reader)?;
    let full_shape = max_expected_value + 1;
    let start_symbol = if root_children_count == full_shape {
        0
    } else if root_children_count < full_shape && full_shape - root_children_count == root_position
    {
        root_position
    } else {
        return corrupted_data(format!(
            "root {} has illegal shape: root_children_count {} matches neither full nor missing-{}",
            root_position, root_children_count, root_position
        ));
    };

    let mut children_entries = Vec::with_capacity(root_children_count as usize);
    for j in 0..root_children_count {
        let child_entry_index = read_u32(reader)?;
        if child_entry_index >= root_entry_count {
            return corrupted_data(format!(
                "root {} child_entry_index {} out of range",
                root_position, child_entry_index
            ));
        }
        let input_symbol = read_sample(reader, bytes_per_sample)?;
        let expected_symbol = start_symbol + j;
        if input_symbol != expected_symbol {
            return corrupted_data(format!(
                "root {} input_symbol {} does not match expected {}",
                root_position, input_symbol, expected_symbol
            ));
        }
        children_entries.push(child_entry_index);
    }

    // Resolution pass: build the codeword -> entry index inverse map and
    // check invariant 4 (codewords occupy a dense [0, root_included_count)
    // range).
    let mut entries_by_word = vec![u32::MAX; root_included_count as usize];
    for (index, entry) in entries.iter().enumerate() {
        if let Some(included) = &entry.included {
            if included.word as usize >= entries_by_word.len() {
                return corrupted_data(format!(
                    "entry {} codeword {} exceeds root_included_count {}",
                    index, included.word, root_included_count
                ));
            }
            if entries_by_word[included.word as usize] != u32::MAX {
                return corrupted_data(format!(
                    "duplicate codeword {} in root {}",
                    included.word, root_position
                ));
            }
            entries_by_word[included.word as usize] = index as u32;
        }
    }
    if entries_by_word.iter().any(|&e| e == u32::MAX) {
        return corrupted_data(format!(
            "root {} codewords do not densely cover [0, root_included_count)",
            root_position
        ));
    }

    Ok(Root {
        entries,
        entries_by_word,
        start_symbol,
        children_entries,
    })
}

fn write_u32<W: io::Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

fn write_u16<W: io::Write>(writer: &mut W, value: u16) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

fn write_sample<W: io::Write>(writer: &mut W, value: u32, bytes_per_sample: u8) -> Result<()> {
    match bytes_per_sample {
        1 => writer.write_all(&[value as u8])?,
        2 => writer.write_all(&(value as u16).to_be_bytes())?,
        other => return invalid_parameter(format!("bytes_per_sample must be 1 or 2, got {}", other)),
    }
    Ok(())
}

fn write_word<W: io::Write>(writer: &mut W, value: u32, bytes_per_word: u8) -> Result<()> {
    match bytes_per_word {
        1 => writer.write_all(&[value as u8])?,
        2 => writer.write_all(&(value as u16).to_be_bytes())?,
        other => return invalid_parameter(format!("bytes_per_word must be 1 or 2, got {}", other)),
    }
    Ok(())
}

/// Writes a forest in the layout `read_forest` can parse back, starting at
/// `total_entry_count`. Only the distinct root arenas (up to the last one
/// that differs from its predecessor) are written; trailing aliased
/// positions are recovered by the reader's alias rule.
pub fn write_forest<W: io::Write>(writer: &mut W, forest: &Forest) -> Result<()> {
    let distinct_root_count = distinct_written_root_count(forest);

    let total_entry_count: u64 = forest.roots[..distinct_root_count]
        .iter()
        .map(|root| root.entries.len() as u64)
        .sum();
    if total_entry_count > (u32::MAX - 1) as u64 {
        return invalid_parameter("forest total_entry_count exceeds wire format limit");
    }

    write_u32(writer, total_entry_count as u32)?;
    writer.write_all(&[forest.bytes_per_word()])?;
    writer.write_all(&[forest.bytes_per_sample()])?;
    write_u16(writer, forest.max_sample_value() as u16)?;
    write_u16(writer, (distinct_root_count - 1) as u16)?;

    for root in &forest.roots[..distinct_root_count] {
        write_one_root(writer, root, forest.bytes_per_word(), forest.bytes_per_sample())?;
    }

    Ok(())
}

fn distinct_written_root_count(forest: &Forest) -> usize {
    let mut count = 1;
    for window in forest.roots.windows(2) {
        if Arc::ptr_eq(&window[0], &window[1]) {
            break;
        }
        count += 1;
    }
    count
}

fn write_one_root<W: io::Write>(
    writer: &mut W,
    root: &Root,
    bytes_per_word: u8,
    bytes_per_sample: u8,
) -> Result<()> {
    write_u32(writer, root.entries.len() as u32)?;
    write_u32(writer, root.root_included_count() as u32)?;

    for (i, entry) in root.entries.iter().enumerate() {
        write_u32(writer, i as u32)?;
        write_u32(writer, entry.children_count)?;
        for &child in &entry.children {
            write_u32(writer, child)?;
        }
        if let Some(included) = &entry.included {
            if included.samples.len() > u16::MAX as usize {
                return invalid_parameter("entry sample_count exceeds 65535");
            }
            write_u16(writer, included.samples.len() as u16)?;
            for &sample in &included.samples {
                write_sample(writer, sample, bytes_per_sample)?;
            }
            write_word(writer, included.word, bytes_per_word)?;
        }
    }

    write_u32(writer, root.children_entries.len() as u32)?;
    for (j, &child_entry_index) in root.children_entries.iter().enumerate() {
        write_u32(writer, child_entry_index)?;
        write_sample(writer, root.start_symbol + j as u32, bytes_per_sample)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimal::build_minimal_forest;

    #[test]
    fn round_trips_minimal_1_byte_forest() {
        let forest = build_minimal_forest(1).unwrap();
        let mut buf = Vec::new();
        write_forest(&mut buf, &forest).unwrap();

        let mut reader = io::Cursor::new(buf);
        let parsed = read_forest(&mut reader).unwrap();

        assert_eq!(parsed.max_sample_value(), 255);
        assert_eq!(parsed.bytes_per_word(), 1);
        assert_eq!(parsed.bytes_per_sample(), 1);
        assert_eq!(parsed.root_count(), 256);

        let root = parsed.root(0).unwrap();
        assert_eq!(root.root_included_count(), 256);
        for k in 0u32..256 {
            let entry_index = root.entries_by_word[k as usize] as usize;
            let entry = &root.entries[entry_index];
            let included = entry.included.as_ref().unwrap();
            assert_eq!(included.samples, vec![k]);
            assert_eq!(included.word, k);
        }
    }

    #[test]
    fn round_trips_minimal_2_byte_forest() {
        let forest = build_minimal_forest(2).unwrap();
        let mut buf = Vec::new();
        write_forest(&mut buf, &forest).unwrap();

        let mut reader = io::Cursor::new(buf);
        let parsed = read_forest(&mut reader).unwrap();

        // Spec 8, scenario 5.
        assert_eq!(parsed.root_count(), 65536);
        let root = parsed.root(0).unwrap();
        assert_eq!(root.root_included_count(), 65536);
        let entry_index = root.entries_by_word[12345] as usize;
        let entry = &root.entries[entry_index];
        assert_eq!(entry.included.as_ref().unwrap().samples, vec![12345]);
        assert_eq!(entry.included.as_ref().unwrap().word, 12345);
    }

    #[test]
    fn rejects_bad_total_entry_count() {
        let forest = build_minimal_forest(1).unwrap();
        let mut buf = Vec::new();
        write_forest(&mut buf, &forest).unwrap();
        // Corrupt total_entry_count (first 4 bytes).
        buf[0] = 0xFF;
        let mut reader = io::Cursor::new(buf);
        let result = read_forest(&mut reader);
        assert!(matches!(result, Err(v2f_io::Error::CorruptedData(_))));
    }
}
