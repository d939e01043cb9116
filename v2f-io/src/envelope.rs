//! Compressed-stream block framing (spec 6.2).

use std::io;

use crate::{corrupted_data, invalid_parameter, Result};

/// `5120 * 256`: the largest number of samples a single block may carry
/// (spec 4.9).
pub const MAX_BLOCK_SIZE: usize = 5120 * 256;

/// One framed compressed block: a size-prefixed payload plus the number of
/// decoded samples it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub sample_count: u32,
    pub compressed_bitstream: Vec<u8>,
}

/// Reads one envelope. Returns `Ok(None)` on a clean end-of-stream, i.e. a
/// read for `compressed_bitstream_size` that returns zero bytes exactly on
/// an envelope boundary. Any other short read is `CorruptedData`.
pub fn read_envelope<R: io::Read>(reader: &mut R) -> Result<Option<Envelope>> {
    let mut size_buf = [0u8; 4];
    let mut filled = 0;
    while filled < 4 {
        let n = reader.read(&mut size_buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return corrupted_data("envelope truncated inside compressed_bitstream_size");
        }
        filled += n;
    }
    let compressed_bitstream_size = u32::from_be_bytes(size_buf);
    if compressed_bitstream_size == 0 {
        return corrupted_data("compressed_bitstream_size must be non-zero");
    }

    let mut count_buf = [0u8; 4];
    reader.read_exact(&mut count_buf)?;
    let sample_count = u32::from_be_bytes(count_buf);
    if sample_count == 0 || sample_count as usize > MAX_BLOCK_SIZE {
        return corrupted_data(format!(
            "envelope sample_count {} out of range [1,{}]",
            sample_count, MAX_BLOCK_SIZE
        ));
    }

    let mut compressed_bitstream = vec![0u8; compressed_bitstream_size as usize];
    reader.read_exact(&mut compressed_bitstream)?;

    log::trace!(
        "read envelope: {} compressed bytes, {} samples",
        compressed_bitstream_size,
        sample_count
    );

    Ok(Some(Envelope {
        sample_count,
        compressed_bitstream,
    }))
}

/// Writes one envelope.
pub fn write_envelope<W: io::Write>(
    writer: &mut W,
    sample_count: u32,
    compressed_bitstream: &[u8],
) -> Result<()> {
    if compressed_bitstream.is_empty() {
        return invalid_parameter("compressed_bitstream must be non-empty");
    }
    if sample_count == 0 || sample_count as usize > MAX_BLOCK_SIZE {
        return invalid_parameter(format!(
            "sample_count {} out of range [1,{}]",
            sample_count, MAX_BLOCK_SIZE
        ));
    }

    writer.write_all(&(compressed_bitstream.len() as u32).to_be_bytes())?;
    writer.write_all(&sample_count.to_be_bytes())?;
    writer.write_all(compressed_bitstream)?;

    log::trace!(
        "wrote envelope: {} compressed bytes, {} samples",
        compressed_bitstream.len(),
        sample_count
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_one_envelope() {
        let mut buf = Vec::new();
        write_envelope(&mut buf, 5, &[1, 2, 3, 4]).unwrap();

        let mut reader = Cursor::new(buf);
        let envelope = read_envelope(&mut reader).unwrap().unwrap();
        assert_eq!(envelope.sample_count, 5);
        assert_eq!(envelope.compressed_bitstream, vec![1, 2, 3, 4]);

        assert!(read_envelope(&mut reader).unwrap().is_none());
    }

    #[test]
    fn clean_eof_at_boundary() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        assert!(read_envelope(&mut reader).unwrap().is_none());
    }

    #[test]
    fn misaligned_short_read_is_corruption() {
        // Ends partway through compressed_bitstream_size itself, not on an
        // envelope boundary.
        let mut reader = Cursor::new(vec![0u8, 0]);
        let result = read_envelope(&mut reader);
        assert!(matches!(result, Err(crate::Error::CorruptedData(_))));
    }
}
