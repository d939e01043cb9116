//! Big-endian packed 1- or 2-byte unsigned sample transcoding (spec 4.1).

use std::io;

use crate::{corrupted_data, invalid_parameter, Result};

/// Outcome of a bounded read from a raw sample stream.
#[derive(Debug, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Number of samples actually read into the caller's buffer.
    pub samples_read: usize,
    /// Set when the stream ended cleanly on a sample boundary before the
    /// buffer was filled.
    pub end_of_stream: bool,
}

fn checked_width(width: u8) -> Result<usize> {
    match width {
        1 | 2 => Ok(width as usize),
        other => invalid_parameter(format!("sample width must be 1 or 2, got {}", other)),
    }
}

/// Reads up to `buf.len()` samples of `width` bytes each, interpreting each
/// sample as unsigned big-endian.
///
/// If fewer than `buf.len()` samples were available and the stream ended
/// exactly on a sample boundary, `end_of_stream` is set. If the stream ends
/// partway through a sample, that is corruption, not end-of-stream.
pub fn read_samples<R: io::Read>(reader: &mut R, buf: &mut [u32], width: u8) -> Result<ReadOutcome> {
    let width = checked_width(width)?;
    let mut raw = [0u8; 2];
    let mut samples_read = 0;

    for slot in buf.iter_mut() {
        let mut filled = 0;
        while filled < width {
            let n = reader.read(&mut raw[filled..width])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(ReadOutcome {
                        samples_read,
                        end_of_stream: true,
                    });
                }
                return corrupted_data("sample stream ended mid-sample");
            }
            filled += n;
        }

        let value = match width {
            1 => raw[0] as u32,
            2 => u16::from_be_bytes([raw[0], raw[1]]) as u32,
            _ => unreachable!("checked_width only returns 1 or 2"),
        };
        *slot = value;
        samples_read += 1;
    }

    Ok(ReadOutcome {
        samples_read,
        end_of_stream: false,
    })
}

/// Writes `samples` as `width`-byte big-endian unsigned integers. Always
/// writes the full width for every sample; there is no short-write mode.
pub fn write_samples<W: io::Write>(writer: &mut W, samples: &[u32], width: u8) -> Result<()> {
    let width = checked_width(width)?;
    for &sample in samples {
        match width {
            1 => {
                if sample > 0xFF {
                    return corrupted_data(format!("sample {} does not fit in 1 byte", sample));
                }
                writer.write_all(&[sample as u8])?;
            }
            2 => {
                if sample > 0xFFFF {
                    return corrupted_data(format!("sample {} does not fit in 2 bytes", sample));
                }
                writer.write_all(&(sample as u16).to_be_bytes())?;
            }
            _ => unreachable!("checked_width only returns 1 or 2"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_1_byte_samples() {
        let data = [0x00u8, 0x01, 0x02, 0xFF];
        let mut reader = Cursor::new(data);
        let mut buf = [0u32; 4];
        let outcome = read_samples(&mut reader, &mut buf, 1).unwrap();
        assert_eq!(outcome.samples_read, 4);
        assert!(!outcome.end_of_stream);
        assert_eq!(buf, [0, 1, 2, 255]);
    }

    #[test]
    fn reads_2_byte_samples_big_endian() {
        let data = [0x01u8, 0x00, 0xFF, 0xFF];
        let mut reader = Cursor::new(data);
        let mut buf = [0u32; 2];
        let outcome = read_samples(&mut reader, &mut buf, 2).unwrap();
        assert_eq!(outcome.samples_read, 2);
        assert_eq!(buf, [256, 65535]);
    }

    #[test]
    fn clean_eos_on_sample_boundary() {
        let data = [0x00u8, 0x01];
        let mut reader = Cursor::new(data);
        let mut buf = [0u32; 4];
        let outcome = read_samples(&mut reader, &mut buf, 1).unwrap();
        assert_eq!(outcome.samples_read, 2);
        assert!(outcome.end_of_stream);
    }

    #[test]
    fn mid_sample_eof_is_corruption() {
        let data = [0x00u8];
        let mut reader = Cursor::new(data);
        let mut buf = [0u32; 1];
        let result = read_samples(&mut reader, &mut buf, 2);
        assert!(matches!(result, Err(crate::Error::CorruptedData(_))));
    }

    #[test]
    fn round_trips_through_write_and_read() {
        let samples = [0u32, 1, 2, 300, 65535];
        let mut out = Vec::new();
        write_samples(&mut out, &samples, 2).unwrap();

        let mut reader = Cursor::new(out);
        let mut buf = [0u32; 5];
        let outcome = read_samples(&mut reader, &mut buf, 2).unwrap();
        assert_eq!(outcome.samples_read, 5);
        assert_eq!(buf, samples);
    }

    #[test]
    fn rejects_invalid_width() {
        let mut reader = Cursor::new([0u8; 4]);
        let mut buf = [0u32; 1];
        let result = read_samples(&mut reader, &mut buf, 3);
        assert!(matches!(result, Err(crate::Error::InvalidParameter(_))));
    }
}
