//! File codec driver: the compress/decompress loop over a raw sample stream
//! and a compressed envelope stream (spec 4.9).

use std::io;

use v2f_forest::{decode_block, encode_block};
use v2f_io::{
    read_envelope, read_samples, write_envelope, write_samples, Quantizer, QuantizerMode, Result,
    MAX_BLOCK_SIZE,
};
use v2f_predict::{Decorrelator, DecorrelatorMode};

use crate::header::Header;

/// Caller-supplied overrides for the values the header file would
/// otherwise provide (spec 6.4 CLI flags `-q -s -d -w`). `None` means "use
/// the header's value".
#[derive(Debug, Clone, Default)]
pub struct CodecOverrides {
    pub quantizer_mode: Option<QuantizerMode>,
    pub quantizer_step_size: Option<u16>,
    pub decorrelator_mode: Option<DecorrelatorMode>,
    pub samples_per_row: Option<usize>,
}

/// The resolved, ready-to-run parameters for one compress or decompress
/// call: a header's forest plus the quantizer/decorrelator it implies once
/// overrides are applied.
pub struct Codec {
    header: Header,
    quantizer: Quantizer,
    decorrelator: Decorrelator,
    bytes_per_sample: u8,
}

impl Codec {
    pub fn new(header: Header, overrides: &CodecOverrides) -> Result<Self> {
        let quantizer_mode = overrides.quantizer_mode.unwrap_or(header.quantizer_mode);
        let quantizer_step_size = overrides
            .quantizer_step_size
            .unwrap_or(header.quantizer_step_size);
        let decorrelator_mode = overrides
            .decorrelator_mode
            .unwrap_or(header.decorrelator_mode);
        let samples_per_row = overrides.samples_per_row.unwrap_or(0);

        let quantizer = Quantizer::new(quantizer_mode, quantizer_step_size, header.max_sample_value)?;
        let decorrelator = Decorrelator::new(decorrelator_mode, header.max_sample_value, samples_per_row)?;
        let bytes_per_sample = header.forest.bytes_per_sample();

        Ok(Self {
            header,
            quantizer,
            decorrelator,
            bytes_per_sample,
        })
    }

    /// Compresses a full raw sample stream to a compressed envelope stream.
    pub fn compress<R: io::Read, W: io::Write>(&self, reader: &mut R, writer: &mut W) -> Result<()> {
        let mut buf = vec![0u32; MAX_BLOCK_SIZE];
        loop {
            let outcome = read_samples(reader, &mut buf, self.bytes_per_sample)?;
            if outcome.samples_read == 0 {
                if outcome.end_of_stream {
                    break;
                }
                return v2f_io::corrupted_data("raw sample stream ended mid-block with no samples read");
            }

            let block = &mut buf[..outcome.samples_read];
            self.quantizer.quantize(block);
            self.decorrelator.decorrelate(block)?;

            let symbols: Vec<u32> = block.to_vec();
            let compressed_bitstream = encode_block(&self.header.forest, &symbols)?;

            write_envelope(writer, outcome.samples_read as u32, &compressed_bitstream)?;

            log::debug!(
                "compressed block of {} samples to {} bytes",
                outcome.samples_read,
                symbols.len()
            );

            if outcome.end_of_stream {
                break;
            }
        }
        Ok(())
    }

    /// Decompresses a full compressed envelope stream to a raw sample
    /// stream.
    pub fn decompress<R: io::Read, W: io::Write>(&self, reader: &mut R, writer: &mut W) -> Result<()> {
        while let Some(envelope) = read_envelope(reader)? {
            let mut samples = decode_block(
                &self.header.forest,
                &envelope.compressed_bitstream,
                envelope.sample_count as usize,
            )?;

            self.decorrelator.invert(&mut samples)?;
            self.quantizer.dequantize(&mut samples);

            write_samples(writer, &samples, self.bytes_per_sample)?;

            log::debug!(
                "decompressed envelope of {} bytes to {} samples",
                envelope.compressed_bitstream.len(),
                samples.len()
            );
        }
        Ok(())
    }
}
