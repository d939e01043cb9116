//! Codec-definition (header) file parsing and writing (spec 6.1, non-forest
//! fields). The inline forest section is handled by `v2f_forest::serializer`.

use std::io;

use v2f_forest::{read_forest, write_forest, Forest};
use v2f_io::{corrupted_data, feature_not_implemented, invalid_parameter, QuantizerMode, Result};
use v2f_predict::DecorrelatorMode;

/// A fully parsed codec descriptor: quantizer + decorrelator parameters
/// plus the forest they code against.
#[derive(Debug, Clone)]
pub struct Header {
    pub quantizer_mode: QuantizerMode,
    pub quantizer_step_size: u16,
    pub decorrelator_mode: DecorrelatorMode,
    pub max_sample_value: u32,
    pub forest: Forest,
}

fn read_u8<R: io::Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: io::Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32<R: io::Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn decorrelator_mode_from_u16(value: u16) -> Result<DecorrelatorMode> {
    match value {
        0 => Ok(DecorrelatorMode::None),
        1 => Ok(DecorrelatorMode::Left),
        2 => Ok(DecorrelatorMode::TwoLeft),
        3 => Ok(DecorrelatorMode::JpegLs),
        4 => Ok(DecorrelatorMode::Fgij),
        other => corrupted_data(format!("decorrelator_mode {} out of range [0,4]", other)),
    }
}

fn decorrelator_mode_to_u16(mode: DecorrelatorMode) -> u16 {
    match mode {
        DecorrelatorMode::None => 0,
        DecorrelatorMode::Left => 1,
        DecorrelatorMode::TwoLeft => 2,
        DecorrelatorMode::JpegLs => 3,
        DecorrelatorMode::Fgij => 4,
    }
}

impl Header {
    pub fn read<R: io::Read>(reader: &mut R) -> Result<Self> {
        let quantizer_mode_raw = read_u8(reader)?;
        let quantizer_mode = match quantizer_mode_raw {
            0 => QuantizerMode::None,
            1 => QuantizerMode::Uniform,
            other => return corrupted_data(format!("quantizer_mode {} out of range [0,1]", other)),
        };

        let quantizer_step_size_raw = read_u32(reader)?;
        if !(1..=255).contains(&quantizer_step_size_raw) {
            return corrupted_data(format!(
                "quantizer_step_size {} out of range [1,255]",
                quantizer_step_size_raw
            ));
        }
        let quantizer_step_size = quantizer_step_size_raw as u16;

        let decorrelator_mode = decorrelator_mode_from_u16(read_u16(reader)?)?;

        let max_sample_value = read_u32(reader)?;
        if !(1..=65535).contains(&max_sample_value) {
            return corrupted_data(format!(
                "max_sample_value {} out of range [1,65535]",
                max_sample_value
            ));
        }

        let forest_id = read_u32(reader)?;
        if forest_id != 0 {
            return feature_not_implemented(format!(
                "forest_id {} (only inline forests, forest_id = 0, are supported)",
                forest_id
            ));
        }

        let forest = read_forest(reader)?;
        if forest.max_sample_value() != max_sample_value {
            return corrupted_data(format!(
                "forest max_expected_value {} does not match header max_sample_value {}",
                forest.max_sample_value(),
                max_sample_value
            ));
        }

        log::debug!(
            "parsed header: quantizer={:?}/{}, decorrelator={:?}, max_sample_value={}",
            quantizer_mode,
            quantizer_step_size,
            decorrelator_mode,
            max_sample_value
        );

        Ok(Self {
            quantizer_mode,
            quantizer_step_size,
            decorrelator_mode,
            max_sample_value,
            forest,
        })
    }

    pub fn write<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        if self.quantizer_step_size == 0 || self.quantizer_step_size > 255 {
            return invalid_parameter("quantizer_step_size must be in [1,255]");
        }
        writer.write_all(&[match self.quantizer_mode {
            QuantizerMode::None => 0,
            QuantizerMode::Uniform => 1,
        }])?;
        writer.write_all(&(self.quantizer_step_size as u32).to_be_bytes())?;
        writer.write_all(&decorrelator_mode_to_u16(self.decorrelator_mode).to_be_bytes())?;
        writer.write_all(&self.max_sample_value.to_be_bytes())?;
        writer.write_all(&0u32.to_be_bytes())?; // forest_id = 0, inline forest follows.
        write_forest(writer, &self.forest)?;
        Ok(())
    }
}
