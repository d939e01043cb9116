//! Four neighbor-based predictors applied over a flat buffer interpreted as
//! a row-major raster (spec 4.4).

use v2f_io::{invalid_parameter, Error, Result};

use crate::residual::{map, unmap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorrelatorMode {
    None,
    Left,
    TwoLeft,
    JpegLs,
    Fgij,
}

/// `{mode, max_sample_value, samples_per_row}`. For `jpeg-ls` and `fgij`,
/// `samples_per_row` must be positive and must evenly divide the block
/// length. `left` and `2-left` accept `samples_per_row = 0`, meaning "treat
/// the whole block as one row" (spec 9, open question).
#[derive(Debug, Clone, Copy)]
pub struct Decorrelator {
    mode: DecorrelatorMode,
    max_sample_value: u32,
    samples_per_row: usize,
}

impl Decorrelator {
    pub fn new(
        mode: DecorrelatorMode,
        max_sample_value: u32,
        samples_per_row: usize,
    ) -> Result<Self> {
        if matches!(mode, DecorrelatorMode::JpegLs | DecorrelatorMode::Fgij) && samples_per_row == 0
        {
            return invalid_parameter(
                "jpeg-ls and fgij decorrelators require samples_per_row > 0",
            );
        }
        Ok(Self {
            mode,
            max_sample_value,
            samples_per_row,
        })
    }

    pub fn mode(&self) -> DecorrelatorMode {
        self.mode
    }

    fn effective_width(&self, len: usize) -> Result<usize> {
        let width = if self.samples_per_row == 0 {
            len
        } else {
            self.samples_per_row
        };
        if width == 0 {
            return invalid_parameter("decorrelator width resolved to zero");
        }
        if matches!(self.mode, DecorrelatorMode::JpegLs | DecorrelatorMode::Fgij)
            && len % width != 0
        {
            return invalid_parameter(format!(
                "block length {} is not a multiple of samples_per_row {}",
                len, width
            ));
        }
        Ok(width)
    }

    fn check_range(&self, value: u32) -> Result<()> {
        if value > self.max_sample_value {
            return Err(Error::CorruptedData(format!(
                "sample {} exceeds max_sample_value {}",
                value, self.max_sample_value
            )));
        }
        Ok(())
    }

    /// Applies the forward transform in place, replacing each sample with
    /// its mapped residual code. Predictions for positions that have
    /// already been overwritten in this pass read from `source`, an
    /// untouched copy of the input.
    pub fn decorrelate(&self, buf: &mut [u32]) -> Result<()> {
        if matches!(self.mode, DecorrelatorMode::None) {
            return Ok(());
        }
        let width = self.effective_width(buf.len())?;
        let source = buf.to_vec();
        let m = self.max_sample_value;

        for i in 0..buf.len() {
            self.check_range(source[i])?;
            let prediction = self.predict(&source, i, width);
            buf[i] = map(source[i], prediction, m);
        }
        Ok(())
    }

    /// Inverts the forward transform in place. Unlike the forward pass, the
    /// inverse can read already-decoded positions directly from `buf`
    /// because decoding proceeds in the same order predictions are
    /// consumed.
    pub fn invert(&self, buf: &mut [u32]) -> Result<()> {
        if matches!(self.mode, DecorrelatorMode::None) {
            return Ok(());
        }
        let width = self.effective_width(buf.len())?;
        let m = self.max_sample_value;

        for i in 0..buf.len() {
            let prediction = self.predict(buf, i, width);
            buf[i] = unmap(buf[i], prediction, m);
        }
        Ok(())
    }

    fn predict(&self, buf: &[u32], i: usize, width: usize) -> u32 {
        match self.mode {
            DecorrelatorMode::None => 0,
            DecorrelatorMode::Left => self.predict_left(buf, i),
            DecorrelatorMode::TwoLeft => self.predict_two_left(buf, i),
            DecorrelatorMode::JpegLs => self.predict_jpeg_ls(buf, i, width),
            DecorrelatorMode::Fgij => self.predict_fgij(buf, i, width),
        }
    }

    fn predict_left(&self, buf: &[u32], i: usize) -> u32 {
        if i == 0 {
            0
        } else {
            buf[i - 1]
        }
    }

    fn predict_two_left(&self, buf: &[u32], i: usize) -> u32 {
        let a = if i >= 1 { buf[i - 1] } else { 0 };
        let b = if i >= 2 { buf[i - 2] } else { 0 };
        (a + b + 1) >> 1
    }

    fn predict_jpeg_ls(&self, buf: &[u32], i: usize, width: usize) -> u32 {
        let row = i / width;
        let col = i % width;

        if row == 0 {
            if col == 0 {
                return 0;
            }
            return buf[i - 1]; // West
        }
        if col == 0 {
            return buf[i - width]; // North
        }

        let a = buf[i - 1] as i64; // West
        let b = buf[i - width] as i64; // North
        let c = buf[i - width - 1] as i64; // North-West

        let predicted = if c >= a.max(b) {
            a.min(b)
        } else if c <= a.min(b) {
            a.max(b)
        } else {
            a + b - c
        };
        predicted as u32
    }

    fn predict_fgij(&self, buf: &[u32], i: usize, width: usize) -> u32 {
        let row = i / width;
        let col = i % width;

        if i == 0 {
            return 0;
        }
        if row == 0 {
            if col == 1 {
                return buf[0];
            }
            return (buf[i - 1] + buf[i - 2]) >> 1; // (left + left-left) >> 1
        }
        if col == 0 {
            return buf[i - width]; // North
        }
        if col == 1 {
            let n = buf[i - width] as u64;
            let nw = buf[i - width - 1] as u64;
            let w = buf[i - 1] as u64;
            return ((n + nw + w) / 3) as u32;
        }

        let w = buf[i - 1] as u64;
        let ww = buf[i - 2] as u64;
        let n = buf[i - width] as u64;
        let nw = buf[i - width - 1] as u64;
        ((w + ww + n + nw) >> 2) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(mode: DecorrelatorMode, max_sample_value: u32, width: usize, samples: &[u32]) {
        let decorrelator = Decorrelator::new(mode, max_sample_value, width).unwrap();
        let mut buf = samples.to_vec();
        decorrelator.decorrelate(&mut buf).unwrap();
        decorrelator.invert(&mut buf).unwrap();
        assert_eq!(buf, samples);
    }

    #[test]
    fn none_mode_is_identity() {
        round_trip(DecorrelatorMode::None, 255, 0, &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn left_mode_round_trips() {
        round_trip(DecorrelatorMode::Left, 255, 0, &[10, 12, 14, 16, 18]);
        round_trip(DecorrelatorMode::Left, 255, 0, &[0, 255, 0, 255]);
    }

    #[test]
    fn two_left_mode_round_trips() {
        round_trip(DecorrelatorMode::TwoLeft, 255, 0, &[10, 12, 14, 16, 18, 1, 200]);
    }

    #[test]
    fn jpeg_ls_mode_round_trips_2x4_buffer() {
        // Spec 8, scenario 4.
        round_trip(
            DecorrelatorMode::JpegLs,
            255,
            4,
            &[0x10, 0x12, 0x14, 0x16, 0x18, 0x1A, 0x1C, 0x1E],
        );
    }

    #[test]
    fn jpeg_ls_first_row_and_column_predictions() {
        let d = Decorrelator::new(DecorrelatorMode::JpegLs, 255, 4).unwrap();
        let buf = [0x10u32, 0x12, 0x14, 0x16, 0x18, 0x1A, 0x1C, 0x1E];
        assert_eq!(d.predict(&buf, 0, 4), 0);
        assert_eq!(d.predict(&buf, 1, 4), 0x10);
        assert_eq!(d.predict(&buf, 2, 4), 0x12);
        assert_eq!(d.predict(&buf, 3, 4), 0x14);
        // second row, first column predicts North
        assert_eq!(d.predict(&buf, 4, 4), 0x10);
    }

    #[test]
    fn fgij_mode_round_trips() {
        round_trip(
            DecorrelatorMode::Fgij,
            255,
            4,
            &[10, 20, 30, 40, 15, 25, 35, 45, 12, 22, 32, 42],
        );
    }

    #[test]
    fn jpeg_ls_and_fgij_require_positive_width() {
        assert!(Decorrelator::new(DecorrelatorMode::JpegLs, 255, 0).is_err());
        assert!(Decorrelator::new(DecorrelatorMode::Fgij, 255, 0).is_err());
    }

    #[test]
    fn two_left_accepts_zero_width_as_whole_block() {
        assert!(Decorrelator::new(DecorrelatorMode::TwoLeft, 255, 0).is_ok());
    }

    #[test]
    fn forward_rejects_out_of_range_sample() {
        let d = Decorrelator::new(DecorrelatorMode::Left, 255, 0).unwrap();
        let mut buf = vec![300u32];
        assert!(matches!(
            d.decorrelate(&mut buf),
            Err(Error::CorruptedData(_))
        ));
    }
}
