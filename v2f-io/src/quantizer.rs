//! Uniform scalar quantizer (spec 4.2).

use crate::{invalid_parameter, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizerMode {
    None,
    Uniform,
}

/// `{mode, step_size, max_sample_value}`. Immutable after construction;
/// the only invariant enforced at construction time is `mode = none =>
/// step_size = 1`. `quantize`/`dequantize` never fail once a `Quantizer`
/// exists.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    mode: QuantizerMode,
    step_size: u16,
    max_sample_value: u32,
}

impl Quantizer {
    pub fn new(mode: QuantizerMode, step_size: u16, max_sample_value: u32) -> Result<Self> {
        if step_size == 0 || step_size > 255 {
            return invalid_parameter(format!(
                "quantizer step_size must be in [1,255], got {}",
                step_size
            ));
        }
        if mode == QuantizerMode::None && step_size != 1 {
            return invalid_parameter("quantizer mode none requires step_size = 1");
        }
        Ok(Self {
            mode,
            step_size,
            max_sample_value,
        })
    }

    pub fn mode(&self) -> QuantizerMode {
        self.mode
    }

    pub fn step_size(&self) -> u16 {
        self.step_size
    }

    pub fn max_sample_value(&self) -> u32 {
        self.max_sample_value
    }

    fn is_identity(&self) -> bool {
        self.mode == QuantizerMode::None || self.step_size == 1
    }

    /// Quantizes samples in place.
    pub fn quantize(&self, samples: &mut [u32]) {
        if self.is_identity() {
            return;
        }
        let step = self.step_size as u32;
        match step {
            2 | 4 | 8 => {
                let shift = step.trailing_zeros();
                for s in samples.iter_mut() {
                    *s >>= shift;
                }
            }
            _ => {
                for s in samples.iter_mut() {
                    *s /= step;
                }
            }
        }
    }

    /// Dequantizes samples in place: midpoint reconstruction, clamped to
    /// `max_sample_value` to cover a possibly incomplete last bin.
    pub fn dequantize(&self, samples: &mut [u32]) {
        if self.is_identity() {
            return;
        }
        let step = self.step_size as u32;
        let midpoint = step / 2;
        for s in samples.iter_mut() {
            let reconstructed = *s * step + midpoint;
            *s = reconstructed.min(self.max_sample_value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_mode_requires_step_one() {
        assert!(Quantizer::new(QuantizerMode::None, 2, 255).is_err());
        assert!(Quantizer::new(QuantizerMode::None, 1, 255).is_ok());
    }

    #[test]
    fn step_out_of_range_is_invalid() {
        assert!(Quantizer::new(QuantizerMode::Uniform, 0, 255).is_err());
        assert!(Quantizer::new(QuantizerMode::Uniform, 256, 255).is_err());
    }

    #[test]
    fn step_one_is_identity() {
        let q = Quantizer::new(QuantizerMode::Uniform, 1, 255).unwrap();
        let mut samples = [0u32, 1, 2, 255];
        let original = samples;
        q.quantize(&mut samples);
        assert_eq!(samples, original);
        q.dequantize(&mut samples);
        assert_eq!(samples, original);
    }

    #[test]
    fn power_of_two_step_uses_shift() {
        let q = Quantizer::new(QuantizerMode::Uniform, 4, 255).unwrap();
        let mut samples = [0u32, 1, 2, 3, 4, 15];
        q.quantize(&mut samples);
        assert_eq!(samples, [0, 0, 0, 0, 1, 3]);
    }

    #[test]
    fn non_power_of_two_step_divides() {
        let q = Quantizer::new(QuantizerMode::Uniform, 3, 255).unwrap();
        let mut samples = [0u32, 1, 2, 3, 4, 5];
        q.quantize(&mut samples);
        assert_eq!(samples, [0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn dequantize_clamps_to_max_sample_value() {
        let q = Quantizer::new(QuantizerMode::Uniform, 4, 255).unwrap();
        let mut samples = [63u32];
        q.dequantize(&mut samples);
        assert_eq!(samples, [255]);
    }

    #[test]
    fn lossy_round_trip_bound_from_spec_scenario_3() {
        let q = Quantizer::new(QuantizerMode::Uniform, 4, 255).unwrap();
        let original: Vec<u32> = (0..16).collect();
        let mut samples = original.clone();
        q.quantize(&mut samples);
        assert_eq!(samples, [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
        q.dequantize(&mut samples);
        assert_eq!(
            samples,
            [2, 2, 2, 2, 6, 6, 6, 6, 10, 10, 10, 10, 14, 14, 14, 14]
        );
        for (r, s) in samples.iter().zip(original.iter()) {
            assert!((*r as i64 - *s as i64).abs() <= 2);
        }
    }
}
