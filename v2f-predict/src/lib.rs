#![allow(dead_code)]

//! Prediction-residual mapping and the four neighbor-based decorrelators
//! (spec 4.3, 4.4) — the "predictive decorrelator" half of the codec core.

pub mod decorrelator;
pub mod residual;

pub use decorrelator::{Decorrelator, DecorrelatorMode};
pub use residual::{map, unmap};
