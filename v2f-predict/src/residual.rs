//! Prediction-residual mapping: the bijection between signed residuals and
//! non-negative codes within the sample dynamic range (spec 4.3).

/// Maps `(sample, prediction)` to a non-negative code in `[0, max_sample_value]`.
///
/// `theta = min(p, M - p)` splits the code space into an interleaved
/// two-sided region (`|d| <= theta`) and a single-sided tail toward whichever
/// end of the range is farther from `p`.
pub fn map(sample: u32, prediction: u32, max_sample_value: u32) -> u32 {
    let p = prediction as i64;
    let s = sample as i64;
    let m = max_sample_value as i64;
    let theta = p.min(m - p);
    let d = s - p;

    if d.unsigned_abs() as i64 <= theta {
        let magnitude = d.unsigned_abs() as i64;
        (2 * magnitude - i64::from(d < 0)) as u32
    } else {
        (theta + d.unsigned_abs() as i64) as u32
    }
}

/// Inverse of [`map`]: recovers `sample` from `(coded, prediction)`.
pub fn unmap(coded: u32, prediction: u32, max_sample_value: u32) -> u32 {
    let p = prediction as i64;
    let m = max_sample_value as i64;
    let theta = p.min(m - p);
    let coded = coded as i64;

    let d = if coded <= 2 * theta {
        if coded % 2 == 0 {
            coded / 2
        } else {
            -(coded + 1) / 2
        }
    } else if theta == p {
        coded - theta
    } else {
        theta - coded
    };

    (p + d) as u32
}
