//! Knee ("elbow") detection on a monotone curve.

use thiserror::Error;

const DEGENERATE_RANGE: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum KneeError {
    #[error("need at least 3 points, got {points}")]
    TooFewPoints { points: usize },
    #[error("got {xs} x values but {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("the {axis} values span no range")]
    FlatAxis { axis: char },
    #[error("first and last values coincide")]
    DegenerateChord,
    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },
}

/// Returns the index of the knee of the curve `(xs[i], ys[i])`.
///
/// Both axes are rescaled to [0, 1]; the knee is the point farthest from the
/// straight line through the first and last rescaled points. Ties resolve to the
/// lowest index. A curve whose first and last values coincide has no usable line.
pub fn find_knee(xs: &[f64], ys: &[f64]) -> Result<usize, KneeError> {
    if xs.len() != ys.len() {
        return Err(KneeError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < 3 {
        return Err(KneeError::TooFewPoints { points: xs.len() });
    }
    if let Some(index) = xs
        .iter()
        .zip(ys)
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(KneeError::NonFinite { index });
    }

    let xs = normalize(xs).ok_or(KneeError::FlatAxis { axis: 'x' })?;
    let ys = normalize(ys).ok_or(KneeError::FlatAxis { axis: 'y' })?;

    let last = xs.len() - 1;
    let (x0, y0) = (xs[0], ys[0]);
    let (dx, dy) = (xs[last] - x0, ys[last] - y0);
    let chord = dx.hypot(dy);
    if dy.abs() < DEGENERATE_RANGE || chord < DEGENERATE_RANGE {
        return Err(KneeError::DegenerateChord);
    }

    let mut best = (0, f64::NEG_INFINITY);
    for (i, (x, y)) in xs.iter().zip(&ys).enumerate() {
        let distance = (dx * (y0 - y) - dy * (x0 - x)).abs() / chord;
        if distance > best.1 {
            best = (i, distance);
        }
    }
    Ok(best.0)
}

fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    (range > DEGENERATE_RANGE).then(|| values.iter().map(|v| (v - min) / range).collect())
}
