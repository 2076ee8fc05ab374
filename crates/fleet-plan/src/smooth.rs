//! Length-preserving path smoothing.
//!
//! Both strategies return exactly as many points as they are given, so the
//! step index of every waypoint survives smoothing.  Headings are recomputed
//! afterwards from forward differences:
//!
//! ```text
//! heading[i]   = heading_of(p[i+1] − p[i])     for i < n − 1
//! heading[n−1] = heading[n−2]                  (0° for a single point)
//! ```

use fleet_core::{Smoothing, Vec2, Waypoint, heading_of};

/// Applies the configured [`Smoothing`] strategy to finalized paths.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PathSmoother {
    method: Smoothing,
}

impl PathSmoother {
    pub fn new(method: Smoothing) -> Self {
        Self { method }
    }

    #[inline]
    pub fn method(&self) -> Smoothing {
        self.method
    }

    /// Smoothed copy of `path`.  `Smoothing::None` returns the input
    /// unchanged, headings included.
    pub fn smooth(&self, path: &[Waypoint]) -> Vec<Waypoint> {
        let points: Vec<Vec2> = path.iter().map(|w| w.pos).collect();
        let smoothed = match self.method {
            Smoothing::None => return path.to_vec(),
            Smoothing::MovingAverage { window } => moving_average(&points, window),
            Smoothing::Spline { factor } => spline(&points, factor),
        };
        let headings = forward_headings(&smoothed);
        path.iter()
            .zip(smoothed)
            .zip(headings)
            .map(|((w, pos), heading)| Waypoint::new(pos, w.step, heading))
            .collect()
    }
}

// ── Moving average ────────────────────────────────────────────────────────────

/// Centered moving average over `[i − w/2, i + w/2]`, truncated at both ends
/// of the path.  Paths shorter than `window` come back unchanged.
pub fn moving_average(points: &[Vec2], window: usize) -> Vec<Vec2> {
    let n = points.len();
    if window == 0 || n < window {
        return points.to_vec();
    }
    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            let sum = points[lo..hi].iter().fold(Vec2::ZERO, |acc, p| acc + *p);
            sum / (hi - lo) as f64
        })
        .collect()
}

// ── Penalized spline ──────────────────────────────────────────────────────────

/// Discrete smoothing spline resampled at uniform arc length.
///
/// Each coordinate is fitted independently by minimizing
///
/// ```text
/// Σ (pᵢ − fᵢ)²  +  factor · Σ (fᵢ₋₁ − 2fᵢ + fᵢ₊₁)²
/// ```
///
/// which reduces to the pentadiagonal system `(I + factor·DᵀD) f = p`.  The
/// fitted curve is then resampled at `n` points evenly spaced along its
/// chord length, so endpoints stay on the fit and spacing is uniform.  Paths
/// with fewer than 3 points come back unchanged.
pub fn spline(points: &[Vec2], factor: f64) -> Vec<Vec2> {
    let n = points.len();
    if n < 3 || !(factor.is_finite() && factor >= 0.0) {
        return points.to_vec();
    }
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let fitted: Vec<Vec2> = whittaker(&xs, factor)
        .into_iter()
        .zip(whittaker(&ys, factor))
        .map(|(x, y)| Vec2::new(x, y))
        .collect();
    resample_uniform(&fitted, n)
}

/// Solve `(I + λ·DᵀD) f = values` with a banded Cholesky factorization.
/// `D` is the second-difference operator; the matrix has half-bandwidth 2.
fn whittaker(values: &[f64], lambda: f64) -> Vec<f64> {
    const SECOND_DIFF: [f64; 3] = [1.0, -2.0, 1.0];

    let n = values.len();
    // band[i][d] holds A[i][i − d].
    let mut band = vec![[0.0f64; 3]; n];
    for row in band.iter_mut() {
        row[0] = 1.0;
    }
    for k in 0..n.saturating_sub(2) {
        for a in 0..3 {
            for b in 0..=a {
                band[k + a][a - b] += lambda * SECOND_DIFF[a] * SECOND_DIFF[b];
            }
        }
    }

    // In-place factorization: band becomes L with the same layout.
    for i in 0..n {
        for d in (0..=i.min(2)).rev() {
            let j = i - d;
            let mut sum = band[i][d];
            for k in i.saturating_sub(2)..j {
                sum -= band[i][i - k] * band[j][j - k];
            }
            if d == 0 {
                band[i][0] = sum.max(f64::MIN_POSITIVE).sqrt();
            } else {
                band[i][d] = sum / band[j][0];
            }
        }
    }

    // L y = values
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = values[i];
        for k in i.saturating_sub(2)..i {
            sum -= band[i][i - k] * y[k];
        }
        y[i] = sum / band[i][0];
    }
    // Lᵀ f = y
    let mut f = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in i + 1..(i + 3).min(n) {
            sum -= band[k][k - i] * f[k];
        }
        f[i] = sum / band[i][0];
    }
    f
}

/// `count` points evenly spaced by arc length along the polyline `points`.
fn resample_uniform(points: &[Vec2], count: usize) -> Vec<Vec2> {
    let mut arc = Vec::with_capacity(points.len());
    arc.push(0.0);
    for w in points.windows(2) {
        let last = arc[arc.len() - 1];
        arc.push(last + w[0].distance(w[1]));
    }
    let total = arc[arc.len() - 1];
    if total <= 0.0 || count < 2 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(count);
    let mut seg = 0;
    for j in 0..count {
        let s = total * j as f64 / (count - 1) as f64;
        while seg + 2 < points.len() && arc[seg + 1] < s {
            seg += 1;
        }
        let span = arc[seg + 1] - arc[seg];
        let t = if span > 0.0 { ((s - arc[seg]) / span).clamp(0.0, 1.0) } else { 0.0 };
        out.push(points[seg] + (points[seg + 1] - points[seg]) * t);
    }
    out
}

// ── Headings ──────────────────────────────────────────────────────────────────

/// Per-point headings from forward differences (see the module docs).
pub fn forward_headings(points: &[Vec2]) -> Vec<f64> {
    let mut out: Vec<f64> = points
        .windows(2)
        .map(|w| heading_of(w[1].x - w[0].x, w[1].y - w[0].y))
        .collect();
    match out.last().copied() {
        Some(h) => out.push(h),
        None if !points.is_empty() => out.push(0.0),
        None => {}
    }
    out
}
