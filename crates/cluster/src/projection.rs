//! Two-dimensional projection of a distance matrix for visual inspection.
//!
//! Classical multidimensional scaling: the squared distances are double
//! centered and the two dominant eigenpairs, found by power iteration with
//! deflation, give the coordinates. The projection is purely diagnostic and
//! never feeds back into clustering.

use std::fmt::Write as _;

use ndarray::{Array1, Array2, Axis};

use crate::matrix::DistanceMatrix;
use crate::types::{ClusterError, Label};

const MAX_ITERATIONS: usize = 500;
const TOLERANCE: f64 = 1e-12;

const SVG_WIDTH: f64 = 800.0;
const SVG_HEIGHT: f64 = 600.0;
const SVG_MARGIN: f64 = 60.0;

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Project every document of `matrix` onto the plane.
///
/// Deterministic for a given matrix. Collections of fewer than two documents
/// sit at the origin.
pub fn project_2d(matrix: &DistanceMatrix) -> Vec<(f64, f64)> {
    let n = matrix.len();
    if n < 2 {
        return vec![(0.0, 0.0); n];
    }

    let mut gram = double_centered(matrix.as_array());
    let (lambda_x, axis_x) = dominant_eigenpair(&gram);
    deflate(&mut gram, lambda_x, &axis_x);
    let (lambda_y, axis_y) = dominant_eigenpair(&gram);

    let scale_x = lambda_x.max(0.0).sqrt();
    let scale_y = lambda_y.max(0.0).sqrt();
    axis_x
        .iter()
        .zip(axis_y.iter())
        .map(|(x, y)| (x * scale_x, y * scale_y))
        .collect()
}

/// `B = -1/2 * J * D^2 * J` with `J` the centering matrix.
fn double_centered(distances: &Array2<f64>) -> Array2<f64> {
    let squared = distances.mapv(|d| d * d);
    let row_means = squared.mean_axis(Axis(1)).unwrap_or_else(|| Array1::zeros(0));
    let col_means = squared.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(0));
    let grand_mean = squared.mean().unwrap_or(0.0);

    let mut gram = squared;
    for ((i, j), value) in gram.indexed_iter_mut() {
        *value = -0.5 * (*value - row_means[i] - col_means[j] + grand_mean);
    }
    gram
}

/// Largest algebraic eigenvalue and its unit eigenvector of a symmetric
/// matrix.
fn dominant_eigenpair(m: &Array2<f64>) -> (f64, Array1<f64>) {
    let n = m.nrows();
    // Shift by a Gershgorin bound so every eigenvalue is non-negative and the
    // power iteration converges to the largest algebraic one.
    let shift = m
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0_f64, f64::max);
    let mut shifted = m.clone();
    for i in 0..n {
        shifted[[i, i]] += shift;
    }

    let mut v = Array1::from_shape_fn(n, |i| 1.0 + (i as f64 + 1.0).sqrt().fract());
    normalize(&mut v);
    for _ in 0..MAX_ITERATIONS {
        let mut next = shifted.dot(&v);
        if !normalize(&mut next) {
            return (0.0, Array1::zeros(n));
        }
        let delta = (&next - &v).mapv(f64::abs).sum();
        v = next;
        if delta < TOLERANCE {
            break;
        }
    }

    orient(&mut v);
    let lambda = v.dot(&m.dot(&v));
    (lambda, v)
}

fn deflate(m: &mut Array2<f64>, lambda: f64, v: &Array1<f64>) {
    for ((i, j), value) in m.indexed_iter_mut() {
        *value -= lambda * v[i] * v[j];
    }
}

/// Scale to unit length; false when the vector is (numerically) zero.
fn normalize(v: &mut Array1<f64>) -> bool {
    let norm = v.dot(&*v).sqrt();
    if norm < TOLERANCE {
        return false;
    }
    v.mapv_inplace(|x| x / norm);
    true
}

/// Fix the sign so the component of largest magnitude is positive.
fn orient(v: &mut Array1<f64>) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

/// Render projected points as a standalone SVG scatter plot, colored by
/// label and annotated with document names.
pub fn render_svg<S: AsRef<str>>(
    points: &[(f64, f64)],
    labels: &[Label],
    names: &[S],
) -> Result<String, ClusterError> {
    if points.len() != labels.len() || points.len() != names.len() {
        return Err(ClusterError::LengthMismatch {
            names: names.len(),
            labels: labels.len().min(points.len()),
        });
    }

    let (min_x, max_x) = bounds(points.iter().map(|p| p.0));
    let (min_y, max_y) = bounds(points.iter().map(|p| p.1));
    let span_x = (max_x - min_x).max(f64::EPSILON);
    let span_y = (max_y - min_y).max(f64::EPSILON);
    let plot_w = SVG_WIDTH - 2.0 * SVG_MARGIN;
    let plot_h = SVG_HEIGHT - 2.0 * SVG_MARGIN;

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SVG_WIDTH}" height="{SVG_HEIGHT}" viewBox="0 0 {SVG_WIDTH} {SVG_HEIGHT}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    for (((x, y), label), name) in points.iter().zip(labels).zip(names) {
        let px = if points.len() > 1 && max_x > min_x {
            SVG_MARGIN + (x - min_x) / span_x * plot_w
        } else {
            SVG_WIDTH / 2.0
        };
        let py = if points.len() > 1 && max_y > min_y {
            SVG_HEIGHT - SVG_MARGIN - (y - min_y) / span_y * plot_h
        } else {
            SVG_HEIGHT / 2.0
        };
        let color = PALETTE[label % PALETTE.len()];
        let _ = writeln!(
            svg,
            r#"<circle cx="{px:.2}" cy="{py:.2}" r="6" fill="{color}" fill-opacity="0.8"><title>cluster {label}</title></circle>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="9">{}</text>"#,
            px + 8.0,
            py + 3.0,
            escape_xml(name.as_ref())
        );
    }
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
