//! Circle collision tests between entities
//!
//! Two metrics are available. `Euclidean` is the real center-to-center
//! distance. `LegacyAxis` reproduces the classic game's formula, which combines
//! the x coordinate of one entity with the x coordinate of the other and never
//! looks at y; it exists so the classic ruleset plays exactly as before.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// How the distance between two entity centers is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `trunc(sqrt(a.x² + b.x²))`
    LegacyAxis,
    /// `|a - b|`
    #[default]
    Euclidean,
}

/// Distance between two centers under `metric`
pub fn distance(metric: DistanceMetric, a: IVec2, b: IVec2) -> f64 {
    match metric {
        DistanceMetric::LegacyAxis => {
            let ax = f64::from(a.x);
            let bx = f64::from(b.x);
            (ax * ax + bx * bx).sqrt().trunc()
        }
        DistanceMetric::Euclidean => {
            let dx = f64::from(a.x) - f64::from(b.x);
            let dy = f64::from(a.y) - f64::from(b.y);
            (dx * dx + dy * dy).sqrt()
        }
    }
}

/// Collision threshold: each side contributes its diameter
#[inline]
pub fn contact_range(radius_a: i32, radius_b: i32) -> f64 {
    f64::from(radius_a) * 2.0 + f64::from(radius_b) * 2.0
}

/// True when two circles are strictly closer than their contact range
pub fn overlaps(metric: DistanceMetric, a: IVec2, radius_a: i32, b: IVec2, radius_b: i32) -> bool {
    distance(metric, a, b) < contact_range(radius_a, radius_b)
}
