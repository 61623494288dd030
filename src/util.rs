use crate::P2;

/// Quadrant of a point relative to the cut point of an internal node.
///
/// Quadrants are indexed TopLeft, TopRight, BottomLeft, BottomRight. A point on a cut
/// line belongs to the left/top side, which matches the first child whose inclusive
/// bounds contain it.
pub(crate) fn determine_quadrant(cut: &P2, point: &P2) -> usize {
    match (point.x <= cut.x, point.y <= cut.y) {
        (true, true) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (false, false) => 3,
    }
}

/// Arithmetic mean, `0.0` for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
