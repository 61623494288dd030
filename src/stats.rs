//! Per-leaf aggregate statistics.

use std::collections::{BTreeMap, BTreeSet};

use crate::{point::Point, util::mean, P2};

/// Aggregate statistics of a leaf's point collection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellStats {
    /// Sum of the weights of the leaf's points
    pub points_number: u64,
    /// Weighted centroid
    pub center_point: P2,
    /// Weighted mean Manhattan distance between distinct points, `0.0` for fewer than two
    pub avg_distance: f64,
    /// Tags occurring on more points than the mean tag does
    pub baseline_tags: BTreeSet<String>,
}

impl Default for CellStats {
    fn default() -> Self {
        Self {
            points_number: 0,
            center_point: P2::origin(),
            avg_distance: 0.0,
            baseline_tags: BTreeSet::new(),
        }
    }
}

impl CellStats {
    /// Recompute the numeric statistics from `points`, keeping the current baseline tags.
    ///
    /// An empty collection leaves the statistics untouched.
    pub(crate) fn update(&mut self, points: &[Point]) {
        if points.is_empty() {
            return;
        }

        let weights: Vec<f64> = points.iter().map(|p| f64::from(p.weight())).collect();
        let total: f64 = weights.iter().sum();
        self.points_number = points.iter().map(|p| u64::from(p.weight())).sum();

        self.center_point = if total > 0.0 {
            let (x, y) = points
                .iter()
                .zip(&weights)
                .fold((0.0, 0.0), |(x, y), (p, w)| (x + p.x() * w, y + p.y() * w));
            P2::new(x / total, y / total)
        } else {
            let xs: Vec<f64> = points.iter().map(Point::x).collect();
            let ys: Vec<f64> = points.iter().map(Point::y).collect();
            P2::new(mean(&xs), mean(&ys))
        };

        let mut distance = 0.0;
        let mut pair_weight = 0.0;
        for (i, a) in points.iter().enumerate() {
            for (j, b) in points.iter().enumerate().skip(i + 1) {
                let w = weights[i] * weights[j];
                distance += w * ((a.x() - b.x()).abs() + (a.y() - b.y()).abs());
                pair_weight += w;
            }
        }
        self.avg_distance = if pair_weight > 0.0 {
            distance / pair_weight
        } else {
            0.0
        };
    }
}

/// Tags whose occurrence count across `points` exceeds the mean occurrence count.
///
/// A tag repeated on a single point counts once for that point. **Returns** `None` when
/// no point carries any tag, so callers can keep a previously known baseline.
pub fn baseline_tags(points: &[Point]) -> Option<BTreeSet<String>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tags in points.iter().filter_map(Point::tags) {
        let unique: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
        for tag in unique {
            *counts.entry(tag).or_default() += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }

    let occurrences: Vec<f64> = counts.values().map(|&c| c as f64).collect();
    let average = mean(&occurrences);
    Some(
        counts
            .into_iter()
            .filter(|&(_, count)| count as f64 > average)
            .map(|(tag, _)| tag.to_owned())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn stats_of_unit_weight_points() {
        let points = [
            Point::new(0.0, 0.0, 1),
            Point::new(2.0, 0.0, 1),
            Point::new(0.0, 4.0, 1),
        ];
        let mut stats = CellStats::default();
        stats.update(&points);

        assert_eq!(stats.points_number, 3);
        assert!((stats.center_point.x - 2.0 / 3.0).abs() < 1e-12);
        assert!((stats.center_point.y - 4.0 / 3.0).abs() < 1e-12);
        // pair distances: 2, 4, 6
        assert!((stats.avg_distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn weights_pull_the_centroid() {
        let points = [Point::new(0.0, 0.0, 3), Point::new(4.0, 8.0, 1)];
        let mut stats = CellStats::default();
        stats.update(&points);

        assert_eq!(stats.points_number, 4);
        assert_eq!(stats.center_point, P2::new(1.0, 2.0));
        assert_eq!(stats.avg_distance, 12.0, "A single pair has its own distance");
    }

    #[test]
    fn single_point_has_no_distance() {
        let mut stats = CellStats::default();
        stats.update(&[Point::new(3.0, 7.0, 2)]);
        assert_eq!(stats.center_point, P2::new(3.0, 7.0));
        assert_eq!(stats.avg_distance, 0.0);
    }

    #[test]
    fn zero_weights_fall_back_to_plain_centroid() {
        let mut stats = CellStats::default();
        stats.update(&[Point::new(0.0, 0.0, 0), Point::new(2.0, 2.0, 0)]);
        assert_eq!(stats.points_number, 0);
        assert_eq!(stats.center_point, P2::new(1.0, 1.0));
        assert_eq!(stats.avg_distance, 0.0);
    }

    #[test]
    fn empty_update_keeps_previous_values() {
        let mut stats = CellStats::default();
        stats.update(&[Point::new(1.0, 1.0, 5)]);
        let before = stats.clone();
        stats.update(&[]);
        assert_eq!(stats, before);
    }

    #[test]
    fn update_keeps_baseline_tags() {
        let mut stats = CellStats {
            baseline_tags: tags(&["park"]),
            ..Default::default()
        };
        stats.update(&[Point::new(1.0, 1.0, 1)]);
        assert_eq!(stats.baseline_tags, tags(&["park"]));
    }

    #[test]
    fn baseline_keeps_tags_above_mean() {
        let points = [
            Point::with_tags(0.0, 0.0, 1, ["cafe", "park"]),
            Point::with_tags(1.0, 0.0, 1, ["cafe", "cafe"]),
            Point::with_tags(2.0, 0.0, 1, ["cafe", "museum"]),
            Point::new(3.0, 0.0, 1),
        ];
        // counts: cafe 3, park 1, museum 1 -> mean 5/3
        assert_eq!(baseline_tags(&points), Some(tags(&["cafe"])));
    }

    #[test]
    fn baseline_of_even_counts_is_empty() {
        let points = [
            Point::with_tags(0.0, 0.0, 1, ["a"]),
            Point::with_tags(1.0, 0.0, 1, ["b"]),
        ];
        assert_eq!(baseline_tags(&points), Some(BTreeSet::new()));
    }

    #[test]
    fn baseline_without_tags_is_none() {
        assert_eq!(baseline_tags(&[Point::new(0.0, 0.0, 1)]), None);
        assert_eq!(baseline_tags(&[]), None);
    }
}
