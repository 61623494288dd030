use crate::P2;

/// A weighted point stored in the trees.
///
/// The weight counts towards a cell's density and split threshold, the optional tags
/// feed the baseline tag statistic of the leaf that owns the point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    position: P2,
    weight: u32,
    tags: Option<Vec<String>>,
}

impl Point {
    /// Create an untagged point
    pub fn new(x: f64, y: f64, weight: u32) -> Self {
        Self {
            position: P2::new(x, y),
            weight,
            tags: None,
        }
    }

    /// Create a point carrying a list of tags
    pub fn with_tags<I, S>(x: f64, y: f64, weight: u32, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            position: P2::new(x, y),
            weight,
            tags: Some(tags.into_iter().map(Into::into).collect()),
        }
    }

    pub fn position(&self) -> P2 {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }
}

/// Sum of the weights of a point collection
pub(crate) fn total_weight(points: &[Point]) -> u64 {
    points.iter().map(|p| u64::from(p.weight)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_point_keeps_tag_order() {
        let p = Point::with_tags(1.0, 2.0, 3, ["b", "a", "b"]);
        assert_eq!(p.position(), P2::new(1.0, 2.0));
        assert_eq!(p.weight(), 3);
        assert_eq!(
            p.tags(),
            Some(&["b".to_string(), "a".to_string(), "b".to_string()][..])
        );
        assert_eq!(Point::new(0.0, 0.0, 1).tags(), None);
    }

    #[test]
    fn total_weight_sums_all_points() {
        let points = [Point::new(0.0, 0.0, 2), Point::new(1.0, 1.0, 0), Point::new(2.0, 2.0, 5)];
        assert_eq!(total_weight(&points), 7);
        assert_eq!(total_weight(&[]), 0);
    }
}
