//! Point set data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};

/// Ordered positions with an optional parallel sequence of colors.
///
/// When colors are present they have exactly one entry per position, in the
/// same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    positions: Vec<Point3f>,
    colors: Option<Vec<Rgb>>,
}

impl PointSet {
    /// Create a new empty point set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a colored point set with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colors: Some(Vec::with_capacity(capacity)),
        }
    }

    /// Create an uncolored point set from positions
    pub fn from_positions(positions: Vec<Point3f>) -> Self {
        Self { positions, colors: None }
    }

    /// Create a colored point set. Fails if the sequences differ in length.
    pub fn from_parts(positions: Vec<Point3f>, colors: Vec<Rgb>) -> crate::Result<Self> {
        if positions.len() != colors.len() {
            return Err(crate::Error::InvalidData(format!(
                "{} positions but {} colors",
                positions.len(),
                colors.len()
            )));
        }
        Ok(Self { positions, colors: Some(colors) })
    }

    /// A single uncolored point at the origin
    pub fn origin() -> Self {
        Self::from_positions(vec![Point3f::origin()])
    }

    /// Get the number of points in the set
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the point set is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3f] {
        &self.positions
    }

    pub fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Add a colored point. Points that were added without a color are
    /// back-filled white.
    pub fn push(&mut self, position: Point3f, color: Rgb) {
        let colors = self
            .colors
            .get_or_insert_with(|| vec![[1.0, 1.0, 1.0]; self.positions.len()]);
        colors.push(color);
        self.positions.push(position);
    }

    /// Iterate over positions paired with their color, if any
    pub fn iter(&self) -> impl Iterator<Item = (&Point3f, Option<&Rgb>)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .map(move |(i, p)| (p, self.colors.as_ref().map(|c| &c[i])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_rejects_length_mismatch() {
        let result = PointSet::from_parts(vec![Point3f::origin()], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn test_origin_is_single_uncolored_point() {
        let set = PointSet::origin();
        assert_eq!(set.len(), 1);
        assert!(!set.has_colors());
        assert_eq!(set.positions()[0], Point3f::origin());
    }

    #[test]
    fn test_push_backfills_colors() {
        let mut set = PointSet::origin();
        set.push(Point3f::new(1.0, 0.0, 0.0), [0.5, 0.25, 0.0]);
        let colors = set.colors().unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0], [1.0, 1.0, 1.0]);
        assert_eq!(colors[1], [0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_iter_pairs_positions_and_colors() {
        let set = PointSet::from_parts(
            vec![Point3f::new(1.0, 2.0, 3.0), Point3f::new(4.0, 5.0, 6.0)],
            vec![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
        )
        .unwrap();
        let collected: Vec<_> = set.iter().map(|(p, c)| (p.x, c.copied())).collect();
        assert_eq!(collected, vec![(1.0, Some([0.0, 0.0, 1.0])), (4.0, Some([1.0, 0.0, 0.0]))]);
    }
}
