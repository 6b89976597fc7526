use eframe::egui::{Rect, Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Square region of a Barnes-Hut tree. Leaves keep their member indices; inner
/// cells only keep the aggregate used for far-field approximation.
pub(super) struct QuadCell {
    pub(super) bounds: Rect,
    pub(super) centroid: Vec2,
    pub(super) weight: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<QuadCell>>; 4],
}

fn square_around(points: &[Vec2]) -> Option<Rect> {
    let mut min = vec2(f32::INFINITY, f32::INFINITY);
    let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for point in points {
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        min = min.min(*point);
        max = max.max(*point);
    }

    if points.is_empty() {
        return None;
    }

    let side = (max - min).max_elem().max(1.0) + 2.0;
    let center = ((min + max) * 0.5).to_pos2();
    Some(Rect::from_center_size(center, vec2(side, side)))
}

fn quadrant(bounds: Rect, point: Vec2) -> usize {
    let center = bounds.center();
    let east = usize::from(point.x >= center.x);
    let south = usize::from(point.y >= center.y);
    east | (south << 1)
}

fn quadrant_bounds(bounds: Rect, index: usize) -> Rect {
    let center = bounds.center();
    let x_range = if index & 1 == 0 {
        (bounds.min.x, center.x)
    } else {
        (center.x, bounds.max.x)
    };
    let y_range = if index & 2 == 0 {
        (bounds.min.y, center.y)
    } else {
        (center.y, bounds.max.y)
    };
    Rect::from_x_y_ranges(x_range.0..=x_range.1, y_range.0..=y_range.1)
}

impl QuadCell {
    /// Builds a tree over all points. `None` for an empty or non-finite point set.
    pub(super) fn build(points: &[Vec2]) -> Option<Self> {
        let bounds = square_around(points)?;
        Some(Self::build_cell(bounds, (0..points.len()).collect(), points, 0))
    }

    fn build_cell(bounds: Rect, members: Vec<usize>, points: &[Vec2], depth: usize) -> Self {
        let weight = members.len() as f32;
        let centroid = if members.is_empty() {
            bounds.center().to_vec2()
        } else {
            members
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + points[index])
                / weight
        };

        let mut cell = Self {
            bounds,
            centroid,
            weight,
            members,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.members.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.members {
            buckets[quadrant(bounds, points[index])].push(index);
        }

        // Coincident points would split forever; keep them in one leaf.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (index, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                let bounds = quadrant_bounds(bounds, index);
                let child = Self::build_cell(bounds, bucket, points, depth + 1);
                cell.children[index] = Some(Box::new(child));
            }
        }
        cell.members.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn side(&self) -> f32 {
        self.bounds.width()
    }

    /// Pre-order walk. Returning `true` from `visitor` skips the cell's children.
    pub(super) fn visit(&self, visitor: &mut impl FnMut(&QuadCell) -> bool) {
        if visitor(self) {
            return;
        }
        for child in self.children.iter().flatten() {
            child.visit(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_match_members() {
        let points = (0..40)
            .map(|index| vec2((index % 7) as f32 * 13.0, (index / 7) as f32 * 9.0))
            .collect::<Vec<_>>();
        let tree = QuadCell::build(&points).expect("finite points");

        assert_eq!(tree.weight, 40.0);
        assert!(!tree.is_leaf());

        let mut leaf_members = Vec::new();
        tree.visit(&mut |cell| {
            if cell.is_leaf() {
                leaf_members.extend(cell.members.iter().copied());
            }
            false
        });
        leaf_members.sort_unstable();
        assert_eq!(leaf_members, (0..40).collect::<Vec<_>>());

        let mean = points.iter().fold(Vec2::ZERO, |sum, point| sum + *point) / 40.0;
        assert!((tree.centroid - mean).length() < 1e-3);
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let points = vec![vec2(5.0, 5.0); 20];
        let tree = QuadCell::build(&points).expect("finite points");
        assert!(tree.is_leaf());
        assert_eq!(tree.members.len(), 20);
    }

    #[test]
    fn non_finite_points_build_nothing() {
        assert!(QuadCell::build(&[vec2(f32::NAN, 0.0)]).is_none());
    }
}
