//! Closed cubic Bezier paths reconstructed from boundary nodes.

use glam::Vec2;

use crate::node::BoundaryNode;

/// Curve segments per Bezier segment when flattening for rasterization.
pub const DEFAULT_FLATTEN_STEPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

/// A closed path of cubic segments starting and ending at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierPath {
    start: Vec2,
    segments: Vec<CubicSegment>,
}

impl BezierPath {
    /// Build the closed outline through `nodes`, translated by `origin`.
    ///
    /// Segment `i` runs from node `i - 1` (wrapping to the last node) to node
    /// `i`. Both of its control points come from node `i`: `control1` is
    /// applied to the segment start and `control2` to the segment end.
    pub fn closed_through(nodes: &[BoundaryNode], origin: Vec2) -> Self {
        let Some(last) = nodes.last() else {
            return Self {
                start: origin,
                segments: Vec::new(),
            };
        };

        let start = origin + last.position();
        let mut previous = start;
        let segments = nodes
            .iter()
            .map(|node| {
                let end = origin + node.position();
                let segment = CubicSegment {
                    control1: previous + node.control1(),
                    control2: end + node.control2(),
                    end,
                };
                previous = end;
                segment
            })
            .collect();

        Self { start, segments }
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    #[inline]
    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }

    /// Iterate `(segment_start, segment)` pairs.
    pub fn iter_spans(&self) -> impl Iterator<Item = (Vec2, &CubicSegment)> {
        let starts = std::iter::once(self.start).chain(self.segments.iter().map(|s| s.end));
        starts.zip(self.segments.iter())
    }

    /// Approximate the path with a closed polyline.
    ///
    /// The returned points do not repeat the start point at the end.
    pub fn flatten(&self, steps_per_segment: usize) -> Vec<Vec2> {
        let steps = steps_per_segment.max(1);
        let mut points = Vec::with_capacity(self.segments.len() * steps);
        for (from, segment) in self.iter_spans() {
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                points.push(cubic_point(from, segment.control1, segment.control2, segment.end, t));
            }
        }
        points
    }

    /// Axis-aligned bounds of all endpoints and control points.
    ///
    /// A cubic lies within the hull of its control points, so this contains
    /// the whole curve.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        self.segments.iter().fold((self.start, self.start), |(min, max), s| {
            (
                min.min(s.control1).min(s.control2).min(s.end),
                max.max(s.control1).max(s.control2).max(s.end),
            )
        })
    }
}

/// Point on a cubic Bezier curve at parameter `t`.
#[inline]
pub fn cubic_point(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn circle_nodes(count: usize, radius: f32) -> Vec<BoundaryNode> {
        let mut rng = StdRng::seed_from_u64(2);
        (0..count)
            .map(|i| BoundaryNode::on_circle(i, count, radius, &mut rng))
            .collect()
    }

    #[test]
    fn test_path_wraps_around() {
        let nodes = circle_nodes(8, 100.0);
        let origin = Vec2::new(150.0, 150.0);
        let path = BezierPath::closed_through(&nodes, origin);

        assert_eq!(path.segments().len(), 8);
        assert_eq!(path.start(), origin + nodes[7].position());
        assert_eq!(path.segments()[7].end, path.start());
        assert_eq!(path.segments()[0].control1, path.start() + nodes[0].control1());
        assert_eq!(path.segments()[3].control2, origin + nodes[3].position() + nodes[3].control2());
    }

    #[test]
    fn test_seed_circle_flattens_near_radius() {
        let nodes = circle_nodes(8, 100.0);
        let path = BezierPath::closed_through(&nodes, Vec2::ZERO);
        for p in path.flatten(DEFAULT_FLATTEN_STEPS) {
            let r = p.length();
            assert!((r - 100.0).abs() < 1.0, "point {:?} strays from the circle: r = {}", p, r);
        }
    }

    #[test]
    fn test_flatten_point_count_and_closure() {
        let nodes = circle_nodes(4, 50.0);
        let path = BezierPath::closed_through(&nodes, Vec2::ZERO);
        let points = path.flatten(10);
        assert_eq!(points.len(), 40);
        assert!((points[points.len() - 1] - path.start()).length() < 1e-4);
    }

    #[test]
    fn test_reconstruction_is_idempotent() {
        let nodes = circle_nodes(12, 80.0);
        let a = BezierPath::closed_through(&nodes, Vec2::new(3.0, 4.0));
        let b = BezierPath::closed_through(&nodes, Vec2::new(3.0, 4.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounds_contain_flattened_curve() {
        let nodes = circle_nodes(8, 100.0);
        let path = BezierPath::closed_through(&nodes, Vec2::new(200.0, 120.0));
        let (min, max) = path.bounds();
        for p in path.flatten(8) {
            assert!(p.cmpge(min - 1e-3).all() && p.cmple(max + 1e-3).all());
        }
    }

    #[test]
    fn test_empty_nodes_give_empty_path() {
        let path = BezierPath::closed_through(&[], Vec2::ONE);
        assert!(path.segments().is_empty());
        assert!(path.flatten(4).is_empty());
    }
}
