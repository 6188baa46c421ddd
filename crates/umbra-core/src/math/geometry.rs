// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provides 2D geometric primitives for region bounds and draw content.
//!
//! Regions, occluding tokens and depth stages are all described by a
//! [`Shape`]. Rasterizers and culling code only ever need two questions
//! answered: "what is the bounding rectangle" and "is this point inside".

/// A point in scene pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    /// The x-coordinate.
    pub x: f32,
    /// The y-coordinate.
    pub y: f32,
}

impl Point2 {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in scene pixel space.
///
/// The rectangle is half-open: a point on the left or top edge is inside,
/// a point on the right or bottom edge is not. This makes adjacent rectangles
/// tile a plane without double-counting pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// The left edge.
    pub x: f32,
    /// The top edge.
    pub y: f32,
    /// The horizontal size. Never negative for rectangles built by the constructors.
    pub width: f32,
    /// The vertical size. Never negative for rectangles built by the constructors.
    pub height: f32,
}

impl Rect {
    /// An empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from two opposite corners, in any order.
    #[inline]
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self::new(min_x, min_y, a.x.max(b.x) - min_x, a.y.max(b.y) - min_y)
    }

    /// Creates the tightest rectangle enclosing all `points`.
    ///
    /// # Returns
    ///
    /// Returns `Some(Rect)` if the input slice is not empty, otherwise `None`.
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::from_corners(min, max))
    }

    /// The right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// The center point.
    #[inline]
    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns `true` if the rectangle covers no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Checks whether a point lies inside the half-open rectangle.
    #[inline]
    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Checks whether two rectangles overlap with non-zero area.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            Point2::new(self.x.min(other.x), self.y.min(other.y)),
            Point2::new(self.right().max(other.right()), self.bottom().max(other.bottom())),
        )
    }
}

/// A fillable 2D shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A circle given by its center and radius.
    Circle {
        /// The center point.
        center: Point2,
        /// The radius in pixels.
        radius: f32,
    },
    /// A simple polygon; the closing edge from the last to the first vertex is implicit.
    Polygon(Vec<Point2>),
}

impl Shape {
    /// Creates a circle shape.
    #[inline]
    pub fn circle(center: Point2, radius: f32) -> Self {
        Shape::Circle {
            center,
            radius: radius.abs(),
        }
    }

    /// Computes the axis-aligned bounding rectangle of the shape.
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(rect) => *rect,
            Shape::Circle { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
            Shape::Polygon(points) => Rect::from_points(points).unwrap_or(Rect::ZERO),
        }
    }

    /// Checks whether a point lies inside the shape.
    ///
    /// Polygons use the even-odd rule.
    pub fn contains_point(&self, p: Point2) -> bool {
        match self {
            Shape::Rect(rect) => rect.contains_point(p),
            Shape::Circle { center, radius } => {
                let dx = p.x - center.x;
                let dy = p.y - center.y;
                dx * dx + dy * dy < radius * radius
            }
            Shape::Polygon(points) => {
                if points.len() < 3 {
                    return false;
                }
                let mut inside = false;
                let mut j = points.len() - 1;
                for i in 0..points.len() {
                    let (a, b) = (points[i], points[j]);
                    if (a.y > p.y) != (b.y > p.y) {
                        let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                        if p.x < x_cross {
                            inside = !inside;
                        }
                    }
                    j = i;
                }
                inside
            }
        }
    }
}

impl From<Rect> for Shape {
    fn from(rect: Rect) -> Self {
        Shape::Rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point2::new(10.0, 5.0), Point2::new(0.0, 0.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 10.0, 5.0));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert!(r.contains_point(Point2::new(0.0, 0.0)));
        assert!(r.contains_point(Point2::new(3.9, 3.9)));
        assert!(!r.contains_point(Point2::new(4.0, 2.0)));
    }

    #[test]
    fn rect_union_and_intersection() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(1.0, 1.0, 2.0, 2.0);
        let c = Rect::new(5.0, 5.0, 1.0, 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.union(&c), Rect::new(0.0, 0.0, 6.0, 6.0));
    }

    #[test]
    fn circle_bounds_and_containment() {
        let s = Shape::circle(Point2::new(10.0, 10.0), 3.0);
        assert_eq!(s.bounds(), Rect::new(7.0, 7.0, 6.0, 6.0));
        assert!(s.contains_point(Point2::new(11.0, 11.0)));
        assert!(!s.contains_point(Point2::new(13.0, 13.0)));
    }

    #[test]
    fn polygon_even_odd_containment() {
        let tri = Shape::Polygon(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
        ]);
        assert!(tri.contains_point(Point2::new(2.0, 2.0)));
        assert!(!tri.contains_point(Point2::new(8.0, 8.0)));
        assert_eq!(tri.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let line = Shape::Polygon(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        assert!(!line.contains_point(Point2::new(0.5, 0.5)));
    }
}
