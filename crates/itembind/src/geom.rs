//! Minimal integer geometry for hit testing.

/// A point in window coordinates.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift the point by an offset, saturating at the coordinate bounds.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Does the rectangle contain the point? The right and bottom edges are
    /// exclusive.
    pub fn contains_point(&self, p: Point) -> bool {
        let (x, y) = (i64::from(p.x), i64::from(p.y));
        let (left, top) = (i64::from(self.tl.x), i64::from(self.tl.y));
        x >= left && y >= top && x < left + i64::from(self.w) && y < top + i64::from(self.h)
    }

    /// Grow the rectangle by `pad` on every side.
    pub fn pad(&self, pad: u32) -> Self {
        let shift = i32::try_from(pad).unwrap_or(i32::MAX);
        Self {
            tl: self.tl.offset(-shift, -shift),
            w: self.w.saturating_add(pad.saturating_mul(2)),
            h: self.h.saturating_add(pad.saturating_mul(2)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains_point(Point::new(10, 10)));
        assert!(r.contains_point(Point::new(14, 14)));
        assert!(!r.contains_point(Point::new(15, 14)));
        assert!(!r.contains_point(Point::new(9, 12)));
        assert!(!Rect::new(0, 0, 0, 0).contains_point(Point::new(0, 0)));
    }

    #[test]
    fn padding() {
        let r = Rect::new(10, 10, 5, 5).pad(2);
        assert_eq!(r, Rect::new(8, 8, 9, 9));
        assert!(r.contains_point(Point::new(8, 16)));
    }
}
