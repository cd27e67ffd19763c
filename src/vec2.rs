use core::ops::{Add, Div, Mul, Sub};

#[derive(Copy, Clone, Default, PartialEq)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

pub type Point = Vec2<f64>;

impl<T> Vec2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Add<T, Output = T> + Copy> Add<Vec2<T>> for Vec2<T> {
    type Output = Vec2<T>;
    fn add(self, other: Vec2<T>) -> Self::Output {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl<T: Sub<T, Output = T> + Copy> Sub<Vec2<T>> for Vec2<T> {
    type Output = Vec2<T>;
    fn sub(self, other: Vec2<T>) -> Self::Output {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl<T: Mul<T, Output = T> + Copy> Mul<T> for Vec2<T> {
    type Output = Vec2<T>;
    fn mul(self, other: T) -> Self::Output {
        Vec2 {
            x: self.x * other,
            y: self.y * other,
        }
    }
}

impl<T: Div<T, Output = T> + Copy> Div<T> for Vec2<T> {
    type Output = Vec2<T>;
    fn div(self, other: T) -> Self::Output {
        Vec2 {
            x: self.x / other,
            y: self.y / other,
        }
    }
}

impl Vec2<f64> {
    pub fn len(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dist(self, other: Self) -> f64 {
        (other - self).len()
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Vec2<T> {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(fmt, "({:?}, {:?})", self.x, self.y)
    }
}

/// A directed line segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Shortens the segment `from -> to` by `from_offset` at its start and `to_offset` at
/// its end, measured along the segment.
///
/// If the offsets consume the whole segment, both ends collapse onto the point that
/// splits the gap in proportion to the offsets; the segment never reverses direction.
/// Coincident endpoints are returned unchanged.
pub fn trim_segment(from: Point, to: Point, from_offset: f64, to_offset: f64) -> Segment {
    let d = to - from;
    let len = d.len();
    if len == 0.0 {
        return Segment { from, to };
    }
    let unit = d / len;
    let total = from_offset + to_offset;
    if total >= len {
        let split = if total > 0.0 { len * from_offset / total } else { 0.0 };
        let p = from + unit * split;
        return Segment { from: p, to: p };
    }
    Segment {
        from: from + unit * from_offset,
        to: to - unit * to_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        a.dist(b) < 1e-9
    }

    #[test]
    fn trim_horizontal() {
        let s = trim_segment(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 32.0, 22.0);
        assert!(approx(s.from, Point::new(32.0, 0.0)), "{:?}", s);
        assert!(approx(s.to, Point::new(78.0, 0.0)), "{:?}", s);
    }

    #[test]
    fn trim_diagonal_keeps_direction() {
        let from = Point::new(0.0, 0.0);
        let to = Point::new(30.0, 40.0);
        let s = trim_segment(from, to, 5.0, 10.0);
        assert!(approx(s.from, Point::new(3.0, 4.0)), "{:?}", s);
        assert!(approx(s.to, Point::new(24.0, 32.0)), "{:?}", s);
        assert!((s.from.dist(from) - 5.0).abs() < 1e-9);
        assert!((s.to.dist(to) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn trim_degenerate() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(trim_segment(p, p, 3.0, 3.0), Segment { from: p, to: p });

        let s = trim_segment(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 30.0, 10.0);
        assert!(approx(s.from, Point::new(7.5, 0.0)), "{:?}", s);
        assert_eq!(s.from, s.to);
    }
}
