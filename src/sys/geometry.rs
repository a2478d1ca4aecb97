//! Plain geometry types shared by the model and the AppKit layer.
//!
//! Rects follow the Cocoa convention (origin at the bottom left) unless a
//! function says otherwise. On macOS they convert to and from the
//! CoreGraphics types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self { Point { x, y } }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self { Size { width, height } }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect { origin: Point::ZERO, size: Size::ZERO };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub const fn from_parts(origin: Point, size: Size) -> Self { Rect { origin, size } }

    pub fn mid_x(&self) -> f64 { self.origin.x + self.size.width / 2.0 }

    pub fn mid_y(&self) -> f64 { self.origin.y + self.size.height / 2.0 }

    pub fn max_x(&self) -> f64 { self.origin.x + self.size.width }

    pub fn max_y(&self) -> f64 { self.origin.y + self.size.height }

    /// A rect of `size` whose center is the center of `self`.
    pub fn centered(&self, size: Size) -> Rect {
        Rect::new(
            self.mid_x() - size.width / 2.0,
            self.mid_y() - size.height / 2.0,
            size.width,
            size.height,
        )
    }
}

#[cfg(target_os = "macos")]
mod cg {
    use objc2_core_foundation::{CGPoint, CGRect, CGSize};

    use super::{Point, Rect, Size};

    impl From<CGPoint> for Point {
        fn from(p: CGPoint) -> Self { Point::new(p.x, p.y) }
    }

    impl From<Point> for CGPoint {
        fn from(p: Point) -> Self { CGPoint::new(p.x, p.y) }
    }

    impl From<CGSize> for Size {
        fn from(s: CGSize) -> Self { Size::new(s.width, s.height) }
    }

    impl From<Size> for CGSize {
        fn from(s: Size) -> Self { CGSize::new(s.width, s.height) }
    }

    impl From<CGRect> for Rect {
        fn from(r: CGRect) -> Self { Rect::from_parts(r.origin.into(), r.size.into()) }
    }

    impl From<Rect> for CGRect {
        fn from(r: Rect) -> Self { CGRect::new(r.origin.into(), r.size.into()) }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn centers_a_size_inside_a_rect() {
        let screen = Rect::new(0.0, 25.0, 1440.0, 875.0);
        let centered = screen.centered(Size::new(900.0, 370.0));
        assert_eq!(centered, Rect::new(270.0, 277.5, 900.0, 370.0));
        assert_eq!(centered.mid_x(), screen.mid_x());
        assert_eq!(centered.mid_y(), screen.mid_y());
    }

    #[test]
    fn reports_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.max_x(), 40.0);
        assert_eq!(r.max_y(), 60.0);
    }
}
