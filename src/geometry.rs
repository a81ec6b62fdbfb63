//! Plain screen geometry.
//!
//! All positions are absolute desktop coordinates in pixels, with the origin
//! at the top-left and `y` growing downwards.  The only monitor-relative
//! value is the [`WorkArea`], which is used for edge snapping.
//!
//! Coordinates arrive over the socket unchecked, so all arithmetic here
//! saturates at the `i32` range instead of overflowing.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A point (or a translation) on the desktop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Accepts `{"x": 10, "y": 20}` (the persisted form) or the string
/// `"10 20"` (handy from shell scripts).
impl<'de> Deserialize<'de> for Point {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Point;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "object {{x, y}} or string \"x y\"")
            }
            fn visit_map<A>(self, mut map: A) -> Result<Point, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut x = None;
                let mut y = None;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "x" => x = Some(map.next_value()?),
                        "y" => y = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                Ok(Point {
                    x: x.ok_or_else(|| DeError::missing_field("x"))?,
                    y: y.ok_or_else(|| DeError::missing_field("y"))?,
                })
            }
            fn visit_str<E>(self, s: &str) -> Result<Point, E>
            where
                E: DeError,
            {
                let parts: Vec<&str> = s.split_whitespace().collect();
                if parts.len() != 2 {
                    return Err(DeError::custom(format!("point: expected \"x y\", got {:?}", s)));
                }
                let x: i32 = parts[0].parse().map_err(|_| DeError::custom("point: x must be an integer"))?;
                let y: i32 = parts[1].parse().map_err(|_| DeError::custom("point: y must be an integer"))?;
                Ok(Point { x, y })
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Width and height of a bar, as laid out by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn left(&self) -> i32 {
        self.origin.x
    }

    pub fn top(&self) -> i32 {
        self.origin.y
    }

    pub fn right(&self) -> i32 {
        self.origin.x.saturating_add(self.size.width)
    }

    pub fn bottom(&self) -> i32 {
        self.origin.y.saturating_add(self.size.height)
    }
}

/// Usable desktop region of the primary display, excluding panels and
/// taskbars.  Edges are `(left, top, right, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkArea {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WorkArea {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl Default for WorkArea {
    /// A 1920×1080 screen with a 40 px taskbar at the bottom.
    fn default() -> Self {
        Self::new(0, 0, 1920, 1040)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(10, 20);
        let b = Point::new(3, -4);
        assert_eq!(a + b, Point::new(13, 16));
        assert_eq!(a - b, Point::new(7, 24));
        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }

    #[test]
    fn point_arithmetic_saturates() {
        let far = Point::new(i32::MAX, i32::MIN);
        assert_eq!(far - Point::new(-200, 5), Point::new(i32::MAX, i32::MIN));
        assert_eq!(far + Point::new(1, -1), far);
        let mut c = Point::new(i32::MAX - 1, 0);
        c += Point::new(10, 0);
        assert_eq!(c, Point::new(i32::MAX, 0));
    }

    #[test]
    fn rect_edges_saturate() {
        let r = Rect::new(Point::new(i32::MAX - 5, i32::MAX), Size::new(40, 30));
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.bottom(), i32::MAX);
    }

    #[test]
    fn rect_edges() {
        let r = Rect::new(Point::new(100, 50), Size::new(40, 30));
        assert_eq!(r.left(), 100);
        assert_eq!(r.right(), 140);
        assert_eq!(r.top(), 50);
        assert_eq!(r.bottom(), 80);
    }

    #[test]
    fn point_deserializes_from_object_or_string() {
        let p: Point = serde_json::from_str(r#"{"x": -5, "y": 7}"#).unwrap();
        assert_eq!(p, Point::new(-5, 7));
        let p: Point = serde_json::from_str(r#""12 34""#).unwrap();
        assert_eq!(p, Point::new(12, 34));
    }

    #[test]
    fn point_rejects_malformed_string() {
        assert!(serde_json::from_str::<Point>(r#""12""#).is_err());
        assert!(serde_json::from_str::<Point>(r#""a b""#).is_err());
        assert!(serde_json::from_str::<Point>(r#"{"x": 1}"#).is_err());
    }
}
