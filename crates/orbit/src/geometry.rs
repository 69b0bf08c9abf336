use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseGeometryError {
    #[error("expected two numbers separated by '{separator}', got '{input}'")]
    Shape { input: String, separator: char },
    #[error("invalid number '{0}'")]
    Number(String),
}

fn parse_pair(s: &str, separator: char) -> Result<(f64, f64), ParseGeometryError> {
    let shape = || ParseGeometryError::Shape {
        input: s.to_string(),
        separator,
    };
    let (a, b) = s.split_once(separator).ok_or_else(shape)?;
    let number = |t: &str| {
        t.trim()
            .parse::<f64>()
            .map_err(|_| ParseGeometryError::Number(t.trim().to_string()))
    };
    Ok((number(a)?, number(b)?))
}

/// Parses `"x,y"`.
impl FromStr for Point {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pair(s, ',').map(|(x, y)| Point::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn square(side: f64) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

/// Dimensions of the surface the menu lives on. Observed, never owned: the host
/// pushes a new value whenever its window changes size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Display, SerializeDisplay, DeserializeFromStr)]
#[display("{width}x{height}")]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A zero-sized viewport means the host has not reported its dimensions yet.
    pub fn is_known(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Whether a square of side `size` centered on `center` fits without clipping.
    pub fn contains_square(&self, center: Point, size: f64) -> bool {
        let half = size / 2.0;
        center.x - half >= 0.0
            && center.x + half <= self.width
            && center.y - half >= 0.0
            && center.y + half <= self.height
    }

    /// Clamps the top-left corner of an element so the element stays inside.
    pub fn clamp_top_left(&self, top_left: Point, element: Size) -> Point {
        let max_x = (self.width - element.width).max(0.0);
        let max_y = (self.height - element.height).max(0.0);
        Point::new(top_left.x.min(max_x).max(0.0), top_left.y.min(max_y).max(0.0))
    }
}

/// Parses `"WxH"`.
impl FromStr for Viewport {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pair(&s.to_ascii_lowercase(), 'x').map(|(w, h)| Viewport::new(w, h))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn centered(center: Point, side: f64) -> Self {
        Self {
            x: center.x - side / 2.0,
            y: center.y - side / 2.0,
            width: side,
            height: side,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}
