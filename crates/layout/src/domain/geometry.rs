#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in the shared virtual desktop coordinate space.
///
/// Edges are half-open: a rectangle covers `x..x + width` horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Area shared with `other`, zero when they do not overlap.
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let width = self.right().min(other.right()) - i64::from(self.x.max(other.x));
        let height = self.bottom().min(other.bottom()) - i64::from(self.y.max(other.y));
        width.max(0) * height.max(0)
    }

    pub fn center(&self) -> (i64, i64) {
        (
            i64::from(self.x) + i64::from(self.width) / 2,
            i64::from(self.y) + i64::from(self.height) / 2,
        )
    }

    pub fn contains_point(&self, (px, py): (i64, i64)) -> bool {
        i64::from(self.x) <= px && px < self.right() && i64::from(self.y) <= py && py < self.bottom()
    }

    /// True when position and size each differ from `other` by at most
    /// `tolerance` on every axis.
    pub fn within_tolerance(&self, other: &Rect, tolerance: u32) -> bool {
        self.x.abs_diff(other.x) <= tolerance
            && self.y.abs_diff(other.y) <= tolerance
            && self.width.abs_diff(other.width) <= tolerance
            && self.height.abs_diff(other.height) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_of_disjoint_rects_is_zero() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(100, 0, 100, 100);
        assert_eq!(a.intersection_area(&b), 0);
    }

    #[test]
    fn overlap_handles_negative_origins() {
        let left = Rect::new(-1440, 0, 1440, 900);
        let window = Rect::new(-200, 100, 400, 300);
        assert_eq!(left.intersection_area(&window), 200 * 300);
    }

    #[test]
    fn overlap_does_not_overflow() {
        let huge = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(huge.intersection_area(&huge), i64::from(i32::MAX) * i64::from(i32::MAX));
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains_point((0, 0)));
        assert!(rect.contains_point((9, 9)));
        assert!(!rect.contains_point((10, 5)));
    }

    #[test]
    fn tolerance_applies_per_axis() {
        let target = Rect::new(100, 100, 800, 600);
        assert!(target.within_tolerance(&Rect::new(102, 98, 801, 600), 2));
        assert!(!target.within_tolerance(&Rect::new(100, 100, 803, 600), 2));
        assert!(!target.within_tolerance(&Rect::new(97, 100, 800, 600), 2));
    }
}
