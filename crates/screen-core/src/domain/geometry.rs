//! Axis-aligned rectangles in virtual-desktop coordinates.
//!
//! Every screen, output and window position in this workspace is an [`Area`].
//! The virtual desktop is the single coordinate space spanning all outputs;
//! an output at `x = 1920` sits immediately to the right of a 1920-pixel-wide
//! output at the origin.
//!
//! Rectangles are half-open: an area at `(0, 0)` with width 1920 covers the
//! columns `0..1920`, so the point `(1920, 0)` belongs to the neighbour on the
//! right, not to this area.

use serde::{Deserialize, Serialize};

/// A rectangle in virtual-desktop coordinates.
///
/// `x` and `y` are the top-left corner (may be negative when an output sits
/// left of or above the origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Area {
    /// X coordinate of the top-left corner.
    pub x: i32,
    /// Y coordinate of the top-left corner.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Area {
    /// Creates an area from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the rightmost X coordinate (exclusive), saturating at
    /// `i32::MAX`.
    pub fn right(&self) -> i32 {
        offset(self.x, self.width)
    }

    /// Returns the bottommost Y coordinate (exclusive), saturating at
    /// `i32::MAX`.
    pub fn bottom(&self) -> i32 {
        offset(self.y, self.height)
    }

    /// Returns `true` if the area covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered by the area.
    pub fn size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Returns `true` if the point `(x, y)` lies inside the area.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Returns `true` if `other` lies entirely inside this area.
    ///
    /// An empty `other` is contained when its origin is inside or on the
    /// boundary of `self`.
    pub fn contains_area(&self, other: &Area) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the overlapping part of two areas, or `None` if they do not
    /// share any pixel.
    pub fn intersection(&self, other: &Area) -> Option<Area> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Area::new(left, top, span(left, right), span(top, bottom)))
        } else {
            None
        }
    }

    /// Number of pixels shared by the two areas (zero when disjoint).
    pub fn overlap_size(&self, other: &Area) -> u64 {
        self.intersection(other).map_or(0, |a| a.size())
    }

    /// Returns the smallest area containing both `self` and `other`.
    pub fn union(&self, other: &Area) -> Area {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Area::new(left, top, span(left, right), span(top, bottom))
    }

    /// Squared Euclidean distance from the top-left corner to the
    /// virtual-desktop origin.
    pub fn origin_distance_sq(&self) -> i64 {
        let x = i64::from(self.x);
        let y = i64::from(self.y);
        x * x + y * y
    }
}

/// `origin + len`, saturating at the ends of the coordinate space.
pub(crate) fn offset(origin: i32, len: u32) -> i32 {
    let end = i64::from(origin) + i64::from(len);
    end.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Distance from `start` to `end`; zero when `end` is not past `start`.
fn span(start: i32, end: i32) -> u32 {
    (i64::from(end) - i64::from(start)).clamp(0, i64::from(u32::MAX)) as u32
}

impl std::fmt::Display for Area {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_right_returns_x_plus_width() {
        let area = Area::new(100, 0, 1920, 1080);
        assert_eq!(area.right(), 2020);
    }

    #[test]
    fn test_area_bottom_returns_y_plus_height() {
        let area = Area::new(0, 50, 1920, 1080);
        assert_eq!(area.bottom(), 1130);
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let area = Area::new(0, 0, 1920, 1080);
        assert!(area.contains_point(0, 0));
        assert!(area.contains_point(1919, 1079));
        assert!(!area.contains_point(1920, 0));
        assert!(!area.contains_point(0, 1080));
    }

    #[test]
    fn test_contains_point_handles_negative_origin() {
        let area = Area::new(-1280, -200, 1280, 1024);
        assert!(area.contains_point(-1, -1));
        assert!(!area.contains_point(0, 0));
    }

    #[test]
    fn test_contains_area_accepts_nested_and_rejects_straddling() {
        let screen = Area::new(0, 0, 1920, 1080);
        assert!(screen.contains_area(&Area::new(10, 10, 100, 100)));
        assert!(screen.contains_area(&screen));
        assert!(!screen.contains_area(&Area::new(1900, 10, 100, 100)));
    }

    #[test]
    fn test_intersection_returns_shared_region() {
        let a = Area::new(0, 0, 100, 100);
        let b = Area::new(50, 50, 100, 100);
        assert_eq!(a.intersection(&b), Some(Area::new(50, 50, 50, 50)));
        assert_eq!(a.overlap_size(&b), 2500);
    }

    #[test]
    fn test_intersection_is_none_for_adjacent_areas() {
        let a = Area::new(0, 0, 1920, 1080);
        let b = Area::new(1920, 0, 1920, 1080);
        assert_eq!(a.intersection(&b), None);
        assert_eq!(a.overlap_size(&b), 0);
    }

    #[test]
    fn test_union_spans_both_areas() {
        let a = Area::new(0, 0, 1920, 1080);
        let b = Area::new(1920, 0, 1280, 1024);
        assert_eq!(a.union(&b), Area::new(0, 0, 3200, 1080));
    }

    #[test]
    fn test_huge_width_saturates_instead_of_wrapping() {
        // Arrange
        let area = Area::new(0, 0, u32::MAX, 100);

        // Act / Assert
        assert_eq!(area.right(), i32::MAX);
        assert!(area.contains_point(10, 10));
        assert!(area.contains_point(i32::MAX - 1, 99));
    }

    #[test]
    fn test_far_origin_edges_saturate() {
        let area = Area::new(i32::MAX - 10, i32::MAX - 5, 100, 100);
        assert_eq!(area.right(), i32::MAX);
        assert_eq!(area.bottom(), i32::MAX);
        assert!(area.contains_point(i32::MAX - 1, i32::MAX - 1));
    }

    #[test]
    fn test_union_spanning_whole_coordinate_space_does_not_overflow() {
        let left = Area::new(i32::MIN, 0, 10, 10);
        let right = Area::new(i32::MAX - 10, 0, 10, 10);

        let union = left.union(&right);

        assert_eq!(union.x, i32::MIN);
        assert_eq!(union.width, u32::MAX);
        assert_eq!(union.height, 10);
    }

    #[test]
    fn test_intersection_of_huge_areas_keeps_full_width() {
        let a = Area::new(i32::MIN, 0, u32::MAX, 10);
        let b = Area::new(-10, 0, u32::MAX, 10);

        let shared = a.intersection(&b).unwrap();

        assert_eq!(shared.x, -10);
        assert_eq!(shared.width, (i32::MAX as u32) + 10);
    }

    #[test]
    fn test_origin_distance_prefers_closer_corner() {
        let near = Area::new(0, 0, 10, 10);
        let far = Area::new(1920, 0, 10, 10);
        assert!(near.origin_distance_sq() < far.origin_distance_sq());
        assert_eq!(Area::new(-3, 4, 1, 1).origin_distance_sq(), 25);
    }

    #[test]
    fn test_display_uses_geometry_string_format() {
        assert_eq!(Area::new(1920, 0, 2560, 1440).to_string(), "2560x1440+1920+0");
    }
}
