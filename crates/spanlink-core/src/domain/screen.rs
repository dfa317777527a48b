//! The `VirtualScreen` entity: one physical monitor mapped into the shared
//! virtual coordinate plane.
//!
//! A screen carries two coordinate pairs. `local_x`/`local_y` is where the
//! monitor sits in its owner's OS coordinate space; `x`/`y` is where it sits
//! in the virtual plane all peers agree on. Width and height are shared by
//! both spaces, so translating a virtual point back to local pixels is an
//! offset subtraction plus the local origin.

use serde::{Deserialize, Serialize};

/// Default DPI assumed for screens whose owner did not report one
/// (the wire check-in format carries geometry only).
pub const DEFAULT_DPI: u32 = 96;

/// One physical monitor positioned in the virtual plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualScreen {
    /// Name of the machine that owns this monitor. Non-empty after check-in.
    pub client: String,
    /// X of the monitor's top-left corner in its owner's OS coordinates.
    pub local_x: i32,
    /// Y of the monitor's top-left corner in its owner's OS coordinates.
    pub local_y: i32,
    /// X of the monitor's top-left corner in the shared virtual plane.
    pub x: i32,
    /// Y of the monitor's top-left corner in the shared virtual plane.
    pub y: i32,
    /// Width in virtual units (pixels).
    pub width: i32,
    /// Height in virtual units (pixels).
    pub height: i32,
    /// Monitor DPI, used when scaling injected coordinates back to pixels.
    pub dpi: u32,
}

impl VirtualScreen {
    /// Rightmost column inside the screen (inclusive).
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    /// Bottom row inside the screen (inclusive).
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    /// Inclusive-corner overlap test used when inserting screens.
    ///
    /// Two rectangles with inclusive corners overlap unless one lies entirely
    /// to the left of, right of, above, or below the other. Note this is
    /// deliberately *not* the same predicate as [`contains`]: insertion-time
    /// conflict detection treats the last row/column as occupied, while
    /// runtime point lookup is half-open.
    ///
    /// [`contains`]: VirtualScreen::contains
    pub fn overlaps(&self, other: &VirtualScreen) -> bool {
        let x_apart = self.x > other.right() || self.right() < other.x;
        // Screen Y grows downward; the row test is symmetric either way.
        let y_apart = self.y > other.bottom() || self.bottom() < other.y;
        !(x_apart || y_apart)
    }

    /// Half-open containment test: `x in [self.x, self.x + width)` and
    /// `y in [self.y, self.y + height)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Translates a virtual point inside this screen to the owner's local
    /// OS coordinates.
    pub fn to_local(&self, virtual_x: i32, virtual_y: i32) -> (i32, i32) {
        (
            (virtual_x - self.x).abs() + self.local_x,
            (virtual_y - self.y).abs() + self.local_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(x: i32, y: i32, w: i32, h: i32) -> VirtualScreen {
        VirtualScreen {
            client: "test".to_string(),
            local_x: 0,
            local_y: 0,
            x,
            y,
            width: w,
            height: h,
            dpi: DEFAULT_DPI,
        }
    }

    #[test]
    fn test_right_and_bottom_are_inclusive() {
        let s = screen(0, 0, 1920, 1080);
        assert_eq!(s.right(), 1919);
        assert_eq!(s.bottom(), 1079);
    }

    #[test]
    fn test_overlaps_when_rectangles_share_area() {
        let a = screen(0, 0, 100, 100);
        let b = screen(50, 50, 100, 100);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_does_not_overlap_when_edge_adjacent() {
        // b starts exactly one column past a's inclusive right edge.
        let a = screen(0, 0, 100, 100);
        let b = screen(100, 0, 100, 100);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_overlaps_when_sharing_the_inclusive_corner_column() {
        // b's first column is a's last column: inclusive corners collide.
        let a = screen(0, 0, 100, 100);
        let b = screen(99, 0, 100, 100);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_contains_is_half_open() {
        let s = screen(0, 0, 1920, 1080);
        assert!(s.contains(0, 0));
        assert!(s.contains(1919, 1079));
        assert!(!s.contains(1920, 500));
        assert!(!s.contains(500, 1080));
    }

    #[test]
    fn test_contains_with_negative_origin() {
        let s = screen(-1280, 0, 1280, 1024);
        assert!(s.contains(-1280, 0));
        assert!(s.contains(-1, 1023));
        assert!(!s.contains(0, 0));
    }

    #[test]
    fn test_to_local_offsets_into_local_origin() {
        let s = VirtualScreen {
            client: "b".to_string(),
            local_x: 100,
            local_y: 200,
            x: 1920,
            y: 0,
            width: 1280,
            height: 1024,
            dpi: DEFAULT_DPI,
        };
        assert_eq!(s.to_local(1970, 60), (150, 260));
    }
}
