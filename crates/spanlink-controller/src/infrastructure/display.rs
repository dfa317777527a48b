//! Display enumeration seam.
//!
//! The session builds its local screen block from whatever this seam reports
//! at startup. A production implementation queries the OS monitor list; the
//! [`StaticDisplays`] implementation serves tests and headless runs.

use spanlink_core::domain::screen::DEFAULT_DPI;

/// Geometry of one physical display in local OS coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub dpi: u32,
}

impl DisplayInfo {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            dpi: DEFAULT_DPI,
        }
    }
}

/// Trait for enumerating the machine's displays.
pub trait DisplayEnumerator: Send + Sync {
    /// Returns all connected displays in OS enumeration order.
    fn displays(&self) -> Vec<DisplayInfo>;
}

/// A fixed display list, for tests and headless operation.
pub struct StaticDisplays(pub Vec<DisplayInfo>);

impl StaticDisplays {
    /// A single 1920x1080 primary display at the local origin.
    pub fn single_1080p() -> Self {
        Self(vec![DisplayInfo::new(0, 0, 1920, 1080)])
    }
}

impl DisplayEnumerator for StaticDisplays {
    fn displays(&self) -> Vec<DisplayInfo> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_displays_reports_configured_geometry() {
        let displays = StaticDisplays(vec![
            DisplayInfo::new(0, 0, 1920, 1080),
            DisplayInfo::new(1920, 0, 1280, 1024),
        ]);

        let reported = displays.displays();

        assert_eq!(reported.len(), 2);
        assert_eq!(reported[1].x, 1920);
        assert_eq!(reported[0].dpi, DEFAULT_DPI);
    }
}
