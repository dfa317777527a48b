//! Display enumeration seam for the agent.
//!
//! The agent's check-in is built from what this seam reports. The production
//! implementation queries the OS monitor list; [`StaticDisplays`] serves
//! tests and headless runs.

use spanlink_core::domain::screen::{VirtualScreen, DEFAULT_DPI};

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
    fn displays(&self) -> Vec<DisplayInfo>;
}

/// A fixed display list, for tests and headless operation.
pub struct StaticDisplays(pub Vec<DisplayInfo>);

impl StaticDisplays {
    /// A single 1280x1024 display at the local origin.
    pub fn single_sxga() -> Self {
        Self(vec![DisplayInfo::new(0, 0, 1280, 1024)])
    }
}

impl DisplayEnumerator for StaticDisplays {
    fn displays(&self) -> Vec<DisplayInfo> {
        self.0.clone()
    }
}

/// Builds the check-in screen list for `client`: local coordinates filled
/// in, virtual coordinates zeroed for the controller to assign.
pub fn check_in_screens(client: &str, displays: &[DisplayInfo]) -> Vec<VirtualScreen> {
    displays
        .iter()
        .map(|d| VirtualScreen {
            client: client.to_string(),
            local_x: d.x,
            local_y: d.y,
            x: 0,
            y: 0,
            width: d.width,
            height: d.height,
            dpi: d.dpi,
        })
        .collect()
}
