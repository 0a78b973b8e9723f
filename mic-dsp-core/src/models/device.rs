use std::fmt;

/// Data-flow direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Capture,
    Render,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Capture => "capture",
            Self::Render => "render",
        })
    }
}

/// Positional index of an endpoint among the active endpoints of one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceIndex(pub u16);

impl fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An active audio endpoint as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEndpoint {
    /// Stable platform identifier (survives reboots and re-plugging).
    pub id: String,
    pub name: String,
    pub direction: Direction,
    pub is_default: bool,
}

/// The capture/render pair handed to the echo canceller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevicePair {
    pub mic: DeviceIndex,
    pub render: DeviceIndex,
}

impl DevicePair {
    /// Both indices in one value: render in the high 16 bits, mic in the low 16.
    ///
    /// The engine needs both slots set together; setting either one to
    /// "default" on its own makes it pick the wrong devices.
    pub fn packed(&self) -> i32 {
        (((self.render.0 as u32) << 16) | self.mic.0 as u32) as i32
    }
}
