//! Remote link vocabulary
//!
//! Operation modes, return codes and the raw payloads returned by the simulation server.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Result of one remote call: payload on success, the failing code otherwise.
pub type LinkResult<T> = std::result::Result<T, ReturnCode>;

/// Operation mode of a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpMode {
    /// Wait for the server reply
    Blocking,
    /// Fire-and-forget, never waits for a reply
    OneShot,
    /// Subscribe: the server keeps refreshing a client-side buffer
    Streaming,
    /// Poll the client-side buffer filled by a previous subscription
    Buffer,
}

impl OpMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OpMode::Blocking => "blocking",
            OpMode::OneShot => "oneshot",
            OpMode::Streaming => "streaming",
            OpMode::Buffer => "buffer",
        }
    }
}

/// Bit-flag status returned by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnCode(pub u32);

impl ReturnCode {
    pub const OK: ReturnCode = ReturnCode(0);
    /// Nothing available yet (no reply or empty buffer)
    pub const NO_VALUE: ReturnCode = ReturnCode(1);
    pub const TIMEOUT: ReturnCode = ReturnCode(2);
    pub const ILLEGAL_OPMODE: ReturnCode = ReturnCode(4);
    /// Server side error, also used for "no such object"
    pub const REMOTE_ERROR: ReturnCode = ReturnCode(8);
    pub const SPLIT_PROGRESS: ReturnCode = ReturnCode(16);
    pub const LOCAL_ERROR: ReturnCode = ReturnCode(32);
    pub const INITIALIZE_ERROR: ReturnCode = ReturnCode(64);

    pub fn is_ok(self) -> bool {
        self == Self::OK
    }

    pub fn is_no_value(self) -> bool {
        self == Self::NO_VALUE
    }

    /// Whether this code counts as success for a call issued in `mode`.
    ///
    /// Blocking and buffered calls need a real value; one-shot and streaming calls
    /// are never acknowledged synchronously, so "no value" is fine for them.
    pub fn accepted_for(self, mode: OpMode) -> bool {
        match mode {
            OpMode::Blocking | OpMode::Buffer => self.is_ok(),
            OpMode::OneShot | OpMode::Streaming => self.is_ok() || self.is_no_value(),
        }
    }

    /// Human readable names of the flags set in this code
    pub fn flags(self) -> Vec<&'static str> {
        const NAMES: [(u32, &str); 7] = [
            (1, "no_value"),
            (2, "timeout"),
            (4, "illegal_opmode"),
            (8, "remote_error"),
            (16, "split_progress"),
            (32, "local_error"),
            (64, "initialize_error"),
        ];
        NAMES
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "code 0 (ok)");
        }
        write!(f, "code {} ({})", self.0, self.flags().join("|"))
    }
}

/// Pixel layout requested from a vision sensor; the client only captures RGB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFormat {
    /// Three bytes per pixel
    #[default]
    Rgb,
}

/// 3D vector in scene units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Raw proximity sensor reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximityReading {
    /// Whether a surface was detected within range
    pub detected: bool,
    /// Detected point, relative to the sensor frame
    pub point: Vector3,
    /// Handle of the detected object, if any
    pub detected_object: Option<i32>,
    /// Normal of the detected surface
    pub surface_normal: Vector3,
}

impl ProximityReading {
    /// Reading for "nothing in range"
    pub fn nothing() -> Self {
        Self::default()
    }

    /// Reading for a surface detected at `point`
    pub fn at(point: Vector3) -> Self {
        Self {
            detected: true,
            point,
            ..Self::default()
        }
    }
}

/// Raw vision sensor reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionFrame {
    /// (width, height) in pixels
    pub resolution: (u32, u32),
    /// Row-major pixel bytes
    pub pixels: Bytes,
}

impl VisionFrame {
    pub fn width(&self) -> u32 {
        self.resolution.0
    }

    pub fn height(&self) -> u32 {
        self.resolution.1
    }
}
