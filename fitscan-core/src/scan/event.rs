use serde::{Deserialize, Serialize};
use std::fmt;

/// A decode callback delivered by the camera.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanEvent {
    /// Symbology reported by the camera, e.g. `ean13`
    #[serde(rename = "type")]
    pub kind: String,
    /// Decoded payload, forwarded verbatim to the lookup
    pub data: String,
}

impl ScanEvent {
    pub fn new(kind: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: data.into(),
        }
    }

    /// Event for a payload whose symbology is unknown.
    pub fn barcode(data: impl Into<String>) -> Self {
        Self::new("unknown", data)
    }

    pub fn has_payload(&self) -> bool {
        !self.data.trim().is_empty()
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type: {}\nData: {}", self.kind, self.data)
    }
}

/// Camera access as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraPermission {
    /// Not asked yet, or the answer is still loading
    #[default]
    Undetermined,
    Granted,
    Denied,
}

impl CameraPermission {
    pub fn is_granted(&self) -> bool {
        *self == CameraPermission::Granted
    }
}
