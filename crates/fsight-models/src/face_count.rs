use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Three-valued face presence category.
///
/// Downstream policy only needs to distinguish "no face", "exactly one
/// face" and "multiple faces"; exact counts above two add no decision
/// value and reduce robustness to detector noise. On the wire this is a
/// bare integer 0, 1 or 2 (2 means "two or more").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceCount {
    /// No face detected.
    None,
    /// Exactly one face detected.
    One,
    /// Two or more faces detected.
    Multiple,
}

impl FaceCount {
    /// Bucket a raw detection count into a category.
    pub fn from_detections(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::One,
            _ => Self::Multiple,
        }
    }

    /// Wire value (0, 1 or 2).
    pub fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::One => 1,
            Self::Multiple => 2,
        }
    }
}

impl Serialize for FaceCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for FaceCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Self::None),
            1 => Ok(Self::One),
            2 => Ok(Self::Multiple),
            other => Err(de::Error::custom(format!(
                "face count must be 0, 1 or 2, got {other}"
            ))),
        }
    }
}
