//! Animation descriptors. Playback belongs to the renderer.

use crate::objects::ObjectId;
use serde::{Deserialize, Serialize};

/// Kind of entrance/emphasis effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Fade,
    Slide,
    Rotate,
    Scale,
    Bounce,
}

/// An animation attached to an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub id: ObjectId,
    pub object_id: ObjectId,
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub duration_ms: u64,
    #[serde(default)]
    pub delay_ms: u64,
}

impl Animation {
    pub fn new(id: ObjectId, object_id: ObjectId, kind: AnimationKind, duration_ms: u64, delay_ms: u64) -> Self {
        Self {
            id,
            object_id,
            kind,
            duration_ms,
            delay_ms,
        }
    }

    /// Time from the start of playback until the animation finishes.
    pub fn end_ms(&self) -> u64 {
        self.delay_ms.saturating_add(self.duration_ms)
    }
}
