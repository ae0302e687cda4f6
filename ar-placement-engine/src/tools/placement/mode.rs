use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::StatusSink;
use crate::error::{PlacementError, PlacementResult};

/// Primitive shapes that can be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Cylinder,
}

impl PrimitiveKind {
    pub const ALL: [Self; 3] = [Self::Cube, Self::Sphere, Self::Cylinder];

    /// Convert string identifier to kind for RPC and shortcut compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cube" => Some(Self::Cube),
            "sphere" => Some(Self::Sphere),
            "cylinder" => Some(Self::Cylinder),
            _ => None,
        }
    }

    /// Identifier used on the wire and in entity names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
        }
    }

    /// Name shown to the user.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Sphere => "Sphere",
            Self::Cylinder => "Cylinder",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PrimitiveKind {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s).ok_or_else(|| PlacementError::InvalidMode(s.to_string()))
    }
}

/// Tracks which primitive is armed for the next placement.
#[derive(Debug, Clone)]
pub struct PlacementModeController {
    armed: PrimitiveKind,
}

impl Default for PlacementModeController {
    fn default() -> Self {
        Self {
            armed: PrimitiveKind::Cube,
        }
    }
}

impl PlacementModeController {
    /// Arm `kind` and report the new mode.
    pub fn set_mode(&mut self, kind: PrimitiveKind, status: &mut dyn StatusSink) {
        if self.armed != kind {
            info!("Placement mode changed: {} -> {}", self.armed, kind);
        }
        self.armed = kind;
        status.report(&format!("Mode: {}", kind.display_name()));
    }

    /// Arm a kind by name. Unknown names leave the current mode untouched.
    pub fn set_mode_by_name(
        &mut self,
        name: &str,
        status: &mut dyn StatusSink,
    ) -> PlacementResult<PrimitiveKind> {
        let kind = name.parse::<PrimitiveKind>()?;
        self.set_mode(kind, status);
        Ok(kind)
    }

    pub fn current_mode(&self) -> PrimitiveKind {
        self.armed
    }
}
