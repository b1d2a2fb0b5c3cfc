//! Settings selecting how a fill provider is built

use crate::{Error, Result};
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the pattern relates to the layers of the print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FillMode {
    /// One 2D pattern reused for every layer
    #[default]
    UniformAcrossLayers,
    /// A 3D subdivision; the pattern changes with the layer height
    Adaptive3D,
    /// Per-layer density without a 3D subdivision. Never implemented:
    /// generating from it aborts the process.
    VaryingPerLayer,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FillSettings {
    /// Smallest distance between neighbouring lines of the curve
    pub min_line_distance: f32,
    pub line_width: f32,
    /// Grayscale TGA whose dark areas are filled densely
    pub density_image: Option<PathBuf>,
    pub mode: FillMode,
}

impl FillSettings {
    pub fn new(min_line_distance: f32, line_width: f32) -> Self {
        Self {
            min_line_distance,
            line_width,
            density_image: None,
            mode: FillMode::default(),
        }
    }

    pub fn with_density_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.density_image = Some(path.into());
        self
    }

    pub fn with_mode(mut self, mode: FillMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_positive("min_line_distance", self.min_line_distance)?;
        validate_positive("line_width", self.line_width)
    }
}

pub(crate) fn validate_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}
