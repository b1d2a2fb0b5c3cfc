//! Sierpinski fill provider: the entry point used by the slicer.
//!
//! A provider is built once per object region. It works out the fractal
//! depth and bounding cube, picks the density provider, and builds either a
//! single 2D pattern shared by all layers or a 3D subdivision that varies
//! with height. Afterwards [`SierpinskiFillProvider::generate`] only reads.

use crate::cross3d::Cross3D;
use crate::density::{
    CombinedDensityProvider, DensityProvider, ImageBasedDensityProvider, UniformDensityProvider,
};
use crate::layer_index::LayerStartIndex;
use crate::settings::validate_positive;
use crate::{BBox3, FillMode, FillSettings, FractalConfig, Polygon, Result, SierpinskiFill};
use std::fmt;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dithering is always used for the pattern shared by all layers.
const USE_DITHERING: bool = true;

/// Fractal infill kinds served by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FillMethod {
    /// Plain cross pattern, identical on every layer
    Cross,
    /// Layered cross: the 2D pattern shifts with the layer height
    Cross3D,
}

/// Density-pattern strategy for the 3D subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternConstruction {
    /// Error diffusion between neighbouring prisms
    Dithered,
    /// Coarsest refinement meeting the density, followed by a sanitize pass
    MinimalDensity,
}

enum FillPattern {
    Shared(SierpinskiFill),
    Adaptive {
        structure: Cross3D,
        starts: LayerStartIndex,
    },
    /// Per-layer density without a 3D structure
    Unimplemented,
}

pub struct SierpinskiFillProvider {
    fractal_config: FractalConfig,
    density: Box<dyn DensityProvider>,
    pattern: FillPattern,
}

impl SierpinskiFillProvider {
    /// Shared 2D pattern with density `line_width / min_line_distance`.
    pub fn new(volume: &BBox3, min_line_distance: f32, line_width: f32) -> Result<Self> {
        let density = UniformDensityProvider::from_line_spacing(line_width, min_line_distance);
        Self::shared_with_provider(volume, min_line_distance, line_width, Box::new(density))
    }

    /// Shared 2D pattern with density read from a grayscale image.
    pub fn with_density_image<P: AsRef<Path>>(
        volume: &BBox3,
        min_line_distance: f32,
        line_width: f32,
        image: P,
    ) -> Result<Self> {
        let density = ImageBasedDensityProvider::load(image, volume)?;
        Self::shared_with_provider(volume, min_line_distance, line_width, Box::new(density))
    }

    /// 3D subdivision with uniform density and a dithered pattern.
    pub fn new_3d(volume: &BBox3, min_line_distance: f32, line_width: f32) -> Result<Self> {
        let density = UniformDensityProvider::from_line_spacing(line_width, min_line_distance);
        Self::adaptive_with_provider(
            volume,
            min_line_distance,
            line_width,
            Box::new(density),
            PatternConstruction::Dithered,
        )
    }

    /// 3D subdivision with image density squeezed into `[0.05, 0.5]`, built
    /// with the minimal-density pattern and sanitized.
    pub fn with_density_image_3d<P: AsRef<Path>>(
        volume: &BBox3,
        min_line_distance: f32,
        line_width: f32,
        image: P,
    ) -> Result<Self> {
        let image = ImageBasedDensityProvider::load(image, volume)?;
        let density = CombinedDensityProvider::new(Box::new(image));
        Self::adaptive_with_provider(
            volume,
            min_line_distance,
            line_width,
            Box::new(density),
            PatternConstruction::MinimalDensity,
        )
    }

    /// Build according to `settings`.
    ///
    /// [`FillMode::VaryingPerLayer`] yields a provider whose `generate`
    /// aborts the process.
    pub fn from_settings(volume: &BBox3, settings: &FillSettings) -> Result<Self> {
        settings.validate()?;
        let (mld, width) = (settings.min_line_distance, settings.line_width);
        match (settings.mode, &settings.density_image) {
            (FillMode::UniformAcrossLayers, None) => Self::new(volume, mld, width),
            (FillMode::UniformAcrossLayers, Some(image)) => {
                Self::with_density_image(volume, mld, width, image)
            }
            (FillMode::Adaptive3D, None) => Self::new_3d(volume, mld, width),
            (FillMode::Adaptive3D, Some(image)) => {
                Self::with_density_image_3d(volume, mld, width, image)
            }
            (FillMode::VaryingPerLayer, image) => {
                let density: Box<dyn DensityProvider> = match image {
                    Some(image) => Box::new(ImageBasedDensityProvider::load(image, volume)?),
                    None => Box::new(UniformDensityProvider::from_line_spacing(width, mld)),
                };
                let fractal_config = FractalConfig::compute(volume, mld, false)?;
                log::debug!("sierpinski fill without a pattern: {:?}", fractal_config);
                Ok(Self {
                    fractal_config,
                    density,
                    pattern: FillPattern::Unimplemented,
                })
            }
        }
    }

    /// Shared 2D pattern over the flattened bounding cube.
    pub fn shared_with_provider(
        volume: &BBox3,
        min_line_distance: f32,
        line_width: f32,
        density: Box<dyn DensityProvider>,
    ) -> Result<Self> {
        validate_positive("line_width", line_width)?;
        let fractal_config = FractalConfig::compute(volume, min_line_distance, false)?;
        let fill = SierpinskiFill::new(
            density.as_ref(),
            fractal_config.bounds.flatten(),
            fractal_config.depth,
            line_width,
            USE_DITHERING,
        );
        log::debug!(
            "shared sierpinski fill: depth {}, bounds {}",
            fractal_config.depth,
            fractal_config.bounds
        );
        Ok(Self {
            fractal_config,
            density,
            pattern: FillPattern::Shared(fill),
        })
    }

    /// 3D subdivision over the bounding cube.
    pub fn adaptive_with_provider(
        volume: &BBox3,
        min_line_distance: f32,
        line_width: f32,
        density: Box<dyn DensityProvider>,
        construction: PatternConstruction,
    ) -> Result<Self> {
        validate_positive("line_width", line_width)?;
        let fractal_config = FractalConfig::compute(volume, min_line_distance, true)?;
        let mut structure =
            Cross3D::new(fractal_config.bounds, fractal_config.depth, line_width);
        structure.initialize(density.as_ref());
        match construction {
            PatternConstruction::Dithered => structure.create_dithered_pattern(density.as_ref()),
            PatternConstruction::MinimalDensity => {
                structure.create_minimal_density_pattern(density.as_ref());
                structure.sanitize();
            }
        }
        let starts = structure.sequence_starts();
        log::debug!(
            "adaptive cross3d fill: depth {}, bounds {}, {} layer starts",
            fractal_config.depth,
            fractal_config.bounds,
            starts.len()
        );
        Ok(Self {
            fractal_config,
            density,
            pattern: FillPattern::Adaptive { structure, starts },
        })
    }

    pub fn fractal_config(&self) -> &FractalConfig {
        &self.fractal_config
    }

    pub fn density(&self) -> &dyn DensityProvider {
        self.density.as_ref()
    }

    pub fn is_shared_pattern(&self) -> bool {
        matches!(self.pattern, FillPattern::Shared(_))
    }

    pub fn is_adaptive_3d(&self) -> bool {
        matches!(self.pattern, FillPattern::Adaptive { .. })
    }

    pub fn shared_pattern(&self) -> Option<&SierpinskiFill> {
        match &self.pattern {
            FillPattern::Shared(fill) => Some(fill),
            _ => None,
        }
    }

    pub fn structure_3d(&self) -> Option<&Cross3D> {
        match &self.pattern {
            FillPattern::Adaptive { structure, .. } => Some(structure),
            _ => None,
        }
    }

    pub fn layer_start_index(&self) -> Option<&LayerStartIndex> {
        match &self.pattern {
            FillPattern::Adaptive { starts, .. } => Some(starts),
            _ => None,
        }
    }

    /// Fill polygon for the layer at height `z`.
    ///
    /// The shared 2D pattern ignores `z` and `pocket_size` except for
    /// [`FillMethod::Cross3D`], which is given half the line width as the
    /// minimum distance to the triangle sides. The 3D subdivision walks the
    /// slice starting at the cell indexed for `z`.
    ///
    /// Called on a provider built for [`FillMode::VaryingPerLayer`], this
    /// logs an error and terminates the process with a non-zero status. It
    /// does not return.
    pub fn generate(&self, method: FillMethod, z: f32, line_width: f32, pocket_size: f32) -> Polygon {
        match &self.pattern {
            FillPattern::Shared(fill) => match method {
                FillMethod::Cross3D => fill.generate_cross_layered(z, line_width / 2.0, pocket_size),
                FillMethod::Cross => fill.generate_cross(),
            },
            FillPattern::Adaptive { structure, starts } => match starts.start_cell(z) {
                Some(start) => {
                    let walker = structure.sequence(start, z);
                    structure.generate_cross(&walker, z)
                }
                None => Polygon::default(),
            },
            FillPattern::Unimplemented => abort_unimplemented(),
        }
    }
}

/// Designed hard stop for the per-layer density configuration without a 3D
/// structure. This is not a recoverable error.
fn abort_unimplemented() -> ! {
    log::error!("Different density sierpinski fill for different layers is not implemented yet!");
    log::logger().flush();
    std::process::exit(-1);
}

impl fmt::Debug for SierpinskiFillProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = match &self.pattern {
            FillPattern::Shared(_) => "shared 2D",
            FillPattern::Adaptive { .. } => "adaptive 3D",
            FillPattern::Unimplemented => "unimplemented",
        };
        f.debug_struct("SierpinskiFillProvider")
            .field("fractal_config", &self.fractal_config)
            .field("pattern", &pattern)
            .finish_non_exhaustive()
    }
}
