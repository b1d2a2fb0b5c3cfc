//! Density providers: map a region of the print to a desired fill fraction.
//!
//! All providers return values in `[0, 1]`. Two-dimensional callers pass a
//! region with a zero z-extent.

use crate::image::Image;
use crate::{BBox2, BBox3, ImageGrayScale, Result, TgaIo};
use nalgebra::Vector2;
use std::fmt;
use std::path::Path;

/// Desired local infill density for a region.
pub trait DensityProvider: Send + Sync {
    fn density(&self, region: &BBox3) -> f32;
}

impl<F> DensityProvider for F
where
    F: Fn(&BBox3) -> f32 + Send + Sync,
{
    fn density(&self, region: &BBox3) -> f32 {
        self(region)
    }
}

/// The same density everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformDensityProvider {
    density: f32,
}

impl UniformDensityProvider {
    pub fn new(density: f32) -> Self {
        Self { density }
    }

    /// Density achieved by lines of `line_width` laid `line_distance` apart.
    pub fn from_line_spacing(line_width: f32, line_distance: f32) -> Self {
        Self::new(line_width / line_distance)
    }
}

impl DensityProvider for UniformDensityProvider {
    fn density(&self, _region: &BBox3) -> f32 {
        self.density
    }
}

/// Density read from a grayscale image stretched over the model footprint.
///
/// The image keeps its aspect ratio: it is scaled uniformly until it covers
/// the XY extent of the model and centered on it. Dark pixels mean dense
/// infill.
pub struct ImageBasedDensityProvider {
    image: ImageGrayScale,
    footprint: BBox2,
    /// Model units per pixel
    pixel_size: f32,
}

impl ImageBasedDensityProvider {
    pub fn load<P: AsRef<Path>>(path: P, model_bounds: &BBox3) -> Result<Self> {
        let image = TgaIo::load_tga(path)?;
        Ok(Self::from_image(image, model_bounds))
    }

    pub fn from_image(image: ImageGrayScale, model_bounds: &BBox3) -> Self {
        let model = model_bounds.flatten();
        let size = model.size();
        let pixels = Vector2::new(image.width().max(1) as f32, image.height().max(1) as f32);
        let pixel_size = (size.x / pixels.x).max(size.y / pixels.y);
        let pixel_size = if pixel_size > 0.0 { pixel_size } else { 1.0 };

        let half = pixels * (pixel_size * 0.5);
        let center = model.center();
        let footprint = BBox2::new(center - half, center + half);

        Self {
            image,
            footprint,
            pixel_size,
        }
    }

    pub fn footprint(&self) -> BBox2 {
        self.footprint
    }

    /// Pixel column for model x; may be out of range.
    fn column(&self, x: f32) -> f32 {
        (x - self.footprint.min.x) / self.pixel_size
    }

    /// Pixel row for model y; row 0 is the max-y edge.
    fn row(&self, y: f32) -> f32 {
        (self.footprint.max.y - y) / self.pixel_size
    }

    fn to_index(value: f32, len: usize) -> usize {
        if value <= 0.0 {
            0
        } else {
            (value as usize).min(len)
        }
    }
}

impl DensityProvider for ImageBasedDensityProvider {
    fn density(&self, region: &BBox3) -> f32 {
        let region = region.flatten();
        let width = self.image.width();
        let height = self.image.height();

        let x0 = Self::to_index(self.column(region.min.x).floor(), width);
        let x1 = Self::to_index(self.column(region.max.x).ceil(), width);
        let y0 = Self::to_index(self.row(region.max.y).floor(), height);
        let y1 = Self::to_index(self.row(region.min.y).ceil(), height);

        let lightness = self.image.mean_gray(x0, y0, x1, y1).unwrap_or_else(|| {
            let center = region.center();
            let x = Self::to_index(self.column(center.x), width.saturating_sub(1));
            let y = Self::to_index(self.row(center.y), height.saturating_sub(1));
            self.image.gray_value(x, y)
        });
        (1.0 - lightness).clamp(0.0, 1.0)
    }
}

impl fmt::Debug for ImageBasedDensityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBasedDensityProvider")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("footprint", &self.footprint)
            .field("pixel_size", &self.pixel_size)
            .finish()
    }
}

/// Affine recombination of another provider, `density * scale + offset`.
///
/// The default transform squeezes the wrapped density into `[0.05, 0.5]`,
/// since the 3D subdivision cannot represent exactly empty or exactly full
/// regions.
pub struct CombinedDensityProvider {
    inner: Box<dyn DensityProvider>,
    scale: f32,
    offset: f32,
}

impl CombinedDensityProvider {
    pub const DEFAULT_SCALE: f32 = 0.45;
    pub const DEFAULT_OFFSET: f32 = 0.05;

    pub fn new(inner: Box<dyn DensityProvider>) -> Self {
        Self::with_transform(inner, Self::DEFAULT_SCALE, Self::DEFAULT_OFFSET)
    }

    pub fn with_transform(inner: Box<dyn DensityProvider>, scale: f32, offset: f32) -> Self {
        Self {
            inner,
            scale,
            offset,
        }
    }

    pub fn into_inner(self) -> Box<dyn DensityProvider> {
        self.inner
    }
}

impl DensityProvider for CombinedDensityProvider {
    fn density(&self, region: &BBox3) -> f32 {
        let density = self.inner.density(region);
        (density * self.scale + self.offset).clamp(0.0, 1.0)
    }
}

impl fmt::Debug for CombinedDensityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedDensityProvider")
            .field("scale", &self.scale)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cube(size: f32) -> BBox3 {
        BBox3::new(Vector3::zeros(), Vector3::new(size, size, size))
    }

    #[test]
    fn test_uniform_density() {
        let provider = UniformDensityProvider::from_line_spacing(0.4, 2.0);
        assert!((provider.density(&cube(1.0)) - 0.2).abs() < 1e-6);
        assert_eq!(provider.density(&cube(1.0)), provider.density(&cube(100.0)));
    }

    #[test]
    fn test_combined_density_bounds() {
        for i in 0..=100 {
            let d = i as f32 / 100.0;
            let combined = CombinedDensityProvider::new(Box::new(UniformDensityProvider::new(d)));
            let value = combined.density(&cube(1.0));
            assert!(value >= 0.05 - 1e-6, "{} -> {}", d, value);
            assert!(value <= 0.5 + 1e-6, "{} -> {}", d, value);
        }
    }

    #[test]
    fn test_combined_custom_transform() {
        let inner = Box::new(|_: &BBox3| 0.5f32);
        let combined = CombinedDensityProvider::with_transform(inner, 4.0, 0.0);
        assert_eq!(combined.density(&cube(1.0)), 1.0);
    }

    #[test]
    fn test_image_density_halves() {
        // left half black (dense), right half white (empty)
        let mut image = ImageGrayScale::filled(4, 4, 1.0);
        for y in 0..4 {
            image.set_value(0, y, 0.0);
            image.set_value(1, y, 0.0);
        }
        let provider = ImageBasedDensityProvider::from_image(image, &cube(40.0));

        let left = BBox3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(20.0, 40.0, 0.0));
        let right = BBox3::new(Vector3::new(20.0, 0.0, 0.0), Vector3::new(40.0, 40.0, 0.0));
        assert_eq!(provider.density(&left), 1.0);
        assert_eq!(provider.density(&right), 0.0);
        assert_eq!(provider.density(&cube(40.0)), 0.5);
    }

    #[test]
    fn test_image_rows_run_top_down() {
        // top row black, bottom row white
        let mut image = ImageGrayScale::filled(1, 2, 1.0);
        image.set_value(0, 0, 0.0);
        let provider = ImageBasedDensityProvider::from_image(image, &cube(10.0));

        let top = BBox3::new(Vector3::new(0.0, 6.0, 0.0), Vector3::new(10.0, 9.0, 0.0));
        let bottom = BBox3::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(10.0, 4.0, 0.0));
        assert_eq!(provider.density(&top), 1.0);
        assert_eq!(provider.density(&bottom), 0.0);
    }

    #[test]
    fn test_image_keeps_aspect_ratio() {
        let image = ImageGrayScale::filled(2, 1, 0.0);
        let model = BBox3::new(Vector3::zeros(), Vector3::new(10.0, 10.0, 1.0));
        let provider = ImageBasedDensityProvider::from_image(image, &model);
        let footprint = provider.footprint();
        assert_eq!(footprint.size(), Vector2::new(20.0, 10.0));
        assert_eq!(footprint.center(), Vector2::new(5.0, 5.0));
    }

    #[test]
    fn test_image_region_outside_uses_nearest_pixel() {
        let mut image = ImageGrayScale::filled(2, 1, 1.0);
        image.set_value(1, 0, 0.0);
        let provider = ImageBasedDensityProvider::from_image(image, &cube(10.0));
        let far_right = BBox3::new(Vector3::new(50.0, 4.0, 0.0), Vector3::new(51.0, 5.0, 0.0));
        assert_eq!(provider.density(&far_right), 1.0);
    }
}
