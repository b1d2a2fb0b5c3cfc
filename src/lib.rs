//! # Sierpinski Fill
//!
//! Adaptive Sierpinski and cross fractal infill patterns for layer-based
//! 3D printing.
//!
//! ## Features
//!
//! - **Shared 2D pattern**: one closed curve reused on every layer
//! - **Adaptive 3D pattern**: a prism subdivision whose slices change with height
//! - **Density control**: uniform, closure-based or read from a grayscale TGA image
//!
//! ## Example
//!
//! ```rust
//! use sierpinski_fill::{BBox3, FillMethod, SierpinskiFillProvider};
//! use nalgebra::Vector3;
//!
//! let volume = BBox3::new(Vector3::zeros(), Vector3::new(40.0, 40.0, 20.0));
//! let provider = SierpinskiFillProvider::new(&volume, 2.0, 0.4)?;
//!
//! let layer = provider.generate(FillMethod::Cross, 0.2, 0.4, 0.0);
//! assert!(layer.len() > 2);
//! # Ok::<(), sierpinski_fill::Error>(())
//! ```

pub mod cross3d;
pub mod density;
pub mod error;
pub mod fractal_config;
pub mod image;
pub mod image_io;
pub mod layer_index;
pub mod logging;
pub mod polygon;
pub mod provider;
pub mod settings;
pub mod sierpinski;
mod triangle;
pub mod types;

// Re-exports
pub use cross3d::{Cell, CellId, Cross3D, SliceWalker};
pub use density::{
    CombinedDensityProvider, DensityProvider, ImageBasedDensityProvider, UniformDensityProvider,
};
pub use error::{Error, Result};
pub use fractal_config::FractalConfig;
pub use image::{Image, ImageGrayScale};
pub use image_io::TgaIo;
pub use layer_index::LayerStartIndex;
pub use logging::LogFile;
pub use polygon::Polygon;
pub use provider::{FillMethod, PatternConstruction, SierpinskiFillProvider};
pub use settings::{FillMode, FillSettings};
pub use sierpinski::SierpinskiFill;
pub use types::{BBox2, BBox3};
