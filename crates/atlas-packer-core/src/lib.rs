//! Core library for packing sprites into power-of-two texture atlases.
//!
//! - Algorithm: binary-space-partition ("lightmap") tree, largest sprite first
//! - Sizing: estimate from total area, then double one side and retry until everything fits
//! - Output: composed RGBA atlas plus a name-sorted manifest (`<name> <left> <right> <bottom> <top>`)
//!
//! Rects use a bottom-left origin with Y up; composition flips them into raster space.
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use atlas_packer_core::{InputImage, PackerConfig, pack_images, to_manifest_text};
//! # fn main() -> anyhow::Result<()> {
//! let img1 = ImageReader::open("a.png")?.decode()?;
//! let img2 = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![
//!   InputImage { key: "a".into(), image: img1 },
//!   InputImage { key: "b".into(), image: img2 },
//! ];
//! let out = pack_images(inputs, PackerConfig::default())?;
//! out.rgba.save("atlas.png")?;
//! std::fs::write("atlas-texture-data.txt", to_manifest_text(&out.manifest))?;
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `atlas_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackerConfig, PackerConfigBuilder};
    pub use crate::export::{parse_manifest, to_json, to_manifest_text};
    pub use crate::model::{
        AtlasLayout, LayoutItem, Manifest, PackStats, Packable, Placement, Rect, Sprite,
    };
    pub use crate::packer::{BspPacker, Packer};
    pub use crate::{
        AtlasJob, InputImage, JobOutput, PackOutput, attempt_pack, estimate_dimensions,
        grow_dimensions, pack_images, pack_jobs, pack_layout, size_atlas,
    };
}
