use crate::compositing::compose;
use crate::config::PackerConfig;
use crate::error::{PackerError, Result};
use crate::model::{AtlasLayout, LayoutItem, Manifest, PackStats, Packable, Placement, Rect, Sprite};
use crate::packer::{BspPacker, Packer};
use image::{DynamicImage, RgbaImage};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to pack (name + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// One packing problem: every sprite that goes into a single atlas.
pub struct AtlasJob {
    pub name: String,
    pub inputs: Vec<InputImage>,
}

/// Output of a packing run: layout, name-sorted manifest and the composed RGBA atlas.
pub struct PackOutput {
    pub layout: AtlasLayout,
    pub manifest: Manifest,
    pub rgba: RgbaImage,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `layout.stats()`.
    pub fn stats(&self) -> PackStats {
        self.layout.stats()
    }
}

/// Result of one job from [`pack_jobs`].
pub struct JobOutput {
    pub name: String,
    pub output: PackOutput,
}

#[instrument(skip_all, fields(sprites = inputs.len()))]
/// Packs `inputs` into a single power-of-two atlas and composes its pixels.
///
/// Notes:
/// - Sprites are inserted largest area first; ties break by name for deterministic results.
/// - Names must be unique and sprites non-empty.
/// - An empty input yields a 1x1 transparent atlas with an empty manifest.
pub fn pack_images(inputs: Vec<InputImage>, cfg: PackerConfig) -> Result<PackOutput> {
    // Validate configuration first
    cfg.validate()?;

    let sprites: Vec<Sprite> = inputs
        .into_iter()
        .map(|inp| Sprite::new(inp.key, inp.image.to_rgba8()))
        .collect();
    check_items(&sprites)?;

    let layout = size_atlas(&sprites, &cfg)?;
    let rgba = compose(&layout, &sprites)?;
    let manifest = Manifest::from_layout(&layout);
    Ok(PackOutput {
        layout,
        manifest,
        rgba,
    })
}

// ---------------- Layout-only API ----------------

/// Packs sizes without compositing pixel data.
/// Inputs are (name, width, height).
pub fn pack_layout<K: Into<String>>(
    inputs: Vec<(K, u32, u32)>,
    cfg: PackerConfig,
) -> Result<AtlasLayout> {
    cfg.validate()?;
    let items: Vec<LayoutItem> = inputs
        .into_iter()
        .map(|(k, w, h)| LayoutItem::new(k, w, h))
        .collect();
    check_items(&items)?;
    size_atlas(&items, &cfg)
}

/// Packs independent jobs, in input order. The first failure aborts the run.
///
/// With feature `parallel` and `cfg.parallel`, jobs run on the rayon pool.
pub fn pack_jobs(jobs: Vec<AtlasJob>, cfg: &PackerConfig) -> Result<Vec<JobOutput>> {
    cfg.validate()?;

    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return jobs
                .into_par_iter()
                .map(|job| pack_job(job, cfg))
                .collect();
        }
    }

    jobs.into_iter().map(|job| pack_job(job, cfg)).collect()
}

fn pack_job(job: AtlasJob, cfg: &PackerConfig) -> Result<JobOutput> {
    let start = Instant::now();
    let output = pack_images(job.inputs, cfg.clone())?;
    let stats = output.stats();
    info!(
        job = %job.name,
        width = stats.width,
        height = stats.height,
        attempts = stats.attempts,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "atlas packed"
    );
    Ok(JobOutput {
        name: job.name,
        output,
    })
}

fn check_items<P: Packable>(items: &[P]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    for it in items {
        let (w, h) = it.size();
        if w == 0 || h == 0 {
            return Err(PackerError::InvalidInput(format!(
                "sprite {} has zero size ({}x{})",
                it.name(),
                w,
                h
            )));
        }
        if !seen.insert(it.name()) {
            return Err(PackerError::DuplicateName(it.name().to_string()));
        }
    }
    Ok(())
}

// ---------------- Atlas sizing ----------------

/// `ceil(sqrt(v))` without going through floats.
fn ceil_sqrt(v: u64) -> u64 {
    let r = v.isqrt();
    if r * r < v { r + 1 } else { r }
}

fn to_dim(v: u64, width: u64, height: u64) -> Result<u32> {
    u32::try_from(v).map_err(|_| PackerError::OutOfSpace {
        width,
        height,
        limit: crate::config::MAX_ATLAS_DIMENSION,
    })
}

/// Initial (width, height) guess from the total sprite area.
///
/// `width = nextPow2(ceil(sqrt(sum)))`, `height = nextPow2(ceil(sum / width))`,
/// so `height <= width`. An empty set estimates `(1, 1)`.
pub fn estimate_dimensions<I: IntoIterator<Item = u64>>(areas: I) -> Result<(u32, u32)> {
    let sum: u64 = areas.into_iter().sum();
    let width = ceil_sqrt(sum).next_power_of_two();
    let height = sum.div_ceil(width).next_power_of_two();
    Ok((to_dim(width, width, height)?, to_dim(height, width, height)?))
}

/// Next size in the growth sequence: square atlases widen, wide ones grow taller.
/// `None` once doubling would overflow.
pub fn grow_dimensions(width: u32, height: u32) -> Option<(u32, u32)> {
    if width == height {
        width.checked_mul(2).map(|w| (w, height))
    } else {
        height.checked_mul(2).map(|h| (width, h))
    }
}

/// One packing attempt into a fresh `width x height` tree, in the given order.
///
/// Returns rects aligned with `items`, or `None` as soon as one item does not fit.
/// Nothing from a failed attempt escapes.
pub fn attempt_pack<P: Packable>(items: &[P], width: u32, height: u32) -> Option<Vec<Rect>> {
    let mut packer: BspPacker<usize> = BspPacker::new(width, height);
    let mut rects = Vec::with_capacity(items.len());
    for (idx, it) in items.iter().enumerate() {
        let (w, h) = it.size();
        rects.push(packer.pack(idx, w, h)?);
    }
    Some(rects)
}

/// Sort largest area first; equal areas by name so the result is deterministic.
fn sort_for_packing<P: Packable>(items: &[P]) -> Vec<&P> {
    let mut sorted: Vec<&P> = items.iter().collect();
    sorted.sort_by(|a, b| {
        b.area()
            .cmp(&a.area())
            .then_with(|| a.name().cmp(b.name()))
    });
    sorted
}

#[instrument(skip_all, fields(items = items.len()))]
/// Runs the growth loop: estimate, attempt, and on failure discard and grow until everything fits.
///
/// Stops with `OutOfSpace` when the next size would exceed `cfg.max_dimension`
/// (or the `u32` doubling limit when no ceiling is configured).
pub fn size_atlas<P: Packable>(items: &[P], cfg: &PackerConfig) -> Result<AtlasLayout> {
    let limit = cfg.dimension_limit();
    let sorted = sort_for_packing(items);
    let (mut width, mut height) = estimate_dimensions(sorted.iter().map(|it| it.area()))?;
    let mut attempts = 0u32;

    loop {
        if width > limit || height > limit {
            return Err(PackerError::OutOfSpace {
                width: width as u64,
                height: height as u64,
                limit,
            });
        }
        attempts += 1;
        if let Some(rects) = attempt_pack(&sorted, width, height) {
            let placements = sorted
                .iter()
                .zip(rects)
                .map(|(it, rect)| Placement {
                    name: it.name().to_string(),
                    rect,
                })
                .collect();
            debug!(width, height, attempts, "all sprites placed");
            return Ok(AtlasLayout {
                width,
                height,
                placements,
                attempts,
            });
        }
        debug!(width, height, attempt = attempts, "attempt failed, growing atlas");
        (width, height) = grow_dimensions(width, height).ok_or(PackerError::OutOfSpace {
            width: width as u64,
            height: height as u64,
            limit,
        })?;
    }
}
