use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels) with a bottom-left origin and Y growing upward.
///
/// Edges are half-open: a rect covers columns `left..right` and rows `bottom..top`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: u32,
    pub right: u32,
    pub bottom: u32,
    pub top: u32,
}

impl Rect {
    pub fn new(left: u32, right: u32, bottom: u32, top: u32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }
    pub fn width(&self) -> u32 {
        self.right - self.left
    }
    pub fn height(&self) -> u32 {
        self.top - self.bottom
    }
    pub fn area(&self) -> u64 {
        (self.width() as u64) * (self.height() as u64)
    }
    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.left >= self.left && r.bottom >= self.bottom && r.right <= self.right && r.top <= self.top
    }
    /// Returns true if the two rects share any pixel. Touching edges do not count.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.left >= r.right || r.left >= self.right || self.bottom >= r.top || r.bottom >= self.top)
    }
}

/// Something the sizer can place: a named box.
pub trait Packable {
    fn name(&self) -> &str;
    fn size(&self) -> (u32, u32);
    fn area(&self) -> u64 {
        let (w, h) = self.size();
        (w as u64) * (h as u64)
    }
}

impl<T: Packable + ?Sized> Packable for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }
}

/// A decoded input image. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Sprite {
    /// Unique within one atlas job.
    pub name: String,
    pub rgba: RgbaImage,
}

impl Sprite {
    pub fn new(name: impl Into<String>, rgba: RgbaImage) -> Self {
        Self {
            name: name.into(),
            rgba,
        }
    }
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
    pub fn area(&self) -> u64 {
        (self.width() as u64) * (self.height() as u64)
    }
    pub fn perimeter(&self) -> u64 {
        2 * (self.width() as u64 + self.height() as u64)
    }
}

impl Packable for Sprite {
    fn name(&self) -> &str {
        &self.name
    }
    fn size(&self) -> (u32, u32) {
        self.rgba.dimensions()
    }
}

/// Size-only stand-in for a sprite (layout-only packing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutItem {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl LayoutItem {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }
}

impl Packable for LayoutItem {
    fn name(&self) -> &str {
        &self.name
    }
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Where a sprite landed. Doubles as a manifest entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub rect: Rect,
}

/// Final dimensions and placements of one successfully packed atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasLayout {
    pub width: u32,
    pub height: u32,
    /// In packing order (area descending).
    pub placements: Vec<Placement>,
    /// Number of packing attempts the growth loop made, including the successful one.
    pub attempts: u32,
}

impl AtlasLayout {
    pub fn bounds(&self) -> Rect {
        Rect::new(0, self.width, 0, self.height)
    }

    /// Computes packing statistics for this layout.
    pub fn stats(&self) -> PackStats {
        let atlas_area = (self.width as u64) * (self.height as u64);
        let used_area: u64 = self.placements.iter().map(|p| p.rect.area()).sum();
        let occupancy = if atlas_area > 0 {
            used_area as f64 / atlas_area as f64
        } else {
            0.0
        };
        PackStats {
            sprites: self.placements.len(),
            width: self.width,
            height: self.height,
            atlas_area,
            used_area,
            occupancy,
            attempts: self.attempts,
        }
    }
}

/// Name-sorted placement table written next to the atlas image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub width: u32,
    pub height: u32,
    /// Sorted by name ascending.
    pub entries: Vec<Placement>,
}

impl Manifest {
    pub fn from_layout(layout: &AtlasLayout) -> Self {
        let mut entries = layout.placements.clone();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            width: layout.width,
            height: layout.height,
            entries,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rect> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i].rect)
    }
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub sprites: usize,
    pub width: u32,
    pub height: u32,
    /// width * height.
    pub atlas_area: u64,
    /// Sum of sprite areas.
    pub used_area: u64,
    /// used_area / atlas_area (0.0 to 1.0).
    pub occupancy: f64,
    pub attempts: u32,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Sprites: {}, Size: {}x{}, Occupancy: {:.2}%, Used Area: {} px², Attempts: {}",
            self.sprites,
            self.width,
            self.height,
            self.occupancy * 100.0,
            self.used_area,
            self.attempts,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.atlas_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.atlas_area > 0 {
            (self.wasted_area() as f64 / self.atlas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
