use crate::error::{PackerError, Result};
use crate::model::{AtlasLayout, Rect, Sprite};
use image::RgbaImage;
use std::collections::HashMap;

/// Blit `src` verbatim into `canvas` with its top-left corner at (dx, dy).
/// Pixels falling outside the canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    let w = sw.min(cw.saturating_sub(dx));
    let h = sh.min(ch.saturating_sub(dy));
    for yy in 0..h {
        for xx in 0..w {
            let px = *src.get_pixel(xx, yy);
            canvas.put_pixel(dx + xx, dy + yy, px);
        }
    }
}

/// Top-left (x, y) of `rect` in raster space, for an atlas `atlas_height` pixels tall.
///
/// Rects are bottom-left/Y-up; raster buffers are top-left/Y-down.
pub fn raster_origin(rect: &Rect, atlas_height: u32) -> (u32, u32) {
    (rect.left, atlas_height - rect.top)
}

/// Compose the atlas canvas: fully transparent, with every sprite copied to its placement.
pub fn compose(layout: &AtlasLayout, sprites: &[Sprite]) -> Result<RgbaImage> {
    let by_name: HashMap<&str, &Sprite> = sprites.iter().map(|s| (s.name.as_str(), s)).collect();
    let mut canvas = RgbaImage::new(layout.width, layout.height);
    for placement in &layout.placements {
        let sprite = by_name.get(placement.name.as_str()).ok_or_else(|| {
            PackerError::InvalidInput(format!("no sprite named {}", placement.name))
        })?;
        if sprite.rgba.dimensions() != (placement.rect.width(), placement.rect.height()) {
            return Err(PackerError::InvalidInput(format!(
                "sprite {} is {}x{} but was placed in a {}x{} rect",
                sprite.name,
                sprite.width(),
                sprite.height(),
                placement.rect.width(),
                placement.rect.height()
            )));
        }
        let (dx, dy) = raster_origin(&placement.rect, layout.height);
        blit_rgba(&sprite.rgba, &mut canvas, dx, dy);
    }
    Ok(canvas)
}
