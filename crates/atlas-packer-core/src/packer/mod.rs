use crate::model::Rect;

pub mod bsp;

pub use bsp::BspPacker;

/// A packer places rectangles into a fixed-size page.
///
/// Implementations must never hand out overlapping rects.
/// `pack` returns `None` if the rectangle cannot be placed on the current page;
/// that is the normal signal to retry with a larger page, not an error.
pub trait Packer<K> {
    fn pack(&mut self, key: K, width: u32, height: u32) -> Option<Rect>;
}
