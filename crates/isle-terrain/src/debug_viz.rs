//! Top-down biome map rendering for inspecting generated islands.
//!
//! The core owns no rendering resources; this only turns an [`Assignment`]
//! into a flat image, one colored block per tile.

mod image;

pub use self::image::DebugImage;

use crate::assignment::Assignment;

/// Render `assignment` with `scale × scale` pixels per tile. Row 0 of the
/// image is the grid's lowest `z`. A scale of 0 is treated as 1.
pub fn render_assignment(assignment: &Assignment, scale: u32) -> DebugImage {
    let scale = scale.max(1);
    let n = assignment.grid().size();
    let mut image = DebugImage::new(n * scale, n * scale);
    for (i, biome) in assignment.labels().iter().enumerate() {
        let col = (i % n as usize) as u32;
        let row = (i / n as usize) as u32;
        image.fill_block(col * scale, row * scale, scale, biome.color());
    }
    image
}
