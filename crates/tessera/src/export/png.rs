//! PNG export through `resvg`.

use std::sync::{Arc, LazyLock};

use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use log::{debug, trace};
use resvg::{
    tiny_skia::{self, Pixmap, Transform},
    usvg::{self, fontdb},
};

use tessera_core::{color::Color, vector::VectorOutput};

use super::ExportError;

/// System fonts, loaded once on first use.
static FONTDB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(); "Loaded system fonts for rasterization");
    Arc::new(db)
});

/// Rasterizes `vector` at its intrinsic size onto an opaque `background`.
///
/// Blocking; callers run it on the blocking pool.
pub(super) fn rasterize(
    vector: &VectorOutput,
    background: Color,
    max_dimension: u32,
) -> Result<Vec<u8>, ExportError> {
    let size = vector
        .intrinsic_size()
        .ok_or_else(|| ExportError::EncodingFailed("diagram has no drawable size".to_string()))?;
    let width = size.width.ceil() as u32;
    let height = size.height.ceil() as u32;
    if width > max_dimension || height > max_dimension {
        return Err(ExportError::EncodingFailed(format!(
            "diagram is {width}x{height}, larger than the {max_dimension}px limit"
        )));
    }

    let options = usvg::Options {
        fontdb: FONTDB.clone(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(vector.as_str(), &options)
        .map_err(|err| ExportError::EncodingFailed(format!("invalid SVG: {err}")))?;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ExportError::EncodingFailed(format!("cannot allocate a {width}x{height} surface"))
    })?;
    let [r, g, b] = background.to_rgb8();
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));

    let tree_size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / tree_size.width(),
        height as f32 / tree_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixmap.data(), width, height, ExtendedColorType::Rgba8)
        .map_err(|err| ExportError::EncodingFailed(err.to_string()))?;

    trace!(width, height, bytes = png.len(); "Rasterized diagram");
    Ok(png)
}
