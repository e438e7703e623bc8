//! Decoded bitmap cache keyed by source reference.
//!
//! The host application owns asset storage and hands the engine either raw
//! encoded bytes (PNG, JPEG, WebP, or SVG markup) or an already decoded image
//! under a source reference string. Layers refer to bitmaps by that string.
//! Decoding happens lazily on first use and the result lives until the source
//! is replaced or invalidated; a failed decode is remembered so it is only
//! attempted (and logged) once.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use tracing::{debug, warn};

use crate::ops::rgba_image_to_pixmap;

/// Default edge length SVG assets are rasterized at.
pub const DEFAULT_SVG_RASTER_SIZE: u32 = 1024;

#[derive(Debug, Clone)]
enum Entry {
    Encoded(Arc<[u8]>),
    Decoded(Arc<Pixmap>),
    Failed,
}

/// Process-lifetime cache of decoded layer bitmaps.
#[derive(Debug, Clone)]
pub struct ImageCache {
    svg_raster_size: u32,
    entries: HashMap<String, Entry>,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_SVG_RASTER_SIZE)
    }
}

impl ImageCache {
    pub fn new(svg_raster_size: u32) -> Self {
        Self {
            svg_raster_size: svg_raster_size.max(1),
            entries: HashMap::new(),
        }
    }

    /// Registers encoded bytes for `source`, replacing any previous entry.
    ///
    /// Decoding is deferred until the source is first resolved.
    pub fn insert_bytes(&mut self, source: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.insert(source.into(), Entry::Encoded(bytes.into()));
    }

    /// Registers an already decoded image for `source`.
    ///
    /// Returns `false` (and stores nothing) for an empty image.
    pub fn insert_image(&mut self, source: impl Into<String>, image: &RgbaImage) -> bool {
        match rgba_image_to_pixmap(image) {
            Some(pixmap) => {
                self.entries.insert(source.into(), Entry::Decoded(Arc::new(pixmap)));
                true
            }
            None => false,
        }
    }

    /// Drops the entry for `source`. The next resolve treats it as missing.
    pub fn invalidate(&mut self, source: &str) {
        self.entries.remove(source);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the decoded bitmap for `source`, decoding it on first use.
    ///
    /// Missing and undecodable sources yield `None`.
    pub fn resolve(&mut self, source: &str) -> Option<Arc<Pixmap>> {
        let entry = match self.entries.get(source) {
            Some(Entry::Decoded(pixmap)) => return Some(Arc::clone(pixmap)),
            Some(Entry::Failed) => return None,
            Some(Entry::Encoded(bytes)) => match decode(bytes, self.svg_raster_size) {
                Some(pixmap) => {
                    debug!(source, width = pixmap.width(), height = pixmap.height(), "decoded bitmap");
                    Entry::Decoded(Arc::new(pixmap))
                }
                None => {
                    warn!(source, "bitmap could not be decoded; rendering fill only");
                    Entry::Failed
                }
            },
            None => {
                warn!(source, "bitmap source is not registered; rendering fill only");
                Entry::Failed
            }
        };
        let resolved = match &entry {
            Entry::Decoded(pixmap) => Some(Arc::clone(pixmap)),
            _ => None,
        };
        self.entries.insert(source.to_owned(), entry);
        resolved
    }
}

fn decode(bytes: &[u8], svg_raster_size: u32) -> Option<Pixmap> {
    if looks_like_svg(bytes) {
        return render_svg(bytes, svg_raster_size);
    }
    let image = image::load_from_memory(bytes)
        .map_err(|e| debug!(error = %e, "raster decode failed"))
        .ok()?;
    rgba_image_to_pixmap(&image.to_rgba8())
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'<')
}

/// Rasterizes SVG markup so its larger side is `size` pixels.
fn render_svg(data: &[u8], size: u32) -> Option<Pixmap> {
    let tree = Tree::from_data(data, &Options::default())
        .map_err(|e| debug!(error = %e, "svg parse failed"))
        .ok()?;

    let svg_size = tree.size();
    let scale = size as f32 / svg_size.width().max(svg_size.height());
    let width = (svg_size.width() * scale).ceil() as u32;
    let height = (svg_size.height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Some(pixmap)
}
