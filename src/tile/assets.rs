use crate::config::IMAGE_SOURCES;

/// Opaque handle to a tile image. The gallery never decodes it; the
/// renderer resolves it however it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    /// 1-based source image number.
    pub source: u32,
}

impl ImageRef {
    pub fn url(self) -> String {
        format!("/img{}_.jpg", self.source)
    }
}

/// Supplies an image handle per tile index.
pub trait AssetProvider {
    fn image(&self, index: usize) -> ImageRef;
}

/// Cycles over a fixed set of numbered sources regardless of tile count.
#[derive(Debug, Clone, Copy)]
pub struct CyclicAssets {
    sources: usize,
}

impl CyclicAssets {
    pub fn new(sources: usize) -> Self {
        Self {
            sources: sources.max(1),
        }
    }
}

impl Default for CyclicAssets {
    fn default() -> Self {
        Self::new(IMAGE_SOURCES)
    }
}

impl AssetProvider for CyclicAssets {
    fn image(&self, index: usize) -> ImageRef {
        ImageRef {
            source: (index % self.sources) as u32 + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_after_ten_sources() {
        let assets = CyclicAssets::default();
        assert_eq!(assets.image(0).url(), "/img1_.jpg");
        assert_eq!(assets.image(9).url(), "/img10_.jpg");
        assert_eq!(assets.image(10), assets.image(0));
        assert_eq!(assets.image(23).source, 4);
    }
}
