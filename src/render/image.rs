//! Opaque fill over pixel regions

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::config::RedactionConfig;
use crate::types::RedactionRegion;

/// Paints redaction regions onto a copy of the page. Fill is
/// idempotent, so abutting or overlapping regions render without
/// artifact; the input image is never touched.
#[derive(Debug, Clone, Copy)]
pub struct ImageRenderer {
    fill: Rgb<u8>,
}

impl ImageRenderer {
    pub fn new(config: &RedactionConfig) -> Self {
        Self {
            fill: Rgb(config.fill_color),
        }
    }

    pub fn redact(&self, page: &RgbImage, regions: &[RedactionRegion]) -> RgbImage {
        let mut out = page.clone();
        for region in regions {
            let right = region.bbox.right().min(out.width());
            let bottom = region.bbox.bottom().min(out.height());
            for y in region.bbox.y..bottom {
                for x in region.bbox.x..right {
                    out.put_pixel(x, y, self.fill);
                }
            }
        }
        debug!(regions = regions.len(), "page rendered");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::PhiCategory;
    use crate::types::BoundingBox;

    fn white_page(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    #[test]
    fn empty_region_list_leaves_the_page_unchanged() {
        let renderer = ImageRenderer::new(&RedactionConfig::default());
        let page = white_page(32, 32);
        let out = renderer.redact(&page, &[]);
        assert_eq!(out, page);
    }

    #[test]
    fn regions_are_filled_opaque_and_input_is_untouched() {
        let renderer = ImageRenderer::new(&RedactionConfig::default());
        let page = white_page(32, 32);
        let region = RedactionRegion {
            bbox: BoundingBox::new(4, 4, 8, 8),
            category: PhiCategory::Name,
        };
        let out = renderer.redact(&page, &[region]);
        assert_eq!(*out.get_pixel(4, 4), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(11, 11), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(12, 12), Rgb([255, 255, 255]));
        assert_eq!(*page.get_pixel(4, 4), Rgb([255, 255, 255]));
    }

    #[test]
    fn overlapping_regions_render_without_artifact() {
        let renderer = ImageRenderer::new(&RedactionConfig::default());
        let page = white_page(32, 32);
        let a = RedactionRegion {
            bbox: BoundingBox::new(0, 0, 10, 10),
            category: PhiCategory::Ssn,
        };
        let b = RedactionRegion {
            bbox: BoundingBox::new(5, 5, 10, 10),
            category: PhiCategory::Mrn,
        };
        let once = renderer.redact(&page, &[a, b]);
        let twice = renderer.redact(&once, &[a, b]);
        assert_eq!(once, twice);
    }

    #[test]
    fn out_of_bounds_region_is_clipped_not_panicked() {
        let renderer = ImageRenderer::new(&RedactionConfig::default());
        let page = white_page(16, 16);
        let region = RedactionRegion {
            bbox: BoundingBox::new(10, 10, 20, 20),
            category: PhiCategory::Phone,
        };
        let out = renderer.redact(&page, &[region]);
        assert_eq!(*out.get_pixel(15, 15), Rgb([0, 0, 0]));
    }
}
