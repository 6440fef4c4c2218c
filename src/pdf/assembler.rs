//! Output PDF generation with lopdf
//!
//! Each processed page is JPEG-encoded and embedded as a DCTDecode
//! image XObject drawn over the full media box, sized so the page
//! keeps its physical dimensions at the pipeline's DPI.

use async_trait::async_trait;
use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageEncoder, RgbImage};
use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, Stream,
};
use tracing::{debug, instrument};

use crate::error::{RenderError, Result};

use super::codec::PdfAssembler;

const POINTS_PER_INCH: f32 = 72.0;

/// Stock assembler backed by lopdf.
#[derive(Debug, Clone, Copy)]
pub struct LopdfAssembler {
    jpeg_quality: u8,
}

impl Default for LopdfAssembler {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl LopdfAssembler {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }

    fn encode_jpeg(&self, page: &RgbImage) -> Result<Vec<u8>> {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .write_image(
                page.as_raw(),
                page.width(),
                page.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(jpeg)
    }
}

#[async_trait]
impl PdfAssembler for LopdfAssembler {
    #[instrument(skip(self, pages))]
    async fn assemble(&self, pages: &[RgbImage], dpi: u32) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

        for page in pages {
            let width_pt = page.width() as f32 / dpi as f32 * POINTS_PER_INCH;
            let height_pt = page.height() as f32 / dpi as f32 * POINTS_PER_INCH;

            let image_stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => page.width() as i64,
                    "Height" => page.height() as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                self.encode_jpeg(page)?,
            );
            let image_id = doc.add_object(image_stream);

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            Object::Real(width_pt.into()),
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(height_pt.into()),
                            Object::Integer(0),
                            Object::Integer(0),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let encoded = content
                .encode()
                .map_err(|e| RenderError::Assembly(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width_pt.into()),
                    Object::Real(height_pt.into()),
                ],
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| RenderError::Assembly(e.to_string()))?;
        debug!(pages = pages.len(), bytes = bytes.len(), "pdf assembled");
        Ok(bytes)
    }
}
