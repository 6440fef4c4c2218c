//! Redaction renderers: placeholder substitution for text, opaque fill
//! for raster pages.

pub mod image;
pub mod text;

pub use self::image::ImageRenderer;
