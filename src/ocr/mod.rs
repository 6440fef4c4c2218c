//! Optical recognition seam and text-to-pixel coordinate mapping

pub mod engine;
pub mod locator;

pub use engine::{OcrEngine, RecognizedWord};
pub use locator::{ImageTextLocator, LocatedPage};
