//! DOCX to Markdown conversion on top of the package layer.

mod cleanup;
mod document;
mod image;
mod styles;

pub use image::ImageExtractor;
pub use styles::StyleResolver;

use crate::error::Result;
use crate::ooxml::{RELS_PART, STYLES_PART};
use crate::package::relationships;
use crate::package::Package;
use crate::ConvertOptions;
use std::path::Path;

/// Main converter struct that orchestrates DOCX to Markdown conversion.
pub struct DocxToMarkdown {
    options: ConvertOptions,
}

impl DocxToMarkdown {
    /// Creates a new converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Creates a new converter with default options.
    pub fn with_defaults() -> Self {
        Self::new(ConvertOptions::default())
    }

    /// Converts a DOCX file to Markdown.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        self.convert_package(&Package::open(path)?)
    }

    /// Converts a DOCX container already held in memory.
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<String> {
        self.convert_package(&Package::from_bytes(bytes)?)
    }

    pub fn convert_package(&self, package: &Package) -> Result<String> {
        let doc = package.document()?;
        let rels = match package.entry(RELS_PART) {
            Some(bytes) => relationships::to_map(relationships::parse(bytes)?),
            None => Default::default(),
        };
        let styles = match package.entry(STYLES_PART) {
            Some(bytes) => StyleResolver::parse(bytes)?,
            None => StyleResolver::default(),
        };
        let mut images = ImageExtractor::new(&self.options.image_handling)?;
        let markdown = document::document_to_markdown(doc, &rels, &styles, &mut images, package)?;
        Ok(cleanup::tidy(&markdown))
    }
}
