//! # docxkit
//!
//! DOCX utility toolkit: strip every embedded image from a document, or
//! convert it to Markdown, working directly on the ZIP/XML container.
//!
//! ## Example
//!
//! ```no_run
//! use docxkit::{DocxImageStripper, StripOptions};
//!
//! let stripper = DocxImageStripper::new(StripOptions::default());
//! let outcome = stripper.strip("document.docx").unwrap();
//! println!(
//!     "removed {} drawings -> {:?}",
//!     outcome.report.drawing_nodes, outcome.output_path
//! );
//! ```

pub mod convert;
pub mod error;
pub mod ooxml;
pub mod package;
pub mod render;
pub mod strip;

pub use convert::DocxToMarkdown;
pub use error::{Error, Result};
pub use package::Package;
pub use strip::{DocxImageStripper, StripOutcome, StripReport};

use std::path::PathBuf;

/// Options for the image stripper.
#[derive(Debug, Clone, Default)]
pub struct StripOptions {
    /// How markup references to missing relationship ids are treated.
    pub orphan_policy: OrphanPolicy,
}

/// Policy for relationship ids referenced in markup but absent from the
/// relationships part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Drop the orphaned reference along with its node. Producer tools leave
    /// these behind often enough that this is the default.
    #[default]
    Lenient,
    /// Fail the run with [`Error::RelationshipNotFound`].
    Strict,
}

/// Options for DOCX to Markdown conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// How to handle images in the document.
    pub image_handling: ImageHandling,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            image_handling: ImageHandling::Inline,
        }
    }
}

/// Specifies how images should be handled during conversion.
#[derive(Debug, Clone)]
pub enum ImageHandling {
    /// Save images to a directory and reference them by path.
    SaveToDir(PathBuf),
    /// Embed images as base64 data URIs.
    Inline,
    /// Skip images entirely.
    Skip,
}
