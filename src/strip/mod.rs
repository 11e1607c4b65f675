//! Image stripping: removes every embedded image from a DOCX container.
//!
//! Three things go together or not at all: the markup nodes referencing an
//! image, the image-kind entries of the relationships part, and the media
//! payloads those entries target. Everything else is copied through
//! byte-for-byte.

mod markup;

pub use markup::{strip_graphic_nodes, MarkupRewrite};

use crate::error::{Error, Result};
use crate::ooxml::{self, MEDIA_PREFIX, RELS_PART};
use crate::package::relationships::{self, RelationshipKind};
use crate::package::Package;
use crate::{OrphanPolicy, StripOptions};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Removes image markup, image relationships and media payloads from a
/// DOCX file, leaving all other content untouched.
pub struct DocxImageStripper {
    options: StripOptions,
}

/// Counts of what a strip pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripReport {
    pub drawing_nodes: usize,
    pub image_relationships: usize,
    pub media_entries: usize,
}

/// A finished strip run: where the output went and what was removed.
#[derive(Debug)]
pub struct StripOutcome {
    pub output_path: PathBuf,
    pub report: StripReport,
}

impl DocxImageStripper {
    /// Creates a stripper with the given options.
    pub fn new(options: StripOptions) -> Self {
        Self { options }
    }

    /// Creates a stripper with default options (lenient orphan policy).
    pub fn with_defaults() -> Self {
        Self::new(StripOptions::default())
    }

    /// Strips `input` and writes the result next to it, prefixing the file
    /// name with `noimages_`.
    pub fn strip<P: AsRef<Path>>(&self, input: P) -> Result<StripOutcome> {
        let output = default_output_path(input.as_ref());
        self.strip_to(input, output)
    }

    /// Strips `input` into an explicit output path.
    pub fn strip_to<P: AsRef<Path>, Q: Into<PathBuf>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<StripOutcome> {
        let output = output.into();
        let package = Package::open(input)?;
        let (package, report) = self.strip_package(package)?;
        package.save(&output)?;
        Ok(StripOutcome {
            output_path: output,
            report,
        })
    }

    /// The in-memory transform behind [`strip`](Self::strip).
    pub fn strip_package(&self, mut package: Package) -> Result<(Package, StripReport)> {
        let rewrite = markup::strip_graphic_nodes(package.document()?)?;

        let rels = match package.entry(RELS_PART) {
            Some(bytes) => relationships::parse(bytes)?,
            None => Vec::new(),
        };

        if self.options.orphan_policy == OrphanPolicy::Strict {
            let known: HashSet<&str> = rels.iter().map(|rel| rel.id.as_str()).collect();
            for id in rewrite.removed_refs.iter().chain(&rewrite.surviving_refs) {
                if !known.contains(id.as_str()) {
                    return Err(Error::RelationshipNotFound(id.clone()));
                }
            }
        }

        let (image_rels, kept_rels): (Vec<_>, Vec<_>) = rels
            .into_iter()
            .partition(|rel| rel.kind() == RelationshipKind::Image);

        // A media payload survives if any kept relationship still targets it.
        let surviving_targets: HashSet<String> = kept_rels
            .iter()
            .filter(|rel| !rel.is_external())
            .map(|rel| ooxml::part_path_for_target(&rel.target))
            .collect();
        let removed_targets: Vec<String> = image_rels
            .iter()
            .filter(|rel| !rel.is_external())
            .map(|rel| ooxml::part_path_for_target(&rel.target))
            .collect();

        let mut report = StripReport {
            drawing_nodes: rewrite.removed_nodes,
            image_relationships: image_rels.len(),
            ..StripReport::default()
        };

        if rewrite.removed_nodes > 0 {
            package.set_entry(ooxml::DOCUMENT_PART, rewrite.xml);
        }
        if !image_rels.is_empty() {
            package.set_entry(RELS_PART, relationships::serialize(&kept_rels)?);
        }
        for target in removed_targets {
            if target.starts_with(MEDIA_PREFIX)
                && !surviving_targets.contains(&target)
                && package.remove_entry(&target)
            {
                report.media_entries += 1;
            }
        }

        Ok((package, report))
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("noimages_{}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_prefixes_file_name() {
        assert_eq!(
            default_output_path(Path::new("/tmp/report.docx")),
            PathBuf::from("/tmp/noimages_report.docx")
        );
        assert_eq!(
            default_output_path(Path::new("report.docx")),
            PathBuf::from("noimages_report.docx")
        );
    }
}
