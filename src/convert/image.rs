//! Image extraction modes for the Markdown converter.

use crate::error::{Error, Result};
use crate::ooxml;
use crate::package::relationships::Relationship;
use crate::package::Package;
use crate::render::escape_link_destination;
use crate::ImageHandling;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Renders embedded images according to the configured handling mode.
pub struct ImageExtractor {
    mode: Mode,
    counter: usize,
}

enum Mode {
    SaveToDir(PathBuf),
    Inline,
    Skip,
}

impl ImageExtractor {
    pub fn new(handling: &ImageHandling) -> Result<Self> {
        let mode = match handling {
            ImageHandling::SaveToDir(dir) => {
                fs::create_dir_all(dir)?;
                Mode::SaveToDir(dir.clone())
            }
            ImageHandling::Inline => Mode::Inline,
            ImageHandling::Skip => Mode::Skip,
        };
        Ok(Self { mode, counter: 0 })
    }

    /// Renders the image behind a relationship id as Markdown. A missing
    /// relationship id renders nothing: orphaned references degrade, they
    /// do not abort the conversion.
    pub fn render(
        &mut self,
        rel_id: &str,
        rels: &HashMap<String, Relationship>,
        package: &Package,
    ) -> Result<Option<String>> {
        if matches!(self.mode, Mode::Skip) {
            return Ok(None);
        }
        let Some(rel) = rels.get(rel_id) else {
            return Ok(None);
        };
        if rel.is_external() {
            // Linked, not embedded: reference the external location directly.
            return Ok(Some(format!(
                "![image]({})",
                escape_link_destination(&rel.target)
            )));
        }

        let part = ooxml::part_path_for_target(&rel.target);
        let data = package
            .entry(&part)
            .ok_or_else(|| Error::MediaNotFound(rel.target.clone()))?;

        self.counter += 1;
        let ext = Path::new(&rel.target)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");

        match &self.mode {
            Mode::SaveToDir(dir) => {
                let filename = format!("image_{}.{}", self.counter, ext);
                let output_path = dir.join(&filename);
                fs::write(&output_path, data)?;
                Ok(Some(format!(
                    "![image]({})",
                    escape_link_destination(&output_path.display().to_string())
                )))
            }
            Mode::Inline => {
                let mime_type = match ext.to_lowercase().as_str() {
                    "png" => "image/png",
                    "jpg" | "jpeg" => "image/jpeg",
                    "gif" => "image/gif",
                    "webp" => "image/webp",
                    "svg" => "image/svg+xml",
                    _ => "application/octet-stream",
                };
                let b64 = BASE64.encode(data);
                Ok(Some(format!(
                    "<img src=\"data:{};base64,{}\" alt=\"image\" />",
                    mime_type, b64
                )))
            }
            Mode::Skip => Ok(None),
        }
    }
}
