//! Office Open XML constants and namespace-aware XML helpers.
//!
//! DOCX co-locates several XML namespaces (wordprocessing markup, DrawingML,
//! relationship references), and producer tools disagree on prefix spelling.
//! Everything here matches on namespace URI plus local name, never on the
//! prefix string.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};

/// Main document markup entry.
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Relationships part for the main document.
pub const RELS_PART: &str = "word/_rels/document.xml.rels";
/// Style definitions.
pub const STYLES_PART: &str = "word/styles.xml";
/// Directory holding embedded media payloads.
pub const MEDIA_PREFIX: &str = "word/media/";

/// WordprocessingML main namespace (usually prefixed `w:`).
pub const MAIN_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Namespace of relationship-reference attributes (`r:embed`, `r:id`).
pub const DOC_RELS_NS: &[u8] =
    b"http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Namespace of the relationships part itself.
pub const PACKAGE_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// True when a resolved name is bound to the given namespace URI.
pub fn is_in(ns: &ResolveResult, uri: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(bound)) if *bound == uri)
}

/// Looks up an attribute by namespace URI and local name, ignoring the prefix.
pub fn resolved_attr<R>(
    reader: &NsReader<R>,
    e: &BytesStart<'_>,
    uri: &[u8],
    local: &[u8],
) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::MalformedMarkup(err.to_string()))?;
        let (ns, name) = reader.resolve_attribute(attr.key);
        if is_in(&ns, uri) && name.as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Looks up an attribute by local name alone, for unprefixed attributes such
/// as `Id` and `Target` in the relationships part.
pub fn local_attr(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::MalformedMarkup(err.to_string()))?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// True when a toggle property is explicitly switched off (`w:val="0"` or
/// `"false"`). Absence of the attribute means the toggle is on.
pub fn val_is_off<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<bool> {
    Ok(matches!(
        resolved_attr(reader, e, MAIN_NS, b"val")?.as_deref(),
        Some("0") | Some("false")
    ))
}

/// Resolves a relationship target (relative to `word/`) to a package entry
/// path: `media/image1.png` becomes `word/media/image1.png`.
pub fn part_path_for_target(target: &str) -> String {
    let target = target.trim_start_matches('/');
    if let Some(root_relative) = target.strip_prefix("../") {
        root_relative.to_string()
    } else if target.starts_with("word/") {
        target.to_string()
    } else {
        format!("word/{}", target)
    }
}

pub(crate) fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::MalformedMarkup(e.to_string()))
}
