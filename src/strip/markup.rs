//! Namespace-aware rewrite of the main document markup.

use crate::error::{Error, Result};
use crate::ooxml::{self, DOC_RELS_NS, MAIN_NS};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};
use std::collections::HashSet;

/// Result of one stripping pass over `word/document.xml`.
pub struct MarkupRewrite {
    /// Serialized markup with every graphic node removed. The input bytes,
    /// untouched, when nothing was removed.
    pub xml: Vec<u8>,
    pub removed_nodes: usize,
    /// Relationship ids referenced from removed subtrees.
    pub removed_refs: HashSet<String>,
    /// Relationship ids still referenced by surviving markup.
    pub surviving_refs: HashSet<String>,
}

/// Removes every `w:drawing` (inline and anchored DrawingML), `w:pict`
/// (legacy VML) and `w:object` (embedded OLE) subtree. Surrounding
/// paragraph and run structure is left as-is, including wrappers that end
/// up empty.
pub fn strip_graphic_nodes(xml: &[u8]) -> Result<MarkupRewrite> {
    let mut reader = NsReader::from_reader(xml);
    let mut writer = Writer::new(Vec::new());
    let mut removed_nodes = 0usize;
    let mut removed_refs = HashSet::new();
    let mut surviving_refs = HashSet::new();
    // Element depth within the subtree currently being dropped, 0 outside.
    let mut skip_depth = 0usize;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        match &event {
            Event::Eof => break,
            Event::Start(e) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    collect_rel_refs(&reader, e, &mut removed_refs)?;
                    continue;
                }
                if is_graphic_node(&ns, e) {
                    skip_depth = 1;
                    removed_nodes += 1;
                    collect_rel_refs(&reader, e, &mut removed_refs)?;
                    continue;
                }
                collect_rel_refs(&reader, e, &mut surviving_refs)?;
            }
            Event::Empty(e) => {
                if skip_depth > 0 {
                    collect_rel_refs(&reader, e, &mut removed_refs)?;
                    continue;
                }
                if is_graphic_node(&ns, e) {
                    removed_nodes += 1;
                    collect_rel_refs(&reader, e, &mut removed_refs)?;
                    continue;
                }
                collect_rel_refs(&reader, e, &mut surviving_refs)?;
            }
            Event::End(_) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
            }
            _ => {
                if skip_depth > 0 {
                    continue;
                }
            }
        }
        ooxml::emit(&mut writer, event)?;
    }

    let xml = if removed_nodes == 0 {
        xml.to_vec()
    } else {
        writer.into_inner()
    };
    Ok(MarkupRewrite {
        xml,
        removed_nodes,
        removed_refs,
        surviving_refs,
    })
}

fn is_graphic_node(ns: &ResolveResult, e: &BytesStart<'_>) -> bool {
    ooxml::is_in(ns, MAIN_NS)
        && matches!(e.local_name().as_ref(), b"drawing" | b"pict" | b"object")
}

fn collect_rel_refs<R>(
    reader: &NsReader<R>,
    e: &BytesStart<'_>,
    out: &mut HashSet<String>,
) -> Result<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::MalformedMarkup(err.to_string()))?;
        let (ns, name) = reader.resolve_attribute(attr.key);
        if ooxml::is_in(&ns, DOC_RELS_NS) && matches!(name.as_ref(), b"embed" | b"link" | b"id") {
            out.insert(attr.unescape_value()?.into_owned());
        }
    }
    Ok(())
}
