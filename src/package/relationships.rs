//! The relationships part (`word/_rels/document.xml.rels`).
//!
//! Each entry maps a relationship id to a target, internal (media, styles)
//! or external (hyperlinks). Ids are unique within the part.

use crate::error::Result;
use crate::ooxml;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{NsReader, Writer};
use std::collections::HashMap;

/// What a relationship points at, derived from its Type URI suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    Image,
    Hyperlink,
    Other,
}

/// One entry of the relationships part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub type_uri: String,
    pub target: String,
    pub target_mode: Option<String>,
}

impl Relationship {
    pub fn kind(&self) -> RelationshipKind {
        if self.type_uri.ends_with("/image") {
            RelationshipKind::Image
        } else if self.type_uri.ends_with("/hyperlink") {
            RelationshipKind::Hyperlink
        } else {
            RelationshipKind::Other
        }
    }

    /// External targets (hyperlinks, linked media) live outside the package.
    pub fn is_external(&self) -> bool {
        self.target_mode.as_deref() == Some("External")
    }
}

/// Parses a relationships part. Entries missing any required attribute are
/// skipped rather than failing the whole part.
pub fn parse(xml: &[u8]) -> Result<Vec<Relationship>> {
    let mut reader = NsReader::from_reader(xml);
    let mut rels = Vec::new();
    loop {
        let (_, event) = reader.read_resolved_event()?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = ooxml::local_attr(e, b"Id")?;
                let type_uri = ooxml::local_attr(e, b"Type")?;
                let target = ooxml::local_attr(e, b"Target")?;
                let (Some(id), Some(type_uri), Some(target)) = (id, type_uri, target) else {
                    continue;
                };
                rels.push(Relationship {
                    id,
                    type_uri,
                    target,
                    target_mode: ooxml::local_attr(e, b"TargetMode")?,
                });
            }
            _ => {}
        }
    }
    Ok(rels)
}

/// Serializes relationships back to a complete part, declaration included.
pub fn serialize(rels: &[Relationship]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    ooxml::emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", ooxml::PACKAGE_RELS_NS));
    ooxml::emit(&mut writer, Event::Start(root))?;
    for rel in rels {
        let mut entry = BytesStart::new("Relationship");
        entry.push_attribute(("Id", rel.id.as_str()));
        entry.push_attribute(("Type", rel.type_uri.as_str()));
        entry.push_attribute(("Target", rel.target.as_str()));
        if let Some(mode) = &rel.target_mode {
            entry.push_attribute(("TargetMode", mode.as_str()));
        }
        ooxml::emit(&mut writer, Event::Empty(entry))?;
    }
    ooxml::emit(&mut writer, Event::End(BytesEnd::new("Relationships")))?;
    Ok(writer.into_inner())
}

/// Id-keyed view for resolvers that look relationships up by reference.
pub fn to_map(rels: Vec<Relationship>) -> HashMap<String, Relationship> {
    rels.into_iter().map(|rel| (rel.id.clone(), rel)).collect()
}
