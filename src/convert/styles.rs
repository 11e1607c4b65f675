//! Style resolver: maps style ids from `word/styles.xml` to display names
//! and heading levels.

use crate::error::Result;
use crate::ooxml::{self, MAIN_NS};
use quick_xml::events::Event;
use quick_xml::NsReader;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct StyleResolver {
    names: HashMap<String, String>,
}

impl StyleResolver {
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = NsReader::from_reader(xml);
        let mut names = HashMap::new();
        let mut current: Option<String> = None;
        loop {
            let (ns, event) = reader.read_resolved_event()?;
            match &event {
                Event::Eof => break,
                Event::Start(e)
                    if ooxml::is_in(&ns, MAIN_NS) && e.local_name().as_ref() == b"style" =>
                {
                    current = ooxml::resolved_attr(&reader, e, MAIN_NS, b"styleId")?;
                }
                Event::Empty(e)
                    if ooxml::is_in(&ns, MAIN_NS) && e.local_name().as_ref() == b"name" =>
                {
                    if let (Some(id), Some(name)) = (
                        current.as_ref(),
                        ooxml::resolved_attr(&reader, e, MAIN_NS, b"val")?,
                    ) {
                        names.insert(id.clone(), name);
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"style" => current = None,
                _ => {}
            }
        }
        Ok(Self { names })
    }

    fn name_of<'a>(&'a self, style_id: &'a str) -> &'a str {
        // When styles.xml is absent the id itself is the best name we have.
        self.names.get(style_id).map(String::as_str).unwrap_or(style_id)
    }

    /// Heading level for a paragraph style, `None` for body styles.
    pub fn heading_level(&self, style_id: &str) -> Option<usize> {
        let lower = self.name_of(style_id).to_lowercase();
        if let Some(rest) = lower.strip_prefix("heading") {
            return rest.trim().parse().ok();
        }
        match lower.as_str() {
            "title" => Some(1),
            "subtitle" => Some(2),
            _ => None,
        }
    }

    /// Bullet-vs-ordered heuristic on the style name.
    pub fn is_bullet(&self, style_id: &str) -> bool {
        let lower = self.name_of(style_id).to_lowercase();
        lower.contains("bullet") || lower.contains("list")
    }
}
