//! Streaming walk of `word/document.xml` producing Markdown blocks.

use crate::convert::image::ImageExtractor;
use crate::convert::styles::StyleResolver;
use crate::error::Result;
use crate::ooxml::{self, DOC_RELS_NS, MAIN_NS};
use crate::package::relationships::Relationship;
use crate::package::Package;
use crate::render::{escape_link_destination, escape_link_text, escape_table_cell};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::collections::HashMap;

pub fn document_to_markdown(
    xml: &[u8],
    rels: &HashMap<String, Relationship>,
    styles: &StyleResolver,
    images: &mut ImageExtractor,
    package: &Package,
) -> Result<String> {
    let mut walker = Walker {
        rels,
        styles,
        images,
        package,
        blocks: Vec::new(),
        para: None,
        run: None,
        link: None,
        table: None,
        graphic: None,
        in_text: false,
    };

    let mut reader = NsReader::from_reader(xml);
    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => break,
            Event::Start(e) => {
                let ns = reader.resolve_element(e.name()).0;
                walker.handle_start(&reader, &ns, e)?
            }
            Event::Empty(e) => {
                let ns = reader.resolve_element(e.name()).0;
                walker.handle_empty(&reader, &ns, e)?
            }
            Event::End(e) => {
                let ns = reader.resolve_element(e.name()).0;
                walker.handle_end(&ns, e)?
            }
            Event::Text(t) => {
                if walker.in_text && walker.graphic.is_none() {
                    walker.push_text(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if walker.in_text && walker.graphic.is_none() {
                    let text = String::from_utf8_lossy(c.as_ref()).into_owned();
                    walker.push_text(&text);
                }
            }
            _ => {}
        }
    }
    Ok(walker.finish())
}

struct Walker<'a> {
    rels: &'a HashMap<String, Relationship>,
    styles: &'a StyleResolver,
    images: &'a mut ImageExtractor,
    package: &'a Package,
    blocks: Vec<String>,
    para: Option<ParaState>,
    run: Option<RunState>,
    link: Option<LinkState>,
    table: Option<TableState>,
    graphic: Option<GraphicState>,
    in_text: bool,
}

#[derive(Default)]
struct ParaState {
    style: Option<String>,
    numbered: bool,
    text: String,
}

#[derive(Default)]
struct RunState {
    bold: bool,
    italic: bool,
    strike: bool,
    text: String,
}

struct LinkState {
    dest: Option<String>,
    text: String,
}

struct GraphicState {
    depth: usize,
    rel_id: Option<String>,
}

struct TableState {
    depth: usize,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Option<String>,
}

impl<'a> Walker<'a> {
    fn handle_start(
        &mut self,
        reader: &NsReader<&[u8]>,
        ns: &ResolveResult,
        e: &BytesStart<'_>,
    ) -> Result<()> {
        if let Some(graphic) = self.graphic.as_mut() {
            graphic.depth += 1;
            return self.scan_graphic_ref(reader, e);
        }
        if !ooxml::is_in(ns, MAIN_NS) {
            return Ok(());
        }
        match e.local_name().as_ref() {
            b"drawing" | b"pict" | b"object" => {
                self.graphic = Some(GraphicState {
                    depth: 1,
                    rel_id: None,
                });
                self.scan_graphic_ref(reader, e)?;
            }
            b"p" => self.para = Some(ParaState::default()),
            b"pStyle" => self.set_para_style(reader, e)?,
            b"numPr" => self.set_numbered(),
            b"r" => self.run = Some(RunState::default()),
            b"b" | b"i" | b"strike" => self.set_run_flag(reader, e)?,
            b"t" => self.in_text = true,
            b"hyperlink" => self.begin_hyperlink(reader, e)?,
            b"tbl" => match self.table.as_mut() {
                // Content of a nested table flows into the enclosing cell.
                Some(table) => table.depth += 1,
                None => {
                    self.table = Some(TableState {
                        depth: 1,
                        rows: Vec::new(),
                        row: Vec::new(),
                        cell: None,
                    })
                }
            },
            b"tr" => {
                if let Some(table) = self.table.as_mut() {
                    if table.depth == 1 {
                        table.row = Vec::new();
                    }
                }
            }
            b"tc" => {
                if let Some(table) = self.table.as_mut() {
                    if table.depth == 1 {
                        table.cell = Some(String::new());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_empty(
        &mut self,
        reader: &NsReader<&[u8]>,
        ns: &ResolveResult,
        e: &BytesStart<'_>,
    ) -> Result<()> {
        if self.graphic.is_some() {
            return self.scan_graphic_ref(reader, e);
        }
        if !ooxml::is_in(ns, MAIN_NS) {
            return Ok(());
        }
        match e.local_name().as_ref() {
            b"pStyle" => self.set_para_style(reader, e)?,
            b"numPr" => self.set_numbered(),
            b"b" | b"i" | b"strike" => self.set_run_flag(reader, e)?,
            b"br" => {
                let page = matches!(
                    ooxml::resolved_attr(reader, e, MAIN_NS, b"type")?.as_deref(),
                    Some("page")
                );
                self.push_text(if page { "\n\n---\n\n" } else { "\n" });
            }
            b"tab" => {
                if self.run.is_some() {
                    self.push_text("\t");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_end(&mut self, ns: &ResolveResult, e: &BytesEnd<'_>) -> Result<()> {
        if let Some(mut graphic) = self.graphic.take() {
            graphic.depth -= 1;
            if graphic.depth > 0 {
                self.graphic = Some(graphic);
                return Ok(());
            }
            return self.finish_graphic(graphic);
        }
        if !ooxml::is_in(ns, MAIN_NS) {
            return Ok(());
        }
        match e.local_name().as_ref() {
            b"t" => self.in_text = false,
            b"r" => self.finish_run(),
            b"hyperlink" => self.finish_link(),
            b"p" => self.finish_paragraph(),
            b"tc" => {
                if let Some(table) = self.table.as_mut() {
                    if table.depth == 1 {
                        if let Some(cell) = table.cell.take() {
                            table.row.push(escape_table_cell(cell.trim()));
                        }
                    }
                }
            }
            b"tr" => {
                if let Some(table) = self.table.as_mut() {
                    if table.depth == 1 {
                        let row = std::mem::take(&mut table.row);
                        table.rows.push(row);
                    }
                }
            }
            b"tbl" => self.finish_table(),
            _ => {}
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        } else if let Some(link) = self.link.as_mut() {
            link.text.push_str(text);
        } else if let Some(para) = self.para.as_mut() {
            para.text.push_str(text);
        }
    }

    fn set_para_style(&mut self, reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<()> {
        if self.run.is_some() {
            return Ok(());
        }
        if let Some(val) = ooxml::resolved_attr(reader, e, MAIN_NS, b"val")? {
            if let Some(para) = self.para.as_mut() {
                para.style = Some(val);
            }
        }
        Ok(())
    }

    fn set_numbered(&mut self) {
        if self.run.is_none() {
            if let Some(para) = self.para.as_mut() {
                para.numbered = true;
            }
        }
    }

    fn set_run_flag(&mut self, reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<()> {
        if self.in_text {
            return Ok(());
        }
        let off = ooxml::val_is_off(reader, e)?;
        if let Some(run) = self.run.as_mut() {
            match e.local_name().as_ref() {
                b"b" => run.bold = !off,
                b"i" => run.italic = !off,
                b"strike" => run.strike = !off,
                _ => {}
            }
        }
        Ok(())
    }

    fn begin_hyperlink(&mut self, reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<()> {
        let dest = match ooxml::resolved_attr(reader, e, DOC_RELS_NS, b"id")? {
            Some(rid) => self.rels.get(&rid).map(|rel| rel.target.clone()),
            None => ooxml::resolved_attr(reader, e, MAIN_NS, b"anchor")?
                .map(|anchor| format!("#{}", anchor)),
        };
        self.link = Some(LinkState {
            dest,
            text: String::new(),
        });
        Ok(())
    }

    fn scan_graphic_ref(&mut self, reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<()> {
        let Some(graphic) = self.graphic.as_mut() else {
            return Ok(());
        };
        if graphic.rel_id.is_some() {
            return Ok(());
        }
        // a:blip carries r:embed (or r:link), v:imagedata and o:OLEObject
        // carry r:id.
        for name in [b"embed".as_slice(), b"link", b"id"] {
            if let Some(id) = ooxml::resolved_attr(reader, e, DOC_RELS_NS, name)? {
                graphic.rel_id = Some(id);
                break;
            }
        }
        Ok(())
    }

    fn finish_graphic(&mut self, graphic: GraphicState) -> Result<()> {
        if let Some(rel_id) = graphic.rel_id {
            if let Some(rendered) = self.images.render(&rel_id, self.rels, self.package)? {
                self.push_text(&rendered);
            }
        }
        Ok(())
    }

    fn finish_run(&mut self) {
        let Some(run) = self.run.take() else { return };
        let mut text = run.text;
        if !text.trim().is_empty() {
            if run.bold {
                text = format!("**{}**", text);
            }
            if run.italic {
                text = format!("*{}*", text);
            }
            if run.strike {
                text = format!("~~{}~~", text);
            }
        }
        if let Some(link) = self.link.as_mut() {
            link.text.push_str(&text);
        } else if let Some(para) = self.para.as_mut() {
            para.text.push_str(&text);
        }
    }

    fn finish_link(&mut self) {
        let Some(link) = self.link.take() else { return };
        let rendered = match link.dest {
            Some(dest) if !link.text.is_empty() => format!(
                "[{}]({})",
                escape_link_text(&link.text),
                escape_link_destination(&dest)
            ),
            // Unresolvable target: keep the text, drop the link.
            _ => link.text,
        };
        if let Some(para) = self.para.as_mut() {
            para.text.push_str(&rendered);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(para) = self.para.take() else { return };
        if let Some(table) = self.table.as_mut() {
            if let Some(cell) = table.cell.as_mut() {
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(para.text.trim());
                return;
            }
        }
        let text = para.text.trim();
        if text.is_empty() {
            return;
        }
        let style = para.style.as_deref().unwrap_or("");
        let line = if let Some(level) = self.styles.heading_level(style) {
            format!("{} {}", "#".repeat(level.min(6)), text)
        } else if para.numbered {
            if self.styles.is_bullet(style) {
                format!("* {}", text)
            } else {
                format!("1. {}", text)
            }
        } else {
            text.to_string()
        };
        self.blocks.push(line);
    }

    fn finish_table(&mut self) {
        let Some(mut table) = self.table.take() else { return };
        if table.depth > 1 {
            table.depth -= 1;
            self.table = Some(table);
            return;
        }
        let rendered = render_table(&table.rows);
        if !rendered.is_empty() {
            self.blocks.push(rendered);
        }
    }

    fn finish(self) -> String {
        self.blocks.join("\n\n")
    }
}

fn render_table(rows: &[Vec<String>]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(first, width));
    lines.push(format!("|{}", " --- |".repeat(width)));
    for row in &rows[1..] {
        lines.push(format_row(row, width));
    }
    lines.join("\n")
}

fn format_row(cells: &[String], width: usize) -> String {
    let mut line = String::from("|");
    for index in 0..width {
        let cell = cells.get(index).map(String::as_str).unwrap_or(" ");
        let cell = if cell.is_empty() { " " } else { cell };
        line.push(' ');
        line.push_str(cell);
        line.push_str(" |");
    }
    line
}
