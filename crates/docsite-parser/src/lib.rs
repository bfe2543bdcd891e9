//! Markdown scanning for the docsite toolkit.
//!
//! The parser never renders anything. It walks a document once and records
//! the two things the rest of the toolkit cares about: headings, with the
//! anchors a site renderer would give them, and link targets. Line numbers
//! always refer to the original file, front matter included.

mod lines;

use std::fs;
use std::io;
use std::path::Path;

use docsite_config::AnchorSettings;
use docsite_slug::SlugRegistry;
use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};

use lines::{front_matter_end, LineIndex};

/// Heading metadata extracted from a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// `None` when the level is outside the anchored range or the text has
    /// nothing that survives slugification.
    pub anchor: Option<String>,
    /// Id requested through a `{#id}` attribute, if any.
    pub explicit_id: Option<String>,
    pub line: usize,
}

impl Heading {
    /// True when an explicit id had to be suffixed because it was taken.
    pub fn explicit_id_collided(&self) -> bool {
        match (&self.explicit_id, &self.anchor) {
            (Some(requested), Some(anchor)) => requested.trim() != anchor,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub target: String,
    pub line: usize,
}

/// Headings and links of one markdown document, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub headings: Vec<Heading>,
    pub links: Vec<Link>,
}

impl Document {
    pub fn anchors(&self) -> impl Iterator<Item = &str> {
        self.headings
            .iter()
            .filter_map(|heading| heading.anchor.as_deref())
    }

    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.anchors().any(|candidate| candidate == anchor)
    }
}

/// Read and scan the markdown file at `path`.
pub fn parse_path(path: &Path, settings: &AnchorSettings) -> io::Result<Document> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_document(&contents, settings))
}

/// Scan `contents`, assigning document-unique anchors to headings.
pub fn parse_document(contents: &str, settings: &AnchorSettings) -> Document {
    let body_start = front_matter_end(contents);
    let body = &contents[body_start..];
    let index = LineIndex::new(contents);

    let mut registry = SlugRegistry::new(settings.word_chars);
    let mut document = Document::default();
    let mut current: Option<PendingHeading> = None;

    let options = Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH;

    for (event, range) in Parser::new_ext(body, options).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading(level, id, _classes)) => {
                current = Some(PendingHeading {
                    level: level as u8,
                    explicit_id: id.map(str::to_string),
                    line: index.line_of(body_start + range.start),
                    text: String::new(),
                });
            }
            Event::End(Tag::Heading(..)) => {
                if let Some(pending) = current.take() {
                    document
                        .headings
                        .push(pending.finish(settings, &mut registry));
                }
            }
            Event::Start(Tag::Link(kind, destination, _)) => {
                let target = match kind {
                    LinkType::Email => format!("mailto:{destination}"),
                    _ => destination.to_string(),
                };
                document.links.push(Link {
                    target,
                    line: index.line_of(body_start + range.start),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(pending) = current.as_mut() {
                    pending.text.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(pending) = current.as_mut() {
                    pending.text.push(' ');
                }
            }
            _ => {}
        }
    }

    document
}

struct PendingHeading {
    level: u8,
    explicit_id: Option<String>,
    line: usize,
    text: String,
}

impl PendingHeading {
    fn finish(self, settings: &AnchorSettings, registry: &mut SlugRegistry) -> Heading {
        let text = collapse_whitespace(&self.text);
        let anchor = if !settings.anchors_level(self.level) {
            None
        } else if let Some(id) = &self.explicit_id {
            registry.reserve(id)
        } else {
            registry.register(&text)
        };

        Heading {
            level: self.level,
            text,
            anchor,
            explicit_id: self.explicit_id,
            line: self.line,
        }
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
