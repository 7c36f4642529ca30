use std::collections::BTreeMap;
use std::path::Path;

use inkpress_blocks::{Block, ContentType, Field, MapFromMeta};
use serde::{Serialize, Serializer};

use super::{ModelError, SourceFile, Time};
use crate::markdown;

/// Marker separating a post's preview from the rest of its content.
pub const MORE_MARKER: &str = "<!--more-->";

/// Author of a post or page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Author {
    pub name: String,
    pub email: String,
    pub url: String,
}

/// Raw body of a document plus how to render it.
///
/// Serializes as its rendered HTML, which templates treat as trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    content_type: ContentType,
    raw: Vec<u8>,
}

impl Content {
    pub fn new(content_type: ContentType, raw: Vec<u8>) -> Self {
        Self { content_type, raw }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn html(&self) -> String {
        let text = String::from_utf8_lossy(&self.raw);
        match self.content_type {
            ContentType::Markdown => markdown::to_html(&text),
            ContentType::Html => text.into_owned(),
        }
    }

    /// The part before [`MORE_MARKER`], or everything when there is no marker.
    pub fn preview(&self) -> Content {
        let text = String::from_utf8_lossy(&self.raw);
        let head = text.split(MORE_MARKER).next().unwrap_or_default();
        Content::new(self.content_type, head.as_bytes().to_vec())
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.html())
    }
}

/// Fields shared by posts and pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub permalink: String,
    /// Navigation entry highlighted while this document renders
    pub hover: String,
    pub template: String,
    pub desc: String,
    pub created: Time,
    pub updated: Time,
    pub author: Author,
    pub content: Content,
    /// Free-form metadata
    pub meta: BTreeMap<String, String>,
}

impl MapFromMeta for Document {
    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<Document>; 8] = [
            Field::<Document>::string("title", |d, v| d.title = v),
            Field::<Document>::string("slug", |d, v| d.slug = v),
            Field::<Document>::string("hover", |d, v| d.hover = v),
            Field::<Document>::string("template", |d, v| d.template = v),
            Field::<Document>::string("desc", |d, v| d.desc = v),
            Field::<Document>::string("author", |d, v| d.author.name = v),
            Field::<Document>::string("author_email", |d, v| d.author.email = v),
            Field::<Document>::string("author_url", |d, v| d.author.url = v),
        ];
        &FIELDS
    }
}

impl Document {
    /// Build the shared part of a post or page.
    ///
    /// Block 0 is the header metadata, block 1 the content, and an optional block 2
    /// of metadata replaces the header's `[meta]` map.
    pub fn from_blocks(
        blocks: &[Block],
        file: &SourceFile,
        default_template: &str,
    ) -> Result<Self, ModelError> {
        if blocks.len() < 2 {
            return Err(ModelError::BlockCount {
                expected: 2,
                found: blocks.len(),
            });
        }
        let header = blocks[0]
            .as_metadata()
            .ok_or(ModelError::NotMetadata { index: 0 })?;

        let created = Time::parse_or(header.item(&["date"]), file.modified);
        let mut doc = Document {
            title: String::new(),
            slug: String::new(),
            url: String::new(),
            permalink: String::new(),
            hover: String::new(),
            template: String::new(),
            desc: String::new(),
            created,
            updated: created,
            author: Author::default(),
            content: Content::new(blocks[1].content_type(), blocks[1].raw().to_vec()),
            meta: header.map_hash("meta"),
        };
        header.map_to("", &mut doc)?;

        let update_date = header.item(&["update_date"]);
        if !update_date.is_empty() {
            doc.updated = Time::parse_or(update_date, file.modified);
        }
        if doc.slug.is_empty() {
            doc.slug = file.stem().to_string();
        }
        if doc.template.is_empty() {
            doc.template = default_template.to_string();
        }
        doc.permalink = format!("/{}", doc.slug);
        doc.url = if Path::new(&doc.slug).extension().is_some() {
            doc.permalink.clone()
        } else {
            format!("{}.html", doc.permalink)
        };

        if let Some(block) = blocks.get(2) {
            let extra = block
                .as_metadata()
                .ok_or(ModelError::NotMetadata { index: 2 })?;
            if let Some(e) = extra.error() {
                return Err(e.clone().into());
            }
            doc.meta = extra.map_hash("");
        }

        Ok(doc)
    }
}

/// A standalone page such as "about".
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    #[serde(flatten)]
    pub doc: Document,
}

impl Page {
    pub const DEFAULT_TEMPLATE: &'static str = "page.html";

    pub fn from_blocks(blocks: &[Block], file: &SourceFile) -> Result<Self, ModelError> {
        Ok(Self {
            doc: Document::from_blocks(blocks, file, Self::DEFAULT_TEMPLATE)?,
        })
    }
}
