use std::collections::BTreeMap;

use inkpress_blocks::Block;
use serde::Serialize;

use super::{Content, Document, ModelError, SourceFile};

/// A tag attached to posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub name: String,
    pub url: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("/tags/{name}.html"),
        }
    }
}

/// A dated blog post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Post {
    #[serde(flatten)]
    pub doc: Document,
    pub tags: Vec<Tag>,
    /// Content before the `<!--more-->` marker
    pub preview: Content,
}

impl Post {
    pub const DEFAULT_TEMPLATE: &'static str = "post.html";

    pub fn from_blocks(blocks: &[Block], file: &SourceFile) -> Result<Self, ModelError> {
        let doc = Document::from_blocks(blocks, file, Self::DEFAULT_TEMPLATE)?;
        let tags = blocks[0]
            .as_metadata()
            .map(|meta| parse_tags(meta.item(&["tags"])))
            .unwrap_or_default();
        let preview = doc.content.preview();

        Ok(Self { doc, tags, preview })
    }
}

fn parse_tags(raw: &str) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !tags.iter().any(|t| t.name == name) {
            tags.push(Tag::new(name));
        }
    }
    tags
}

/// One tag and the posts that carry it, as indices into the post list.
#[derive(Debug, Clone)]
pub struct TagEntry {
    pub tag: Tag,
    pub posts: Vec<usize>,
}

/// Tag name to posts, built by one scan over the post list.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: BTreeMap<String, TagEntry>,
}

impl TagIndex {
    /// Index `posts`; each entry keeps the order of the post list.
    pub fn build(posts: &[Post]) -> Self {
        let mut entries: BTreeMap<String, TagEntry> = BTreeMap::new();
        for (i, post) in posts.iter().enumerate() {
            for tag in &post.tags {
                entries
                    .entry(tag.name.clone())
                    .or_insert_with(|| TagEntry {
                        tag: tag.clone(),
                        posts: Vec::new(),
                    })
                    .posts
                    .push(i);
            }
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
