//! Typed blocks produced by the parser.

use crate::meta::MetaBlock;

/// Rendering mode of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Passed through the markdown transform before rendering
    Markdown,
    /// Emitted unchanged
    Html,
}

impl ContentType {
    /// Keyword used after a delimiter prefix.
    pub fn keyword(self) -> &'static str {
        match self {
            ContentType::Markdown => "markdown",
            ContentType::Html => "html",
        }
    }
}

/// Discriminant of a [`Block`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Metadata,
    Content(ContentType),
    Unrecognized,
}

impl BlockKind {
    /// Resolve a block-type keyword (the text after a delimiter prefix).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "ini" => Some(BlockKind::Metadata),
            "markdown" | "md" => Some(BlockKind::Content(ContentType::Markdown)),
            "html" => Some(BlockKind::Content(ContentType::Html)),
            _ => None,
        }
    }
}

/// One delimited segment of a source document.
#[derive(Debug, Clone)]
pub enum Block {
    /// Parsed ini key/value data
    Metadata(MetaBlock),

    /// Body content, rendered according to its type
    Content { content_type: ContentType, raw: Vec<u8> },

    /// A delimiter keyword no grammar knows about
    Unrecognized { keyword: String, raw: Vec<u8> },
}

impl Block {
    /// Build a block of the given kind from its payload bytes.
    pub fn new(kind: BlockKind, keyword: &str, raw: Vec<u8>) -> Self {
        match kind {
            BlockKind::Metadata => Block::Metadata(MetaBlock::from_bytes(raw)),
            BlockKind::Content(content_type) => Block::Content { content_type, raw },
            BlockKind::Unrecognized => Block::Unrecognized {
                keyword: keyword.to_string(),
                raw,
            },
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Metadata(_) => BlockKind::Metadata,
            Block::Content { content_type, .. } => BlockKind::Content(*content_type),
            Block::Unrecognized { .. } => BlockKind::Unrecognized,
        }
    }

    /// Raw payload bytes, exactly as they appeared between delimiters.
    pub fn raw(&self) -> &[u8] {
        match self {
            Block::Metadata(meta) => meta.raw(),
            Block::Content { raw, .. } | Block::Unrecognized { raw, .. } => raw,
        }
    }

    /// The metadata view of this block, if it is one.
    pub fn as_metadata(&self) -> Option<&MetaBlock> {
        match self {
            Block::Metadata(meta) => Some(meta),
            _ => None,
        }
    }

    /// Content type of this block; anything that is not markdown renders literally.
    pub fn content_type(&self) -> ContentType {
        match self {
            Block::Content { content_type, .. } => *content_type,
            _ => ContentType::Html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_keywords() {
        assert_eq!(BlockKind::from_keyword("ini"), Some(BlockKind::Metadata));
        assert_eq!(
            BlockKind::from_keyword("md"),
            Some(BlockKind::Content(ContentType::Markdown))
        );
        assert_eq!(
            BlockKind::from_keyword("html"),
            Some(BlockKind::Content(ContentType::Html))
        );
        assert_eq!(BlockKind::from_keyword("INI"), None);
        assert_eq!(BlockKind::from_keyword("xxx"), None);
    }

    #[test]
    fn metadata_accessor_is_safe_on_mismatch() {
        let block = Block::new(
            BlockKind::Content(ContentType::Markdown),
            "markdown",
            b"# Hi".to_vec(),
        );

        assert!(block.as_metadata().is_none());
        assert_eq!(block.raw(), b"# Hi");
        assert_eq!(block.content_type(), ContentType::Markdown);
    }

    #[test]
    fn unrecognized_renders_literally() {
        let block = Block::new(BlockKind::Unrecognized, "yaml", b"a: b".to_vec());

        assert_eq!(block.kind(), BlockKind::Unrecognized);
        assert_eq!(block.content_type(), ContentType::Html);
    }
}
