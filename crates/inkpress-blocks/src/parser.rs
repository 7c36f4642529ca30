//! Delimiter grammar for source documents.

use std::ops::Range;

use crate::block::{Block, BlockKind};

/// Delimiter family. Exactly one family is active for a given document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `-----ini` style separator lines
    Rule,
    /// ```` ```ini ```` style fenced blocks closed by a bare fence
    Fence,
}

impl Family {
    pub fn prefix(self) -> &'static str {
        match self {
            Family::Rule => "-----",
            Family::Fence => "```",
        }
    }
}

/// Errors that reject a whole document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Document must start with a block delimiter, found {found:?}")]
    MissingDelimiter { found: String },

    #[error("Unrecognized first block type {keyword:?}")]
    UnknownBlock { keyword: String },
}

/// Byte offsets of one line: `start..text_end` excludes the line break,
/// `end` is where the next line begins.
#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    text_end: usize,
    end: usize,
}

impl Line {
    fn text<'a>(&self, raw: &'a [u8]) -> &'a [u8] {
        &raw[self.start..self.text_end]
    }
}

/// One block's delimiter line and payload range.
#[derive(Debug, Clone)]
struct Span<'a> {
    line: usize,
    keyword: &'a str,
    kind: BlockKind,
    body: Range<usize>,
}

fn strip_bom(raw: &[u8]) -> &[u8] {
    raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw)
}

fn split_lines(raw: &[u8]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for chunk in raw.split_inclusive(|b| *b == b'\n') {
        let end = start + chunk.len();
        let text_end = if chunk.ends_with(b"\n") { end - 1 } else { end };
        lines.push(Line {
            start,
            text_end,
            end,
        });
        start = end;
    }
    lines
}

fn is_keyword(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parser for one delimiter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockParser {
    family: Family,
}

impl BlockParser {
    pub fn new(family: Family) -> Self {
        Self { family }
    }

    pub fn rule() -> Self {
        Self::new(Family::Rule)
    }

    pub fn fence() -> Self {
        Self::new(Family::Fence)
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn prefix(&self) -> &'static str {
        self.family.prefix()
    }

    /// True iff `raw` is exactly this grammar's prefix.
    pub fn is(&self, raw: &[u8]) -> bool {
        raw == self.prefix().as_bytes()
    }

    /// Classify a bare block-type keyword.
    pub fn detect(&self, keyword: &[u8]) -> Option<Block> {
        let keyword = std::str::from_utf8(keyword).ok()?;
        BlockKind::from_keyword(keyword).map(|kind| Block::new(kind, keyword, Vec::new()))
    }

    /// Split a document into blocks.
    ///
    /// Blank input yields no blocks. Otherwise the first non-blank line must be a
    /// delimiter with a recognized keyword. A leading byte-order mark is ignored.
    pub fn parse(&self, raw: &[u8]) -> Result<Vec<Block>, ParseError> {
        let raw = strip_bom(raw);
        let lines = split_lines(raw);
        let Some(first) = lines
            .iter()
            .position(|l| !l.text(raw).trim_ascii().is_empty())
        else {
            return Ok(Vec::new());
        };

        let head = lines[first].text(raw);
        let keyword = self
            .delimiter(head)
            .ok_or_else(|| ParseError::MissingDelimiter {
                found: String::from_utf8_lossy(head.trim_ascii()).into_owned(),
            })?;
        let kind = BlockKind::from_keyword(keyword).ok_or_else(|| ParseError::UnknownBlock {
            keyword: keyword.to_string(),
        })?;

        let opening = Span {
            line: first,
            keyword,
            kind,
            body: 0..0,
        };
        let spans = match self.family {
            Family::Rule => self.rule_spans(raw, &lines, opening),
            Family::Fence => self.fence_spans(raw, &lines, opening),
        };

        Ok(spans
            .into_iter()
            .map(|span| Block::new(span.kind, span.keyword, raw[span.body].to_vec()))
            .collect())
    }

    /// Every `-----<keyword>` line after the first starts a new block; unknown
    /// keywords give unrecognized blocks.
    fn rule_spans<'a>(&self, raw: &'a [u8], lines: &[Line], opening: Span<'a>) -> Vec<Span<'a>> {
        let first = opening.line;
        let mut spans = vec![opening];
        for (i, line) in lines.iter().enumerate().skip(first + 1) {
            let Some(keyword) = self.delimiter(line.text(raw)) else {
                continue;
            };
            spans.push(Span {
                line: i,
                keyword,
                kind: BlockKind::from_keyword(keyword).unwrap_or(BlockKind::Unrecognized),
                body: 0..0,
            });
        }

        let starts: Vec<usize> = spans.iter().map(|s| lines[s.line].start).collect();
        for (n, span) in spans.iter_mut().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(raw.len());
            span.body = lines[span.line].end..end;
        }
        spans
    }

    /// A fenced block runs to its closing bare fence. Inside a content block, a
    /// fence line with any keyword opens a code sample that the next bare fence
    /// closes, so samples never end the block. Only a recognized keyword between
    /// blocks opens a new one.
    fn fence_spans<'a>(&self, raw: &'a [u8], lines: &[Line], opening: Span<'a>) -> Vec<Span<'a>> {
        let first = opening.line;
        let mut spans = Vec::new();
        let mut open = Some(opening);
        let mut in_sample = false;

        for (i, line) in lines.iter().enumerate().skip(first + 1) {
            let text = line.text(raw);
            let bare = self.is(text.trim_ascii());
            let keyword = self.delimiter(text);

            match open.take() {
                Some(mut span) => {
                    if bare && in_sample {
                        in_sample = false;
                    } else if bare {
                        span.body = lines[span.line].end..line.start;
                        spans.push(span);
                        continue;
                    } else if let Some(keyword) = keyword {
                        let next = BlockKind::from_keyword(keyword);
                        match (span.kind, next) {
                            // ini text holds no code samples; an opening ends it
                            (BlockKind::Metadata, Some(kind)) => {
                                span.body = lines[span.line].end..line.start;
                                spans.push(span);
                                open = Some(Span {
                                    line: i,
                                    keyword,
                                    kind,
                                    body: 0..0,
                                });
                                continue;
                            }
                            _ => in_sample = true,
                        }
                    }
                    open = Some(span);
                }
                None => {
                    open = keyword.and_then(|keyword| {
                        BlockKind::from_keyword(keyword).map(|kind| Span {
                            line: i,
                            keyword,
                            kind,
                            body: 0..0,
                        })
                    });
                    in_sample = false;
                }
            }
        }

        if let Some(mut span) = open {
            span.body = lines[span.line].end..raw.len();
            spans.push(span);
        }
        spans
    }

    /// Keyword of a delimiter line, if `line` is one.
    fn delimiter<'a>(&self, line: &'a [u8]) -> Option<&'a str> {
        let rest = line.strip_prefix(self.prefix().as_bytes())?;
        let keyword = std::str::from_utf8(rest).ok()?.trim();
        is_keyword(keyword).then_some(keyword)
    }
}

/// The grammars available to a build, chosen per document by prefix.
#[derive(Debug, Clone)]
pub struct ParserSet {
    parsers: Vec<BlockParser>,
}

impl ParserSet {
    pub fn new(parsers: Vec<BlockParser>) -> Self {
        Self { parsers }
    }

    pub fn parsers(&self) -> &[BlockParser] {
        &self.parsers
    }

    /// The parser whose prefix opens the first non-blank line of `raw`.
    pub fn select(&self, raw: &[u8]) -> Option<&BlockParser> {
        let head = raw.trim_ascii_start();
        self.parsers
            .iter()
            .find(|p| head.starts_with(p.prefix().as_bytes()))
    }

    /// Classify a keyword with any registered grammar.
    pub fn detect(&self, keyword: &[u8]) -> Option<Block> {
        self.parsers.iter().find_map(|p| p.detect(keyword))
    }

    /// Parse with whichever grammar the document is written in.
    pub fn parse(&self, raw: &[u8]) -> Result<Vec<Block>, ParseError> {
        let raw = strip_bom(raw);
        if raw.trim_ascii().is_empty() {
            return Ok(Vec::new());
        }
        match self.select(raw) {
            Some(parser) => parser.parse(raw),
            None => Err(ParseError::MissingDelimiter {
                found: String::from_utf8_lossy(first_line(raw.trim_ascii_start())).into_owned(),
            }),
        }
    }
}

impl Default for ParserSet {
    fn default() -> Self {
        Self::new(vec![BlockParser::rule(), BlockParser::fence()])
    }
}

fn first_line(raw: &[u8]) -> &[u8] {
    raw.split(|b| *b == b'\n').next().unwrap_or_default().trim_ascii()
}
