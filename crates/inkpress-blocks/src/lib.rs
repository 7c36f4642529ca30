//! Block parser for inkpress source documents.
//!
//! A source document is a sequence of delimited blocks: an ini metadata block
//! followed by a content block (markdown or literal html), optionally followed by
//! a second metadata block. Two delimiter families are supported, a line-rule
//! family (`-----ini`) and a fenced family (```` ```ini ````).

pub mod block;
pub mod mapping;
pub mod meta;
pub mod parser;

pub use block::{Block, BlockKind, ContentType};
pub use mapping::{Field, MapFromMeta};
pub use meta::{MetaBlock, MetaError};
pub use parser::{BlockParser, Family, ParseError, ParserSet};
