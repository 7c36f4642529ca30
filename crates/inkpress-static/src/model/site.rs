use inkpress_blocks::{Block, Field, MapFromMeta};
use serde::Serialize;

use super::ModelError;
use crate::nav::NavGroup;

/// Site-wide metadata from the `[meta]` namespace of the site document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteMeta {
    pub title: String,
    pub subtitle: String,
    pub keyword: String,
    pub desc: String,
    pub domain: String,
    pub root: String,
}

impl MapFromMeta for SiteMeta {
    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<SiteMeta>; 6] = [
            Field::<SiteMeta>::string("title", |m, v| m.title = v),
            Field::<SiteMeta>::string("subtitle", |m, v| m.subtitle = v),
            Field::<SiteMeta>::string("keyword", |m, v| m.keyword = v),
            Field::<SiteMeta>::string("desc", |m, v| m.desc = v),
            Field::<SiteMeta>::string("domain", |m, v| m.domain = v),
            Field::<SiteMeta>::string("root", |m, v| m.root = v),
        ];
        &FIELDS
    }
}

impl SiteMeta {
    /// Read site metadata and navigation from the blocks of the site document.
    pub fn from_blocks(blocks: &[Block]) -> Result<(SiteMeta, NavGroup), ModelError> {
        let Some(first) = blocks.first() else {
            return Err(ModelError::BlockCount {
                expected: 1,
                found: 0,
            });
        };
        let block = first
            .as_metadata()
            .ok_or(ModelError::NotMetadata { index: 0 })?;

        let mut meta = SiteMeta::default();
        block.map_to("meta", &mut meta)?;
        let navs = NavGroup::from_meta(block)?;

        Ok((meta, navs))
    }
}
