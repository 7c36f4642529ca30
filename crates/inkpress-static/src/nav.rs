//! Site navigation and its hover state.

use std::ops::Deref;

use inkpress_blocks::{Field, MapFromMeta, MetaBlock, MetaError};
use serde::Serialize;

/// One navigation entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Nav {
    pub name: String,
    pub title: String,
    pub link: String,
    /// Hover class pages use to select this entry
    pub hover: String,
    /// Open the link in a new window
    pub blank: bool,
    pub is_hover: bool,
}

impl MapFromMeta for Nav {
    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<Nav>; 4] = [
            Field::<Nav>::string("title", |n, v| n.title = v),
            Field::<Nav>::string("link", |n, v| n.link = v),
            Field::<Nav>::string("hover", |n, v| n.hover = v),
            Field::<Nav>::bool("blank", |n, v| n.blank = v),
        ];
        &FIELDS
    }
}

/// Ordered navigation entries with at most one hovered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NavGroup {
    items: Vec<Nav>,
}

impl NavGroup {
    pub fn new(items: Vec<Nav>) -> Self {
        Self { items }
    }

    /// Entries are listed as `name = Title` under `[nav]`, each optionally
    /// detailed by a `[nav.<name>]` namespace.
    pub fn from_meta(meta: &MetaBlock) -> Result<Self, MetaError> {
        let mut items = Vec::new();
        for name in meta.keys("nav") {
            let mut nav = Nav {
                name: name.to_string(),
                title: meta.item(&["nav", name]).to_string(),
                link: format!("/{name}.html"),
                hover: name.to_string(),
                ..Default::default()
            };
            meta.map_to(&format!("nav.{name}"), &mut nav)?;
            items.push(nav);
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[Nav] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The currently hovered entry.
    pub fn hovered(&self) -> Option<&Nav> {
        self.items.iter().find(|n| n.is_hover)
    }

    /// Mark entries whose hover class is `class` until the returned guard drops.
    pub fn hover(&mut self, class: &str) -> HoverGuard<'_> {
        for nav in &mut self.items {
            nav.is_hover = !class.is_empty() && nav.hover == class;
        }
        HoverGuard { navs: self }
    }

    pub fn reset(&mut self) {
        for nav in &mut self.items {
            nav.is_hover = false;
        }
    }
}

/// Hover state scoped to a render; resets the group when dropped.
pub struct HoverGuard<'a> {
    navs: &'a mut NavGroup,
}

impl Deref for HoverGuard<'_> {
    type Target = NavGroup;

    fn deref(&self) -> &NavGroup {
        self.navs
    }
}

impl Drop for HoverGuard<'_> {
    fn drop(&mut self) {
        self.navs.reset();
    }
}
