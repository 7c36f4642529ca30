//! Mutable state shared by the stages of one build.

use std::ops::Range;
use std::path::{Component, Path, PathBuf};

use crate::builder::BuildError;
use crate::model::{Page, Post, SiteMeta, TagIndex};
use crate::nav::NavGroup;
use crate::pager::Pager;
use crate::templates::Theme;

/// Default number of posts per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// Everything the compile stages read and write during one build.
///
/// Created fresh for each build and never shared between builds.
pub struct BuildContext<'t> {
    /// Destination root
    pub dst_dir: PathBuf,
    pub page_size: usize,
    pub site: SiteMeta,
    pub navs: NavGroup,
    /// Posts, most recent first
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
    pub tags: TagIndex,
    /// Number of listing pages written
    pub post_page_count: usize,
    /// First stage failure; later stages do nothing once set
    pub error: Option<BuildError>,
    /// Files written so far, in order
    pub written: Vec<PathBuf>,
    pub(crate) index: Option<(Range<usize>, Pager)>,
    pub(crate) theme: &'t dyn Theme,
}

impl<'t> BuildContext<'t> {
    pub fn new(
        dst_dir: impl Into<PathBuf>,
        theme: &'t dyn Theme,
        site: SiteMeta,
        navs: NavGroup,
        posts: Vec<Post>,
        pages: Vec<Page>,
    ) -> Self {
        let tags = TagIndex::build(&posts);
        Self {
            dst_dir: dst_dir.into(),
            page_size: DEFAULT_PAGE_SIZE,
            site,
            navs,
            posts,
            pages,
            tags,
            post_page_count: 0,
            error: None,
            written: Vec::new(),
            index: None,
            theme,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Posts shown on the index: the first listing page.
    pub fn index_posts(&self) -> &[Post] {
        match &self.index {
            Some((range, _)) => &self.posts[range.clone()],
            None => &[],
        }
    }

    /// Pager of the first listing page.
    pub fn index_pager(&self) -> Option<&Pager> {
        self.index.as_ref().map(|(_, pager)| pager)
    }

    /// Destination path for a site URL; extensionless URLs get `.html`.
    pub fn output_path(&self, url: &str) -> Result<PathBuf, BuildError> {
        output_path(&self.dst_dir, url)
    }
}

/// Map a site URL under `dst_dir`. URLs that are empty or step outside the
/// destination (`..`, `.`, drive prefixes) are rejected.
pub(crate) fn output_path(dst_dir: &Path, url: &str) -> Result<PathBuf, BuildError> {
    let rel = Path::new(url.trim_start_matches('/'));
    let contained = rel
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if rel.as_os_str().is_empty() || !contained {
        return Err(BuildError::UnsafePath(url.to_string()));
    }

    let mut path = dst_dir.join(rel);
    if path.extension().is_none() {
        path.set_extension("html");
    }
    Ok(path)
}
