//! View models handed to the theme, one per render stage.

use serde::Serialize;

use crate::model::{Archive, Page, Post, SiteMeta, Tag};
use crate::nav::NavGroup;
use crate::pager::Pager;

/// Keys every stage provides.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteView<'a> {
    pub title: String,
    pub meta: &'a SiteMeta,
    pub navs: &'a NavGroup,
}

impl<'a> SiteView<'a> {
    pub fn new(title: String, meta: &'a SiteMeta, navs: &'a NavGroup) -> Self {
        Self { title, meta, navs }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostView<'a> {
    #[serde(flatten)]
    pub site: SiteView<'a>,
    pub desc: &'a str,
    pub post: &'a Post,
    pub permalink: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListingView<'a> {
    #[serde(flatten)]
    pub site: SiteView<'a>,
    pub posts: &'a [Post],
    pub pager: &'a Pager,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveView<'a> {
    #[serde(flatten)]
    pub site: SiteView<'a>,
    pub archives: &'a [Archive<'a>],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageView<'a> {
    #[serde(flatten)]
    pub site: SiteView<'a>,
    pub desc: &'a str,
    pub page: &'a Page,
    pub permalink: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagView<'a> {
    #[serde(flatten)]
    pub site: SiteView<'a>,
    pub tag: &'a Tag,
    pub posts: Vec<&'a Post>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexView<'a> {
    #[serde(flatten)]
    pub site: SiteView<'a>,
    pub posts: &'a [Post],
    pub pager: Option<&'a Pager>,
}

/// Data for one template execution.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ViewModel<'a> {
    Post(PostView<'a>),
    Listing(ListingView<'a>),
    Archive(ArchiveView<'a>),
    Page(PageView<'a>),
    Tag(TagView<'a>),
    Index(IndexView<'a>),
}

impl ViewModel<'_> {
    pub fn site(&self) -> &SiteView<'_> {
        match self {
            ViewModel::Post(v) => &v.site,
            ViewModel::Listing(v) => &v.site,
            ViewModel::Archive(v) => &v.site,
            ViewModel::Page(v) => &v.site,
            ViewModel::Tag(v) => &v.site,
            ViewModel::Index(v) => &v.site,
        }
    }
}
