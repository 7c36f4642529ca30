use std::time::SystemTime;

use inkpress_blocks::ParserSet;

use crate::model::{Page, Post, SiteMeta, SourceFile};
use crate::nav::NavGroup;
use crate::templates::TemplateTheme;

fn parse(source: &str) -> Vec<inkpress_blocks::Block> {
    ParserSet::default().parse(source.as_bytes()).unwrap()
}

/// A markdown post titled and slugged `slug`; `tags` is a comma list.
pub(crate) fn post(slug: &str, date: &str, tags: &str) -> Post {
    let source = format!(
        "-----ini\ntitle = {slug}\nslug = {slug}\ndate = {date}\ntags = {tags}\n-----markdown\nbody of {slug}\n"
    );
    let file = SourceFile::new(format!("source/post/{slug}.md"), SystemTime::UNIX_EPOCH);
    Post::from_blocks(&parse(&source), &file).unwrap()
}

/// A page whose title, slug and hover class are all `slug`.
pub(crate) fn page(slug: &str) -> Page {
    let source = format!(
        "-----ini\ntitle = {slug}\nslug = {slug}\nhover = {slug}\n-----markdown\n{slug} page\n"
    );
    let file = SourceFile::new(format!("source/page/{slug}.md"), SystemTime::UNIX_EPOCH);
    Page::from_blocks(&parse(&source), &file).unwrap()
}

/// Site "Inkpress" with home, archive and about navigation.
pub(crate) fn site() -> (SiteMeta, NavGroup) {
    let source = "-----ini\n[meta]\ntitle = Inkpress\n\n[nav]\nhome = Home\narchive = Archive\nabout = About\n\n[nav.home]\nlink = /\n";
    SiteMeta::from_blocks(&parse(source)).unwrap()
}

pub(crate) fn theme() -> TemplateTheme {
    TemplateTheme::builtin().unwrap()
}
