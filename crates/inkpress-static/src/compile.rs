//! Render stages of a build.
//!
//! Stages run in a fixed order against one [`BuildContext`]. The first failure is
//! stored on the context and every later stage is skipped. Files written by earlier
//! stages are left in place.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::builder::BuildError;
use crate::context::{output_path, BuildContext};
use crate::model::{Archive, Post};
use crate::pager::Cursor;
use crate::templates::Theme;
use crate::view::{
    ArchiveView, IndexView, ListingView, PageView, PostView, SiteView, TagView, ViewModel,
};

/// Permalink layout of listing pages.
pub const LISTING_LAYOUT: &str = "/posts/{n}.html";

type Stage = fn(&mut BuildContext<'_>) -> Result<(), BuildError>;

// listing must precede index: it records page 1 for reuse
const STAGES: [(&str, Stage); 6] = [
    ("post", compile_single_posts),
    ("listing", compile_paged_posts),
    ("archive", compile_archive),
    ("page", compile_pages),
    ("tag", compile_tags),
    ("index", compile_index),
];

/// Run every stage in order, stopping at the first failure.
pub fn compile(ctx: &mut BuildContext<'_>) {
    for (name, stage) in STAGES {
        if ctx.error.is_some() {
            tracing::debug!("Skipping {} stage after earlier failure", name);
            continue;
        }

        let start = Instant::now();
        let before = ctx.written.len();
        match stage(ctx) {
            Ok(()) => tracing::debug!(
                "Compiled {} stage: {} files in {}ms",
                name,
                ctx.written.len() - before,
                start.elapsed().as_millis()
            ),
            Err(e) => {
                tracing::error!("{} stage failed: {}", name, e);
                ctx.error = Some(e);
            }
        }
    }
}

/// Execute `template` against `view` into `dest`, replacing any existing file.
pub fn render_to_file(
    theme: &dyn Theme,
    view: &ViewModel<'_>,
    template: &str,
    dest: &Path,
) -> Result<(), BuildError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let write_error = |source| BuildError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(dest).map_err(write_error)?);
    let html = theme.execute(template, view)?;
    out.write_all(html.as_bytes()).map_err(write_error)?;
    out.flush().map_err(write_error)
}

fn title(prefix: &str, site_title: &str) -> String {
    format!("{prefix} - {site_title}")
}

fn compile_single_posts(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    for post in &ctx.posts {
        let dest = ctx.output_path(&post.doc.url)?;
        let view = ViewModel::Post(PostView {
            site: SiteView::new(title(&post.doc.title, &ctx.site.title), &ctx.site, &ctx.navs),
            desc: &post.doc.desc,
            post,
            permalink: &post.doc.permalink,
        });

        render_to_file(ctx.theme, &view, &post.doc.template, &dest)?;
        ctx.written.push(dest);
    }
    Ok(())
}

fn compile_paged_posts(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let cursor = Cursor::new(ctx.page_size, ctx.posts.len());
    let mut page = 1;

    while let Some(mut pager) = cursor.page(page) {
        pager.set_layout(LISTING_LAYOUT);
        let dest = ctx.dst_dir.join(format!("posts/{page}.html"));
        let view = ViewModel::Listing(ListingView {
            site: SiteView::new(
                title(&format!("Page {page}"), &ctx.site.title),
                &ctx.site,
                &ctx.navs,
            ),
            posts: &ctx.posts[pager.begin..pager.end],
            pager: &pager,
        });

        render_to_file(ctx.theme, &view, "posts.html", &dest)?;
        ctx.written.push(dest);

        if page == 1 {
            ctx.index = Some((pager.begin..pager.end, pager));
        }
        page += 1;
    }

    ctx.post_page_count = page - 1;
    Ok(())
}

fn compile_archive(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let archives = Archive::group(&ctx.posts);
    let dest = ctx.dst_dir.join("archive.html");

    let navs = ctx.navs.hover("archive");
    let view = ViewModel::Archive(ArchiveView {
        site: SiteView::new(title("Archive", &ctx.site.title), &ctx.site, &navs),
        archives: &archives,
    });

    render_to_file(ctx.theme, &view, "archive.html", &dest)?;
    ctx.written.push(dest);
    Ok(())
}

fn compile_pages(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    for page in &ctx.pages {
        let dest = output_path(&ctx.dst_dir, &page.doc.url)?;

        let navs = ctx.navs.hover(&page.doc.hover);
        let view = ViewModel::Page(PageView {
            site: SiteView::new(title(&page.doc.title, &ctx.site.title), &ctx.site, &navs),
            desc: &page.doc.desc,
            page,
            permalink: &page.doc.permalink,
        });

        render_to_file(ctx.theme, &view, &page.doc.template, &dest)?;
        ctx.written.push(dest);
    }
    Ok(())
}

fn compile_tags(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    for entry in ctx.tags.iter() {
        let dest = output_path(&ctx.dst_dir, &entry.tag.url)?;
        let posts: Vec<&Post> = entry.posts.iter().map(|&i| &ctx.posts[i]).collect();
        let view = ViewModel::Tag(TagView {
            site: SiteView::new(title(&entry.tag.name, &ctx.site.title), &ctx.site, &ctx.navs),
            tag: &entry.tag,
            posts,
        });

        render_to_file(ctx.theme, &view, "posts.html", &dest)?;
        ctx.written.push(dest);
    }
    Ok(())
}

fn compile_index(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let template = if ctx.theme.has_template("index.html") {
        "index.html"
    } else {
        "posts.html"
    };
    let dest = ctx.dst_dir.join("index.html");

    let (posts, pager) = match &ctx.index {
        Some((range, pager)) => (&ctx.posts[range.clone()], Some(pager)),
        None => (&ctx.posts[..0], None),
    };
    let navs = ctx.navs.hover("home");
    let view = ViewModel::Index(IndexView {
        site: SiteView::new(ctx.site.title.clone(), &ctx.site, &navs),
        posts,
        pager,
    });

    render_to_file(ctx.theme, &view, template, &dest)?;
    ctx.written.push(dest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{page, post, site, theme};
    use crate::templates::{TemplateTheme, ThemeError};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn posts(n: usize) -> Vec<Post> {
        (0..n)
            .map(|i| {
                let tags = if i % 2 == 0 { "even" } else { "odd,all" };
                post(&format!("post-{i}"), &format!("2021-01-{:02}", 28 - i), tags)
            })
            .collect()
    }

    fn relative(ctx: &BuildContext<'_>) -> Vec<String> {
        ctx.written
            .iter()
            .map(|p| {
                p.strip_prefix(&ctx.dst_dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn compiles_every_stage_in_order() {
        let temp = tempdir().unwrap();
        let theme = theme();
        let (meta, navs) = site();
        let mut ctx = BuildContext::new(
            temp.path(),
            &theme,
            meta,
            navs,
            posts(3),
            vec![page("about")],
        );

        compile(&mut ctx);

        assert!(ctx.error.is_none());
        assert_eq!(
            relative(&ctx),
            vec![
                "post-0.html",
                "post-1.html",
                "post-2.html",
                "posts/1.html",
                "archive.html",
                "about.html",
                "tags/all.html",
                "tags/even.html",
                "tags/odd.html",
                "index.html",
            ]
        );
        assert!(ctx.navs.hovered().is_none());
    }

    #[test]
    fn paginates_listing_and_reuses_first_page_for_index() {
        let temp = tempdir().unwrap();
        let theme = theme();
        let (meta, navs) = site();
        let mut ctx = BuildContext::new(temp.path(), &theme, meta, navs, posts(10), vec![])
            .with_page_size(4);

        compile(&mut ctx);

        assert!(ctx.error.is_none());
        assert_eq!(ctx.post_page_count, 3);
        for n in 1..=3 {
            assert!(temp.path().join(format!("posts/{n}.html")).exists());
        }
        assert!(!temp.path().join("posts/4.html").exists());

        let slugs: Vec<_> = ctx.index_posts().iter().map(|p| p.doc.slug.as_str()).collect();
        assert_eq!(slugs, vec!["post-0", "post-1", "post-2", "post-3"]);
        let pager = ctx.index_pager().unwrap();
        assert_eq!((pager.page, pager.begin, pager.end), (1, 0, 4));

        let index = std::fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert!(index.contains("<title>Inkpress</title>"));
        assert!(index.contains(">post-3</a>"));
        assert!(!index.contains(">post-4</a>"));
        assert!(index.contains(r#"class="next""#));
    }

    #[test]
    fn index_falls_back_to_listing_template() {
        let temp = tempdir().unwrap();
        let (meta, navs) = site();

        let listing_only = TemplateTheme::from_sources([
            ("post.html", "post"),
            ("posts.html", "listing {{ Posts | length }}"),
            ("archive.html", "archive"),
        ])
        .unwrap();
        let mut ctx = BuildContext::new(temp.path(), &listing_only, meta.clone(), navs.clone(), posts(2), vec![]);
        compile(&mut ctx);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("index.html")).unwrap(),
            "listing 2"
        );

        let custom = TemplateTheme::from_sources([
            ("post.html", "post"),
            ("posts.html", "listing"),
            ("archive.html", "archive"),
            ("index.html", "home {{ Pager.Page }} {{ Navs[0].IsHover }}"),
        ])
        .unwrap();
        let mut ctx = BuildContext::new(temp.path(), &custom, meta, navs, posts(2), vec![]);
        compile(&mut ctx);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("index.html")).unwrap(),
            "home 1 true"
        );
    }

    #[test]
    fn empty_site_still_writes_archive_and_index() {
        let temp = tempdir().unwrap();
        let theme = theme();
        let (meta, navs) = site();
        let mut ctx = BuildContext::new(temp.path(), &theme, meta, navs, vec![], vec![]);

        compile(&mut ctx);

        assert!(ctx.error.is_none());
        assert_eq!(ctx.post_page_count, 0);
        assert_eq!(relative(&ctx), vec!["archive.html", "index.html"]);
        assert!(ctx.index_pager().is_none());
    }

    #[test]
    fn failure_skips_later_stages() {
        let temp = tempdir().unwrap();
        let (meta, navs) = site();
        // no archive template: the archive stage fails
        let theme = TemplateTheme::from_sources([("post.html", "post"), ("posts.html", "listing")])
            .unwrap();
        let mut ctx = BuildContext::new(
            temp.path(),
            &theme,
            meta,
            navs,
            posts(2),
            vec![page("about")],
        );

        compile(&mut ctx);

        assert!(matches!(
            ctx.error,
            Some(BuildError::Theme(ThemeError::Template { ref name, .. })) if name == "archive.html"
        ));
        assert_eq!(
            relative(&ctx),
            vec!["post-0.html", "post-1.html", "posts/1.html"]
        );
        assert!(!temp.path().join("about.html").exists());
        assert!(!temp.path().join("index.html").exists());
        assert!(ctx.navs.hovered().is_none());
    }

    #[test]
    fn slugs_and_tags_cannot_escape_destination() {
        let temp = tempdir().unwrap();
        let dst = temp.path().join("public");
        let theme = theme();

        let (meta, navs) = site();
        let mut ctx = BuildContext::new(&dst, &theme, meta, navs, vec![post("../evil", "2021-01-01", "")], vec![]);
        compile(&mut ctx);

        assert!(matches!(ctx.error, Some(BuildError::UnsafePath(ref url)) if url == "/../evil.html"));
        assert!(!temp.path().join("evil.html").exists());

        let (meta, navs) = site();
        let mut ctx = BuildContext::new(&dst, &theme, meta, navs, vec![post("fine", "2021-01-01", "../../escape")], vec![]);
        compile(&mut ctx);

        assert!(matches!(ctx.error, Some(BuildError::UnsafePath(_))));
        assert!(!temp.path().join("escape.html").exists());
        assert!(dst.join("fine.html").is_file());
    }

    #[test]
    fn stage_is_skipped_when_error_already_set() {
        let temp = tempdir().unwrap();
        let theme = theme();
        let (meta, navs) = site();
        let mut ctx = BuildContext::new(temp.path(), &theme, meta, navs, posts(1), vec![]);
        ctx.error = Some(BuildError::AlreadyBuilding);

        compile(&mut ctx);

        assert!(ctx.written.is_empty());
        assert!(matches!(ctx.error, Some(BuildError::AlreadyBuilding)));
    }

    #[test]
    fn render_to_file_truncates_previous_output() {
        let temp = tempdir().unwrap();
        let dest: PathBuf = temp.path().join("nested/dir/out.html");
        let theme = TemplateTheme::from_sources([("t.html", "{{ Title }}")]).unwrap();
        let (meta, navs) = site();

        let long = ViewModel::Index(IndexView {
            site: SiteView::new("a much longer first title".to_string(), &meta, &navs),
            posts: &[],
            pager: None,
        });
        render_to_file(&theme, &long, "t.html", &dest).unwrap();

        let short = ViewModel::Index(IndexView {
            site: SiteView::new("second".to_string(), &meta, &navs),
            posts: &[],
            pager: None,
        });
        render_to_file(&theme, &short, "t.html", &dest).unwrap();

        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "second");
    }

    #[test]
    fn render_to_file_surfaces_theme_errors() {
        let temp = tempdir().unwrap();
        let theme = TemplateTheme::from_sources([("t.html", "{{ Title }}")]).unwrap();
        let (meta, navs) = site();
        let view = ViewModel::Index(IndexView {
            site: SiteView::new(String::new(), &meta, &navs),
            posts: &[],
            pager: None,
        });

        let err = render_to_file(&theme, &view, "missing.html", &temp.path().join("x.html"))
            .unwrap_err();

        assert!(matches!(err, BuildError::Theme(_)));
    }
}
