//! Scaffold a new site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use inkpress_static::templates::DEFAULT_TEMPLATES;

use crate::config::CONFIG_FILE;

/// Run the init command in `root`. Existing files are kept unless `yes` is set.
pub fn run(root: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing inkpress site in {}", root.display());

    let mut files: Vec<(String, &str)> = vec![
        (CONFIG_FILE.to_string(), DEFAULT_CONFIG),
        ("source/meta.md".to_string(), DEFAULT_META),
        ("source/post/hello-world.md".to_string(), DEFAULT_POST),
        ("source/page/about.md".to_string(), DEFAULT_ABOUT),
    ];
    files.extend(
        DEFAULT_TEMPLATES
            .iter()
            .map(|(name, source)| (format!("template/{name}"), *source)),
    );

    let mut skipped = 0;
    for (rel, content) in &files {
        let path = root.join(rel);
        if path.exists() && !yes {
            tracing::warn!("{} already exists. Use --yes to overwrite.", rel);
            skipped += 1;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {rel}"))?;
        tracing::info!("Created {}", rel);
    }

    tracing::info!(
        "Initialization complete ({} files written, {} kept)",
        files.len() - skipped,
        skipped
    );
    tracing::info!("Run 'inkpress watch' to build and rebuild on change.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Inkpress Configuration

[source]
# Directory holding meta.md, post/ and page/
dir = "source"

[theme]
# Template directory
dir = "template"

[build]
# Output directory for the built site
output = "public"

# Posts per listing page
page_size = 4
"#;

const DEFAULT_META: &str = r#"-----ini
[meta]
title = My Inkpress Blog
subtitle = Notes and writing
keyword = blog,inkpress
desc = A blog built with inkpress
domain = http://localhost
root = /

[nav]
home = Home
archive = Archive
about = About

[nav.home]
link = /
"#;

const DEFAULT_POST: &str = r#"-----ini
title = Hello World
slug = hello-world
date = 2024-01-01 09:00
tags = inkpress,welcome
author = inkpress
-----markdown
Welcome to **inkpress**. Each document is a run of blocks: an `ini` block of
metadata followed by a content block.

<!--more-->

## Writing posts

Add markdown files under `source/post/`, then run `inkpress build`.
"#;

const DEFAULT_ABOUT: &str = r#"-----ini
title = About
slug = about
hover = about
-----markdown
# About

This page lives in `source/page/about.md`.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use inkpress_static::{BuildConfig, StaticBuilder};
    use tempfile::tempdir;

    #[test]
    fn scaffolds_a_buildable_site() {
        let temp = tempdir().unwrap();

        run(temp.path(), false).unwrap();

        assert!(temp.path().join(CONFIG_FILE).is_file());
        assert!(temp.path().join("template/post.html").is_file());

        let builder = StaticBuilder::new(BuildConfig {
            source_dir: temp.path().join("source"),
            template_dir: temp.path().join("template"),
            output_dir: temp.path().join("public"),
            page_size: 4,
        });
        let result = builder.build().unwrap();

        assert_eq!((result.posts, result.pages, result.tags), (1, 1, 2));
        assert!(temp.path().join("public/hello-world.html").is_file());
        assert!(temp.path().join("public/tags/welcome.html").is_file());
    }

    #[test]
    fn keeps_existing_files_without_yes() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "# mine\n").unwrap();

        run(temp.path(), false).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join(CONFIG_FILE)).unwrap(),
            "# mine\n"
        );

        run(temp.path(), true).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join(CONFIG_FILE)).unwrap(),
            DEFAULT_CONFIG
        );
    }
}
