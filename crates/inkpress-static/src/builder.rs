//! Static site builder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use inkpress_blocks::{Block, ParseError, ParserSet};
use walkdir::WalkDir;

use crate::compile::compile;
use crate::context::{BuildContext, DEFAULT_PAGE_SIZE};
use crate::model::{ModelError, Page, Post, SiteMeta, SourceFile};
use crate::nav::NavGroup;
use crate::state::BuildState;
use crate::templates::{TemplateTheme, ThemeError};

/// Site metadata document, relative to the source directory.
pub const META_FILE: &str = "meta.md";

/// Posts directory, relative to the source directory.
pub const POST_DIR: &str = "post";

/// Pages directory, relative to the source directory.
pub const PAGE_DIR: &str = "page";

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source documents directory
    pub source_dir: PathBuf,

    /// Theme templates directory
    pub template_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Posts per listing page
    pub page_size: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("source"),
            template_dir: PathBuf::from("template"),
            output_dir: PathBuf::from("public"),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    pub posts: usize,
    pub pages: usize,
    pub tags: usize,

    /// Number of listing pages generated
    pub listing_pages: usize,

    /// Number of files written
    pub files: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Source directory not found: {0}")]
    MissingSource(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Invalid document {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Output URL {0:?} escapes the destination directory")]
    UnsafePath(String),

    #[error("A build is already running")]
    AlreadyBuilding,
}

/// Static site builder.
///
/// Owns the block grammars and the build-state guard, so every caller that shares
/// one builder is serialized through the same `Idle -> Building -> Idle` machine.
pub struct StaticBuilder {
    config: BuildConfig,
    parsers: ParserSet,
    state: BuildState,
}

impl StaticBuilder {
    /// Create a builder using the default rule and fence grammars.
    pub fn new(config: BuildConfig) -> Self {
        Self::with_parsers(config, ParserSet::default())
    }

    pub fn with_parsers(config: BuildConfig, parsers: ParserSet) -> Self {
        Self {
            config,
            parsers,
            state: BuildState::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn is_building(&self) -> bool {
        self.state.is_building()
    }

    /// Build the site, failing with [`BuildError::AlreadyBuilding`] if another
    /// build on this builder is still running.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let Some(_guard) = self.state.try_begin() else {
            return Err(BuildError::AlreadyBuilding);
        };
        let start = Instant::now();

        let source_dir = &self.config.source_dir;
        if !source_dir.is_dir() {
            return Err(BuildError::MissingSource(source_dir.clone()));
        }

        let theme = self.load_theme()?;
        let (site, navs) = self.load_site()?;
        let mut posts = self.load_dir(&source_dir.join(POST_DIR), Post::from_blocks)?;
        let pages = self.load_dir(&source_dir.join(PAGE_DIR), Page::from_blocks)?;
        posts.sort_by(|a, b| b.doc.created.cmp(&a.doc.created));

        tracing::info!(
            "Loaded {} posts and {} pages from {}",
            posts.len(),
            pages.len(),
            source_dir.display()
        );

        fs::create_dir_all(&self.config.output_dir).map_err(|source| BuildError::Write {
            path: self.config.output_dir.clone(),
            source,
        })?;

        let mut ctx = BuildContext::new(&self.config.output_dir, &theme, site, navs, posts, pages)
            .with_page_size(self.config.page_size);
        compile(&mut ctx);

        if let Some(e) = ctx.error {
            return Err(e);
        }

        Ok(BuildResult {
            posts: ctx.posts.len(),
            pages: ctx.pages.len(),
            tags: ctx.tags.len(),
            listing_pages: ctx.post_page_count,
            files: ctx.written.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    fn load_theme(&self) -> Result<TemplateTheme, BuildError> {
        let dir = &self.config.template_dir;
        if dir.is_dir() {
            return Ok(TemplateTheme::load(dir)?);
        }
        tracing::warn!(
            "Template directory {} not found, using the built-in theme",
            dir.display()
        );
        Ok(TemplateTheme::builtin()?)
    }

    fn load_site(&self) -> Result<(SiteMeta, NavGroup), BuildError> {
        let path = self.config.source_dir.join(META_FILE);
        if !path.is_file() {
            tracing::warn!("{} not found, using empty site metadata", path.display());
            return Ok((SiteMeta::default(), NavGroup::default()));
        }

        let blocks = self.read_blocks(&path)?;
        SiteMeta::from_blocks(&blocks).map_err(|source| BuildError::Model { path, source })
    }

    /// Load every `.md` file under `dir` in file-name order.
    fn load_dir<T>(
        &self,
        dir: &Path,
        build: fn(&[Block], &SourceFile) -> Result<T, ModelError>,
    ) -> Result<Vec<T>, BuildError> {
        let mut items = Vec::new();
        if !dir.is_dir() {
            tracing::debug!("Skipping missing directory {}", dir.display());
            return Ok(items);
        }

        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| BuildError::Read {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }

            let file = SourceFile::from_path(path).map_err(|source| BuildError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let blocks = self.read_blocks(path)?;
            let item = build(&blocks, &file).map_err(|source| BuildError::Model {
                path: path.to_path_buf(),
                source,
            })?;
            items.push(item);
        }
        Ok(items)
    }

    fn read_blocks(&self, path: &Path) -> Result<Vec<Block>, BuildError> {
        let bytes = fs::read(path).map_err(|source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parsers.parse(&bytes).map_err(|source| BuildError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
