//! Static site generator core for inkpress.
//!
//! Turns parsed source documents into a tree of HTML files through an ordered,
//! fail-fast sequence of render stages.

pub mod builder;
pub mod compile;
pub mod context;
pub mod markdown;
pub mod model;
pub mod nav;
pub mod pager;
pub mod state;
pub mod templates;
pub mod view;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use compile::{compile, render_to_file};
pub use context::BuildContext;
pub use model::{Archive, Page, Post, SiteMeta, SourceFile, Tag, TagIndex};
pub use nav::{Nav, NavGroup};
pub use pager::{Cursor, Pager};
pub use state::{BuildGuard, BuildState};
pub use templates::{TemplateTheme, Theme, ThemeError};
pub use view::ViewModel;

#[cfg(test)]
pub(crate) mod test_helpers;
