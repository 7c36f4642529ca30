//! Theme capability: named templates executed against a view model.

use std::path::{Path, PathBuf};

use minijinja::{path_loader, Environment, ErrorKind};

use crate::view::ViewModel;

/// Errors from loading or executing templates.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Template directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("Failed to render template {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// What the build pipeline needs from a template engine.
pub trait Theme {
    /// Execute template `name` against `view`.
    fn execute(&self, name: &str, view: &ViewModel<'_>) -> Result<String, ThemeError>;

    /// Whether the theme provides a template called `name`.
    fn has_template(&self, name: &str) -> bool;
}

/// Theme backed by minijinja.
pub struct TemplateTheme {
    env: Environment<'static>,
}

impl TemplateTheme {
    /// Load templates lazily from `dir`; names are paths relative to it.
    pub fn load(dir: &Path) -> Result<Self, ThemeError> {
        if !dir.is_dir() {
            return Err(ThemeError::MissingDir(dir.to_path_buf()));
        }
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        tracing::debug!("Loading templates from {}", dir.display());
        Ok(Self { env })
    }

    /// Build a theme from in-memory `(name, source)` pairs.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ThemeError> {
        let mut env = Environment::new();
        for (name, source) in sources {
            env.add_template_owned(name.to_string(), source.to_string())
                .map_err(|source| ThemeError::Template {
                    name: name.to_string(),
                    source,
                })?;
        }
        Ok(Self { env })
    }

    /// The default theme shipped with inkpress.
    pub fn builtin() -> Result<Self, ThemeError> {
        Self::from_sources(DEFAULT_TEMPLATES.iter().copied())
    }
}

impl Theme for TemplateTheme {
    fn execute(&self, name: &str, view: &ViewModel<'_>) -> Result<String, ThemeError> {
        let to_error = |source| ThemeError::Template {
            name: name.to_string(),
            source,
        };
        let tmpl = self.env.get_template(name).map_err(to_error)?;
        tmpl.render(view).map_err(to_error)
    }

    fn has_template(&self, name: &str) -> bool {
        match self.env.get_template(name) {
            Ok(_) => true,
            // a broken template still exists; rendering it reports the error
            Err(e) => e.kind() != ErrorKind::TemplateNotFound,
        }
    }
}

/// Default theme templates, written out by `inkpress init`.
pub const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", BASE_TEMPLATE),
    ("nav.html", NAV_TEMPLATE),
    ("post.html", POST_TEMPLATE),
    ("posts.html", POSTS_TEMPLATE),
    ("archive.html", ARCHIVE_TEMPLATE),
    ("page.html", PAGE_TEMPLATE),
];

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ Title }}</title>
  {% if Desc %}<meta name="description" content="{{ Desc }}">{% endif %}
  {% if Meta.Keyword %}<meta name="keywords" content="{{ Meta.Keyword }}">{% endif %}
</head>
<body>
  <header class="header">
    <a href="/" class="logo">{{ Meta.Title }}</a>
    {% if Meta.Subtitle %}<span class="subtitle">{{ Meta.Subtitle }}</span>{% endif %}
    {% include "nav.html" %}
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
</body>
</html>"##;

const NAV_TEMPLATE: &str = r##"<ul class="nav-list">
{% for item in Navs %}
  <li class="nav-item{% if item.IsHover %} active{% endif %}">
    <a href="{{ item.Link }}"{% if item.Blank %} target="_blank"{% endif %}>{{ item.Title }}</a>
  </li>
{% endfor %}
</ul>"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="post">
  <h1><a href="{{ Post.Url }}">{{ Post.Title }}</a></h1>
  <p class="meta">
    <time datetime="{{ Post.Created.Iso }}">{{ Post.Created.Date }}</time>
    {% if Post.Author.Name %} by {{ Post.Author.Name }}{% endif %}
  </p>
  <div class="content">
    {{ Post.Content | safe }}
  </div>
  {% if Post.Tags %}
  <ul class="tags">
  {% for tag in Post.Tags %}
    <li><a href="{{ tag.Url }}">{{ tag.Name }}</a></li>
  {% endfor %}
  </ul>
  {% endif %}
</article>
{% endblock %}"##;

const POSTS_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
{% if Tag %}<h1 class="tag-title">{{ Tag.Name }}</h1>{% endif %}
{% for post in Posts %}
<article class="post-preview">
  <h2><a href="{{ post.Url }}">{{ post.Title }}</a></h2>
  <time datetime="{{ post.Created.Iso }}">{{ post.Created.Date }}</time>
  <div class="preview">
    {{ post.Preview | safe }}
  </div>
</article>
{% endfor %}
{% if Pager %}
<nav class="pager">
  {% if Pager.PrevUrl %}<a class="prev" href="{{ Pager.PrevUrl }}">Newer</a>{% endif %}
  <span class="current">{{ Pager.Page }}</span>
  {% if Pager.NextUrl %}<a class="next" href="{{ Pager.NextUrl }}">Older</a>{% endif %}
</nav>
{% endif %}
{% endblock %}"##;

const ARCHIVE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="archive">
{% for archive in Archives %}
  <h2>{{ archive.Year }}</h2>
  {% for month in archive.Months %}
  <h3>{{ month.Month }}</h3>
  <ul>
    {% for post in month.Posts %}
    <li><a href="{{ post.Url }}">{{ post.Title }}</a></li>
    {% endfor %}
  </ul>
  {% endfor %}
{% endfor %}
</section>
{% endblock %}"##;

const PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="page">
  <h1>{{ Page.Title }}</h1>
  <div class="content">
    {{ Page.Content | safe }}
  </div>
</article>
{% endblock %}"##;
