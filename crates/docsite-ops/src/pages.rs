use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use docsite_config::Config;
use ignore::WalkBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::OperationError;

/// A markdown file under the source directory and the route it is served at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Path relative to the source directory, `/`-separated.
    pub source: String,
    pub absolute: PathBuf,
    /// Source path after rewrites, still carrying its `.md` extension.
    pub published: String,
    pub route: String,
}

/// Every discovered page, addressable by source path or route key.
#[derive(Clone, Debug, Default)]
pub struct PageIndex {
    pages: Vec<Page>,
    by_source: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
}

impl PageIndex {
    pub fn from_pages(mut pages: Vec<Page>) -> Self {
        pages.sort_by(|a, b| a.source.cmp(&b.source));
        let mut by_source = HashMap::new();
        let mut by_key = HashMap::new();
        for (idx, page) in pages.iter().enumerate() {
            by_source.insert(page.source.clone(), idx);
            by_key.entry(route_key(&page.published)).or_insert(idx);
        }
        PageIndex {
            pages,
            by_source,
            by_key,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Page> {
        self.pages.get(idx)
    }

    pub fn position_by_source(&self, source: &str) -> Option<usize> {
        self.by_source.get(source).copied()
    }

    pub fn position_by_key(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }
}

/// Walk the source directory and collect in-scope markdown pages.
pub fn discover(config: &Config) -> Result<PageIndex, OperationError> {
    let src_dir = &config.site.src_dir;
    if !src_dir.is_dir() {
        return Err(OperationError::InvalidInput(format!(
            "source directory {} does not exist",
            src_dir.display()
        )));
    }

    let out_dir = config.site.out_dir.clone();
    let mut pages = Vec::new();
    let walker = WalkBuilder::new(src_dir)
        .filter_entry(move |entry| entry.path() != out_dir.as_path())
        .build();

    for entry in walker {
        let entry = entry.map_err(|source| OperationError::Walk {
            path: src_dir.clone(),
            source,
        })?;
        if !entry.file_type().is_some_and(|kind| kind.is_file()) {
            continue;
        }

        let absolute = entry.path();
        let Ok(relative) = absolute.strip_prefix(src_dir) else {
            continue;
        };
        if !is_markdown(relative) || !config.source.is_in_scope(relative) {
            debug!(path = %relative.display(), "skipping out-of-scope file");
            continue;
        }

        let source = slash_path(relative);
        let published = published_path(config, &source);
        pages.push(Page {
            route: route_for(config, &published),
            source,
            absolute: absolute.to_path_buf(),
            published,
        });
    }

    info!(count = pages.len(), src_dir = %src_dir.display(), "discovered pages");
    Ok(PageIndex::from_pages(pages))
}

/// Apply the first matching rewrite to a source path.
pub fn published_path(config: &Config, source: &str) -> String {
    config
        .rewrites
        .iter()
        .find_map(|rule| rule.apply(source))
        .unwrap_or_else(|| source.to_string())
}

/// URL a published path is served at, including the site base.
pub fn route_for(config: &Config, published: &str) -> String {
    let stem = strip_markdown_ext(published);
    let path = if stem == "index" {
        String::new()
    } else if let Some(dir) = stem.strip_suffix("/index") {
        format!("{dir}/")
    } else if config.site.clean_urls {
        stem.to_string()
    } else {
        format!("{stem}.html")
    };
    format!("{}{}", config.site.base, path)
}

/// Lookup key for a published path: extension removed, directory routes
/// spelled out as `<dir>/index`.
pub fn route_key(published: &str) -> String {
    let trimmed = published.trim_start_matches('/');
    let stem = match strip_markdown_ext(trimmed) {
        stem if stem.len() < trimmed.len() => stem,
        _ => trimmed.strip_suffix(".html").unwrap_or(trimmed),
    };
    if stem.is_empty() {
        "index".to_string()
    } else if stem.ends_with('/') {
        format!("{stem}index")
    } else {
        stem.to_string()
    }
}

/// Drop a trailing `.md` or `.markdown`, ignoring ASCII case.
pub(crate) fn strip_markdown_ext(path: &str) -> &str {
    [".markdown", ".md"]
        .iter()
        .find_map(|ext| {
            let split = path.len().checked_sub(ext.len())?;
            path.get(split..)
                .filter(|tail| tail.eq_ignore_ascii_case(ext))?;
            path.get(..split)
        })
        .unwrap_or(path)
}

pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

/// Render a relative path with `/` separators regardless of platform.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonicalise `.` and `..` path segments without touching the filesystem.
pub(crate) fn normalize_path(path: PathBuf) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
