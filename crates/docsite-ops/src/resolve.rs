use std::ffi::OsString;
use std::path::{Path, PathBuf};

use docsite_config::{is_external, Config};
use percent_encoding::percent_decode_str;
use tracing::trace;

use crate::pages::{normalize_path, route_key, slash_path, Page, PageIndex};

/// Where a link points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    External,
    /// Index into the page table.
    Page(usize),
    /// A file reached through an alias or a relative path that is not a page.
    File(PathBuf),
    Unresolved,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
    pub target: LinkTarget,
    /// Percent-decoded anchor fragment, if the link carried one.
    pub fragment: Option<String>,
}

impl ResolvedLink {
    fn new(target: LinkTarget, fragment: Option<String>) -> Self {
        ResolvedLink { target, fragment }
    }
}

/// Resolves link targets the way the published site would serve them.
pub struct Resolver<'a> {
    config: &'a Config,
    pages: &'a PageIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a Config, pages: &'a PageIndex) -> Self {
        Resolver { config, pages }
    }

    /// Resolve `target` as written in `from`, or as a site-absolute link when
    /// `from` is `None` (sidebar entries).
    pub fn resolve(&self, from: Option<&Page>, target: &str) -> ResolvedLink {
        let target = target.trim();
        if is_external(target) {
            return ResolvedLink::new(LinkTarget::External, None);
        }

        let (path, fragment) = split_link_target(target);
        let fragment = fragment.map(normalize_fragment).filter(|value| !value.is_empty());
        let path = strip_query(path);
        let path = percent_decode_str(path).decode_utf8_lossy();

        let resolved = if path.is_empty() {
            from.and_then(|page| self.pages.position_by_source(&page.source))
                .map(LinkTarget::Page)
                .unwrap_or(LinkTarget::Unresolved)
        } else if path.starts_with('/') {
            self.resolve_absolute(&path)
        } else if let Some(page) = from {
            self.resolve_relative(page, &path)
        } else {
            LinkTarget::Unresolved
        };

        trace!(link = target, resolved = ?resolved, "resolved link");
        ResolvedLink::new(resolved, fragment)
    }

    fn resolve_absolute(&self, path: &str) -> LinkTarget {
        let stripped = self.strip_base(path);

        for alias in &self.config.aliases {
            if let Some(replacement) = alias.apply(&stripped) {
                let candidate = self
                    .config
                    .project
                    .root
                    .join(replacement.trim_start_matches('/'));
                if let Some(file) = existing_file(&normalize_path(candidate)) {
                    return LinkTarget::File(file);
                }
            }
        }

        let key = route_key(&stripped);
        self.pages
            .position_by_key(&key)
            .or_else(|| self.pages.position_by_key(&format!("{key}/index")))
            .map(LinkTarget::Page)
            .unwrap_or(LinkTarget::Unresolved)
    }

    fn resolve_relative(&self, page: &Page, path: &str) -> LinkTarget {
        let source_dir = Path::new(&page.source)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let joined = slash_path(&normalize_path(source_dir.join(path)));

        let candidates = if path.ends_with('/') {
            vec![join_index(&joined)]
        } else if let Some(stem) = joined.strip_suffix(".html") {
            vec![format!("{stem}.md"), format!("{stem}.markdown")]
        } else if joined.ends_with(".md") || joined.ends_with(".markdown") {
            vec![joined.clone()]
        } else {
            vec![
                joined.clone(),
                format!("{joined}.md"),
                format!("{joined}.markdown"),
                join_index(&joined),
            ]
        };

        if let Some(idx) = candidates
            .iter()
            .find_map(|candidate| self.pages.position_by_source(candidate))
        {
            return LinkTarget::Page(idx);
        }

        let page_dir = page.absolute.parent().unwrap_or(Path::new("."));
        let on_disk = normalize_path(page_dir.join(path));
        if on_disk.exists() {
            LinkTarget::File(on_disk)
        } else {
            LinkTarget::Unresolved
        }
    }

    fn strip_base(&self, path: &str) -> String {
        let base = self.config.site.base.as_str();
        if base == "/" {
            return path.to_string();
        }
        if let Some(rest) = path.strip_prefix(base) {
            format!("/{rest}")
        } else if path == base.trim_end_matches('/') {
            "/".to_string()
        } else {
            path.to_string()
        }
    }
}

/// Split a link target into its path and optional anchor components.
pub fn split_link_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((path, anchor)) => (path, Some(anchor)),
        None => (target, None),
    }
}

/// Decode percent-encoding and trim surrounding whitespace.
pub fn normalize_fragment(fragment: &str) -> String {
    percent_decode_str(fragment)
        .decode_utf8_lossy()
        .trim()
        .to_string()
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map(|(head, _)| head).unwrap_or(path)
}

fn join_index(dir: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        "index.md".to_string()
    } else {
        format!("{dir}/index.md")
    }
}

fn existing_file(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }

    let mut with_extension = OsString::from(candidate.as_os_str());
    with_extension.push(".md");
    let with_extension = PathBuf::from(with_extension);
    if with_extension.is_file() {
        return Some(with_extension);
    }

    let index = candidate.join("index.md");
    index.is_file().then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_targets_into_path_and_fragment() {
        assert_eq!(split_link_target("guide.md#setup"), ("guide.md", Some("setup")));
        assert_eq!(split_link_target("#setup"), ("", Some("setup")));
        assert_eq!(split_link_target("/guide"), ("/guide", None));
    }

    #[test]
    fn fragments_are_percent_decoded() {
        assert_eq!(normalize_fragment("caf%C3%A9 "), "café");
    }

    #[test]
    fn index_paths_are_joined_without_double_slashes() {
        assert_eq!(join_index("guide/"), "guide/index.md");
        assert_eq!(join_index(""), "index.md");
    }

    #[test]
    fn queries_are_ignored() {
        assert_eq!(strip_query("/guide?tab=1"), "/guide");
    }
}
