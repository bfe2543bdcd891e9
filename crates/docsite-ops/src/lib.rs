//! Site-level operations for the docsite toolkit: page discovery, heading
//! anchors, route tables and link checking.

mod check;
mod pages;
mod render;
mod resolve;

use std::io;
use std::path::{Path, PathBuf};

use docsite_config::{CheckRule, Config};
use docsite_parser::parse_path;
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::info;

pub use pages::{discover, published_path, route_for, route_key, Page, PageIndex};
pub use render::OutputFormat;
pub use resolve::{LinkTarget, ResolvedLink, Resolver};

/// Errors surfaced by the operation layer.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
    #[error("{0}")]
    InvalidInput(String),
    #[error("failed to serialise output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Operation bundle the CLI hooks into.
pub struct Operations {
    config: Config,
}

/// Options for listing heading anchors.
#[derive(Clone, Debug, Default)]
pub struct AnchorsOptions {
    /// Restrict output to pages under these paths (relative to the project
    /// root). Empty means every page.
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
}

#[derive(Clone, Debug, Default)]
pub struct RoutesOptions {
    pub format: OutputFormat,
}

#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
}

/// Headings of one page with the anchors the site renders for them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageAnchors {
    pub source: String,
    pub route: String,
    pub headings: Vec<AnchorEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnchorEntry {
    pub level: u8,
    pub text: String,
    pub anchor: Option<String>,
    pub line: usize,
    /// `route#anchor`, present when permalinks are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

#[derive(Debug)]
pub struct AnchorsOutcome {
    pub pages: Vec<PageAnchors>,
    pub rendered: String,
}

/// A sidebar item and where its link leads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub group: String,
    pub text: String,
    pub link: Option<String>,
    /// Route or file the link resolves to; `None` when it resolves nowhere.
    pub resolved: Option<String>,
}

#[derive(Debug)]
pub struct RoutesOutcome {
    pub pages: Vec<Page>,
    pub sidebar: Vec<SidebarEntry>,
    pub rendered: String,
}

/// Single problem reported by `check`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Finding {
    #[serde(serialize_with = "serialize_rule")]
    pub rule: CheckRule,
    /// Path relative to the project root.
    pub path: PathBuf,
    pub line: Option<usize>,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
    pub pages_checked: usize,
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub report: CheckReport,
    pub rendered: String,
    pub exit_code: i32,
}

impl Operations {
    pub fn new(config: Config) -> Self {
        Operations { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover the site's pages.
    pub fn pages(&self) -> Result<PageIndex, OperationError> {
        discover(&self.config)
    }

    /// List every anchored heading, page by page.
    pub fn anchors(&self, options: AnchorsOptions) -> Result<AnchorsOutcome, OperationError> {
        let index = self.pages()?;
        let selected = self.select_pages(&index, &options.paths)?;
        let settings = self.config.markdown.anchor;

        let pages = selected
            .par_iter()
            .map(|&idx| {
                let page = &index.pages()[idx];
                let document =
                    parse_path(&page.absolute, &settings).map_err(|source| OperationError::Io {
                        path: page.absolute.clone(),
                        source,
                    })?;

                let headings = document
                    .headings
                    .into_iter()
                    .map(|heading| AnchorEntry {
                        permalink: heading
                            .anchor
                            .as_ref()
                            .filter(|_| settings.permalink)
                            .map(|anchor| format!("{}#{}", page.route, anchor)),
                        level: heading.level,
                        text: heading.text,
                        anchor: heading.anchor,
                        line: heading.line,
                    })
                    .collect();

                Ok(PageAnchors {
                    source: page.source.clone(),
                    route: page.route.clone(),
                    headings,
                })
            })
            .collect::<Result<Vec<_>, OperationError>>()?;

        let rendered = render::render_anchors(&pages, options.format)?;
        Ok(AnchorsOutcome { pages, rendered })
    }

    /// Route table for every page, plus the sidebar's resolution.
    pub fn routes(&self, options: RoutesOptions) -> Result<RoutesOutcome, OperationError> {
        let index = self.pages()?;
        let resolver = Resolver::new(&self.config, &index);

        let mut sidebar = Vec::new();
        for group in &self.config.sidebar {
            for item in group.flatten() {
                let resolved = item
                    .link
                    .as_deref()
                    .and_then(|link| self.describe_target(&index, &resolver.resolve(None, link), link));
                sidebar.push(SidebarEntry {
                    group: group.text.clone(),
                    text: item.text.clone(),
                    link: item.link.clone(),
                    resolved,
                });
            }
        }

        let pages = index.pages().to_vec();
        let rendered = render::render_routes(&pages, &sidebar, options.format)?;
        Ok(RoutesOutcome {
            pages,
            sidebar,
            rendered,
        })
    }

    /// Run the enabled check rules.
    pub fn check(&self, options: CheckOptions) -> Result<CheckOutcome, OperationError> {
        let index = self.pages()?;
        let targets = self.select_pages(&index, &options.paths)?;

        let report = check::run(check::CheckRunInput {
            config: &self.config,
            pages: &index,
            targets: &targets,
            include_sidebar: options.paths.is_empty(),
        })?;

        info!(
            findings = report.findings.len(),
            pages = report.pages_checked,
            "check complete"
        );

        let rendered = render::render_check(&report, options.format)?;
        let exit_code = if report.findings.is_empty() { 0 } else { 1 };
        Ok(CheckOutcome {
            report,
            rendered,
            exit_code,
        })
    }

    fn select_pages(
        &self,
        index: &PageIndex,
        paths: &[PathBuf],
    ) -> Result<Vec<usize>, OperationError> {
        if paths.is_empty() {
            return Ok((0..index.len()).collect());
        }

        let root = &self.config.project.root;
        let prefixes: Vec<PathBuf> = paths
            .iter()
            .map(|path| pages::normalize_path(root.join(path)))
            .collect();

        let selected: Vec<usize> = index
            .pages()
            .iter()
            .enumerate()
            .filter(|(_, page)| prefixes.iter().any(|prefix| page.absolute.starts_with(prefix)))
            .map(|(idx, _)| idx)
            .collect();

        if selected.is_empty() {
            let listed = paths
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(OperationError::InvalidInput(format!(
                "no pages found under {listed}"
            )));
        }
        Ok(selected)
    }

    fn describe_target(
        &self,
        index: &PageIndex,
        resolved: &ResolvedLink,
        link: &str,
    ) -> Option<String> {
        let base = match &resolved.target {
            LinkTarget::External => return Some(link.to_string()),
            LinkTarget::Page(idx) => index.get(*idx)?.route.clone(),
            LinkTarget::File(path) => display_relative(&self.config.project.root, path),
            LinkTarget::Unresolved => return None,
        };
        Some(match &resolved.fragment {
            Some(fragment) => format!("{base}#{fragment}"),
            None => base,
        })
    }
}

pub(crate) fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(pages::slash_path)
        .unwrap_or_else(|_| path.display().to_string())
}

fn serialize_rule<S>(rule: &CheckRule, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(rule.as_str())
}
