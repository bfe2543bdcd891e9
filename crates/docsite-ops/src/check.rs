use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use docsite_config::{AnchorSettings, CheckRule, Config, CONFIG_FILE_NAME};
use docsite_parser::{parse_path, Document};
use rayon::prelude::*;
use strsim::normalized_levenshtein;
use tracing::{debug, warn};

use crate::pages::{is_markdown, Page, PageIndex};
use crate::resolve::{LinkTarget, Resolver};
use crate::{display_relative, CheckReport, Finding, OperationError};

/// Input bundle for executing check rules.
pub(crate) struct CheckRunInput<'a> {
    pub config: &'a Config,
    pub pages: &'a PageIndex,
    /// Pages whose links and headings are checked.
    pub targets: &'a [usize],
    pub include_sidebar: bool,
}

pub(crate) fn run(input: CheckRunInput<'_>) -> Result<CheckReport, OperationError> {
    let rules = &input.config.check.rules;
    let documents = parse_pages(input.pages, &input.config.markdown.anchor)?;

    let environment = CheckEnvironment {
        config: input.config,
        pages: input.pages,
        documents: &documents,
        resolver: Resolver::new(input.config, input.pages),
        file_anchors: FileAnchorCache::default(),
    };

    let active: Vec<ActiveRule> = rules
        .iter()
        .filter_map(|rule| {
            page_executor(*rule).map(|executor| ActiveRule {
                rule: *rule,
                executor,
            })
        })
        .collect();

    let mut findings: Vec<Finding> = input
        .targets
        .par_iter()
        .map(|&idx| process_page(idx, &active, &environment))
        .reduce(Vec::new, |mut acc, mut next| {
            acc.append(&mut next);
            acc
        });

    if input.include_sidebar && rules.contains(&CheckRule::SidebarLinks) {
        findings.extend(evaluate_sidebar(&environment));
    }

    findings.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.rule.as_str().cmp(b.rule.as_str()))
    });

    Ok(CheckReport {
        findings,
        pages_checked: input.targets.len(),
    })
}

fn parse_pages(
    pages: &PageIndex,
    settings: &AnchorSettings,
) -> Result<Vec<Document>, OperationError> {
    pages
        .pages()
        .par_iter()
        .map(|page| {
            parse_path(&page.absolute, settings).map_err(|source| OperationError::Io {
                path: page.absolute.clone(),
                source,
            })
        })
        .collect()
}

type RuleExecutor = fn(&PageSnapshot<'_>, &CheckEnvironment<'_>) -> Vec<RuleFinding>;

struct ActiveRule {
    rule: CheckRule,
    executor: RuleExecutor,
}

/// Per-page executor; sidebar links are checked once per run instead.
fn page_executor(rule: CheckRule) -> Option<RuleExecutor> {
    match rule {
        CheckRule::BrokenLinks => Some(evaluate_broken_links as RuleExecutor),
        CheckRule::BrokenAnchors => Some(evaluate_broken_anchors as RuleExecutor),
        CheckRule::DuplicateAnchors => Some(evaluate_duplicate_anchors as RuleExecutor),
        CheckRule::SidebarLinks => None,
    }
}

struct RuleFinding {
    line: usize,
    message: String,
}

struct PageSnapshot<'a> {
    page: &'a Page,
    document: &'a Document,
}

struct CheckEnvironment<'a> {
    config: &'a Config,
    pages: &'a PageIndex,
    documents: &'a [Document],
    resolver: Resolver<'a>,
    file_anchors: FileAnchorCache,
}

impl CheckEnvironment<'_> {
    /// Anchors available at a resolved target, or `None` when they cannot
    /// be known (external links, non-markdown files).
    fn anchors_at(&self, target: &LinkTarget) -> Option<Vec<String>> {
        match target {
            LinkTarget::Page(idx) => self
                .documents
                .get(*idx)
                .map(|document| document.anchors().map(str::to_string).collect()),
            LinkTarget::File(path) if is_markdown(path) => self
                .file_anchors
                .anchors_for(path, &self.config.markdown.anchor),
            _ => None,
        }
    }
}

/// Anchors of markdown files outside the page table, reached via aliases.
#[derive(Default)]
struct FileAnchorCache {
    inner: Mutex<HashMap<PathBuf, Option<Vec<String>>>>,
}

impl FileAnchorCache {
    fn anchors_for(&self, path: &Path, settings: &AnchorSettings) -> Option<Vec<String>> {
        if let Some(cached) = self.lock().get(path) {
            return cached.clone();
        }

        let anchors = match parse_path(path, settings) {
            Ok(document) => Some(document.anchors().map(str::to_string).collect()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read link target");
                None
            }
        };
        self.lock().insert(path.to_path_buf(), anchors.clone());
        anchors
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Option<Vec<String>>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn process_page(idx: usize, rules: &[ActiveRule], env: &CheckEnvironment<'_>) -> Vec<Finding> {
    let (Some(page), Some(document)) = (env.pages.get(idx), env.documents.get(idx)) else {
        return Vec::new();
    };
    let snapshot = PageSnapshot { page, document };
    let path = PathBuf::from(display_relative(&env.config.project.root, &page.absolute));

    let mut results = Vec::new();
    for active in rules {
        for finding in (active.executor)(&snapshot, env) {
            results.push(Finding {
                rule: active.rule,
                path: path.clone(),
                line: Some(finding.line),
                message: finding.message,
            });
        }
    }

    debug!(page = %page.source, findings = results.len(), "checked page");
    results
}

fn evaluate_broken_links(snapshot: &PageSnapshot<'_>, env: &CheckEnvironment<'_>) -> Vec<RuleFinding> {
    snapshot
        .document
        .links
        .iter()
        .filter(|link| !link.target.trim().is_empty())
        .filter(|link| {
            env.resolver.resolve(Some(snapshot.page), &link.target).target
                == LinkTarget::Unresolved
        })
        .map(|link| RuleFinding {
            line: link.line,
            message: format!("Broken link to '{}'", link.target),
        })
        .collect()
}

fn evaluate_broken_anchors(
    snapshot: &PageSnapshot<'_>,
    env: &CheckEnvironment<'_>,
) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    for link in &snapshot.document.links {
        let resolved = env.resolver.resolve(Some(snapshot.page), &link.target);
        let Some(fragment) = resolved.fragment.as_deref() else {
            continue;
        };
        let Some(anchors) = env.anchors_at(&resolved.target) else {
            continue;
        };

        if !anchors.iter().any(|anchor| anchor == fragment) {
            findings.push(RuleFinding {
                line: link.line,
                message: anchor_missing_message(fragment, &link.target, &anchors),
            });
        }
    }
    findings
}

fn evaluate_duplicate_anchors(
    snapshot: &PageSnapshot<'_>,
    _env: &CheckEnvironment<'_>,
) -> Vec<RuleFinding> {
    let headings = &snapshot.document.headings;
    headings
        .iter()
        .filter(|heading| heading.explicit_id_collided())
        .filter_map(|heading| {
            let requested = heading.explicit_id.as_deref()?.trim();
            let served = heading.anchor.as_deref()?;
            let first = headings
                .iter()
                .find(|other| other.anchor.as_deref() == Some(requested))
                .map(|other| other.line);
            let message = match first {
                Some(line) => format!(
                    "Duplicate anchor '{requested}' (first defined at line {line}); served as '#{served}'"
                ),
                None => format!("Duplicate anchor '{requested}'; served as '#{served}'"),
            };
            Some(RuleFinding {
                line: heading.line,
                message,
            })
        })
        .collect()
}

fn evaluate_sidebar(env: &CheckEnvironment<'_>) -> Vec<Finding> {
    let path = sidebar_origin(env.config);
    let mut findings = Vec::new();

    for group in &env.config.sidebar {
        for item in group.flatten() {
            let Some(link) = item.link.as_deref() else {
                continue;
            };
            let resolved = env.resolver.resolve(None, link);

            let message = if resolved.target == LinkTarget::Unresolved {
                format!(
                    "Sidebar item '{}' in '{}' links to '{}', which matches no page",
                    item.text, group.text, link
                )
            } else {
                let missing = resolved.fragment.as_deref().and_then(|fragment| {
                    let anchors = env.anchors_at(&resolved.target)?;
                    (!anchors.iter().any(|anchor| anchor == fragment))
                        .then(|| anchor_missing_message(fragment, link, &anchors))
                });
                match missing {
                    Some(message) => format!("Sidebar item '{}': {}", item.text, message),
                    None => continue,
                }
            };

            findings.push(Finding {
                rule: CheckRule::SidebarLinks,
                path: path.clone(),
                line: None,
                message,
            });
        }
    }
    findings
}

/// Config file the sidebar came from, relative to the project root.
fn sidebar_origin(config: &Config) -> PathBuf {
    config
        .sources
        .layers
        .iter()
        .rev()
        .find_map(|layer| layer.path.as_deref())
        .map(|path| PathBuf::from(display_relative(&config.project.root, path)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn anchor_missing_message(anchor: &str, target: &str, anchors: &[String]) -> String {
    let suggestion = anchors
        .iter()
        .map(|candidate| {
            (
                candidate.as_str(),
                normalized_levenshtein(anchor, candidate.as_str()),
            )
        })
        .filter(|(_, score)| *score > 0.6)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(slug, _)| slug.to_string());

    let mut message = format!("Missing anchor '#{anchor}' referenced by '{target}'");
    if let Some(suggestion) = suggestion {
        message.push_str(&format!(". Did you mean '#{suggestion}'?"));
    }
    message
}
