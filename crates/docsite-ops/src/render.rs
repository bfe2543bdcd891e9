use std::fmt::Write as _;

use serde_json::json;

use crate::{CheckReport, OperationError, Page, PageAnchors, SidebarEntry};

/// Output format shared by every operation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

pub(crate) fn render_anchors(
    pages: &[PageAnchors],
    format: OutputFormat,
) -> Result<String, OperationError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "pages": pages }))?),
        OutputFormat::Plain => {
            let mut out = String::new();
            for page in pages {
                let _ = writeln!(out, "{} -> {}", page.source, page.route);
                for heading in &page.headings {
                    let anchor = heading
                        .anchor
                        .as_deref()
                        .map(|anchor| format!("#{anchor}"))
                        .unwrap_or_else(|| "(no anchor)".to_string());
                    let _ = writeln!(
                        out,
                        "  {:>4}  h{}  {}  {}",
                        heading.line, heading.level, anchor, heading.text
                    );
                }
            }
            Ok(out)
        }
    }
}

pub(crate) fn render_routes(
    pages: &[Page],
    sidebar: &[SidebarEntry],
    format: OutputFormat,
) -> Result<String, OperationError> {
    match format {
        OutputFormat::Json => {
            let payload = json!({
                "pages": pages
                    .iter()
                    .map(|page| json!({
                        "source": page.source,
                        "published": page.published,
                        "route": page.route,
                    }))
                    .collect::<Vec<_>>(),
                "sidebar": sidebar,
            });
            Ok(serde_json::to_string_pretty(&payload)?)
        }
        OutputFormat::Plain => {
            let mut out = String::new();
            for page in pages {
                let _ = writeln!(out, "{} -> {}", page.source, page.route);
            }
            if !sidebar.is_empty() {
                out.push_str("\nSidebar:\n");
                for entry in sidebar {
                    let link = entry.link.as_deref().unwrap_or("-");
                    let resolved = match (&entry.link, &entry.resolved) {
                        (None, _) => String::new(),
                        (Some(_), Some(resolved)) => format!(" -> {resolved}"),
                        (Some(_), None) => " -> (unresolved)".to_string(),
                    };
                    let _ = writeln!(
                        out,
                        "  [{}] {}: {}{}",
                        entry.group, entry.text, link, resolved
                    );
                }
            }
            Ok(out)
        }
    }
}

pub(crate) fn render_check(
    report: &CheckReport,
    format: OutputFormat,
) -> Result<String, OperationError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Plain => {
            if report.findings.is_empty() {
                return Ok(format!(
                    "No issues found in {} page(s).\n",
                    report.pages_checked
                ));
            }

            let mut out = String::new();
            for finding in &report.findings {
                let location = match finding.line {
                    Some(line) => format!("{}:{}", finding.path.display(), line),
                    None => finding.path.display().to_string(),
                };
                let _ = writeln!(out, "{location} [{}] {}", finding.rule, finding.message);
            }
            let _ = writeln!(
                out,
                "\n{} issue(s) found in {} page(s).",
                report.findings.len(),
                report.pages_checked
            );
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use docsite_config::CheckRule;

    use super::*;
    use crate::Finding;

    fn report() -> CheckReport {
        CheckReport {
            findings: vec![
                Finding {
                    rule: CheckRule::BrokenLinks,
                    path: PathBuf::from("docs/guide.md"),
                    line: Some(3),
                    message: "Broken link to 'missing.md'".into(),
                },
                Finding {
                    rule: CheckRule::SidebarLinks,
                    path: PathBuf::from(".docsite.toml"),
                    line: None,
                    message: "Sidebar item 'Setup' links to '/setup', which matches no page"
                        .into(),
                },
            ],
            pages_checked: 2,
        }
    }

    #[test]
    fn plain_check_lists_locations_and_summary() {
        let rendered = render_check(&report(), OutputFormat::Plain).expect("render");
        assert!(rendered.starts_with("docs/guide.md:3 [broken-links] Broken link"));
        assert!(rendered.contains(".docsite.toml [sidebar-links]"));
        assert!(rendered.ends_with("2 issue(s) found in 2 page(s).\n"));
    }

    #[test]
    fn json_check_serialises_rules_as_names() {
        let rendered = render_check(&report(), OutputFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
        assert_eq!(value["findings"][0]["rule"], "broken-links");
        assert_eq!(value["findings"][1]["line"], serde_json::Value::Null);
        assert_eq!(value["pages_checked"], 2);
    }

    #[test]
    fn clean_reports_say_so() {
        let rendered = render_check(&CheckReport::default(), OutputFormat::Plain).expect("render");
        assert_eq!(rendered, "No issues found in 0 page(s).\n");
    }
}
