use docsite_config::LoadOptions;
use docsite_config::Config;
use docsite_ops::{Operations, OutputFormat, RoutesOptions, SidebarEntry};
use docsite_test_support::{canonical_root, load_config, sample_site, write_file};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn sample_site_routes_use_clean_urls() {
    let (_temp, root) = sample_site();
    let ops = Operations::new(load_config(&root));

    let outcome = ops.routes(RoutesOptions::default()).expect("routes");
    let routes: Vec<(&str, &str)> = outcome
        .pages
        .iter()
        .map(|page| (page.source.as_str(), page.route.as_str()))
        .collect();

    assert_eq!(
        routes,
        vec![
            ("index.md", "/"),
            ("openwebui-configuration.md", "/openwebui-configuration"),
            ("railway-deployment-guide.md", "/railway-deployment-guide"),
        ]
    );
    assert!(outcome.rendered.contains("index.md -> /\n"));
}

#[test]
fn sidebar_entries_resolve_to_routes_and_aliased_files() {
    let (_temp, root) = sample_site();
    let ops = Operations::new(load_config(&root));

    let outcome = ops.routes(RoutesOptions::default()).expect("routes");
    let brief = outcome
        .sidebar
        .iter()
        .find(|entry| entry.text == "Project Brief")
        .expect("project brief entry");

    assert_eq!(
        brief,
        &SidebarEntry {
            group: "Memory Bank".into(),
            text: "Project Brief".into(),
            link: Some("/memory-bank/projectbrief".into()),
            resolved: Some("memory-bank/projectbrief.md".into()),
        }
    );

    let intro = &outcome.sidebar[0];
    assert_eq!(intro.resolved.as_deref(), Some("/"));
    assert_eq!(outcome.sidebar.len(), 5);
}

#[test]
fn html_routes_rewrites_and_base_prefix() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);
    write_file(
        &root,
        ".docsite.toml",
        "[site]\nbase = \"/handbook/\"\n\n[[rewrites]]\nfrom = \"packages/:pkg/docs.md\"\nto = \":pkg/index.md\"\n",
    );
    write_file(&root, "docs/index.md", "# Home\n");
    write_file(&root, "docs/guide/index.md", "# Guide\n");
    write_file(&root, "docs/guide/setup.md", "# Setup\n");
    write_file(&root, "docs/packages/core/docs.md", "# Core\n");

    let config = Config::load(LoadOptions::default().with_working_dir(&root)).expect("config");
    let ops = Operations::new(config);
    let outcome = ops
        .routes(RoutesOptions {
            format: OutputFormat::Json,
        })
        .expect("routes");

    let routes: Vec<(&str, &str, &str)> = outcome
        .pages
        .iter()
        .map(|page| {
            (
                page.source.as_str(),
                page.published.as_str(),
                page.route.as_str(),
            )
        })
        .collect();
    assert_eq!(
        routes,
        vec![
            ("guide/index.md", "guide/index.md", "/handbook/guide/"),
            ("guide/setup.md", "guide/setup.md", "/handbook/guide/setup.html"),
            ("index.md", "index.md", "/handbook/"),
            ("packages/core/docs.md", "core/index.md", "/handbook/core/"),
        ]
    );

    let value: serde_json::Value = serde_json::from_str(&outcome.rendered).expect("json");
    assert_eq!(value["pages"][3]["route"], "/handbook/core/");
    assert_eq!(value["sidebar"], serde_json::json!([]));
}

#[test]
fn missing_source_directory_is_invalid_input() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);
    let ops = Operations::new(load_config(&root));

    let err = ops.routes(RoutesOptions::default()).unwrap_err();
    assert!(matches!(err, docsite_ops::OperationError::InvalidInput(_)));
}

#[test]
fn markdown_extension_pages_route_like_md_pages() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);
    write_file(
        &root,
        ".docsite.toml",
        "[source]\ninclude = [\"**/*.md\", \"**/*.markdown\"]\n",
    );
    write_file(&root, "docs/index.md", "# Home\n\nSee [the guide](guide.html#setup).\n");
    write_file(&root, "docs/guide.markdown", "# Guide\n\n## Setup\n");

    let config = Config::load(LoadOptions::default().with_working_dir(&root)).expect("config");
    let ops = Operations::new(config);
    let outcome = ops.routes(RoutesOptions::default()).expect("routes");
    let routes: Vec<(&str, &str)> = outcome
        .pages
        .iter()
        .map(|page| (page.source.as_str(), page.route.as_str()))
        .collect();

    assert_eq!(routes, vec![("guide.markdown", "/guide.html"), ("index.md", "/")]);

    let report = ops
        .check(docsite_ops::CheckOptions::default())
        .expect("check")
        .report;
    assert!(report.findings.is_empty(), "{:?}", report.findings);
}
