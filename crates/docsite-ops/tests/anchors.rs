use std::path::PathBuf;

use docsite_ops::{AnchorsOptions, OperationError, Operations, OutputFormat};
use docsite_test_support::{canonical_root, load_config, sample_site, write_file};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn lists_anchors_with_permalinks() {
    let (_temp, root) = sample_site();
    let ops = Operations::new(load_config(&root));

    let outcome = ops
        .anchors(AnchorsOptions {
            paths: vec![PathBuf::from("docs/railway-deployment-guide.md")],
            format: OutputFormat::Plain,
        })
        .expect("anchors");

    assert_eq!(outcome.pages.len(), 1);
    let page = &outcome.pages[0];
    assert_eq!(page.route, "/railway-deployment-guide");

    let permalinks: Vec<_> = page
        .headings
        .iter()
        .filter_map(|heading| heading.permalink.as_deref())
        .collect();
    assert_eq!(
        permalinks,
        vec![
            "/railway-deployment-guide#railway-deployment-guide",
            "/railway-deployment-guide#prerequisites",
            "/railway-deployment-guide#setup",
        ]
    );
    assert!(outcome.rendered.contains("h2  #prerequisites  Prerequisites"));
}

#[test]
fn duplicate_headings_get_numbered_anchors() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);
    write_file(
        &root,
        "docs/faq.md",
        "# FAQ\n\n## Install\n\n## Install\n\n## Install\n\n## ???\n",
    );

    let ops = Operations::new(load_config(&root));
    let outcome = ops
        .anchors(AnchorsOptions {
            format: OutputFormat::Json,
            ..AnchorsOptions::default()
        })
        .expect("anchors");

    let anchors: Vec<Option<&str>> = outcome.pages[0]
        .headings
        .iter()
        .map(|heading| heading.anchor.as_deref())
        .collect();
    assert_eq!(
        anchors,
        vec![
            Some("faq"),
            Some("install"),
            Some("install-1"),
            Some("install-2"),
            None,
        ]
    );

    let value: serde_json::Value = serde_json::from_str(&outcome.rendered).expect("json");
    assert_eq!(value["pages"][0]["headings"][2]["anchor"], "install-1");
    assert_eq!(value["pages"][0]["headings"][2]["permalink"], "/faq.html#install-1");
    assert!(value["pages"][0]["headings"][4].get("permalink").is_none());
}

#[test]
fn disabled_permalinks_are_omitted() {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);
    write_file(&root, ".docsite.toml", "[markdown.anchor]\npermalink = false\n");
    write_file(&root, "docs/index.md", "# Home\n");

    let ops = Operations::new(load_config(&root));
    let outcome = ops.anchors(AnchorsOptions::default()).expect("anchors");
    assert_eq!(outcome.pages[0].headings[0].anchor.as_deref(), Some("home"));
    assert_eq!(outcome.pages[0].headings[0].permalink, None);
}

#[test]
fn unknown_paths_are_rejected() {
    let (_temp, root) = sample_site();
    let ops = Operations::new(load_config(&root));

    let err = ops
        .anchors(AnchorsOptions {
            paths: vec![PathBuf::from("docs/missing")],
            format: OutputFormat::Plain,
        })
        .unwrap_err();
    match err {
        OperationError::InvalidInput(message) => assert!(message.contains("docs/missing")),
        other => panic!("unexpected error: {other:?}"),
    }
}
