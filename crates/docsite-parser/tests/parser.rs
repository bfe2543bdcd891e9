use std::fs;

use docsite_config::AnchorSettings;
use docsite_parser::{parse_document, parse_path, Heading, Link};
use docsite_slug::WordChars;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SAMPLE: &str = r#"---
title: Railway Deployment Guide
---

# Railway Deployment Guide

Intro line with a [link](./openwebui-configuration.md#environment).

```bash
# not a heading
```

## Prerequisites

    ### Indented code, still not a heading

Setup
-----

## Setup

### São Tomé & Príncipe

See [setup](#setup-1) and [home](/).
"#;

fn heading(level: u8, text: &str, anchor: Option<&str>, line: usize) -> Heading {
    Heading {
        level,
        text: text.to_string(),
        anchor: anchor.map(str::to_string),
        explicit_id: None,
        line,
    }
}

#[test]
fn collects_headings_with_unique_anchors_and_lines() {
    let document = parse_document(SAMPLE, &AnchorSettings::default());

    assert_eq!(
        document.headings,
        vec![
            heading(1, "Railway Deployment Guide", Some("railway-deployment-guide"), 5),
            heading(2, "Prerequisites", Some("prerequisites"), 13),
            heading(2, "Setup", Some("setup"), 17),
            heading(2, "Setup", Some("setup-1"), 20),
            heading(3, "São Tomé & Príncipe", Some("so-tom-prncipe"), 22),
        ]
    );
}

#[test]
fn collects_links_in_document_order() {
    let document = parse_document(SAMPLE, &AnchorSettings::default());

    assert_eq!(
        document.links,
        vec![
            Link {
                target: "./openwebui-configuration.md#environment".into(),
                line: 7,
            },
            Link {
                target: "#setup-1".into(),
                line: 24,
            },
            Link {
                target: "/".into(),
                line: 24,
            },
        ]
    );
    assert!(document.has_anchor("setup-1"));
    assert!(!document.has_anchor("environment"));
}

#[test]
fn unicode_policy_keeps_accented_letters() {
    let settings = AnchorSettings {
        word_chars: WordChars::Unicode,
        ..AnchorSettings::default()
    };
    let document = parse_document(SAMPLE, &settings);
    let anchors: Vec<_> = document.anchors().collect();
    assert!(anchors.contains(&"são-tomé-príncipe"));
}

#[test]
fn front_matter_headings_are_ignored() {
    let contents = "---\n# title: not a heading\n---\n# Real\n";
    let document = parse_document(contents, &AnchorSettings::default());
    assert_eq!(document.headings.len(), 1);
    assert_eq!(document.headings[0].line, 4);
}

#[test]
fn parses_documents_from_disk() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("guide.md");
    fs::write(&path, "# Guide\n\n## Next Steps\n").expect("write sample");

    let document = parse_path(&path, &AnchorSettings::default()).expect("parse file");
    let anchors: Vec<_> = document.anchors().collect();
    assert_eq!(anchors, vec!["guide", "next-steps"]);

    assert!(parse_path(&temp.path().join("missing.md"), &AnchorSettings::default()).is_err());
}
