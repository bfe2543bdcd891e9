//! Shared test harness utilities for docsite crates.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use docsite_config::{Config, LoadOptions};
use tempfile::TempDir;

/// Configuration of the sample site written by [`sample_site`].
pub const SAMPLE_CONFIG: &str = r#"[site]
title = "Unified AI Platform"
description = "A comprehensive, self-hosted AI platform with OpenWebUI and LiteLLM"
src_dir = "docs"
out_dir = "dist"
base = ""
clean_urls = true

[markdown.anchor]
permalink = true

[[rewrites]]
from = "/memory-bank/:path*"
to = "/:path*"

[[aliases]]
find = "^/memory-bank/(.*)"
replacement = "memory-bank/$1"

[[sidebar]]
text = "Guide"
items = [
  { text = "Introduction", link = "/" },
  { text = "OpenWebUI Configuration", link = "/openwebui-configuration" },
  { text = "Railway Deployment Guide", link = "/railway-deployment-guide" },
]

[[sidebar]]
text = "Memory Bank"
items = [
  { text = "Project Brief", link = "/memory-bank/projectbrief" },
  { text = "Progress", link = "/memory-bank/progress" },
]

[[social_links]]
icon = "github"
link = "https://github.com/example/unified-ai-platform"

[mermaid]
theme = "default"
"#;

/// Write `contents` to `relative` under `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}

/// Canonical path of a temporary directory, so comparisons survive symlinked
/// temp roots.
pub fn canonical_root(dir: &TempDir) -> PathBuf {
    fs::canonicalize(dir.path()).expect("canonicalize tempdir")
}

/// Load configuration as the CLI would from `root`.
pub fn load_config(root: &Path) -> Config {
    Config::load(LoadOptions::default().with_working_dir(root)).expect("load config")
}

/// A small documentation site: three guide pages under `docs/` and a
/// memory bank outside it, reachable through the alias.
pub fn sample_site() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("tempdir");
    let root = canonical_root(&temp);

    write_file(&root, ".docsite.toml", SAMPLE_CONFIG);
    write_file(
        &root,
        "docs/index.md",
        "---\nlayout: home\n---\n\n# Unified AI Platform\n\n\
         Start with the [deployment guide](./railway-deployment-guide.md#prerequisites).\n\n\
         ## Quick Links\n\n- [Configuration](/openwebui-configuration#environment-variables)\n",
    );
    write_file(
        &root,
        "docs/openwebui-configuration.md",
        "# OpenWebUI Configuration\n\n## Environment Variables\n\n\
         Set `OPENAI_API_BASE_URL`.\n\n## Models\n\nSee the [brief](/memory-bank/projectbrief#goals).\n",
    );
    write_file(
        &root,
        "docs/railway-deployment-guide.md",
        "# Railway Deployment Guide\n\n## Prerequisites\n\n## Setup\n\n\
         Back to the [home page](/).\n",
    );
    write_file(
        &root,
        "memory-bank/projectbrief.md",
        "# Project Brief\n\n## Goals\n\n## Scope\n",
    );
    write_file(&root, "memory-bank/progress.md", "# Progress\n\n## Done\n");

    (temp, root)
}
