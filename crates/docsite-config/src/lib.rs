//! Site configuration primitives and loader for the docsite toolkit.
//!
//! The loader resolves configuration using the precedence stack
//! override flag → working directory → git root → built-in defaults.
//! Parsed settings are normalised into typed structures so downstream crates
//! can operate without touching raw TOML.

mod raw;
mod rewrite;

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use docsite_slug::WordChars;
use globset::{Glob, GlobMatcher};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use raw::{
    AliasPartial, Located, PartialConfig, RewritePartial, SidebarGroupPartial, SidebarItemPartial,
    SocialLinkPartial,
};
pub use rewrite::RoutePattern;

pub const CONFIG_FILE_NAME: &str = ".docsite.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub project: ProjectSettings,
    pub site: SiteSettings,
    pub markdown: MarkdownSettings,
    pub source: SourceSettings,
    pub rewrites: Vec<RewriteRule>,
    pub aliases: Vec<PathAlias>,
    pub sidebar: Vec<SidebarGroup>,
    pub social_links: Vec<SocialLink>,
    pub mermaid: MermaidSettings,
    pub check: CheckSettings,
    pub sources: ConfigSources,
}

/// Repository scope; alias replacements resolve against `root`.
#[derive(Clone, Debug)]
pub struct ProjectSettings {
    pub root: PathBuf,
}

/// Site-level publishing settings.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    pub title: Option<String>,
    pub description: Option<String>,
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Always starts and ends with `/`.
    pub base: String,
    pub clean_urls: bool,
}

#[derive(Clone, Debug)]
pub struct MarkdownSettings {
    pub anchor: AnchorSettings,
}

/// Controls which headings receive anchors and how they are slugged.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnchorSettings {
    pub permalink: bool,
    pub word_chars: WordChars,
    pub min_level: u8,
    pub max_level: u8,
}

impl AnchorSettings {
    pub fn anchors_level(&self, level: u8) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

impl Default for AnchorSettings {
    fn default() -> Self {
        AnchorSettings {
            permalink: true,
            word_chars: WordChars::Ascii,
            min_level: 1,
            max_level: 6,
        }
    }
}

/// Which files under `site.src_dir` count as pages.
#[derive(Clone, Debug)]
pub struct SourceSettings {
    pub include: PatternList,
    pub exclude: PatternList,
}

impl SourceSettings {
    /// `relative` is a path relative to the source directory.
    pub fn is_in_scope(&self, relative: &Path) -> bool {
        if self.exclude.is_match(relative) {
            return false;
        }
        self.include.is_empty() || self.include.is_match(relative)
    }
}

/// Maps a source path to the path it is published under.
#[derive(Clone, Debug)]
pub struct RewriteRule {
    pub from: RoutePattern,
    pub to: RoutePattern,
    pub source: ConfigSource,
}

impl RewriteRule {
    pub fn apply(&self, path: &str) -> Option<String> {
        self.from
            .captures(path)
            .map(|captured| self.to.render(&captured))
    }
}

/// Regex-based link alias resolving to a path relative to the project root.
#[derive(Clone, Debug)]
pub struct PathAlias {
    pub find: Regex,
    pub replacement: String,
    pub source: ConfigSource,
}

impl PathAlias {
    pub fn apply(&self, link: &str) -> Option<String> {
        if self.find.is_match(link) {
            Some(self.find.replace(link, self.replacement.as_str()).into_owned())
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SidebarGroup {
    pub text: String,
    pub collapsed: Option<bool>,
    pub items: Vec<SidebarItem>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SidebarItem {
    pub text: String,
    pub link: Option<String>,
    pub items: Vec<SidebarItem>,
}

impl SidebarGroup {
    /// Every item in the group, depth-first.
    pub fn flatten(&self) -> Vec<&SidebarItem> {
        fn walk<'a>(items: &'a [SidebarItem], out: &mut Vec<&'a SidebarItem>) {
            for item in items {
                out.push(item);
                walk(&item.items, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SocialLink {
    pub icon: String,
    pub link: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MermaidSettings {
    pub theme: String,
}

#[derive(Clone, Debug)]
pub struct CheckSettings {
    pub rules: Vec<CheckRule>,
}

/// Supported check rules.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum CheckRule {
    SidebarLinks,
    BrokenLinks,
    BrokenAnchors,
    DuplicateAnchors,
}

impl CheckRule {
    pub const ALL: &'static [CheckRule] = &[
        CheckRule::SidebarLinks,
        CheckRule::BrokenLinks,
        CheckRule::BrokenAnchors,
        CheckRule::DuplicateAnchors,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckRule::SidebarLinks => "sidebar-links",
            CheckRule::BrokenLinks => "broken-links",
            CheckRule::BrokenAnchors => "broken-anchors",
            CheckRule::DuplicateAnchors => "duplicate-anchors",
        }
    }
}

impl fmt::Display for CheckRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckRule {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sidebar-links" => Ok(CheckRule::SidebarLinks),
            "broken-links" => Ok(CheckRule::BrokenLinks),
            "broken-anchors" => Ok(CheckRule::BrokenAnchors),
            "duplicate-anchors" => Ok(CheckRule::DuplicateAnchors),
            _ => Err(()),
        }
    }
}

/// Pattern plus compiled matcher helper.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    matcher: GlobMatcher,
}

impl Pattern {
    fn new(source: &ConfigSource, value: String) -> Result<Self, ConfigValidationError> {
        match Glob::new(&value) {
            Ok(glob) => Ok(Pattern {
                matcher: glob.compile_matcher(),
                original: value,
            }),
            Err(err) => Err(ConfigValidationError::new(
                Some(source.clone()),
                format!("invalid glob pattern '{value}': {err}"),
            )),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.matcher.is_match(path)
    }
}

/// Ordered list of glob patterns.
#[derive(Clone, Debug, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = raw::defaults_layer(&default_source);
        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        for layer in &source_layers {
            debug!(layer = %layer.describe(), "config layer applied");
        }

        let resolved = finalize(merged).map_err(ConfigError::Validation)?;
        Ok(Config {
            project: resolved.project,
            site: resolved.site,
            markdown: resolved.markdown,
            source: resolved.source,
            rewrites: resolved.rewrites,
            aliases: resolved.aliases,
            sidebar: resolved.sidebar,
            social_links: resolved.social_links,
            mermaid: resolved.mermaid,
            check: resolved.check,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    raw::parse_layer(&contents, source).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

struct ResolvedConfig {
    project: ProjectSettings,
    site: SiteSettings,
    markdown: MarkdownSettings,
    source: SourceSettings,
    rewrites: Vec<RewriteRule>,
    aliases: Vec<PathAlias>,
    sidebar: Vec<SidebarGroup>,
    social_links: Vec<SocialLink>,
    mermaid: MermaidSettings,
    check: CheckSettings,
}

fn finalize(partial: PartialConfig) -> Result<ResolvedConfig, ConfigValidationErrors> {
    let mut errors = Vec::new();
    let fallback = || ConfigSource::default(PathBuf::from("."));
    let anchor = finalize_anchor(&partial, &mut errors);

    let root = partial
        .root
        .map(|located| resolve_path(&located))
        .unwrap_or_else(|| PathBuf::from("."));

    let src_dir = partial
        .src_dir
        .map(|located| resolve_path(&located))
        .unwrap_or_else(|| root.join("docs"));
    let out_dir = partial
        .out_dir
        .map(|located| resolve_path(&located))
        .unwrap_or_else(|| root.join("dist"));

    let base = partial
        .base
        .unwrap_or_else(|| Located::new("/".to_string(), fallback()));
    let base = normalize_base(base, &mut errors);

    let include = compile_patterns(
        partial
            .include
            .unwrap_or_else(|| Located::new(vec!["**/*.md".into()], fallback())),
        "source.include",
        &mut errors,
    );
    let exclude = compile_patterns(
        partial
            .exclude
            .unwrap_or_else(|| Located::new(Vec::new(), fallback())),
        "source.exclude",
        &mut errors,
    );

    let rewrites = partial
        .rewrites
        .map(|located| parse_rewrites(located, &mut errors))
        .unwrap_or_default();
    let aliases = partial
        .aliases
        .map(|located| parse_aliases(located, &mut errors))
        .unwrap_or_default();
    let sidebar = partial
        .sidebar
        .map(|located| parse_sidebar(located, &mut errors))
        .unwrap_or_default();
    let social_links = partial
        .social_links
        .map(|located| parse_social_links(located, &mut errors))
        .unwrap_or_default();

    let rules = partial
        .rules
        .map(|located| parse_rules(located, &mut errors))
        .unwrap_or_else(|| CheckRule::ALL.to_vec());

    if !errors.is_empty() {
        return Err(ConfigValidationErrors(errors));
    }

    Ok(ResolvedConfig {
        project: ProjectSettings { root },
        site: SiteSettings {
            title: partial.title.map(|located| located.value),
            description: partial.description.map(|located| located.value),
            src_dir,
            out_dir,
            base,
            clean_urls: partial
                .clean_urls
                .map(|located| located.value)
                .unwrap_or(false),
        },
        markdown: MarkdownSettings { anchor },
        source: SourceSettings {
            include: PatternList { patterns: include },
            exclude: PatternList { patterns: exclude },
        },
        rewrites,
        aliases,
        sidebar,
        social_links,
        mermaid: MermaidSettings {
            theme: partial
                .mermaid_theme
                .map(|located| located.value)
                .unwrap_or_else(|| "default".to_string()),
        },
        check: CheckSettings { rules },
    })
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

fn normalize_base(located: Located<String>, errors: &mut Vec<ConfigValidationError>) -> String {
    let value = located.value.trim();
    if value.is_empty() || value == "/" {
        return "/".to_string();
    }
    if !value.starts_with('/') || !value.ends_with('/') {
        errors.push(
            ConfigValidationError::new(
                Some(located.source.clone()),
                format!("base must start and end with '/' (received '{value}')"),
            )
            .with_context("site.base"),
        );
    }
    value.to_string()
}

fn finalize_anchor(
    partial: &PartialConfig,
    errors: &mut Vec<ConfigValidationError>,
) -> AnchorSettings {
    let defaults = AnchorSettings::default();

    let word_chars = match &partial.word_chars {
        Some(located) => match located.value.parse::<WordChars>() {
            Ok(policy) => policy,
            Err(_) => {
                errors.push(
                    ConfigValidationError::new(
                        Some(located.source.clone()),
                        format!(
                            "unknown word_chars '{}' (expected 'ascii' or 'unicode')",
                            located.value
                        ),
                    )
                    .with_context("markdown.anchor.word_chars"),
                );
                defaults.word_chars
            }
        },
        None => defaults.word_chars,
    };

    let mut level = |located: &Option<Located<u8>>, key: &str, default: u8| match located {
        Some(located) => {
            if located.value == 0 || located.value > 6 {
                errors.push(
                    ConfigValidationError::new(
                        Some(located.source.clone()),
                        format!("must be between 1 and 6 (received {})", located.value),
                    )
                    .with_context(format!("markdown.anchor.{key}")),
                );
            }
            located.value
        }
        None => default,
    };

    let min_level = level(&partial.min_level, "min_level", defaults.min_level);
    let max_level = level(&partial.max_level, "max_level", defaults.max_level);

    if min_level > max_level {
        errors.push(
            ConfigValidationError::new(
                None,
                format!("min_level ({min_level}) must not exceed max_level ({max_level})"),
            )
            .with_context("markdown.anchor"),
        );
    }

    AnchorSettings {
        permalink: partial
            .permalink
            .as_ref()
            .map(|located| located.value)
            .unwrap_or(defaults.permalink),
        word_chars,
        min_level,
        max_level,
    }
}

fn compile_patterns(
    located: Located<Vec<String>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    for pattern in located.value {
        match Pattern::new(&located.source, pattern) {
            Ok(compiled) => patterns.push(compiled),
            Err(err) => errors.push(err.with_context(context)),
        }
    }
    patterns
}

fn parse_rewrites(
    located: Located<Vec<RewritePartial>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<RewriteRule> {
    let Located { value, source } = located;
    let mut rules = Vec::new();

    for entry in value {
        let parsed = RoutePattern::parse(&entry.from)
            .and_then(|from| RoutePattern::parse(&entry.to).map(|to| (from, to)));
        let (from, to) = match parsed {
            Ok(pair) => pair,
            Err(message) => {
                errors.push(
                    ConfigValidationError::new(Some(source.clone()), message)
                        .with_context("rewrites"),
                );
                continue;
            }
        };

        let declared: HashSet<&str> = from.params().collect();
        let missing: Vec<&str> = to.params().filter(|name| !declared.contains(name)).collect();
        if !missing.is_empty() {
            errors.push(
                ConfigValidationError::new(
                    Some(source.clone()),
                    format!(
                        "rewrite '{}' -> '{}' uses undeclared parameter(s): {}",
                        from,
                        to,
                        missing.join(", ")
                    ),
                )
                .with_context("rewrites"),
            );
            continue;
        }

        rules.push(RewriteRule {
            from,
            to,
            source: source.clone(),
        });
    }
    rules
}

fn parse_aliases(
    located: Located<Vec<AliasPartial>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<PathAlias> {
    let Located { value, source } = located;
    let mut aliases = Vec::new();

    for entry in value {
        match Regex::new(&entry.find) {
            Ok(find) => aliases.push(PathAlias {
                find,
                replacement: entry.replacement,
                source: source.clone(),
            }),
            Err(err) => errors.push(
                ConfigValidationError::new(
                    Some(source.clone()),
                    format!("invalid alias pattern '{}': {err}", entry.find),
                )
                .with_context("aliases"),
            ),
        }
    }
    aliases
}

fn parse_sidebar(
    located: Located<Vec<SidebarGroupPartial>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<SidebarGroup> {
    let Located { value, source } = located;
    value
        .into_iter()
        .map(|group| {
            if group.text.trim().is_empty() {
                errors.push(
                    ConfigValidationError::new(
                        Some(source.clone()),
                        "sidebar group text cannot be empty".into(),
                    )
                    .with_context("sidebar"),
                );
            }
            SidebarGroup {
                items: parse_sidebar_items(group.items, &source, errors),
                text: group.text,
                collapsed: group.collapsed,
            }
        })
        .collect()
}

fn parse_sidebar_items(
    items: Vec<SidebarItemPartial>,
    source: &ConfigSource,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<SidebarItem> {
    items
        .into_iter()
        .map(|item| {
            match &item.link {
                Some(link) if !link.starts_with('/') && !is_external(link) => {
                    errors.push(
                        ConfigValidationError::new(
                            Some(source.clone()),
                            format!(
                                "sidebar item '{}' link '{link}' must be absolute or external",
                                item.text
                            ),
                        )
                        .with_context("sidebar"),
                    );
                }
                None if item.items.is_empty() => {
                    errors.push(
                        ConfigValidationError::new(
                            Some(source.clone()),
                            format!("sidebar item '{}' needs a link or nested items", item.text),
                        )
                        .with_context("sidebar"),
                    );
                }
                _ => {}
            }
            SidebarItem {
                items: parse_sidebar_items(item.items, source, errors),
                text: item.text,
                link: item.link,
            }
        })
        .collect()
}

fn parse_social_links(
    located: Located<Vec<SocialLinkPartial>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<SocialLink> {
    let Located { value, source } = located;
    value
        .into_iter()
        .filter_map(|entry| {
            if !is_external(&entry.link) {
                errors.push(
                    ConfigValidationError::new(
                        Some(source.clone()),
                        format!("social link '{}' must be an external URL", entry.link),
                    )
                    .with_context("social_links"),
                );
                return None;
            }
            Some(SocialLink {
                icon: entry.icon,
                link: entry.link,
            })
        })
        .collect()
}

fn parse_rules(
    located: Located<Vec<String>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<CheckRule> {
    let mut result = Vec::new();
    let mut seen = HashSet::new();
    for rule_name in located.value {
        match rule_name.parse::<CheckRule>() {
            Ok(rule) => {
                if !seen.insert(rule) {
                    errors.push(
                        ConfigValidationError::new(
                            Some(located.source.clone()),
                            format!("duplicate check rule '{rule}'"),
                        )
                        .with_context("check.rules"),
                    );
                } else {
                    result.push(rule);
                }
            }
            Err(_) => errors.push(
                ConfigValidationError::new(
                    Some(located.source.clone()),
                    format!("unknown check rule '{rule_name}'"),
                )
                .with_context("check.rules"),
            ),
        }
    }
    result
}

/// Return true if `target` points outside the site (http/mailto/etc.).
pub fn is_external(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}
