//! Raw TOML shapes and the per-layer partial configuration they produce.

use std::path::PathBuf;

use serde::Deserialize;

use crate::ConfigSource;

#[derive(Clone, Debug)]
pub(crate) struct Located<T> {
    pub(crate) value: T,
    pub(crate) source: ConfigSource,
}

impl<T> Located<T> {
    pub(crate) fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

/// Settings contributed by one layer. Later layers replace earlier values
/// key by key; array tables are replaced wholesale.
#[derive(Clone, Debug, Default)]
pub(crate) struct PartialConfig {
    pub(crate) root: Option<Located<PathBuf>>,
    pub(crate) title: Option<Located<String>>,
    pub(crate) description: Option<Located<String>>,
    pub(crate) src_dir: Option<Located<PathBuf>>,
    pub(crate) out_dir: Option<Located<PathBuf>>,
    pub(crate) base: Option<Located<String>>,
    pub(crate) clean_urls: Option<Located<bool>>,
    pub(crate) permalink: Option<Located<bool>>,
    pub(crate) word_chars: Option<Located<String>>,
    pub(crate) min_level: Option<Located<u8>>,
    pub(crate) max_level: Option<Located<u8>>,
    pub(crate) include: Option<Located<Vec<String>>>,
    pub(crate) exclude: Option<Located<Vec<String>>>,
    pub(crate) rewrites: Option<Located<Vec<RewritePartial>>>,
    pub(crate) aliases: Option<Located<Vec<AliasPartial>>>,
    pub(crate) sidebar: Option<Located<Vec<SidebarGroupPartial>>>,
    pub(crate) social_links: Option<Located<Vec<SocialLinkPartial>>>,
    pub(crate) mermaid_theme: Option<Located<String>>,
    pub(crate) rules: Option<Located<Vec<String>>>,
}

macro_rules! take_later {
    ($self:ident, $other:ident, $($field:ident),+ $(,)?) => {
        $(
            if $other.$field.is_some() {
                $self.$field = $other.$field;
            }
        )+
    };
}

impl PartialConfig {
    pub(crate) fn merge(&mut self, other: PartialConfig) {
        take_later!(
            self,
            other,
            root,
            title,
            description,
            src_dir,
            out_dir,
            base,
            clean_urls,
            permalink,
            word_chars,
            min_level,
            max_level,
            include,
            exclude,
            rewrites,
            aliases,
            sidebar,
            social_links,
            mermaid_theme,
            rules,
        );
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RewritePartial {
    pub(crate) from: String,
    pub(crate) to: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct AliasPartial {
    pub(crate) find: String,
    pub(crate) replacement: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SidebarGroupPartial {
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) collapsed: Option<bool>,
    #[serde(default)]
    pub(crate) items: Vec<SidebarItemPartial>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SidebarItemPartial {
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) link: Option<String>,
    #[serde(default)]
    pub(crate) items: Vec<SidebarItemPartial>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SocialLinkPartial {
    pub(crate) icon: String,
    pub(crate) link: String,
}

pub(crate) fn defaults_layer(source: &ConfigSource) -> PartialConfig {
    PartialConfig {
        root: Some(Located::new(source.base_dir.clone(), source.clone())),
        base: Some(Located::new("/".into(), source.clone())),
        clean_urls: Some(Located::new(false, source.clone())),
        include: Some(Located::new(vec!["**/*.md".into()], source.clone())),
        exclude: Some(Located::new(
            vec!["**/node_modules/**".into()],
            source.clone(),
        )),
        mermaid_theme: Some(Located::new("default".into(), source.clone())),
        ..PartialConfig::default()
    }
}

pub(crate) fn parse_layer(
    contents: &str,
    source: ConfigSource,
) -> Result<PartialConfig, toml::de::Error> {
    let raw: RawConfig = toml::from_str(contents)?;
    Ok(raw.into_partial(source))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    project: Option<RawProject>,
    #[serde(default)]
    site: Option<RawSite>,
    #[serde(default)]
    markdown: Option<RawMarkdown>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    rewrites: Option<Vec<RewritePartial>>,
    #[serde(default)]
    aliases: Option<Vec<AliasPartial>>,
    #[serde(default)]
    sidebar: Option<Vec<SidebarGroupPartial>>,
    #[serde(default)]
    social_links: Option<Vec<SocialLinkPartial>>,
    #[serde(default)]
    mermaid: Option<RawMermaid>,
    #[serde(default)]
    check: Option<RawCheck>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProject {
    #[serde(default)]
    root: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSite {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    src_dir: Option<PathBuf>,
    #[serde(default)]
    out_dir: Option<PathBuf>,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    clean_urls: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMarkdown {
    #[serde(default)]
    anchor: Option<RawAnchor>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnchor {
    #[serde(default)]
    permalink: Option<bool>,
    #[serde(default)]
    word_chars: Option<String>,
    #[serde(default)]
    min_level: Option<u8>,
    #[serde(default)]
    max_level: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    #[serde(default)]
    include: Option<Vec<String>>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMermaid {
    #[serde(default)]
    theme: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCheck {
    #[serde(default)]
    rules: Option<Vec<String>>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        let project = self.project.unwrap_or_default();
        let site = self.site.unwrap_or_default();
        let anchor = self
            .markdown
            .and_then(|markdown| markdown.anchor)
            .unwrap_or_default();
        let scope = self.source.unwrap_or_default();

        PartialConfig {
            root: project.root.map(located(&source)),
            title: site.title.map(located(&source)),
            description: site.description.map(located(&source)),
            src_dir: site.src_dir.map(located(&source)),
            out_dir: site.out_dir.map(located(&source)),
            base: site.base.map(located(&source)),
            clean_urls: site.clean_urls.map(located(&source)),
            permalink: anchor.permalink.map(located(&source)),
            word_chars: anchor.word_chars.map(located(&source)),
            min_level: anchor.min_level.map(located(&source)),
            max_level: anchor.max_level.map(located(&source)),
            include: scope.include.map(located(&source)),
            exclude: scope.exclude.map(located(&source)),
            rewrites: self.rewrites.map(located(&source)),
            aliases: self.aliases.map(located(&source)),
            sidebar: self.sidebar.map(located(&source)),
            social_links: self.social_links.map(located(&source)),
            mermaid_theme: self
                .mermaid
                .and_then(|mermaid| mermaid.theme)
                .map(located(&source)),
            rules: self
                .check
                .and_then(|check| check.rules)
                .map(located(&source)),
        }
    }
}

/// Tag values from one layer with that layer's source.
fn located<T>(source: &ConfigSource) -> impl Fn(T) -> Located<T> + '_ {
    move |value| Located::new(value, source.clone())
}
