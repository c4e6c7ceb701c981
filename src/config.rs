use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::discover::DiscoverOptions;
use crate::document::LoadOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub include_text: bool,
    #[serde(default = "default_ann_extension")]
    pub ann_extension: String,
    #[serde(default = "default_text_extension")]
    pub text_extension: String,
    /// Defaults to every file carrying `ann_extension`.
    #[serde(default)]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_ann_extension() -> String {
    "ann".to_string()
}
fn default_text_extension() -> String {
    "txt".to_string()
}

impl CorpusConfig {
    /// Defaults for a corpus rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_text: false,
            ann_extension: default_ann_extension(),
            text_extension: default_text_extension(),
            include_globs: Vec::new(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }

    pub fn discover_options(&self) -> DiscoverOptions {
        let mut options = DiscoverOptions::for_extension(&self.ann_extension);
        if !self.include_globs.is_empty() {
            options.include_globs = self.include_globs.clone();
        }
        options.exclude_globs = self.exclude_globs.clone();
        options.follow_symlinks = self.follow_symlinks;
        options
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            include_text: self.include_text,
            text_extension: self.text_extension.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    #[default]
    None,
    Subfolder,
    List,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CollectionsConfig {
    #[serde(default)]
    pub mode: CollectionMode,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

impl Config {
    /// Configuration for a bare corpus root, all other settings defaulted.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            corpus: CorpusConfig::for_root(root),
            collections: CollectionsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    let corpus = &config.corpus;

    if corpus.ann_extension.is_empty() || corpus.text_extension.is_empty() {
        anyhow::bail!("corpus.ann_extension and corpus.text_extension must not be empty");
    }

    if corpus.ann_extension == corpus.text_extension {
        anyhow::bail!(
            "corpus.ann_extension and corpus.text_extension must differ (both '{}')",
            corpus.ann_extension
        );
    }

    if config.collections.mode == CollectionMode::List && config.collections.labels.is_empty() {
        anyhow::bail!("collections.labels must not be empty when collections.mode is 'list'");
    }

    Ok(())
}
