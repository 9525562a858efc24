//! Lightweight configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Nested keys come from double underscores in env vars, so
//! `APP_DATASET__ROOT=/data/course` overrides `dataset.root`.
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_in(Path::new("."))
    }

    /// Load `config.toml` and the environment overlay from `base_dir`.
    pub fn load_in(base_dir: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(base_dir.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, base_dir: base_dir.to_path_buf() };
        config.validate()?;
        Ok(config)
    }

    /// Wrap an already-built figment. Relative paths resolve against `base_dir`.
    pub fn from_figment(figment: Figment, base_dir: &Path) -> Self {
        Self { figment, base_dir: base_dir.to_path_buf() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Extract a settings section, filling absent keys from `T::default()`.
    pub fn section<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned + Serialize + Default,
    {
        let merged = Figment::new()
            .merge(Serialized::defaults(T::default()))
            .merge(self.figment.focus(key));
        merged
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read section '{}': {}", key, e))
    }

    pub fn dataset(&self) -> anyhow::Result<DatasetSettings> {
        self.section("dataset")
    }

    pub fn embedding(&self) -> anyhow::Result<EmbeddingSettings> {
        self.section("embedding")
    }

    pub fn index(&self) -> anyhow::Result<IndexSettings> {
        self.section("index")
    }

    fn validate(&self) -> anyhow::Result<()> {
        let index = self.index()?;
        if index.chunk_overlap >= index.chunk_size {
            return Err(crate::error::Error::InvalidConfig(format!(
                "index.chunk_overlap ({}) must be smaller than index.chunk_size ({})",
                index.chunk_overlap, index.chunk_size
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&index.lambda_mult) {
            return Err(crate::error::Error::InvalidConfig(format!(
                "index.lambda_mult must be within [0, 1], got {}",
                index.lambda_mult
            ))
            .into());
        }
        if index.fetch_k < index.k {
            return Err(crate::error::Error::InvalidConfig(format!(
                "index.fetch_k ({}) must be at least index.k ({})",
                index.fetch_k, index.k
            ))
            .into());
        }
        Ok(())
    }
}

/// Where the course sources live and where the dataset goes.
///
/// `main_file`, `sections_dir` and `theory_file` are relative to `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    pub root: String,
    pub main_file: String,
    pub sections_dir: String,
    pub theory_file: String,
    pub output: String,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            root: "./5_sem_ml".to_string(),
            main_file: "main.tex".to_string(),
            sections_dir: "section".to_string(),
            theory_file: "section/polidobro/teormin.tex".to_string(),
            output: "data_for_ml.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Model identifier, e.g. `ai-forever/sbert_large_nlu_ru`.
    pub model: String,
    /// Directory holding one sub-directory per model identifier.
    pub models_dir: String,
    /// Token limit per input; longer inputs are truncated.
    pub max_len: usize,
    pub batch_size: usize,
    /// GPU ordinal used when built with the `cuda` feature.
    pub device_ordinal: usize,
    /// Scale pooled vectors to unit length.
    pub normalize: bool,
    pub use_fake: bool,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "ai-forever/sbert_large_nlu_ru".to_string(),
            models_dir: "models".to_string(),
            max_len: 24,
            batch_size: 32,
            device_ordinal: 0,
            normalize: false,
            use_fake: false,
            fake_dim: 1024,
        }
    }
}

/// Chunking and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Number of results returned per query.
    pub k: usize,
    /// Candidate pool size fed to MMR.
    pub fetch_k: usize,
    /// 1.0 is pure relevance, 0.0 is pure diversity.
    pub lambda_mult: f32,
    /// Also index one title embedding per dataset row.
    pub index_titles: bool,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { chunk_size: 1200, chunk_overlap: 300, k: 3, fetch_k: 20, lambda_mult: 0.5, index_titles: true }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
