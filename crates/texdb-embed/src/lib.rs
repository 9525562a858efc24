//! texdb-embed
//!
//! Sentence embeddings for the course index: a candle BERT encoder with
//! attention-masked mean pooling, and a deterministic hash embedder for tests
//! and offline runs.

pub mod device;
pub mod pool;
pub mod tokenize;

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use texdb_core::config::{resolve_with_base, EmbeddingSettings};
use texdb_core::{Embedder, Error};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};
use twox_hash::XxHash64;

pub use device::select_device;
pub use pool::{l2_normalize, masked_mean};
pub use tokenize::{tokenize_batch, BatchInputs};

/// BERT sentence encoder loaded from a local model directory.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    batch_size: usize,
    normalize: bool,
}

impl BertEmbedder {
    /// Load `config.json`, `tokenizer.json` and the weights from `model_dir`.
    ///
    /// Weights are read from `model.safetensors` when present, otherwise from
    /// `pytorch_model.bin`.
    pub fn load(model_dir: &Path, settings: &EmbeddingSettings) -> Result<Self> {
        let device = select_device(settings.device_ordinal);
        info!(model = %settings.model, dir = %model_dir.display(), "loading sentence encoder");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).with_context(|| format!("Failed to read {}", config_path.display()))?,
        )
        .with_context(|| format!("Invalid model config {}", config_path.display()))?;

        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config).context("Failed to build BERT model from weights")?;
        info!(dim = config.hidden_size, max_len = settings.max_len, "sentence encoder ready");

        Ok(Self {
            model,
            tokenizer,
            device,
            dim: config.hidden_size,
            max_len: settings.max_len,
            batch_size: settings.batch_size.max(1),
            normalize: settings.normalize,
        })
    }

    /// Resolve the model directory for `settings` and load it.
    pub fn from_settings(settings: &EmbeddingSettings, base_dir: &Path) -> Result<Self> {
        let model_dir = resolve_model_dir(settings, base_dir)?;
        Self::load(&model_dir, settings)
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let inputs = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let hidden = self.model.forward(&inputs.input_ids, &inputs.token_type_ids, Some(&inputs.attention_mask))?;
        let mut pooled = masked_mean(&hidden, &inputs.attention_mask)?;
        if self.normalize {
            pooled = l2_normalize(&pooled)?;
        }
        Ok(pooled.to_dtype(DType::F32)?.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        debug!(path = %safetensors.display(), "mapping safetensors weights");
        // SAFETY: the weight file is not modified while the model is alive.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device)? };
        return Ok(vb);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        debug!(path = %pickle.display(), "reading pytorch weights");
        let weights = candle_core::pickle::read_all(&pickle)?;
        let weights_map: std::collections::HashMap<String, candle_core::Tensor> = weights.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights_map, DTYPE, device));
    }
    Err(Error::NotFound(format!("no model.safetensors or pytorch_model.bin in {}", model_dir.display())).into())
}

/// Locate the directory of `settings.model`.
///
/// `APP_MODEL_DIR` wins when it points at an existing directory. Otherwise
/// the model is looked up under `models_dir` (relative to `base_dir`) by its
/// full identifier, then by its last path segment.
pub fn resolve_model_dir(settings: &EmbeddingSettings, base_dir: &Path) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.is_dir() {
            info!(dir = %p.display(), "using APP_MODEL_DIR");
            return Ok(p);
        }
        warn!(dir = %p.display(), "APP_MODEL_DIR is not a directory, ignoring");
    }
    let models_dir = resolve_with_base(base_dir, &settings.models_dir);
    let short = settings.model.rsplit('/').next().unwrap_or(&settings.model);
    let candidates = [models_dir.join(&settings.model), models_dir.join(short)];
    candidates
        .iter()
        .find(|p| p.is_dir())
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("model '{}' under {}", settings.model, models_dir.display())).into())
}

/// Deterministic bag-of-tokens embedding, L2 normalized.
///
/// Each whitespace token is hashed into one of `dim` buckets, so texts that
/// share words end up close to each other.
pub struct FakeEmbedder {
    dim: usize,
    max_len: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1), max_len: usize::MAX } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += 0.5 + val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

fn fake_requested(settings: &EmbeddingSettings) -> bool {
    settings.use_fake
        || std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// The embedder selected by configuration: the fake embedder when
/// `use_fake` or `APP_USE_FAKE_EMBEDDINGS` is set, the BERT encoder otherwise.
pub fn get_default_embedder(settings: &EmbeddingSettings, base_dir: &Path) -> Result<Box<dyn Embedder>> {
    if fake_requested(settings) {
        info!(dim = settings.fake_dim, "using fake embedder");
        return Ok(Box::new(FakeEmbedder::new(settings.fake_dim)));
    }
    Ok(Box::new(BertEmbedder::from_settings(settings, base_dir)?))
}
