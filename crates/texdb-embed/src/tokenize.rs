use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Model inputs for one padded batch, each shaped `[batch, seq]`.
pub struct BatchInputs {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

/// Encode `texts`, truncate each to `max_len` tokens and pad to the longest
/// sequence in the batch.
///
/// Positions the tokenizer itself padded (attention mask 0) are dropped
/// before truncation, so a fixed padding length in `tokenizer.json` never
/// reaches the pooled tokens. Truncation keeps the trailing special token.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<BatchInputs> {
    let pad_id = pad_token_id(tokenizer);
    let mut rows = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids: Vec<u32> = enc
            .get_ids()
            .iter()
            .zip(enc.get_attention_mask())
            .filter(|(_, attend)| **attend != 0)
            .map(|(&id, _)| id)
            .collect();
        if ids.len() > max_len {
            let last = ids[ids.len() - 1];
            ids.truncate(max_len);
            if let Some(tail) = ids.last_mut() { *tail = last; }
        }
        rows.push(ids);
    }

    let seq = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let mut ids = Vec::with_capacity(rows.len() * seq);
    let mut mask = Vec::with_capacity(rows.len() * seq);
    for row in &rows {
        let pad = seq - row.len();
        ids.extend_from_slice(row);
        ids.extend(std::iter::repeat(pad_id).take(pad));
        mask.extend(std::iter::repeat(1u32).take(row.len()));
        mask.extend(std::iter::repeat(0u32).take(pad));
    }

    let shape = (rows.len(), seq);
    let input_ids = Tensor::from_vec(ids, shape, device)?;
    let attention_mask = Tensor::from_vec(mask, shape, device)?;
    let token_type_ids = input_ids.zeros_like()?;
    Ok(BatchInputs { input_ids, attention_mask, token_type_ids })
}

fn pad_token_id(tokenizer: &Tokenizer) -> u32 {
    tokenizer
        .get_padding()
        .map(|p| p.pad_id)
        .or_else(|| tokenizer.token_to_id("[PAD]"))
        .unwrap_or(0)
}
