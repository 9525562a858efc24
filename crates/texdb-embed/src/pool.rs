use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

/// Smallest token count divided by, so an all-masked row pools to zeros.
pub const MIN_TOKEN_COUNT: f32 = 1e-9;

/// Attention-masked mean over the sequence axis: `[B,T,H]` -> `[B,H]`.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    ensure!(dims.len() == 3, "hidden shape must be [B,T,H], got {:?}", dims);
    let (batch, hidden_dim) = (dims[0], dims[2]);

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_broadcast = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let sum = (hidden * &mask_broadcast)?.sum(1)?;
    let floor = Tensor::new(&[MIN_TOKEN_COUNT], hidden.device())?.to_dtype(hidden.dtype())?;
    let counts = mask.sum_keepdim(1)?.broadcast_maximum(&floor)?;
    let mean = sum.broadcast_div(&counts)?;
    ensure!(mean.dims() == [batch, hidden_dim], "pooled shape mismatch: {:?}", mean.dims());
    Ok(mean)
}

/// Scale each row of `[B,H]` to unit length.
pub fn l2_normalize(emb: &Tensor) -> Result<Tensor> {
    let eps_val = match emb.dtype() { DType::F16 | DType::BF16 => 1e-6f64, _ => 1e-12f64 };
    let norm = emb.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, eps_val)?;
    Ok(emb.broadcast_div(&norm)?)
}
