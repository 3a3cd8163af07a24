use super::config::DistogramToSequenceConfig;
use candle_core::{Module, Result, Tensor, D};
use candle_nn::{linear, ops::softmax, Linear, VarBuilder};

/// Multi-head attention whose queries and keys come from different streams.
///
/// Projections follow the usual `q`, `k`, `v`, `out` layout with biases. Padding
/// keys are removed through an additive bias of `-inf`, see [`key_padding_bias`].
#[derive(Debug)]
pub struct MaskedAttention {
    q: Linear,
    k: Linear,
    v: Linear,
    out: Linear,
    num_heads: usize,
    head_dim: usize,
}

impl MaskedAttention {
    pub fn load(vb: VarBuilder, config: &DistogramToSequenceConfig, layer: usize) -> Result<Self> {
        let hidden = config.hidden_size;
        let vb = vb.pp(layer);
        Ok(Self {
            q: linear(hidden, hidden, vb.pp("q"))?,
            k: linear(hidden, hidden, vb.pp("k"))?,
            v: linear(hidden, hidden, vb.pp("v"))?,
            out: linear(hidden, hidden, vb.pp("out"))?,
            num_heads: config.num_heads,
            head_dim: config.head_dim(),
        })
    }

    // [batch, len, hidden] -> [batch, heads, len, head_dim]
    fn split_heads(&self, x: &Tensor) -> Result<Tensor> {
        let (batch_size, seq_len, _) = x.dims3()?;
        x.reshape((batch_size, seq_len, self.num_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    /// `query` and `key_value` are `[batch, len, hidden]`; `key_bias` is the
    /// `[batch, 1, 1, len]` output of [`key_padding_bias`].
    pub fn forward(&self, query: &Tensor, key_value: &Tensor, key_bias: &Tensor) -> Result<Tensor> {
        let (batch_size, seq_len, hidden) = query.dims3()?;
        let q = self.split_heads(&self.q.forward(query)?)?;
        let k = self.split_heads(&self.k.forward(key_value)?)?;
        let v = self.split_heads(&self.v.forward(key_value)?)?;

        let scaling = 1.0 / (self.head_dim as f64).sqrt();
        // (B, H, L, L)
        let scores = (q.matmul(&k.transpose(D::Minus2, D::Minus1)?.contiguous()?)? * scaling)?;
        let scores = scores.broadcast_add(key_bias)?;
        let attn = softmax(&scores, D::Minus1)?;

        let context = attn
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((batch_size, seq_len, hidden))?;
        self.out.forward(&context)
    }
}

/// `0` for valid keys and `-inf` for padding, shaped `[batch, 1, 1, len]` to
/// broadcast over heads and queries.
pub fn key_padding_bias(mask: &Tensor) -> Result<Tensor> {
    let (batch_size, seq_len) = mask.dims2()?;
    let zeros = mask.zeros_like()?;
    let neg_inf = Tensor::full(f32::NEG_INFINITY, (batch_size, seq_len), mask.device())?;
    mask.eq(&zeros)?
        .where_cond(&neg_inf, &zeros)?
        .reshape((batch_size, 1, 1, seq_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    fn config() -> DistogramToSequenceConfig {
        DistogramToSequenceConfig {
            hidden_size: 8,
            num_layers: 1,
            num_heads: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_key_padding_bias() -> Result<()> {
        let mask = Tensor::new(&[[1f32, 1., 0.], [1., 0., 0.]], &Device::Cpu)?;
        let bias = key_padding_bias(&mask)?;
        assert_eq!(bias.dims(), &[2, 1, 1, 3]);
        let values = bias.flatten_all()?.to_vec1::<f32>()?;
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 0.0);
        assert_eq!(values[2], f32::NEG_INFINITY);
        assert_eq!(values[4], f32::NEG_INFINITY);
        Ok(())
    }

    #[test]
    fn test_padding_keys_do_not_leak() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let attention = MaskedAttention::load(vb, &config(), 0)?;

        let query = Tensor::randn(0f32, 1., (1, 4, 8), &device)?;
        let mask = Tensor::new(&[[1f32, 1., 0., 0.]], &device)?;
        let bias = key_padding_bias(&mask)?;

        // changing the values behind padded keys must not change the output
        let base = Tensor::randn(0f32, 1., (1, 4, 8), &device)?;
        let noise = Tensor::randn(0f32, 100., (1, 2, 8), &device)?;
        let perturbed = Tensor::cat(&[base.narrow(1, 0, 2)?, noise], 1)?;

        let a = attention.forward(&query, &base, &bias)?;
        let b = attention.forward(&query, &perturbed, &bias)?;
        let diff = (a - b)?.abs()?.max_all()?.to_scalar::<f32>()?;
        assert!(diff < 1e-4, "max difference {diff}");
        Ok(())
    }
}
