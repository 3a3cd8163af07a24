use candle_core::Tensor;

/// Output of a strategy forward pass.
#[derive(Debug)]
pub struct ModelOutput {
    /// Unnormalized scores, `[batch, vocab]`.
    pub logits: Tensor,
    /// Softmax of `logits`.
    pub probabilities: Tensor,
}
