use chunkwise_core::{ChunkwiseError, Result};

fn is_finite(v: &[f32]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Dot product, accumulated in `f64`.
pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

/// Euclidean norm, accumulated in `f64`.
pub fn norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}

/// Cosine of the angle between `a` and `b`, in `[-1, 1]`.
///
/// Vectors of different lengths are a `DimensionMismatch` and a NaN or
/// infinite component is a `NonFiniteEmbedding`. A zero vector on either
/// side scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ChunkwiseError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if !is_finite(a) || !is_finite(b) {
        return Err(ChunkwiseError::NonFiniteEmbedding);
    }
    let denom = norm(a) * norm(b);
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok((dot(a, b) / denom).clamp(-1.0, 1.0) as f32)
}
