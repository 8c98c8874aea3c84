//! Sampling without replacement for round selection.

use rand::Rng;

use crate::error::QuizError;

/// Draw `count` distinct names uniformly at random from `pool`, without
/// replacement (partial Fisher–Yates over an index vector). The caller
/// supplies the `Rng`; production uses `rand::rng()`, tests a seeded
/// `StdRng`.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    pool: &[String],
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, QuizError> {
    if pool.len() < count {
        return Err(QuizError::InsufficientPool {
            available: pool.len(),
            requested: count,
        });
    }

    let mut indices: Vec<usize> = (0..pool.len()).collect();
    for i in 0..count {
        let j = rng.random_range(i..indices.len());
        indices.swap(i, j);
    }

    Ok(indices[..count].iter().map(|&i| pool[i].clone()).collect())
}
