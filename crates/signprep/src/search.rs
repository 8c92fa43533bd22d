use indicatif::{ParallelProgressIterator, ProgressBar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::prelude::*;

/// The best candidate found by [best_of].
#[derive(Debug)]
pub(crate) struct Best<C> {
    /// Position of the winning trial.
    pub(crate) trial: usize,
    pub(crate) seed: u64,
    pub(crate) score: usize,
    pub(crate) candidate: C,
}

/// Draws `trials` seeds from a generator seeded with `seed`.
pub(crate) fn draw_seeds(seed: u64, trials: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..trials).map(|_| rng.gen()).collect()
}

/// Evaluates a candidate for every seed and returns the one with the
/// highest score. Ties are broken by the position of the seed (first
/// found wins), so the result doesn't depend on the order in which the
/// trials are executed.
///
/// A trial, whose candidate can't be generated, doesn't take part in
/// the competition. If no trial succeeds, the error of the first trial
/// is returned.
pub(crate) fn best_of<C, G, S>(
    seeds: &[u64],
    generate: G,
    score: S,
    pbar: ProgressBar,
) -> SignprepResult<Best<C>>
where
    C: Send,
    G: Fn(u64) -> SignprepResult<C> + Sync,
    S: Fn(&C) -> usize + Sync,
{
    if seeds.is_empty() {
        bail!("at least one trial is required");
    }

    let scores: Vec<SignprepResult<usize>> = seeds
        .par_iter()
        .progress_with(pbar.clone())
        .map(|seed| generate(*seed).map(|candidate| score(&candidate)))
        .collect();

    pbar.finish_using_style();

    let mut best: Option<(usize, usize)> = None;
    let mut first_error = None;

    for (trial, result) in scores.into_iter().enumerate() {
        match result {
            Ok(score) => match best {
                Some((_, max)) if max >= score => {}
                _ => best = Some((trial, score)),
            },
            Err(e) => {
                log::debug!(
                    "trial {trial} (seed {}) failed: {e}",
                    seeds[trial]
                );
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    let Some((trial, score)) = best else {
        return Err(first_error.unwrap_or_else(|| {
            SignprepError::other("no trial has been evaluated")
        }));
    };

    let seed = seeds[trial];
    Ok(Best {
        trial,
        seed,
        score,
        candidate: generate(seed)?,
    })
}
