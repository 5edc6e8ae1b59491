//! Train/evaluation partitioning.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ExportError;

/// Where evaluation samples come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Carve this percentage (0–100) out of the training pool.
    Percent(u8),
    /// Take every sample under a separate, pre-labeled directory tree.
    Dedicated(PathBuf),
}

impl Default for Evaluation {
    fn default() -> Self {
        Evaluation::Percent(10)
    }
}

impl Evaluation {
    pub fn validate(&self) -> Result<(), ExportError> {
        match self {
            Evaluation::Percent(p) if *p > 100 => Err(ExportError::InvalidConfig(format!(
                "evaluation percentage must be in 0..=100 (got {p})"
            ))),
            _ => Ok(()),
        }
    }
}

/// The two halves of a converted dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub eval: Vec<T>,
}

/// Number of evaluation samples for `total` items at `eval_percent`.
pub fn eval_count(total: usize, eval_percent: u8) -> usize {
    let raw = (total as f64 * eval_percent as f64 / 100.0).round() as usize;
    raw.min(total)
}

/// Shuffle in place. A seed makes the order reproducible.
pub fn shuffle<T>(items: &mut [T], seed: Option<u64>) {
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        items.shuffle(&mut rng);
    } else {
        let mut rng = rand::rng();
        items.shuffle(&mut rng);
    }
}

/// Shuffle, then take the evaluation share from the front.
pub fn split_by_percent<T>(mut items: Vec<T>, eval_percent: u8, seed: Option<u64>) -> Split<T> {
    shuffle(&mut items, seed);
    let train = items.split_off(eval_count(items.len(), eval_percent));
    Split { train, eval: items }
}

/// Keep both pools whole, shuffling each independently.
pub fn split_dedicated<T>(mut train: Vec<T>, mut eval: Vec<T>, seed: Option<u64>) -> Split<T> {
    shuffle(&mut train, seed);
    shuffle(&mut eval, seed.map(|s| s.wrapping_add(1)));
    Split { train, eval }
}
