//! Seeded train/test splitting with stratification

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed seed so repeated splits of the same state are reproducible
pub const SPLIT_SEED: u64 = 42;

/// The four partitions produced by a split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

impl TrainTestSplit {
    pub fn train_rows(&self) -> usize {
        self.x_train.nrows()
    }

    pub fn test_rows(&self) -> usize {
        self.x_test.nrows()
    }
}

/// Split rows into train/test partitions with a fixed seed.
///
/// Attempts a stratified split keyed on the target when it has more than one
/// distinct value; falls back to a plain shuffled split if stratification is
/// not possible (e.g. a class with a single member).
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
) -> Result<TrainTestSplit> {
    let n = x.nrows();
    if n != y.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }

    let n_test = validated_test_count(n, test_size)?;

    let groups = group_by_class(y);
    let stratify = groups.len() > 1;

    let test_indices = if stratify {
        match stratified_test_indices(&groups, test_size, n_test) {
            Some(indices) => indices,
            // e.g. singleton class: plain shuffled split instead
            None => shuffled_test_indices(n, n_test),
        }
    } else {
        shuffled_test_indices(n, n_test)
    };

    let mut in_test = vec![false; n];
    for &i in &test_indices {
        in_test[i] = true;
    }
    let train_indices: Vec<usize> = (0..n).filter(|&i| !in_test[i]).collect();

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: train_indices.iter().map(|&i| y[i]).collect(),
        y_test: test_indices.iter().map(|&i| y[i]).collect(),
    })
}

/// The split routine itself enforces the fraction: both partitions must be
/// non-empty.
fn validated_test_count(n: usize, test_size: f64) -> Result<usize> {
    if !test_size.is_finite() || test_size <= 0.0 || test_size >= 1.0 {
        return Err(PipelineError::ComputationError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::ComputationError(format!(
            "test_size {} leaves an empty partition for {} rows",
            test_size, n
        )));
    }
    Ok(n_test)
}

/// Group row indices by target class. BTreeMap over the label's bit pattern
/// keeps the iteration order deterministic.
fn group_by_class(y: &Array1<f64>) -> BTreeMap<u64, Vec<usize>> {
    let mut groups: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        groups.entry(label.to_bits()).or_default().push(i);
    }
    groups
}

fn shuffled_test_indices(n: usize, n_test: usize) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    indices.truncate(n_test);
    indices
}

/// Pick test indices per class, preserving class proportions. Returns None
/// when stratification cannot produce a valid split.
fn stratified_test_indices(
    groups: &BTreeMap<u64, Vec<usize>>,
    test_size: f64,
    n_test: usize,
) -> Option<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    let mut test_indices = Vec::with_capacity(n_test);

    for indices in groups.values() {
        // A class needs at least one member on each side
        if indices.len() < 2 {
            return None;
        }

        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);

        let take = ((indices.len() as f64) * test_size).round() as usize;
        let take = take.clamp(1, indices.len() - 1);
        test_indices.extend_from_slice(&shuffled[..take]);
    }

    Some(test_indices)
}
