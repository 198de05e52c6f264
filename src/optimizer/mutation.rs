use crate::config::PermutationPolicy;
use crate::library::{CellRecord, LibraryDescription};
use fastrand::Rng;

pub const REQUIRED_PARAMETERS: usize = 7;
pub const NEUTRAL_VALUE: f64 = 1.0;

/// The seven values a genlib gate needs, in positional order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pub area: f64,
    pub rise_block_delay: f64,
    pub fall_block_delay: f64,
    pub rise_fanout_delay: f64,
    pub fall_fanout_delay: f64,
    pub input_load: f64,
    pub max_load: f64,
}

impl ParameterSet {
    /// Binds the first seven values. Callers pad beforehand.
    pub fn from_values(values: &[f64]) -> Self {
        debug_assert!(values.len() >= REQUIRED_PARAMETERS);
        Self {
            area: values[0],
            rise_block_delay: values[1],
            fall_block_delay: values[2],
            rise_fanout_delay: values[3],
            fall_fanout_delay: values[4],
            input_load: values[5],
            max_load: values[6],
        }
    }
}

/// Declared numeric values of a cell in declaration order.
/// Missing or non-numeric fields degrade to the neutral value.
pub fn collect_attributes(cell: &CellRecord, library: &LibraryDescription) -> Vec<f64> {
    library
        .numeric_attributes()
        .map(|name| cell.attribute_value(name).unwrap_or(NEUTRAL_VALUE))
        .collect()
}

pub fn pad_to_required(values: &mut Vec<f64>) {
    while values.len() < REQUIRED_PARAMETERS {
        values.push(NEUTRAL_VALUE);
    }
}

/// `n!`, or `None` once it no longer fits in a usize.
pub fn permutation_count(n: usize) -> Option<usize> {
    (1..=n).try_fold(1usize, |acc, k| acc.checked_mul(k))
}

/// The permutation at `index` in lexicographic order of positions
/// (the same order `itertools::permutations` yields).
pub fn nth_permutation<T: Clone>(values: &[T], index: usize) -> Vec<T> {
    let n = values.len();
    let mut index = match permutation_count(n) {
        Some(total) => index % total,
        None => index,
    };

    let mut pool: Vec<T> = values.to_vec();
    let mut out = Vec::with_capacity(n);
    for remaining in (1..=n).rev() {
        // Block size for the current leading position is (remaining - 1)!.
        let block = permutation_count(remaining - 1).unwrap_or(usize::MAX);
        let pick = index / block;
        index %= block;
        out.push(pool.remove(pick));
    }
    out
}

/// Orders the padded value list for one iteration.
pub fn reorder(values: &mut Vec<f64>, iteration: usize, policy: PermutationPolicy, rng: &mut Rng) {
    match policy {
        PermutationPolicy::Shuffle => rng.shuffle(values),
        PermutationPolicy::Indexed => *values = nth_permutation(values, iteration),
    }
}

pub fn derive_parameters(
    cell: &CellRecord,
    library: &LibraryDescription,
    iteration: usize,
    policy: PermutationPolicy,
    rng: &mut Rng,
) -> ParameterSet {
    let mut values = collect_attributes(cell, library);
    pad_to_required(&mut values);
    reorder(&mut values, iteration, policy, rng);
    ParameterSet::from_values(&values)
}
