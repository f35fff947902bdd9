//! Crossover and mutation over course-ordered individuals.
//!
//! Every individual keeps gene `i` for course `i`, so splicing two parents at
//! the same cut point always yields children that schedule each course once.

use rand::Rng;
use sched_core::{Gene, Problem};

use crate::generator::random_gene;

/// One-point crossover at `cut`: the first child takes `p1[..cut]` and
/// `p2[cut..]`, the second the complement.
pub fn crossover_at(p1: &[Gene], p2: &[Gene], cut: usize) -> (Vec<Gene>, Vec<Gene>) {
    debug_assert_eq!(p1.len(), p2.len());
    let cut = cut.min(p1.len());
    let mut a = Vec::with_capacity(p1.len());
    a.extend_from_slice(&p1[..cut]);
    a.extend_from_slice(&p2[cut..]);
    let mut b = Vec::with_capacity(p2.len());
    b.extend_from_slice(&p2[..cut]);
    b.extend_from_slice(&p1[cut..]);
    (a, b)
}

/// Cut drawn uniformly from `[1, len - 1]`; parents shorter than two genes are
/// copied unchanged.
pub fn crossover<R: Rng>(p1: &[Gene], p2: &[Gene], rng: &mut R) -> (Vec<Gene>, Vec<Gene>) {
    if p1.len() < 2 {
        return (p1.to_vec(), p2.to_vec());
    }
    let cut = rng.gen_range(1..p1.len());
    crossover_at(p1, p2, cut)
}

/// Resamples slot, room and instructor of each gene with probability `rate`.
/// Returns the number of genes touched.
pub fn mutate<R: Rng>(problem: &Problem, genes: &mut [Gene], rate: f64, rng: &mut R) -> usize {
    let mut touched = 0;
    for g in genes.iter_mut() {
        if rng.gen::<f64>() < rate {
            *g = random_gene(problem, g.course, rng);
            touched += 1;
        }
    }
    touched
}
