//! Greedy first-fit partition of candidates into cliques.
//!
//! Each round seeds a clique with the first remaining candidate, then walks
//! the rest in order. A candidate joins only if it combines with every
//! member already in the clique; otherwise it is left for a later round.
//! Singleton cliques are dropped. The result depends on input order, so
//! callers must pass candidates in a fixed order (discovery order).
//!
//! This is a heuristic partition, not a maximum-clique search. Worst case
//! is quadratic in the number of remaining candidates per round.

use tracing::debug;

use crate::error::CombineResult;

/// Partition `candidates` into cliques of size two or more.
///
/// `combinable` is never assumed to be transitive: every member of an
/// emitted clique has been checked against every other member.
pub fn build_cliques<T, F>(candidates: &[T], mut combinable: F) -> CombineResult<Vec<Vec<T>>>
where
    T: Copy,
    F: FnMut(T, T) -> CombineResult<bool>,
{
    let mut remaining: Vec<T> = candidates.to_vec();
    let mut cliques = Vec::new();
    let mut round = 0usize;

    while let Some((&seed, rest)) = remaining.split_first() {
        let mut clique = vec![seed];
        let mut leftover = Vec::new();

        for &candidate in rest {
            let mut fits = true;
            for &member in &clique {
                if !combinable(member, candidate)? {
                    fits = false;
                    break;
                }
            }
            if fits {
                clique.push(candidate);
            } else {
                leftover.push(candidate);
            }
        }

        round += 1;
        if clique.len() > 1 {
            debug!(round, size = clique.len(), "formed clique");
            cliques.push(clique);
        }
        remaining = leftover;
    }

    Ok(cliques)
}
