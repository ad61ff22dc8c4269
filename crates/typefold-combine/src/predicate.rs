//! Pairwise combinability of record types.
//!
//! Two records combine when they are close in size, share enough field
//! names, and every shared field has compatible non-null types. The test is
//! commutative but not transitive.
//!
//! # Rules
//!
//! 1. Size gate: the smaller record must have at least `required_overlap`
//!    times as many fields as the larger one.
//! 2. Overlap: at most `smaller - ceil(larger * required_overlap)` of the
//!    smaller record's fields may be missing from the larger one.
//! 3. Shared fields: when both sides have non-null alternatives, the two
//!    sets must have the same size and pair up by kind. Paired members must
//!    be structurally equal, except plain strings, which always pair.
//!    A side that is only `null` never blocks.

use std::collections::HashMap;

use tracing::trace;

use typefold_graph::{GraphError, TypeGraph};
use typefold_types::{RecordType, TypeKind, TypeRef};

use crate::error::{CombineError, CombineResult};

/// The combinability test bound to one graph generation.
#[derive(Clone, Copy, Debug)]
pub struct Combinability<'g> {
    graph: &'g TypeGraph,
    required_overlap: f64,
}

impl<'g> Combinability<'g> {
    /// Bind the test to `graph` with the given overlap ratio.
    pub fn new(graph: &'g TypeGraph, required_overlap: f64) -> Self {
        Self {
            graph,
            required_overlap,
        }
    }

    /// Can the records at `a` and `b` be merged?
    pub fn can_combine_refs(&self, a: TypeRef, b: TypeRef) -> CombineResult<bool> {
        let ra = self.graph.record(a).ok_or(CombineError::NotARecord(a))?;
        let rb = self.graph.record(b).ok_or(CombineError::NotARecord(b))?;
        let combinable = self.can_combine(ra, rb)?;
        trace!(a = %a, b = %b, combinable, "combinability");
        Ok(combinable)
    }

    /// Can records `a` and `b` be merged?
    pub fn can_combine(&self, a: &RecordType, b: &RecordType) -> CombineResult<bool> {
        let (larger, smaller) = if a.len() >= b.len() { (a, b) } else { (b, a) };

        if (smaller.len() as f64) < larger.len() as f64 * self.required_overlap {
            return Ok(false);
        }

        let min_overlap = (larger.len() as f64 * self.required_overlap).ceil() as usize;
        if smaller.len() < min_overlap {
            return Err(CombineError::NegativeFaultBudget {
                larger: larger.len(),
                smaller: smaller.len(),
                min_overlap,
            });
        }
        let max_faults = smaller.len() - min_overlap;

        let mut common = Vec::with_capacity(smaller.len());
        let mut faults = 0usize;
        for name in smaller.field_names() {
            if larger.has_field(name) {
                common.push(name);
            } else {
                faults += 1;
                if faults > max_faults {
                    return Ok(false);
                }
            }
        }

        for name in common {
            let ts = smaller
                .field(name)
                .ok_or_else(|| CombineError::MissingCommonField(name.to_string()))?;
            let tl = larger
                .field(name)
                .ok_or_else(|| CombineError::MissingCommonField(name.to_string()))?;

            let s1 = self.graph.non_null_members(ts)?;
            let s2 = self.graph.non_null_members(tl)?;
            if s1.is_empty() || s2.is_empty() {
                continue;
            }
            if !self.type_sets_can_be_combined(&s1, &s2)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Can two sets of non-null alternatives for one field be reconciled?
    pub fn type_sets_can_be_combined(&self, s1: &[TypeRef], s2: &[TypeRef]) -> CombineResult<bool> {
        if s1.len() != s2.len() {
            return Ok(false);
        }

        let mut by_kind: HashMap<TypeKind, TypeRef> = HashMap::with_capacity(s2.len());
        for t in s2 {
            by_kind.insert(self.kind(*t)?, *t);
        }

        for t1 in s1 {
            let kind = self.kind(*t1)?;
            let Some(t2) = by_kind.get(&kind) else {
                return Ok(false);
            };
            if kind.is_string() {
                continue;
            }
            if !self.graph.structurally_equal(*t1, *t2) {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn kind(&self, r: TypeRef) -> CombineResult<TypeKind> {
        Ok(self.graph.kind(r).ok_or(GraphError::NodeNotFound(r))?)
    }
}
