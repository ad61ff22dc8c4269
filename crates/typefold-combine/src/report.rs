use serde::{Deserialize, Serialize};

use typefold_types::TypeRef;

/// What a combine pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineReport {
    /// Number of unpinned records considered.
    pub candidates: usize,
    /// The cliques found, as refs into the input graph.
    pub cliques: Vec<Vec<TypeRef>>,
    /// The merged node each clique became, as refs into the output graph.
    /// Parallel to `cliques`.
    pub merged: Vec<TypeRef>,
}

impl CombineReport {
    /// Returns `true` if nothing was merged.
    pub fn is_noop(&self) -> bool {
        self.cliques.is_empty()
    }

    /// Total number of input records that were folded into merged nodes.
    pub fn merged_records(&self) -> usize {
        self.cliques.iter().map(Vec::len).sum()
    }

    /// The output node for an input record, if it was part of a clique.
    pub fn merged_into(&self, record: TypeRef) -> Option<TypeRef> {
        self.cliques
            .iter()
            .zip(&self.merged)
            .find(|(clique, _)| clique.contains(&record))
            .map(|(_, merged)| *merged)
    }
}
