//! The combine pass: select candidates, build cliques, rewrite the graph.
//!
//! Candidates are the unpinned records of the input graph in discovery
//! order. That order is the only source of ordering in the pass, so the
//! output is reproducible for a given input graph.

use tracing::info;

use typefold_graph::TypeGraph;
use typefold_types::TypeRef;

use crate::clique::build_cliques;
use crate::config::CombineConfig;
use crate::error::CombineResult;
use crate::merge::build_merged_record;
use crate::predicate::Combinability;
use crate::report::CombineReport;

/// Merge near-duplicate record types and return the new graph.
pub fn combine(graph: &TypeGraph, config: &CombineConfig) -> CombineResult<TypeGraph> {
    combine_with_report(graph, config).map(|(graph, _)| graph)
}

/// Like [`combine`], also reporting which records were merged.
pub fn combine_with_report(
    graph: &TypeGraph,
    config: &CombineConfig,
) -> CombineResult<(TypeGraph, CombineReport)> {
    config.validate()?;

    let candidates: Vec<TypeRef> = graph
        .records()
        .into_iter()
        .filter(|(_, record)| !record.pinned)
        .map(|(r, _)| r)
        .collect();

    let check = Combinability::new(graph, config.required_overlap);
    let cliques = build_cliques(&candidates, |a, b| check.can_combine_refs(a, b))?;

    let mut merged = Vec::with_capacity(cliques.len());
    let combined = graph.rewrite(
        &cliques,
        &config.string_mapping,
        |members, rw, slot| -> CombineResult<TypeRef> {
            let built = build_merged_record(members, rw, slot)?;
            merged.push(built);
            Ok(built)
        },
    )?;

    let report = CombineReport {
        candidates: candidates.len(),
        cliques,
        merged,
    };
    info!(
        candidates = report.candidates,
        cliques = report.cliques.len(),
        merged_records = report.merged_records(),
        nodes_before = graph.len(),
        nodes_after = combined.len(),
        "combined record types"
    );

    Ok((combined, report))
}
