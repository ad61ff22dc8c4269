//! Merging one clique of records into a single record type.
//!
//! For every field name that appears in any member, the types found under
//! that name are reduced to one merged type:
//!
//! - no non-null type anywhere: `null`
//! - plain/enumerated strings: if every member carries a histogram, the
//!   histograms are summed; otherwise the first member's string is kept
//!   and enumeration data is dropped
//! - anything else: the first member's type, carried into the new graph
//!
//! A field is nullable in the merged record when at least one member lacks
//! it or holds a nullable type for it.

use std::collections::BTreeMap;

use tracing::warn;

use typefold_graph::{Rewriter, TypeGraph};
use typefold_types::{NameHints, PrimitiveKind, StringHistogram, Type, TypeRef};

use crate::error::{CombineError, CombineResult};

/// The types found under one field name across a clique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldTypes {
    /// Non-null payloads (old-graph refs), in member order. A member whose
    /// field has exactly one non-null alternative contributes that
    /// alternative; a multi-alternative union is contributed whole.
    pub types: Vec<TypeRef>,
    /// Some member lacks the field or allows `null` for it.
    pub nullable: bool,
    /// Union of the name hints of the members' field types.
    pub names: NameHints,
}

/// Gather, per field name, the types of that field across `members`.
pub fn collect_field_types(
    graph: &TypeGraph,
    members: &[TypeRef],
) -> CombineResult<BTreeMap<String, FieldTypes>> {
    let mut records = Vec::with_capacity(members.len());
    for member in members {
        let record = graph.record(*member).ok_or(CombineError::NotARecord(*member))?;
        records.push(record);
    }

    let mut fields: BTreeMap<String, FieldTypes> = BTreeMap::new();
    for record in &records {
        for name in record.field_names() {
            fields.entry(name.to_string()).or_default();
        }
    }

    for (name, collected) in fields.iter_mut() {
        let mut hints = Vec::new();
        for record in &records {
            let Some(ty) = record.field(name) else {
                collected.nullable = true;
                continue;
            };
            if graph.is_nullable(ty) {
                collected.nullable = true;
            }
            if let Some(names) = graph.names(ty) {
                hints.push(names);
            }
            let non_null = graph.non_null_members(ty)?;
            match non_null.as_slice() {
                [] => {}
                [single] => collected.types.push(*single),
                _ => collected.types.push(ty),
            }
        }
        collected.names = NameHints::union_all(hints);
    }

    Ok(fields)
}

/// Build the merged type for one field in the new graph generation.
pub fn merge_field(
    rw: &mut Rewriter<'_>,
    field: &str,
    collected: &FieldTypes,
) -> CombineResult<TypeRef> {
    let old = rw.old();

    let merged = match collected.types.first() {
        None => rw.builder().new_primitive(PrimitiveKind::Null),
        Some(&representative) => {
            let rep_ty = old.resolve(representative)?;
            if rep_ty.kind().is_string() {
                merge_strings(rw, field, collected, representative)?
            } else {
                if matches!(rep_ty, Type::Union(_)) && union_enumerations_differ(old, collected)? {
                    warn!(field, "union members carry differing enumerations; enumeration dropped");
                }
                rw.reconstitute(representative)?
            }
        }
    };

    if collected.nullable {
        Ok(rw.builder().make_nullable(merged, collected.names.clone())?)
    } else {
        Ok(merged)
    }
}

fn merge_strings(
    rw: &mut Rewriter<'_>,
    field: &str,
    collected: &FieldTypes,
    representative: TypeRef,
) -> CombineResult<TypeRef> {
    let old = rw.old();

    let mut histograms: Vec<Option<&StringHistogram>> = Vec::with_capacity(collected.types.len());
    for t in &collected.types {
        match old.resolve(*t)? {
            Type::String(s) => histograms.push(s.histogram.as_ref()),
            other => {
                return Err(CombineError::MixedStringKinds {
                    field: field.to_string(),
                    other: other.kind().to_string(),
                })
            }
        }
    }

    if histograms.iter().all(Option::is_some) {
        let merged = StringHistogram::merge_all(histograms.into_iter().flatten());
        let names = NameHints::union_all(collected.types.iter().filter_map(|t| old.names(*t)));
        return Ok(rw.builder().new_string(names, Some(merged)));
    }

    if histograms.iter().any(Option::is_some) {
        warn!(field, "mixed enumerated and plain strings; enumeration dropped");
    }
    Ok(rw.reconstitute(representative)?)
}

/// Do the string alternatives of the collected field types carry
/// different histograms? Only the representative's survives a union merge.
fn union_enumerations_differ(graph: &TypeGraph, collected: &FieldTypes) -> CombineResult<bool> {
    let mut seen: Option<Option<&StringHistogram>> = None;
    for t in &collected.types {
        for member in graph.non_null_members(*t)? {
            let Type::String(s) = graph.resolve(member)? else {
                continue;
            };
            match seen {
                None => seen = Some(s.histogram.as_ref()),
                Some(first) if first != s.histogram.as_ref() => return Ok(true),
                Some(_) => {}
            }
        }
    }
    Ok(false)
}

/// Build the merged record for `members` into `slot`.
///
/// This is the rewrite constructor used by the orchestrator.
pub fn build_merged_record(
    members: &[TypeRef],
    rw: &mut Rewriter<'_>,
    slot: TypeRef,
) -> CombineResult<TypeRef> {
    let old = rw.old();
    let collected = collect_field_types(old, members)?;

    let mut fields = BTreeMap::new();
    for (name, field_types) in &collected {
        let merged = merge_field(rw, name, field_types)?;
        fields.insert(name.clone(), merged);
    }

    let names = NameHints::union_all(members.iter().filter_map(|m| old.names(*m)));
    Ok(rw.builder().new_record_type(names, fields, false, Some(slot))?)
}
