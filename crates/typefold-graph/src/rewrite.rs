//! Atomic multi-group substitution.
//!
//! [`TypeGraph::rewrite`] replaces each group of nodes with one new node and
//! redirects every reference to a group member onto that node. The result is
//! a new graph generation; the input graph is left untouched, and any error
//! aborts the whole rewrite without producing a partial graph.
//!
//! New indices are assigned in old-arena order. A group takes the position
//! of its first member, so the relative order of records is preserved.
//!
//! When the string format policy lowers a union member to a plain string,
//! the union may end up with two string members. Such unions are narrowed
//! before copying: a plain string already present wins, otherwise the first
//! lowered member stays. A union narrowed to one non-union member is not
//! copied at all; references to it go straight to that member.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace};

use typefold_types::{StringTypeMapping, Type, TypeKind, TypeRef};

use crate::builder::TypeBuilder;
use crate::error::{GraphError, GraphResult};
use crate::graph::TypeGraph;

/// Handle given to a rewrite constructor.
///
/// It exposes the old generation (read-only), the translation of old refs
/// into the new generation, and the builder for the new generation.
#[derive(Debug)]
pub struct Rewriter<'a> {
    old: &'a TypeGraph,
    forward: Vec<TypeRef>,
    builder: TypeBuilder,
}

impl<'a> Rewriter<'a> {
    /// The graph being rewritten.
    pub fn old(&self) -> &'a TypeGraph {
        self.old
    }

    /// The new-generation ref of an old node.
    ///
    /// Retained nodes map to their copies; group members map to the slot of
    /// their group.
    pub fn reconstitute(&self, old_ref: TypeRef) -> GraphResult<TypeRef> {
        self.forward
            .get(old_ref.index())
            .copied()
            .ok_or(GraphError::NodeNotFound(old_ref))
    }

    /// The builder for the new generation.
    pub fn builder(&mut self) -> &mut TypeBuilder {
        &mut self.builder
    }
}

impl TypeGraph {
    /// Replace each group with one node built by `constructor`.
    ///
    /// `constructor` receives the group's members (old refs), the
    /// [`Rewriter`], and the forwarding slot reserved for the group. It must
    /// fill that slot and return it. Retained nodes are copied forward with
    /// their child refs translated and `mapping` applied to string formats.
    pub fn rewrite<E, F>(
        &self,
        groups: &[Vec<TypeRef>],
        mapping: &StringTypeMapping,
        mut constructor: F,
    ) -> Result<TypeGraph, E>
    where
        E: From<GraphError>,
        F: FnMut(&[TypeRef], &mut Rewriter<'_>, TypeRef) -> Result<TypeRef, E>,
    {
        self.validate()?;

        let mut group_of: Vec<Option<usize>> = vec![None; self.len()];
        for (g, group) in groups.iter().enumerate() {
            if group.is_empty() {
                return Err(GraphError::EmptyGroup(g).into());
            }
            for member in group {
                match group_of.get_mut(member.index()) {
                    None => return Err(GraphError::NodeNotFound(*member).into()),
                    Some(Some(_)) => return Err(GraphError::DuplicateGroupMember(*member).into()),
                    Some(entry) => *entry = Some(g),
                }
            }
        }

        let narrowed = self.narrow_unions(&group_of, mapping)?;
        let mut aliases = BTreeMap::new();
        for (union, kept) in &narrowed {
            if let [only] = kept.as_slice() {
                if !matches!(self.resolve(*only)?, Type::Union(_)) {
                    aliases.insert(union.index(), only.index());
                }
            }
        }

        let mut builder = TypeBuilder::with_mapping(mapping.clone());
        let mut group_slots: Vec<Option<TypeRef>> = vec![None; groups.len()];
        let mut slots: Vec<Option<TypeRef>> = vec![None; self.len()];
        for (i, assigned) in group_of.iter().enumerate() {
            if aliases.contains_key(&i) {
                continue;
            }
            slots[i] = Some(match assigned {
                Some(g) => *group_slots[*g].get_or_insert_with(|| builder.reserve()),
                None => builder.reserve(),
            });
        }
        for (union, target) in &aliases {
            slots[*union] = slots[*target];
        }
        let forward = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.ok_or(GraphError::NodeNotFound(TypeRef::new(i as u32))))
            .collect::<GraphResult<Vec<_>>>()?;

        let mut rewriter = Rewriter {
            old: self,
            forward,
            builder,
        };

        for (old_ref, node) in self.iter() {
            if group_of[old_ref.index()].is_some() || aliases.contains_key(&old_ref.index()) {
                continue;
            }
            let ty = match narrowed.get(&old_ref) {
                Some(kept) => Type::Union(kept.clone()),
                None => node.ty.clone(),
            };
            let ty = ty.map_refs(|child| rewriter.forward[child.index()]);
            let slot = rewriter.forward[old_ref.index()];
            rewriter.builder.copy_into(slot, ty, node.names.clone())?;
        }

        for (group, slot) in groups.iter().zip(&group_slots) {
            let Some(slot) = *slot else {
                continue;
            };
            let built = constructor(group.as_slice(), &mut rewriter, slot)?;
            if built != slot {
                return Err(GraphError::ForwardingMismatch {
                    expected: slot,
                    actual: built,
                }
                .into());
            }
            debug!(members = group.len(), slot = %slot, "rewrote group");
        }

        for (name, target) in self.roots() {
            let redirected = rewriter.forward[target.index()];
            rewriter.builder.add_root(name.clone(), redirected)?;
        }

        let graph = rewriter.builder.finish()?;
        debug!(
            groups = groups.len(),
            old_nodes = self.len(),
            new_nodes = graph.len(),
            "graph rewrite complete"
        );
        Ok(graph)
    }
    /// Unions (outside any group) whose members collide once `mapping`
    /// lowers string formats, with the members that survive, in order.
    fn narrow_unions(
        &self,
        group_of: &[Option<usize>],
        mapping: &StringTypeMapping,
    ) -> GraphResult<BTreeMap<TypeRef, Vec<TypeRef>>> {
        let mut narrowed = BTreeMap::new();
        for (r, node) in self.iter() {
            let Type::Union(members) = &node.ty else {
                continue;
            };
            if group_of[r.index()].is_some() {
                continue;
            }

            let mut lowered = Vec::with_capacity(members.len());
            for member in members {
                lowered.push(matches!(
                    self.resolve(*member)?,
                    Type::Formatted(format) if mapping.lowers(*format)
                ));
            }
            if !lowered.iter().any(|l| *l) {
                continue;
            }

            let mut keep = vec![false; members.len()];
            let mut kinds = HashSet::new();
            for pass in [false, true] {
                for (i, member) in members.iter().enumerate() {
                    if lowered[i] != pass {
                        continue;
                    }
                    let kind = if pass {
                        TypeKind::String
                    } else {
                        self.kind(*member).ok_or(GraphError::NodeNotFound(*member))?
                    };
                    keep[i] = kinds.insert(kind);
                }
            }

            if keep.iter().all(|k| *k) {
                continue;
            }
            let kept: Vec<TypeRef> = members
                .iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(m, _)| *m)
                .collect();
            trace!(union = %r, before = members.len(), after = kept.len(), "narrowed union");
            narrowed.insert(r, kept);
        }
        Ok(narrowed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use typefold_types::{FormatMapping, NameHints, PrimitiveKind, StringFormat, TypeKind};

    fn fields(pairs: &[(&str, TypeRef)]) -> BTreeMap<String, TypeRef> {
        pairs.iter().map(|(n, r)| (n.to_string(), *r)).collect()
    }

    /// `holder {a: A, b: B}` where A = {x: integer} and B = {x: integer}.
    fn holder_graph() -> (TypeGraph, TypeRef, TypeRef, TypeRef) {
        let mut b = TypeBuilder::new();
        let int = b.new_primitive(PrimitiveKind::Integer);
        let ra = b
            .new_record_type(NameHints::inferred("a"), fields(&[("x", int)]), false, None)
            .unwrap();
        let rb = b
            .new_record_type(NameHints::inferred("b"), fields(&[("x", int)]), false, None)
            .unwrap();
        let holder = b
            .new_record_type(
                NameHints::explicit("Holder"),
                fields(&[("a", ra), ("b", rb)]),
                true,
                None,
            )
            .unwrap();
        b.add_root("Holder", holder).unwrap();
        (b.finish().unwrap(), ra, rb, holder)
    }

    /// Constructor that rebuilds the first member with unioned names.
    fn merge_first(
        members: &[TypeRef],
        rw: &mut Rewriter<'_>,
        slot: TypeRef,
    ) -> GraphResult<TypeRef> {
        let old = rw.old();
        let names = NameHints::union_all(members.iter().filter_map(|m| old.names(*m)));
        let record = old.record(members[0]).ok_or(GraphError::NodeNotFound(members[0]))?;
        let mut new_fields = BTreeMap::new();
        for (name, ty) in &record.fields {
            new_fields.insert(name.clone(), rw.reconstitute(*ty)?);
        }
        rw.builder().new_record_type(names, new_fields, false, Some(slot))
    }

    #[test]
    fn references_are_redirected() {
        let (graph, ra, rb, _) = holder_graph();
        let rewritten = graph
            .rewrite(&[vec![ra, rb]], &StringTypeMapping::default(), merge_first)
            .unwrap();

        let holder = rewritten.root("Holder").unwrap();
        let record = rewritten.record(holder).unwrap();
        assert_eq!(record.field("a"), record.field("b"));
        let merged = record.field("a").unwrap();
        let names: Vec<&str> = rewritten.names(merged).unwrap().names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(rewritten.len(), graph.len() - 1);
    }

    #[test]
    fn input_graph_is_untouched() {
        let (graph, ra, rb, _) = holder_graph();
        let before = graph.clone();
        let _ = graph
            .rewrite(&[vec![ra, rb]], &StringTypeMapping::default(), merge_first)
            .unwrap();
        assert_eq!(graph, before);
    }

    #[test]
    fn group_takes_position_of_first_member() {
        let (graph, ra, rb, _) = holder_graph();
        let rewritten = graph
            .rewrite(&[vec![rb, ra]], &StringTypeMapping::default(), merge_first)
            .unwrap();
        let order: Vec<String> = rewritten
            .records()
            .into_iter()
            .map(|(r, _)| rewritten.names(r).and_then(|n| n.first()).unwrap_or("").to_string())
            .collect();
        assert_eq!(order, vec!["a".to_string(), "Holder".to_string()]);
    }

    #[test]
    fn overlapping_groups_are_rejected() {
        let (graph, ra, rb, _) = holder_graph();
        let err = graph
            .rewrite(&[vec![ra, rb], vec![rb]], &StringTypeMapping::default(), merge_first)
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateGroupMember(rb));
    }

    #[test]
    fn empty_group_is_rejected() {
        let (graph, _, _, _) = holder_graph();
        let err = graph
            .rewrite(&[vec![]], &StringTypeMapping::default(), merge_first)
            .unwrap_err();
        assert_eq!(err, GraphError::EmptyGroup(0));
    }

    #[test]
    fn constructor_must_fill_its_slot() {
        let (graph, ra, rb, _) = holder_graph();
        let err = graph
            .rewrite(&[vec![ra, rb]], &StringTypeMapping::default(), |_, rw, _| {
                Ok::<_, GraphError>(rw.builder().new_primitive(PrimitiveKind::Null))
            })
            .unwrap_err();
        assert!(matches!(err, GraphError::ForwardingMismatch { .. }));
    }

    #[test]
    fn no_groups_copies_with_mapping() {
        let mut b = TypeBuilder::new();
        let uuid = b.new_formatted(NameHints::empty(), StringFormat::Uuid);
        let graph = b.finish().unwrap();

        let mapping = StringTypeMapping::new().with(StringFormat::Uuid, FormatMapping::AsString);
        let rewritten = graph.rewrite(&[], &mapping, merge_first).unwrap();
        assert_eq!(rewritten.kind(uuid), Some(TypeKind::String));
        assert_eq!(graph.kind(uuid), Some(TypeKind::Formatted(StringFormat::Uuid)));
    }

    #[test]
    fn lowered_format_next_to_plain_string_keeps_the_plain_one() {
        let mut b = TypeBuilder::new();
        let null = b.new_primitive(PrimitiveKind::Null);
        let date = b.new_formatted(NameHints::empty(), StringFormat::Date);
        let plain = b.new_string(NameHints::empty(), None);
        let when = b.new_union(NameHints::empty(), vec![null, date, plain]).unwrap();
        let rec = b
            .new_record_type(NameHints::inferred("a"), fields(&[("when", when)]), false, None)
            .unwrap();
        let graph = b.finish().unwrap();

        let rewritten = graph
            .rewrite(&[], &StringTypeMapping::all_plain(), merge_first)
            .unwrap();
        assert_eq!(rewritten.describe(rec), "{when: string?}");
        assert_eq!(
            rewritten.resolve(when).unwrap(),
            &Type::Union(vec![null, plain])
        );
    }

    #[test]
    fn union_narrowed_to_one_member_is_bypassed() {
        let mut b = TypeBuilder::new();
        let date = b.new_formatted(NameHints::empty(), StringFormat::Date);
        let uuid = b.new_formatted(NameHints::empty(), StringFormat::Uuid);
        let when = b.new_union(NameHints::empty(), vec![date, uuid]).unwrap();
        let rec = b
            .new_record_type(NameHints::explicit("Top"), fields(&[("when", when)]), true, None)
            .unwrap();
        b.add_root("Top", rec).unwrap();
        let graph = b.finish().unwrap();

        let rewritten = graph
            .rewrite(&[], &StringTypeMapping::all_plain(), merge_first)
            .unwrap();
        assert_eq!(rewritten.len(), graph.len() - 1);
        let top = rewritten.root("Top").unwrap();
        let field = rewritten.record(top).unwrap().field("when").unwrap();
        assert_eq!(rewritten.kind(field), Some(TypeKind::String));
        assert_eq!(rewritten.describe(top), "{when: string}");
    }

    #[test]
    fn unions_are_left_alone_when_nothing_collides() {
        let mut b = TypeBuilder::new();
        let date = b.new_formatted(NameHints::empty(), StringFormat::Date);
        let int = b.new_primitive(PrimitiveKind::Integer);
        let when = b.new_union(NameHints::empty(), vec![date, int]).unwrap();
        let graph = b.finish().unwrap();

        let rewritten = graph
            .rewrite(&[], &StringTypeMapping::all_plain(), merge_first)
            .unwrap();
        assert_eq!(rewritten.describe(when), "(string | integer)");
    }

    #[test]
    fn recursive_group_members_point_at_merged_node() {
        // a = {next: a?}, b = {next: b?}
        let mut b = TypeBuilder::new();
        let ra = b.reserve();
        let rb = b.reserve();
        let na = b.make_nullable(ra, NameHints::empty()).unwrap();
        let nb = b.make_nullable(rb, NameHints::empty()).unwrap();
        b.new_record_type(NameHints::inferred("a"), fields(&[("next", na)]), false, Some(ra))
            .unwrap();
        b.new_record_type(NameHints::inferred("b"), fields(&[("next", nb)]), false, Some(rb))
            .unwrap();
        let graph = b.finish().unwrap();

        let rewritten = graph
            .rewrite(&[vec![ra, rb]], &StringTypeMapping::default(), merge_first)
            .unwrap();
        let merged = rewritten.records()[0].0;
        let next = rewritten.record(merged).unwrap().field("next").unwrap();
        assert_eq!(rewritten.non_null_members(next).unwrap(), vec![merged]);
    }
}
