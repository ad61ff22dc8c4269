//! Graph fixtures shared by the unit tests.

use std::collections::BTreeMap;

use typefold_graph::{TypeBuilder, TypeGraph};
use typefold_types::{NameHints, PrimitiveKind, StringHistogram, TypeRef};

pub(crate) struct Fixture {
    pub(crate) builder: TypeBuilder,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self {
            builder: TypeBuilder::new(),
        }
    }

    pub(crate) fn int(&mut self) -> TypeRef {
        self.builder.new_primitive(PrimitiveKind::Integer)
    }

    pub(crate) fn double(&mut self) -> TypeRef {
        self.builder.new_primitive(PrimitiveKind::Double)
    }

    pub(crate) fn null(&mut self) -> TypeRef {
        self.builder.new_primitive(PrimitiveKind::Null)
    }

    pub(crate) fn string(&mut self) -> TypeRef {
        self.builder.new_string(NameHints::empty(), None)
    }

    pub(crate) fn enum_string(&mut self, values: &[(&str, u64)]) -> TypeRef {
        let histogram: StringHistogram = values.iter().map(|(v, c)| (*v, *c)).collect();
        self.builder.new_string(NameHints::empty(), Some(histogram))
    }

    pub(crate) fn nullable(&mut self, ty: TypeRef) -> TypeRef {
        self.builder.make_nullable(ty, NameHints::empty()).unwrap()
    }

    pub(crate) fn union(&mut self, members: Vec<TypeRef>) -> TypeRef {
        self.builder.new_union(NameHints::empty(), members).unwrap()
    }

    pub(crate) fn array(&mut self, item: TypeRef) -> TypeRef {
        self.builder.new_array(NameHints::empty(), item).unwrap()
    }

    pub(crate) fn record(&mut self, name: &str, fields: &[(&str, TypeRef)]) -> TypeRef {
        self.record_with(name, fields, false)
    }

    pub(crate) fn pinned(&mut self, name: &str, fields: &[(&str, TypeRef)]) -> TypeRef {
        let r = self.record_with(name, fields, true);
        self.builder.add_root(name, r).unwrap();
        r
    }

    fn record_with(&mut self, name: &str, fields: &[(&str, TypeRef)], pinned: bool) -> TypeRef {
        let fields: BTreeMap<String, TypeRef> =
            fields.iter().map(|(n, t)| (n.to_string(), *t)).collect();
        let names = if pinned {
            NameHints::explicit(name)
        } else {
            NameHints::inferred(name)
        };
        self.builder
            .new_record_type(names, fields, pinned, None)
            .unwrap()
    }

    /// A record whose fields are all integers.
    pub(crate) fn int_record(&mut self, name: &str, field_names: &[&str]) -> TypeRef {
        let fields: Vec<(&str, TypeRef)> = field_names.iter().map(|n| (*n, self.int())).collect();
        self.record(name, &fields)
    }

    pub(crate) fn finish(self) -> TypeGraph {
        self.builder.finish().unwrap()
    }
}
