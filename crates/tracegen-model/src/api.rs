//! The API model: a type arena plus the functions and interfaces that use it.
//!
//! An [`Api`] is built once, then handed to the generator read-only. Builder
//! methods allocate types in the arena and hand back [`TypeId`]s; numeric
//! signature ids are assigned from internal counters, so they are unique by
//! construction. Complex-type tags go through an ordered registry that
//! rejects duplicates.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{
    Bitmask, Enumeration, Interface, LiteralKind, Member, Polymorphic, Struct, SwitchCase, TypeDef,
    TypeId, TypeKind,
};
use crate::utils::sanitize_tag;

/// Argument direction: inputs are recorded on call entry, outputs on leave.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
}

/// One function or method argument.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Arg {
    pub ty: TypeId,
    pub name: String,
    pub direction: Direction,
    /// Wire index in the call envelope. Assigned on registration: free
    /// functions count from 0, methods from 1 (index 0 is `this`).
    pub index: usize,
}

impl Arg {
    pub fn input(ty: TypeId, name: &str) -> Self {
        Self {
            ty,
            name: name.to_string(),
            direction: Direction::In,
            index: 0,
        }
    }

    pub fn output(ty: TypeId, name: &str) -> Self {
        Self {
            ty,
            name: name.to_string(),
            direction: Direction::Out,
            index: 0,
        }
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Out
    }
}

/// An interface method. The implicit leading `this` argument is not stored;
/// the generator synthesizes wire index 0 for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Method {
    /// Call signature id; shares the id space of free functions.
    pub id: u32,
    pub name: String,
    pub ret: TypeId,
    pub args: Vec<Arg>,
}

impl Method {
    /// Build a method; the signature id is assigned when the owning
    /// interface is registered with [`Api::interface`].
    pub fn new(name: &str, ret: TypeId, mut args: Vec<Arg>) -> Self {
        for (i, arg) in args.iter_mut().enumerate() {
            arg.index = i + 1;
        }
        Self {
            id: 0,
            name: name.to_string(),
            ret,
            args,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

/// A free function of the traced API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Function {
    pub id: u32,
    pub name: String,
    pub ret: TypeId,
    pub args: Vec<Arg>,
    pub visibility: Visibility,
}

impl Function {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// The whole model of one traced API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Api {
    /// Include lines emitted verbatim at the top of the generated file.
    pub headers: Vec<String>,
    types: Vec<TypeDef>,
    /// Complex-type tags in registration order; guards tag uniqueness.
    tags: IndexMap<String, TypeId>,
    pub functions: Vec<Function>,
    interfaces: Vec<TypeId>,
    next_type_id: u32,
    next_call_id: u32,
}

impl Api {
    /// The pre-allocated `void` type.
    pub const VOID: TypeId = TypeId(0);

    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            types: vec![TypeDef {
                expr: "void".to_string(),
                tag: "void".to_string(),
                kind: TypeKind::Void,
            }],
            tags: IndexMap::new(),
            functions: Vec::new(),
            interfaces: Vec::new(),
            next_type_id: 0,
            next_call_id: 0,
        }
    }

    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.types[id.index()]
    }

    /// All arena ids in creation order.
    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.types.len() as u32).map(TypeId)
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    pub fn header(&mut self, line: &str) {
        self.headers.push(line.to_string());
    }

    fn push(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(def);
        id
    }

    fn register_tag(&mut self, tag: &str, id: TypeId) {
        let previous = self.tags.insert(tag.to_string(), id);
        assert!(
            previous.is_none(),
            "duplicate complex-type tag `{tag}`: helper names would collide"
        );
    }

    fn next_type_id(&mut self) -> u32 {
        let id = self.next_type_id;
        self.next_type_id += 1;
        id
    }

    fn next_call_id(&mut self) -> u32 {
        let id = self.next_call_id;
        self.next_call_id += 1;
        id
    }

    // --- type builders -----------------------------------------------------

    pub fn literal(&mut self, expr: &str, kind: LiteralKind) -> TypeId {
        self.push(TypeDef {
            expr: expr.to_string(),
            tag: sanitize_tag(expr),
            kind: TypeKind::Literal(kind),
        })
    }

    /// A `char *` string; pass a length expression for fixed-length strings,
    /// `None` for null-terminated ones.
    pub fn string(&mut self, length: Option<&str>) -> TypeId {
        self.push(TypeDef {
            expr: "char *".to_string(),
            tag: "string".to_string(),
            kind: TypeKind::String {
                length: length.map(str::to_string),
            },
        })
    }

    pub fn const_of(&mut self, inner: TypeId) -> TypeId {
        let inner_def = self.get(inner);
        let expr = format!("const {}", inner_def.expr);
        let tag = format!("C{}", inner_def.tag);
        self.push(TypeDef {
            expr,
            tag,
            kind: TypeKind::Const { inner },
        })
    }

    /// Forward-declare a struct so that members can refer back to it.
    /// Complete it with [`structure_define`](Self::structure_define).
    pub fn structure_decl(&mut self, name: &str) -> TypeId {
        let numeric = self.next_type_id();
        let tag = sanitize_tag(name);
        let id = self.push(TypeDef {
            expr: name.to_string(),
            tag: tag.clone(),
            kind: TypeKind::Struct(Struct {
                id: numeric,
                name: name.to_string(),
                members: Vec::new(),
            }),
        });
        self.register_tag(&tag, id);
        id
    }

    /// Fill in the members of a forward-declared struct.
    pub fn structure_define(&mut self, id: TypeId, members: Vec<(TypeId, &str)>) {
        let members = members
            .into_iter()
            .map(|(ty, name)| Member {
                ty,
                name: name.to_string(),
            })
            .collect();
        match &mut self.types[id.index()].kind {
            TypeKind::Struct(s) => {
                assert!(s.members.is_empty(), "struct `{}` defined twice", s.name);
                s.members = members;
            }
            other => panic!("cannot define members of a {} type", other.name()),
        }
    }

    pub fn structure(&mut self, name: &str, members: Vec<(TypeId, &str)>) -> TypeId {
        let id = self.structure_decl(name);
        self.structure_define(id, members);
        id
    }

    pub fn array(&mut self, element: TypeId, length: &str) -> TypeId {
        let element_def = self.get(element);
        let expr = format!("{} *", element_def.expr);
        let tag = format!("{}_array", element_def.tag);
        self.push(TypeDef {
            expr,
            tag,
            kind: TypeKind::Array {
                element,
                length: length.to_string(),
            },
        })
    }

    pub fn blob(&mut self, size: &str) -> TypeId {
        self.push(TypeDef {
            expr: "void *".to_string(),
            tag: "blob".to_string(),
            kind: TypeKind::Blob {
                size: size.to_string(),
            },
        })
    }

    pub fn enumeration(&mut self, name: &str, values: Vec<&str>) -> TypeId {
        let numeric = self.next_type_id();
        let tag = sanitize_tag(name);
        let id = self.push(TypeDef {
            expr: name.to_string(),
            tag: tag.clone(),
            kind: TypeKind::Enum(Enumeration {
                id: numeric,
                values: values.into_iter().map(str::to_string).collect(),
            }),
        });
        self.register_tag(&tag, id);
        id
    }

    pub fn bitmask(&mut self, name: &str, flags: Vec<&str>) -> TypeId {
        let numeric = self.next_type_id();
        let tag = sanitize_tag(name);
        let id = self.push(TypeDef {
            expr: name.to_string(),
            tag: tag.clone(),
            kind: TypeKind::Bitmask(Bitmask {
                id: numeric,
                flags: flags.into_iter().map(str::to_string).collect(),
            }),
        });
        self.register_tag(&tag, id);
        id
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        let pointee_def = self.get(pointee);
        let expr = format!("{} *", pointee_def.expr);
        let tag = format!("{}P", pointee_def.tag);
        self.push(TypeDef {
            expr,
            tag,
            kind: TypeKind::Pointer { pointee },
        })
    }

    /// A named scalar carrying a runtime resource; serialized as `inner`.
    pub fn handle(&mut self, name: &str, inner: TypeId) -> TypeId {
        let expr = self.get(inner).expr.clone();
        self.push(TypeDef {
            expr,
            tag: sanitize_tag(name),
            kind: TypeKind::Handle { inner },
        })
    }

    pub fn alias(&mut self, expr: &str, target: TypeId) -> TypeId {
        self.push(TypeDef {
            expr: expr.to_string(),
            tag: sanitize_tag(expr),
            kind: TypeKind::Alias { target },
        })
    }

    pub fn opaque(&mut self, expr: &str) -> TypeId {
        self.push(TypeDef {
            expr: expr.to_string(),
            tag: sanitize_tag(expr),
            kind: TypeKind::Opaque,
        })
    }

    /// Register an interface. Method signature ids are assigned here, from
    /// the same counter as free functions.
    pub fn interface(&mut self, name: &str, mut methods: Vec<Method>) -> TypeId {
        for method in &mut methods {
            method.id = self.next_call_id();
        }
        let tag = sanitize_tag(name);
        let id = self.push(TypeDef {
            expr: name.to_string(),
            tag: tag.clone(),
            kind: TypeKind::Interface(Interface {
                name: name.to_string(),
                methods,
            }),
        });
        self.register_tag(&tag, id);
        self.interfaces.push(id);
        id
    }

    /// `expr` is the C++ type of the value; `selector` the C expression whose
    /// runtime value picks the active case.
    pub fn polymorphic(
        &mut self,
        expr: &str,
        selector: &str,
        cases: Vec<(Vec<&str>, TypeId)>,
    ) -> TypeId {
        let tag = sanitize_tag(expr);
        let cases = cases
            .into_iter()
            .map(|(labels, ty)| SwitchCase {
                labels: labels.into_iter().map(str::to_string).collect(),
                ty,
            })
            .collect();
        let id = self.push(TypeDef {
            expr: expr.to_string(),
            tag: tag.clone(),
            kind: TypeKind::Polymorphic(Polymorphic {
                selector: selector.to_string(),
                cases,
            }),
        });
        self.register_tag(&tag, id);
        id
    }

    // --- signature builders ------------------------------------------------

    pub fn function(&mut self, name: &str, ret: TypeId, mut args: Vec<Arg>) -> &Function {
        for (i, arg) in args.iter_mut().enumerate() {
            arg.index = i;
        }
        let function = Function {
            id: self.next_call_id(),
            name: name.to_string(),
            ret,
            args,
            visibility: Visibility::Public,
        };
        self.functions.push(function);
        self.functions.last().expect("just pushed")
    }

    /// Like [`function`](Self::function), but hidden from the public export
    /// surface of the generated layer.
    pub fn private_function(&mut self, name: &str, ret: TypeId, args: Vec<Arg>) -> &Function {
        self.function(name, ret, args);
        let function = self.functions.last_mut().expect("just pushed");
        function.visibility = Visibility::Private;
        self.functions.last().expect("just pushed")
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}
