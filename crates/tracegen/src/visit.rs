//! Single-dispatch traversal over the type-kind taxonomy.
//!
//! Implement [`TypeVisitor`] and override the handlers a pass cares about;
//! [`walk`] selects exactly one handler per kind. Transparent kinds (const,
//! pointer, handle, alias) default to recursing into their inner type,
//! terminal kinds default to no-ops, and the structural kinds must be
//! handled explicitly.
//!
//! A pass that must touch each type at most once overrides `visit` with a
//! visited-set check before walking; the set lives on the visitor instance,
//! created fresh per generation run, never in ambient state.

use tracegen_model::{
    Api, Bitmask, Enumeration, Interface, LiteralKind, Polymorphic, Struct, TypeId, TypeKind,
};

use crate::Result;

pub trait TypeVisitor: Sized {
    /// Dispatch `id` to the handler for its kind.
    fn visit(&mut self, api: &Api, id: TypeId) -> Result<()> {
        walk(self, api, id)
    }

    fn visit_void(&mut self, _api: &Api, _id: TypeId) -> Result<()> {
        Ok(())
    }

    fn visit_literal(&mut self, _api: &Api, _id: TypeId, _kind: LiteralKind) -> Result<()> {
        Ok(())
    }

    fn visit_string(&mut self, _api: &Api, _id: TypeId, _length: Option<&str>) -> Result<()> {
        Ok(())
    }

    fn visit_blob(&mut self, _api: &Api, _id: TypeId, _size: &str) -> Result<()> {
        Ok(())
    }

    fn visit_opaque(&mut self, _api: &Api, _id: TypeId) -> Result<()> {
        Ok(())
    }

    fn visit_const(&mut self, api: &Api, _id: TypeId, inner: TypeId) -> Result<()> {
        self.visit(api, inner)
    }

    fn visit_pointer(&mut self, api: &Api, _id: TypeId, pointee: TypeId) -> Result<()> {
        self.visit(api, pointee)
    }

    fn visit_handle(&mut self, api: &Api, _id: TypeId, inner: TypeId) -> Result<()> {
        self.visit(api, inner)
    }

    fn visit_alias(&mut self, api: &Api, _id: TypeId, target: TypeId) -> Result<()> {
        self.visit(api, target)
    }

    fn visit_struct(&mut self, api: &Api, id: TypeId, s: &Struct) -> Result<()>;

    fn visit_array(&mut self, api: &Api, id: TypeId, element: TypeId, length: &str) -> Result<()>;

    fn visit_enum(&mut self, api: &Api, id: TypeId, e: &Enumeration) -> Result<()>;

    fn visit_bitmask(&mut self, api: &Api, id: TypeId, b: &Bitmask) -> Result<()>;

    fn visit_interface(&mut self, api: &Api, id: TypeId, iface: &Interface) -> Result<()>;

    fn visit_polymorphic(&mut self, api: &Api, id: TypeId, p: &Polymorphic) -> Result<()>;
}

/// Select the handler for the kind of `id`.
pub fn walk<V: TypeVisitor>(visitor: &mut V, api: &Api, id: TypeId) -> Result<()> {
    let def = api.get(id);
    match &def.kind {
        TypeKind::Void => visitor.visit_void(api, id),
        TypeKind::Literal(kind) => visitor.visit_literal(api, id, *kind),
        TypeKind::String { length } => visitor.visit_string(api, id, length.as_deref()),
        TypeKind::Const { inner } => visitor.visit_const(api, id, *inner),
        TypeKind::Struct(s) => visitor.visit_struct(api, id, s),
        TypeKind::Array { element, length } => visitor.visit_array(api, id, *element, length),
        TypeKind::Blob { size } => visitor.visit_blob(api, id, size),
        TypeKind::Enum(e) => visitor.visit_enum(api, id, e),
        TypeKind::Bitmask(b) => visitor.visit_bitmask(api, id, b),
        TypeKind::Pointer { pointee } => visitor.visit_pointer(api, id, *pointee),
        TypeKind::Handle { inner } => visitor.visit_handle(api, id, *inner),
        TypeKind::Alias { target } => visitor.visit_alias(api, id, *target),
        TypeKind::Opaque => visitor.visit_opaque(api, id),
        TypeKind::Interface(iface) => visitor.visit_interface(api, id, iface),
        TypeKind::Polymorphic(p) => visitor.visit_polymorphic(api, id, p),
    }
}
