//! The type taxonomy.
//!
//! Every type a traced API can mention is one of the kinds below. The set is
//! closed: generation passes match exhaustively, and adding a kind is a
//! tool-level change, not a runtime extension point.

use serde::{Deserialize, Serialize};

use crate::api::Method;

/// Index of a type in the [`Api`](crate::Api) arena.
///
/// Ids are handed out by the `Api` builders in creation order and are the
/// identity used by visited-set tracking during generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One entry in the type arena.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeDef {
    /// C++ type expression, as it appears in prototypes and casts.
    pub expr: String,
    /// Identifier fragment used in emitted helper names and loop variables.
    pub tag: String,
    pub kind: TypeKind,
}

/// Primitive wire kinds, selecting the `write<Kind>` writer call.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LiteralKind {
    Bool,
    SInt,
    UInt,
    Float,
    Double,
}

impl LiteralKind {
    /// Suffix of the trace-writer call serializing this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::SInt => "SInt",
            Self::UInt => "UInt",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }
}

/// The closed kind taxonomy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TypeKind {
    Void,
    Literal(LiteralKind),
    /// `char *` text; `length` is a C expression for fixed-length strings,
    /// `None` for null-terminated ones.
    String { length: Option<String> },
    Const { inner: TypeId },
    Struct(Struct),
    /// `length` is a C expression computing the element count at the call site.
    Array { element: TypeId, length: String },
    /// Raw memory with an explicit byte-size expression.
    Blob { size: String },
    Enum(Enumeration),
    Bitmask(Bitmask),
    Pointer { pointee: TypeId },
    /// A named scalar standing for a runtime resource (serialized as its
    /// underlying type).
    Handle { inner: TypeId },
    Alias { target: TypeId },
    /// A value recorded by address only.
    Opaque,
    Interface(Interface),
    Polymorphic(Polymorphic),
}

impl TypeKind {
    /// Kinds that get a standalone generated helper (function or table).
    pub fn is_complex(&self) -> bool {
        matches!(
            self,
            Self::Struct(_) | Self::Enum(_) | Self::Bitmask(_) | Self::Polymorphic(_)
        )
    }

    /// Kinds that defer to an inner type without any wire presence of their own.
    pub fn is_transparent(&self) -> bool {
        matches!(
            self,
            Self::Const { .. } | Self::Pointer { .. } | Self::Handle { .. } | Self::Alias { .. }
        )
    }

    /// Short kind name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Literal(_) => "literal",
            Self::String { .. } => "string",
            Self::Const { .. } => "const",
            Self::Struct(_) => "struct",
            Self::Array { .. } => "array",
            Self::Blob { .. } => "blob",
            Self::Enum(_) => "enum",
            Self::Bitmask(_) => "bitmask",
            Self::Pointer { .. } => "pointer",
            Self::Handle { .. } => "handle",
            Self::Alias { .. } => "alias",
            Self::Opaque => "opaque",
            Self::Interface(_) => "interface",
            Self::Polymorphic(_) => "polymorphic",
        }
    }
}

/// A record type. Member order is the wire order and must never be shuffled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Struct {
    /// Numeric signature id, unique among complex types of one API.
    pub id: u32,
    /// Display name recorded in the struct signature.
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    pub ty: TypeId,
    pub name: String,
}

/// A named-constant type. Values are C expressions that double as display
/// names; declared order is preserved in the emitted table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Enumeration {
    pub id: u32,
    pub values: Vec<String>,
}

/// Like [`Enumeration`], but values combine as flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bitmask {
    pub id: u32,
    pub flags: Vec<String>,
}

/// A reference-counted, virtually-dispatched object type. The generated
/// layer intercepts these through proxy objects.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<Method>,
}

/// A value whose concrete type is chosen at runtime by a selector expression.
///
/// Case-label sets are disjoint; the model does not itself check that they
/// cover every selector value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Polymorphic {
    /// C expression yielding the selector value at the call site.
    pub selector: String,
    pub cases: Vec<SwitchCase>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Case labels, without the `case` keyword.
    pub labels: Vec<String>,
    pub ty: TypeId,
}
