//! Core data structures for tracegen: the model of a traced API.
//!
//! An [`Api`] owns an arena of [`TypeDef`]s indexed by [`TypeId`], plus the
//! free functions and interfaces whose calls the generated layer intercepts.
//! The model is built once through the `Api` builder methods and read-only
//! afterwards; the generator never mutates it.
//!
//! # Example
//!
//! ```
//! use tracegen_model::{Api, Arg, LiteralKind};
//!
//! let mut api = Api::new();
//! let float = api.literal("float", LiteralKind::Float);
//! let point = api.structure("Point", vec![(float, "x"), (float, "y")]);
//! api.function("MovePoint", Api::VOID, vec![Arg::input(point, "p")]);
//! assert_eq!(api.functions[0].args[0].index, 0);
//! ```

mod api;
mod types;
pub mod utils;


pub use api::{Api, Arg, Direction, Function, Method, Visibility};
pub use types::{
    Bitmask, Enumeration, Interface, LiteralKind, Member, Polymorphic, Struct, SwitchCase, TypeDef,
    TypeId, TypeKind,
};
