//! tracegen: generates the C++ source of a call-interception layer for a
//! native API.
//!
//! Given a [`tracegen_model::Api`], the generator emits one ordered text
//! stream: serialization helpers for every complex type, a proxy class per
//! interface, and an intercepted body per free function and method. The
//! emitted code records each call through the `trace::localWriter` envelope
//! protocol and swaps interface pointers so the application only ever holds
//! proxies while the library only ever sees real instances.
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
//!
//! let code = tracegen::emit(&api).expect("generation succeeds");
//! assert!(code.contains("static void _write__Point"));
//! assert!(code.contains("void MovePoint(Point p) {"));
//! ```

pub mod complex;
mod cpp;
pub mod tracer;
pub mod value;
pub mod visit;
pub mod wrap;

#[cfg(test)]
mod complex_tests;
#[cfg(test)]
mod value_tests;
#[cfg(test)]
mod wrap_tests;

pub use tracer::{Config, Tracer};

/// Result type for generation passes.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort generation.
///
/// All of these are model defects: the tool must fail rather than emit code
/// that corrupts the trace.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Void appeared where a serialized value is required.
    #[error("void value `{0}` cannot be serialized")]
    VoidValue(String),

    /// Void appeared where a wrappable value is required.
    #[error("void value `{0}` cannot be wrapped")]
    VoidWrap(String),

    /// A Release-style method must return the remaining reference count.
    #[error("interface `{0}`: Release must return a reference count")]
    ReleaseReturnsVoid(String),
}

/// Generate the interception layer for `api` with default options.
pub fn emit(api: &tracegen_model::Api) -> Result<String> {
    Tracer::new(api).emit()
}
