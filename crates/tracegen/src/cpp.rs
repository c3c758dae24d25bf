//! Small C++ rendering helpers shared by the emitters.

use tracegen_model::{Api, Arg, TypeId};

/// Name of the generated proxy class for an interface.
pub(crate) fn wrap_name(name: &str) -> String {
    format!("Wrap{name}")
}

/// Render a C string literal.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `ret name(type arg, ...)`.
pub(crate) fn prototype(api: &Api, ret: TypeId, name: &str, args: &[Arg]) -> String {
    format!("{} {}({})", api.get(ret).expr, name, arg_decls(api, args))
}

pub(crate) fn arg_decls(api: &Api, args: &[Arg]) -> String {
    args.iter()
        .map(|arg| format!("{} {}", api.get(arg.ty).expr, arg.name))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn arg_names(args: &[Arg]) -> String {
    args.iter()
        .map(|arg| arg.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
