//! Wrap/unwrap code emission.
//!
//! Interface pointers can sit anywhere inside a value: behind pointers,
//! inside struct members, under handles and aliases. These two mirror-image
//! passes find them and emit the statement that swaps proxy and real
//! instance, guarded against null at every pointer hop.

use tracegen_model::{Api, TypeId, TypeKind};

use crate::{Error, Result, cpp};

/// Which way the swap goes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Library → application: replace real instances with proxies.
    Wrap,
    /// Application → library: recover real instances from proxies.
    Unwrap,
}

pub struct ValueWrapper<'a> {
    api: &'a Api,
    mode: Mode,
}

impl<'a> ValueWrapper<'a> {
    pub fn new(api: &'a Api, mode: Mode) -> Self {
        Self { api, mode }
    }

    /// Emit the statements swapping interface pointers reachable from
    /// `instance`, a value of type `id`. Emits nothing when no interface is
    /// reachable.
    pub fn visit(&self, id: TypeId, instance: &str, out: &mut String) -> Result<()> {
        match &self.api.get(id).kind {
            TypeKind::Void => Err(Error::VoidWrap(instance.to_string())),
            TypeKind::Struct(s) => {
                for member in &s.members {
                    self.visit(member.ty, &format!("({instance}).{}", member.name), out)?;
                }
                Ok(())
            }
            TypeKind::Pointer { pointee } => {
                let mut body = String::new();
                self.visit(*pointee, &format!("*{instance}"), &mut body)?;
                if !body.is_empty() {
                    out.push_str(&format!("    if ({instance}) {{\n"));
                    out.push_str(&body);
                    out.push_str("    }\n");
                }
                Ok(())
            }
            TypeKind::Handle { inner } => self.visit(*inner, instance, out),
            TypeKind::Alias { target } => self.visit(*target, instance, out),
            TypeKind::Interface(iface) => {
                // The pointer hop above put a `*` in front of the instance;
                // strip it back off to assign the pointer slot itself.
                let target = instance
                    .strip_prefix('*')
                    .expect("interface values are reached through a pointer");
                let wrap = cpp::wrap_name(&iface.name);
                out.push_str(&format!("    if ({target}) {{\n"));
                match self.mode {
                    Mode::Wrap => {
                        out.push_str(&format!("        {target} = new {wrap}({target});\n"));
                    }
                    Mode::Unwrap => {
                        out.push_str(&format!(
                            "        {target} = static_cast<{wrap} *>({target})->m_pInstance;\n"
                        ));
                    }
                }
                out.push_str("    }\n");
                Ok(())
            }
            // XXX: arrays of interface pointers are not traversed.
            TypeKind::Array { .. } => Ok(()),
            TypeKind::Literal(_)
            | TypeKind::String { .. }
            | TypeKind::Const { .. }
            | TypeKind::Blob { .. }
            | TypeKind::Enum(_)
            | TypeKind::Bitmask(_)
            | TypeKind::Opaque
            | TypeKind::Polymorphic(_) => Ok(()),
        }
    }
}
