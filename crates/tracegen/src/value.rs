//! Inline serialization of a single value.
//!
//! Primitive kinds are serialized in place with one writer call; complex
//! kinds delegate to the standalone helper emitted by
//! [`ComplexSerializer`](crate::complex::ComplexSerializer), so a complex
//! body is never inlined twice. Null pointers and arrays are encoded with a
//! `writeNull()` marker instead of entering brackets.

use tracegen_model::{Api, TypeId, TypeKind};

use crate::{Error, Result};

pub struct ValueSerializer<'a> {
    api: &'a Api,
}

impl<'a> ValueSerializer<'a> {
    pub fn new(api: &'a Api) -> Self {
        Self { api }
    }

    /// Emit the statement(s) serializing `instance`, a value of type `id`.
    pub fn serialize(&self, id: TypeId, instance: &str, out: &mut String) -> Result<()> {
        let def = self.api.get(id);
        match &def.kind {
            TypeKind::Void => Err(Error::VoidValue(instance.to_string())),
            TypeKind::Literal(kind) => {
                out.push_str(&format!(
                    "    trace::localWriter.write{}({instance});\n",
                    kind.as_str()
                ));
                Ok(())
            }
            TypeKind::String { length } => {
                match length {
                    Some(length) => out.push_str(&format!(
                        "    trace::localWriter.writeString((const char *){instance}, {length});\n"
                    )),
                    None => out.push_str(&format!(
                        "    trace::localWriter.writeString((const char *){instance});\n"
                    )),
                }
                Ok(())
            }
            TypeKind::Const { inner } => self.serialize(*inner, instance, out),
            TypeKind::Struct(_) => {
                out.push_str(&format!("    _write__{}({instance});\n", def.tag));
                Ok(())
            }
            TypeKind::Array { element, length } => {
                self.serialize_array(*element, length, instance, out)
            }
            TypeKind::Blob { size } => {
                out.push_str(&format!(
                    "    trace::localWriter.writeBlob({instance}, {size});\n"
                ));
                Ok(())
            }
            TypeKind::Enum(_) => {
                out.push_str(&format!(
                    "    trace::localWriter.writeEnum(&__enum{}_sig, {instance});\n",
                    def.tag
                ));
                Ok(())
            }
            TypeKind::Bitmask(_) => {
                out.push_str(&format!(
                    "    trace::localWriter.writeBitmask(&__bitmask{}_sig, {instance});\n",
                    def.tag
                ));
                Ok(())
            }
            TypeKind::Pointer { pointee } => self.serialize_pointer(*pointee, instance, out),
            TypeKind::Handle { inner } => self.serialize(*inner, instance, out),
            TypeKind::Alias { target } => self.serialize(*target, instance, out),
            TypeKind::Opaque => {
                out.push_str(&format!(
                    "    trace::localWriter.writeOpaque((const void *){instance});\n"
                ));
                Ok(())
            }
            // Identity, not contents: an interface instance is recorded by
            // its address.
            TypeKind::Interface(_) => {
                out.push_str(&format!(
                    "    trace::localWriter.writeOpaque((const void *)&{instance});\n"
                ));
                Ok(())
            }
            TypeKind::Polymorphic(p) => {
                out.push_str(&format!(
                    "    _write__{}({}, {instance});\n",
                    def.tag, p.selector
                ));
                Ok(())
            }
        }
    }

    fn serialize_array(
        &self,
        element: TypeId,
        length: &str,
        instance: &str,
        out: &mut String,
    ) -> Result<()> {
        let tag = &self.api.get(element).tag;
        let count = format!("__c{tag}");
        let index = format!("__i{tag}");
        out.push_str(&format!("    if ({instance}) {{\n"));
        out.push_str(&format!("        size_t {count} = {length};\n"));
        out.push_str(&format!("        trace::localWriter.beginArray({count});\n"));
        out.push_str(&format!(
            "        for (size_t {index} = 0; {index} < {count}; ++{index}) {{\n"
        ));
        out.push_str("            trace::localWriter.beginElement();\n");
        self.serialize(element, &format!("({instance})[{index}]"), out)?;
        out.push_str("            trace::localWriter.endElement();\n");
        out.push_str("        }\n");
        out.push_str("        trace::localWriter.endArray();\n");
        out.push_str("    } else {\n");
        out.push_str("        trace::localWriter.writeNull();\n");
        out.push_str("    }\n");
        Ok(())
    }

    // A non-null pointer is encoded as an array of one element, so the
    // reader reconstructs optional values without a separate wire tag.
    fn serialize_pointer(&self, pointee: TypeId, instance: &str, out: &mut String) -> Result<()> {
        out.push_str(&format!("    if ({instance}) {{\n"));
        out.push_str("        trace::localWriter.beginArray(1);\n");
        out.push_str("        trace::localWriter.beginElement();\n");
        self.serialize(pointee, &format!("*{instance}"), out)?;
        out.push_str("        trace::localWriter.endElement();\n");
        out.push_str("        trace::localWriter.endArray();\n");
        out.push_str("    } else {\n");
        out.push_str("        trace::localWriter.writeNull();\n");
        out.push_str("    }\n");
        Ok(())
    }
}
