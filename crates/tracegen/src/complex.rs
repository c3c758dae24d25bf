//! Standalone helpers for complex types.
//!
//! For every struct and polymorphic type one serialization function, for
//! every enum and bitmask one static value table, for every interface one
//! proxy class declaration. Each helper is emitted at most once per run, and
//! every type a helper references is visited first, so helper text always
//! precedes its uses.

use std::collections::HashSet;

use tracegen_model::{Api, Bitmask, Enumeration, Interface, Polymorphic, Struct, TypeId};

use crate::value::ValueSerializer;
use crate::visit::{TypeVisitor, walk};
use crate::{Result, cpp};

pub struct ComplexSerializer {
    visited: HashSet<TypeId>,
    out: String,
}

impl ComplexSerializer {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
            out: String::new(),
        }
    }

    /// The accumulated helper text, in emission order.
    pub fn finish(self) -> String {
        self.out
    }
}

impl Default for ComplexSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeVisitor for ComplexSerializer {
    // Mark at entry: recursive type graphs terminate, and a type referenced
    // from several call sites is emitted exactly once.
    fn visit(&mut self, api: &Api, id: TypeId) -> Result<()> {
        if !self.visited.insert(id) {
            return Ok(());
        }
        walk(self, api, id)
    }

    fn visit_struct(&mut self, api: &Api, id: TypeId, s: &Struct) -> Result<()> {
        for member in &s.members {
            self.visit(api, member.ty)?;
        }
        let def = api.get(id);
        let tag = &def.tag;
        let count = s.members.len();
        self.out.push_str(&format!(
            "static void _write__{tag}(const {} &value) {{\n",
            def.expr
        ));
        self.out
            .push_str(&format!("    static const char * members[{count}] = {{\n"));
        for member in &s.members {
            self.out
                .push_str(&format!("        {},\n", cpp::quote(&member.name)));
        }
        self.out.push_str("    };\n");
        self.out
            .push_str("    static const trace::StructSig sig = {\n");
        self.out.push_str(&format!(
            "       {}, {}, {count}, members\n",
            s.id,
            cpp::quote(&s.name)
        ));
        self.out.push_str("    };\n");
        self.out.push_str("    trace::localWriter.beginStruct(&sig);\n");
        let serializer = ValueSerializer::new(api);
        for member in &s.members {
            serializer.serialize(member.ty, &format!("value.{}", member.name), &mut self.out)?;
        }
        self.out.push_str("    trace::localWriter.endStruct();\n");
        self.out.push_str("}\n\n");
        Ok(())
    }

    fn visit_array(&mut self, api: &Api, _id: TypeId, element: TypeId, _length: &str) -> Result<()> {
        self.visit(api, element)
    }

    fn visit_enum(&mut self, api: &Api, id: TypeId, e: &Enumeration) -> Result<()> {
        let tag = &api.get(id).tag;
        self.out.push_str(&format!(
            "static const trace::EnumValue __enum{tag}_values[] = {{\n"
        ));
        for value in &e.values {
            self.out
                .push_str(&format!("   {{{}, {value}}},\n", cpp::quote(value)));
        }
        self.out.push_str("};\n\n");
        self.out.push_str(&format!(
            "static const trace::EnumSig __enum{tag}_sig = {{\n"
        ));
        self.out.push_str(&format!(
            "   {}, {}, __enum{tag}_values\n",
            e.id,
            e.values.len()
        ));
        self.out.push_str("};\n\n");
        Ok(())
    }

    fn visit_bitmask(&mut self, api: &Api, id: TypeId, b: &Bitmask) -> Result<()> {
        let tag = &api.get(id).tag;
        self.out.push_str(&format!(
            "static const trace::BitmaskFlag __bitmask{tag}_flags[] = {{\n"
        ));
        for flag in &b.flags {
            self.out
                .push_str(&format!("   {{{}, {flag}}},\n", cpp::quote(flag)));
        }
        self.out.push_str("};\n\n");
        self.out.push_str(&format!(
            "static const trace::BitmaskSig __bitmask{tag}_sig = {{\n"
        ));
        self.out.push_str(&format!(
            "   {}, {}, __bitmask{tag}_flags\n",
            b.id,
            b.flags.len()
        ));
        self.out.push_str("};\n\n");
        Ok(())
    }

    fn visit_interface(&mut self, api: &Api, _id: TypeId, iface: &Interface) -> Result<()> {
        // Method signatures may be the only reference to some types.
        for method in &iface.methods {
            self.visit(api, method.ret)?;
            for arg in &method.args {
                self.visit(api, arg.ty)?;
            }
        }
        let wrap = cpp::wrap_name(&iface.name);
        self.out
            .push_str(&format!("class {wrap} : public {}\n", iface.name));
        self.out.push_str("{\n");
        self.out.push_str("public:\n");
        self.out
            .push_str(&format!("    {wrap}({} * pInstance);\n", iface.name));
        self.out.push_str(&format!("    virtual ~{wrap}();\n"));
        self.out.push('\n');
        for method in &iface.methods {
            self.out.push_str(&format!(
                "    {};\n",
                cpp::prototype(api, method.ret, &method.name, &method.args)
            ));
        }
        self.out.push('\n');
        self.out
            .push_str(&format!("    {} * m_pInstance;\n", iface.name));
        self.out.push_str("};\n\n");
        Ok(())
    }

    fn visit_polymorphic(&mut self, api: &Api, id: TypeId, p: &Polymorphic) -> Result<()> {
        for case in &p.cases {
            self.visit(api, case.ty)?;
        }
        let def = api.get(id);
        self.out.push_str(&format!(
            "static void _write__{}(int selector, const {} & value) {{\n",
            def.tag, def.expr
        ));
        self.out.push_str("    switch (selector) {\n");
        let serializer = ValueSerializer::new(api);
        for case in &p.cases {
            for label in &case.labels {
                self.out.push_str(&format!("    case {label}:\n"));
            }
            let cast = format!("static_cast<{}>(value)", api.get(case.ty).expr);
            serializer.serialize(case.ty, &cast, &mut self.out)?;
            self.out.push_str("        break;\n");
        }
        self.out.push_str("    }\n");
        self.out.push_str("}\n\n");
        Ok(())
    }
}
