//! Whole-API orchestration.
//!
//! [`Tracer`] drives one generation pass and produces one ordered text
//! stream: header includes, then every complex-type helper, then the requery
//! factory table, then one proxy implementation per interface, then one
//! signature table and one intercepted body per free function.
//!
//! Every intercepted call emits a strictly sequential envelope:
//! `beginEnter` → inputs (unwrap, then serialize) → `endEnter` → real call →
//! `beginLeave` → outputs (serialize, then wrap) → result → `endLeave`. The
//! application ends up holding wrapped proxies; the library only ever sees
//! real instances.

use tracegen_model::{Api, Arg, Function, Interface, Method, TypeId, TypeKind};

use crate::complex::ComplexSerializer;
use crate::value::ValueSerializer;
use crate::visit::TypeVisitor;
use crate::wrap::{Mode, ValueWrapper};
use crate::{Error, Result, cpp};

/// Method name with identity-preserving lookup semantics.
const REQUERY_METHOD: &str = "QueryInterface";
/// Method name whose zero return destroys the proxy.
const RELEASE_METHOD: &str = "Release";

/// Generation options.
#[derive(Clone, Debug)]
pub struct Config {
    /// Prefix of the dispatch symbol the generated code calls to reach the
    /// real function.
    pub dispatch_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch_prefix: "__".to_string(),
        }
    }
}

pub struct Tracer<'a> {
    api: &'a Api,
    config: Config,
    out: String,
}

impl<'a> Tracer<'a> {
    pub fn new(api: &'a Api) -> Self {
        Self::with_config(api, Config::default())
    }

    pub fn with_config(api: &'a Api, config: Config) -> Self {
        Self {
            api,
            config,
            out: String::new(),
        }
    }

    /// Generate the whole interception layer.
    pub fn emit(mut self) -> Result<String> {
        let api = self.api;
        self.headers();
        self.complex_types()?;
        self.wrap_factories();
        for &id in api.interfaces() {
            self.interface_impl(id)?;
        }
        for function in &api.functions {
            self.function_decl(function);
        }
        for function in &api.functions {
            self.function_impl(function)?;
        }
        Ok(self.out)
    }

    fn headers(&mut self) {
        let api = self.api;
        for line in &api.headers {
            self.out.push_str(line);
            self.out.push('\n');
        }
        if !api.headers.is_empty() {
            self.out.push('\n');
        }
    }

    fn complex_types(&mut self) -> Result<()> {
        let api = self.api;
        let mut serializer = ComplexSerializer::new();
        for id in api.type_ids() {
            serializer.visit(api, id)?;
        }
        self.out.push_str(&serializer.finish());
        Ok(())
    }

    /// Static table mapping interface identifiers to proxy factories,
    /// consulted by requery interception. Read-only after program start.
    fn wrap_factories(&mut self) {
        let api = self.api;
        if api.interfaces().is_empty() {
            return;
        }
        for &id in api.interfaces() {
            let iface = interface_of(api, id);
            let wrap = cpp::wrap_name(&iface.name);
            self.out.push_str(&format!(
                "static IUnknown * _wrap__{}(void *pInstance) {{\n",
                api.get(id).tag
            ));
            self.out.push_str(&format!(
                "    return new {wrap}(({} *) pInstance);\n",
                iface.name
            ));
            self.out.push_str("}\n\n");
        }
        self.out.push_str("struct _WrapEntry {\n");
        self.out.push_str("    const IID *iid;\n");
        self.out.push_str("    IUnknown * (*wrap)(void *pInstance);\n");
        self.out.push_str("};\n\n");
        let count = api.interfaces().len();
        self.out
            .push_str(&format!("static const _WrapEntry _wrap_table[{count}] = {{\n"));
        for &id in api.interfaces() {
            let iface = interface_of(api, id);
            self.out.push_str(&format!(
                "    {{&IID_{}, _wrap__{}}},\n",
                iface.name,
                api.get(id).tag
            ));
        }
        self.out.push_str("};\n\n");
        self.out
            .push_str("static const _WrapEntry * _lookupWrap(REFIID riid) {\n");
        self.out
            .push_str(&format!("    for (size_t i = 0; i < {count}; ++i) {{\n"));
        self.out.push_str("        if (riid == *_wrap_table[i].iid) {\n");
        self.out.push_str("            return &_wrap_table[i];\n");
        self.out.push_str("        }\n");
        self.out.push_str("    }\n");
        self.out.push_str("    return NULL;\n");
        self.out.push_str("}\n\n");
    }

    fn interface_impl(&mut self, id: TypeId) -> Result<()> {
        let api = self.api;
        let iface = interface_of(api, id);
        let wrap = cpp::wrap_name(&iface.name);
        self.out
            .push_str(&format!("{wrap}::{wrap}({} * pInstance) {{\n", iface.name));
        self.out.push_str("    m_pInstance = pInstance;\n");
        self.out.push_str("}\n\n");
        self.out.push_str(&format!("{wrap}::~{wrap}() {{\n"));
        self.out.push_str("}\n\n");
        for method in &iface.methods {
            self.method_impl(iface, method)?;
        }
        Ok(())
    }

    fn method_impl(&mut self, iface: &Interface, method: &Method) -> Result<()> {
        let api = self.api;
        let wrap = cpp::wrap_name(&iface.name);
        let ret = api.get(method.ret);
        let non_void = !matches!(ret.kind, TypeKind::Void);

        let qualified = format!("{wrap}::{}", method.name);
        self.out.push_str(&format!(
            "{} {{\n",
            cpp::prototype(api, method.ret, &qualified, &method.args)
        ));
        let mut names = vec![cpp::quote("this")];
        names.extend(method.args.iter().map(|arg| cpp::quote(&arg.name)));
        let argc = method.args.len() + 1;
        self.out.push_str(&format!(
            "    static const char * __args[{argc}] = {{{}}};\n",
            names.join(", ")
        ));
        self.out.push_str(&format!(
            "    static const trace::FunctionSig __sig = {{{}, {}, {argc}, __args}};\n",
            method.id,
            cpp::quote(&format!("{}::{}", iface.name, method.name))
        ));
        self.out
            .push_str("    unsigned __call = trace::localWriter.beginEnter(&__sig);\n");
        self.out.push_str("    trace::localWriter.beginArg(0);\n");
        self.out
            .push_str("    trace::localWriter.writeOpaque((const void *)m_pInstance);\n");
        self.out.push_str("    trace::localWriter.endArg();\n");
        for arg in &method.args {
            if !arg.is_output() {
                self.unwrap_value(arg.ty, &arg.name)?;
                self.serialize_arg(arg)?;
            }
        }
        if non_void {
            self.out.push_str(&format!("    {} __result;\n", ret.expr));
        }
        self.out.push_str("    trace::localWriter.endEnter();\n");
        let call = format!(
            "m_pInstance->{}({})",
            method.name,
            cpp::arg_names(&method.args)
        );
        if non_void {
            self.out.push_str(&format!("    __result = {call};\n"));
        } else {
            self.out.push_str(&format!("    {call};\n"));
        }
        self.out
            .push_str("    trace::localWriter.beginLeave(__call);\n");
        for arg in &method.args {
            if arg.is_output() {
                self.serialize_arg(arg)?;
                self.wrap_value(arg.ty, &arg.name)?;
            }
        }
        if non_void {
            self.serialize_ret(method.ret)?;
            self.wrap_value(method.ret, "__result")?;
        }
        self.out.push_str("    trace::localWriter.endLeave();\n");
        if method.name == REQUERY_METHOD {
            self.requery_tail(method);
        }
        if method.name == RELEASE_METHOD {
            if !non_void {
                return Err(Error::ReleaseReturnsVoid(iface.name.clone()));
            }
            self.out.push_str("    if (!__result)\n");
            self.out.push_str("        delete this;\n");
        }
        if non_void {
            self.out.push_str("    return __result;\n");
        }
        self.out.push_str("}\n\n");
        Ok(())
    }

    /// Identity-preserving requery: re-querying an already-wrapped instance
    /// yields this proxy; known identifiers go through the factory table;
    /// unknown ones are logged and passed through unwrapped.
    fn requery_tail(&mut self, method: &Method) {
        let Some(riid) = method.args.iter().find(|arg| !arg.is_output()) else {
            return;
        };
        let Some(slot) = method.args.iter().find(|arg| arg.is_output()) else {
            return;
        };
        let riid = &riid.name;
        let slot = &slot.name;
        self.out.push_str(&format!("    if ({slot} && *{slot}) {{\n"));
        self.out
            .push_str(&format!("        if (*{slot} == m_pInstance) {{\n"));
        self.out.push_str(&format!("            *{slot} = this;\n"));
        self.out.push_str("        } else {\n");
        self.out.push_str(&format!(
            "            const _WrapEntry *_entry = _lookupWrap({riid});\n"
        ));
        self.out.push_str("            if (_entry) {\n");
        self.out
            .push_str(&format!("                *{slot} = _entry->wrap(*{slot});\n"));
        self.out.push_str("            } else {\n");
        self.out.push_str("                os::log(\"tracegen: warning: unknown REFIID {0x%08lX,0x%04X,0x%04X,{0x%02X,0x%02X,0x%02X,0x%02X,0x%02X,0x%02X,0x%02X,0x%02X}}\\n\",\n");
        self.out.push_str(&format!(
            "                        {riid}.Data1, {riid}.Data2, {riid}.Data3,\n"
        ));
        for i in 0..8 {
            let sep = if i == 7 { ");" } else { "," };
            self.out
                .push_str(&format!("                        {riid}.Data4[{i}]{sep}\n"));
        }
        self.out.push_str("            }\n");
        self.out.push_str("        }\n");
        self.out.push_str("    }\n");
    }

    fn function_decl(&mut self, function: &Function) {
        let name = &function.name;
        if function.args.is_empty() {
            self.out
                .push_str(&format!("static const char ** __{name}_args = NULL;\n"));
        } else {
            let names: Vec<String> = function
                .args
                .iter()
                .map(|arg| cpp::quote(&arg.name))
                .collect();
            self.out.push_str(&format!(
                "static const char * __{name}_args[{}] = {{{}}};\n",
                function.args.len(),
                names.join(", ")
            ));
        }
        self.out.push_str(&format!(
            "static const trace::FunctionSig __{name}_sig = {{{}, {}, {}, __{name}_args}};\n\n",
            function.id,
            cpp::quote(name),
            function.args.len()
        ));
    }

    fn function_impl(&mut self, function: &Function) -> Result<()> {
        let api = self.api;
        let ret = api.get(function.ret);
        let non_void = !matches!(ret.kind, TypeKind::Void);
        if function.is_public() {
            self.out.push_str("extern \"C\" PUBLIC\n");
        } else {
            self.out.push_str("extern \"C\" PRIVATE\n");
        }
        self.out.push_str(&format!(
            "{} {{\n",
            cpp::prototype(api, function.ret, &function.name, &function.args)
        ));
        if non_void {
            self.out.push_str(&format!("    {} __result;\n", ret.expr));
        }
        self.out.push_str(&format!(
            "    unsigned __call = trace::localWriter.beginEnter(&__{}_sig);\n",
            function.name
        ));
        for arg in &function.args {
            if !arg.is_output() {
                self.unwrap_value(arg.ty, &arg.name)?;
                self.serialize_arg(arg)?;
            }
        }
        self.out.push_str("    trace::localWriter.endEnter();\n");
        let call = format!(
            "{}{}({})",
            self.config.dispatch_prefix,
            function.name,
            cpp::arg_names(&function.args)
        );
        if non_void {
            self.out.push_str(&format!("    __result = {call};\n"));
        } else {
            self.out.push_str(&format!("    {call};\n"));
        }
        self.out
            .push_str("    trace::localWriter.beginLeave(__call);\n");
        for arg in &function.args {
            if arg.is_output() {
                self.serialize_arg(arg)?;
                self.wrap_value(arg.ty, &arg.name)?;
            }
        }
        if non_void {
            self.serialize_ret(function.ret)?;
            self.wrap_value(function.ret, "__result")?;
        }
        self.out.push_str("    trace::localWriter.endLeave();\n");
        if non_void {
            self.out.push_str("    return __result;\n");
        }
        self.out.push_str("}\n\n");
        Ok(())
    }

    fn serialize_arg(&mut self, arg: &Arg) -> Result<()> {
        let api = self.api;
        self.out
            .push_str(&format!("    trace::localWriter.beginArg({});\n", arg.index));
        ValueSerializer::new(api).serialize(arg.ty, &arg.name, &mut self.out)?;
        self.out.push_str("    trace::localWriter.endArg();\n");
        Ok(())
    }

    fn serialize_ret(&mut self, ty: TypeId) -> Result<()> {
        let api = self.api;
        self.out.push_str("    trace::localWriter.beginReturn();\n");
        ValueSerializer::new(api).serialize(ty, "__result", &mut self.out)?;
        self.out.push_str("    trace::localWriter.endReturn();\n");
        Ok(())
    }

    fn wrap_value(&mut self, ty: TypeId, instance: &str) -> Result<()> {
        let api = self.api;
        ValueWrapper::new(api, Mode::Wrap).visit(ty, instance, &mut self.out)
    }

    fn unwrap_value(&mut self, ty: TypeId, instance: &str) -> Result<()> {
        let api = self.api;
        ValueWrapper::new(api, Mode::Unwrap).visit(ty, instance, &mut self.out)
    }
}

fn interface_of(api: &Api, id: TypeId) -> &Interface {
    match &api.get(id).kind {
        TypeKind::Interface(iface) => iface,
        _ => unreachable!("interface registry holds only interface types"),
    }
}
