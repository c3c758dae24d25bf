//! Tests for complex-type helper emission.

use tracegen_model::{Api, LiteralKind, Method, TypeId};

use crate::complex::ComplexSerializer;
use crate::visit::TypeVisitor;

fn emit(api: &Api, roots: &[TypeId]) -> String {
    let mut serializer = ComplexSerializer::new();
    for &id in roots {
        serializer.visit(api, id).expect("emittable type");
    }
    serializer.finish()
}

#[test]
fn struct_helper_serializes_members_in_declared_order() {
    let mut api = Api::new();
    let float = api.literal("float", LiteralKind::Float);
    let point = api.structure("Point", vec![(float, "x"), (float, "y")]);
    let out = emit(&api, &[point]);
    insta::assert_snapshot!(out.trim_end(), @r#"
    static void _write__Point(const Point &value) {
        static const char * members[2] = {
            "x",
            "y",
        };
        static const trace::StructSig sig = {
           0, "Point", 2, members
        };
        trace::localWriter.beginStruct(&sig);
        trace::localWriter.writeFloat(value.x);
        trace::localWriter.writeFloat(value.y);
        trace::localWriter.endStruct();
    }
    "#);
}

#[test]
fn helpers_are_emitted_once() {
    let mut api = Api::new();
    let float = api.literal("float", LiteralKind::Float);
    let point = api.structure("Point", vec![(float, "x"), (float, "y")]);
    let out = emit(&api, &[point, point, point]);
    assert_eq!(out.matches("static void _write__Point").count(), 1);
}

#[test]
fn member_helpers_precede_their_dependents() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let inner = api.structure("Extent", vec![(int, "w"), (int, "h")]);
    let outer = api.structure("Viewport", vec![(inner, "extent"), (int, "depth")]);
    let out = emit(&api, &[outer]);

    let inner_pos = out.find("static void _write__Extent").expect("inner helper");
    let outer_pos = out.find("static void _write__Viewport").expect("outer helper");
    assert!(inner_pos < outer_pos);
}

#[test]
fn enum_table_preserves_declared_order() {
    let mut api = Api::new();
    let fruit = api.enumeration("Fruit", vec!["F_PEAR", "F_APPLE", "F_QUINCE"]);
    let out = emit(&api, &[fruit]);
    insta::assert_snapshot!(out.trim_end(), @r#"
    static const trace::EnumValue __enumFruit_values[] = {
       {"F_PEAR", F_PEAR},
       {"F_APPLE", F_APPLE},
       {"F_QUINCE", F_QUINCE},
    };

    static const trace::EnumSig __enumFruit_sig = {
       0, 3, __enumFruit_values
    };
    "#);
}

#[test]
fn bitmask_table_references_its_flags() {
    let mut api = Api::new();
    let flags = api.bitmask("MapFlags", vec!["MAP_READ", "MAP_WRITE"]);
    let out = emit(&api, &[flags]);
    insta::assert_snapshot!(out.trim_end(), @r#"
    static const trace::BitmaskFlag __bitmaskMapFlags_flags[] = {
       {"MAP_READ", MAP_READ},
       {"MAP_WRITE", MAP_WRITE},
    };

    static const trace::BitmaskSig __bitmaskMapFlags_sig = {
       0, 2, __bitmaskMapFlags_flags
    };
    "#);
}

#[test]
fn polymorphic_dispatch_switches_on_the_selector() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let float = api.literal("float", LiteralKind::Float);
    let poly = api.polymorphic(
        "GLparam",
        "pname",
        vec![(vec!["GL_A", "GL_B"], int), (vec!["GL_C"], float)],
    );
    let out = emit(&api, &[poly]);
    insta::assert_snapshot!(out.trim_end(), @r"
    static void _write__GLparam(int selector, const GLparam & value) {
        switch (selector) {
        case GL_A:
        case GL_B:
        trace::localWriter.writeSInt(static_cast<int>(value));
            break;
        case GL_C:
        trace::localWriter.writeFloat(static_cast<float>(value));
            break;
        }
    }
    ");
}

#[test]
fn polymorphic_case_helpers_come_first() {
    let mut api = Api::new();
    let float = api.literal("float", LiteralKind::Float);
    let point = api.structure("Point", vec![(float, "x"), (float, "y")]);
    let poly = api.polymorphic("Payload", "kind", vec![(vec!["K_POINT"], point)]);
    let out = emit(&api, &[poly]);

    let case_pos = out.find("static void _write__Point").expect("case helper");
    let dispatch_pos = out.find("static void _write__Payload").expect("dispatch");
    assert!(case_pos < dispatch_pos);
}

#[test]
fn interface_declares_a_proxy_class() {
    let mut api = Api::new();
    let ulong = api.literal("ULONG", LiteralKind::UInt);
    let iface = api.interface(
        "IThing",
        vec![
            Method::new("AddRef", ulong, vec![]),
            Method::new("Release", ulong, vec![]),
        ],
    );
    let out = emit(&api, &[iface]);
    insta::assert_snapshot!(out.trim_end(), @r"
    class WrapIThing : public IThing
    {
    public:
        WrapIThing(IThing * pInstance);
        virtual ~WrapIThing();

        ULONG AddRef();
        ULONG Release();

        IThing * m_pInstance;
    };
    ");
}

#[test]
fn transparent_and_terminal_kinds_emit_nothing() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let ptr = api.pointer(int);
    let const_ptr = api.const_of(ptr);
    let blob = api.blob("n");
    let s = api.string(None);
    let out = emit(&api, &[const_ptr, blob, s, int]);
    assert_eq!(out, "");
}

#[test]
fn recursive_struct_terminates_and_emits_once() {
    let mut api = Api::new();
    let node = api.structure_decl("Node");
    let next = api.pointer(node);
    let int = api.literal("int", LiteralKind::SInt);
    api.structure_define(node, vec![(int, "value"), (next, "next")]);

    let out = emit(&api, &[node]);
    assert_eq!(out.matches("static void _write__Node").count(), 1);
    // the next pointer serializes through the helper itself
    assert!(out.contains("    _write__Node(*value.next);\n"));
}

#[test]
fn array_element_helpers_are_pulled_in() {
    let mut api = Api::new();
    let float = api.literal("float", LiteralKind::Float);
    let point = api.structure("Point", vec![(float, "x"), (float, "y")]);
    let arr = api.array(point, "count");
    let out = emit(&api, &[arr]);
    assert!(out.contains("static void _write__Point"));
}
