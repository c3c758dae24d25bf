//! Tests for interface wrapping and unwrapping.

use tracegen_model::{Api, LiteralKind, TypeId};

use crate::Error;
use crate::wrap::{Mode, ValueWrapper};

fn emit(api: &Api, mode: Mode, id: TypeId, instance: &str) -> String {
    let mut out = String::new();
    ValueWrapper::new(api, mode)
        .visit(id, instance, &mut out)
        .expect("wrappable value");
    out
}

#[test]
fn interface_pointer_is_wrapped_into_a_proxy() {
    let mut api = Api::new();
    let iface = api.interface("IThing", vec![]);
    let ptr = api.pointer(iface);
    assert_eq!(
        emit(&api, Mode::Wrap, ptr, "obj"),
        concat!(
            "    if (obj) {\n",
            "    if (obj) {\n",
            "        obj = new WrapIThing(obj);\n",
            "    }\n",
            "    }\n",
        )
    );
}

#[test]
fn unwrap_recovers_the_real_instance() {
    let mut api = Api::new();
    let iface = api.interface("IThing", vec![]);
    let ptr = api.pointer(iface);
    assert_eq!(
        emit(&api, Mode::Unwrap, ptr, "obj"),
        concat!(
            "    if (obj) {\n",
            "    if (obj) {\n",
            "        obj = static_cast<WrapIThing *>(obj)->m_pInstance;\n",
            "    }\n",
            "    }\n",
        )
    );
}

#[test]
fn output_slot_rewrites_through_two_pointer_hops() {
    let mut api = Api::new();
    let iface = api.interface("IThing", vec![]);
    let ptr = api.pointer(iface);
    let slot = api.pointer(ptr);
    assert_eq!(
        emit(&api, Mode::Wrap, slot, "ppOut"),
        concat!(
            "    if (ppOut) {\n",
            "    if (*ppOut) {\n",
            "    if (*ppOut) {\n",
            "        *ppOut = new WrapIThing(*ppOut);\n",
            "    }\n",
            "    }\n",
            "    }\n",
        )
    );
}

#[test]
fn data_pointers_emit_nothing() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let ptr = api.pointer(int);
    assert_eq!(emit(&api, Mode::Wrap, ptr, "data"), "");
    assert_eq!(emit(&api, Mode::Unwrap, ptr, "data"), "");
}

#[test]
fn struct_members_are_searched() {
    let mut api = Api::new();
    let iface = api.interface("IThing", vec![]);
    let ptr = api.pointer(iface);
    let int = api.literal("int", LiteralKind::SInt);
    let desc = api.structure("Desc", vec![(int, "size"), (ptr, "handler")]);
    assert_eq!(
        emit(&api, Mode::Wrap, desc, "desc"),
        concat!(
            "    if ((desc).handler) {\n",
            "    if ((desc).handler) {\n",
            "        (desc).handler = new WrapIThing((desc).handler);\n",
            "    }\n",
            "    }\n",
        )
    );
}

#[test]
fn aliases_and_handles_are_transparent() {
    let mut api = Api::new();
    let iface = api.interface("IThing", vec![]);
    let ptr = api.pointer(iface);
    let alias = api.alias("LPTHING", ptr);
    let out = emit(&api, Mode::Wrap, alias, "obj");
    assert!(out.contains("new WrapIThing(obj)"));
}

#[test]
fn interface_pointer_arrays_are_not_rewritten() {
    let mut api = Api::new();
    let iface = api.interface("IThing", vec![]);
    let ptr = api.pointer(iface);
    let arr = api.array(ptr, "count");
    assert_eq!(emit(&api, Mode::Wrap, arr, "objs"), "");
}

#[test]
fn void_is_rejected() {
    let api = Api::new();
    let mut out = String::new();
    let err = ValueWrapper::new(&api, Mode::Wrap)
        .visit(Api::VOID, "x", &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::VoidWrap(instance) if instance == "x"));
}
