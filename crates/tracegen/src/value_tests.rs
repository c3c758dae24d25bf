//! Tests for inline value serialization.

use tracegen_model::{Api, LiteralKind, TypeId};

use crate::Error;
use crate::value::ValueSerializer;

fn emit(api: &Api, id: TypeId, instance: &str) -> String {
    let mut out = String::new();
    ValueSerializer::new(api)
        .serialize(id, instance, &mut out)
        .expect("serializable value");
    out
}

#[test]
fn literal_kinds_select_the_writer_call() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let double = api.literal("double", LiteralKind::Double);
    assert_eq!(emit(&api, int, "x"), "    trace::localWriter.writeSInt(x);\n");
    assert_eq!(
        emit(&api, double, "d"),
        "    trace::localWriter.writeDouble(d);\n"
    );
}

#[test]
fn null_terminated_string() {
    let mut api = Api::new();
    let s = api.string(None);
    assert_eq!(
        emit(&api, s, "name"),
        "    trace::localWriter.writeString((const char *)name);\n"
    );
}

#[test]
fn fixed_length_string_passes_the_length() {
    let mut api = Api::new();
    let s = api.string(Some("32"));
    assert_eq!(
        emit(&api, s, "label"),
        "    trace::localWriter.writeString((const char *)label, 32);\n"
    );
}

#[test]
fn transparent_kinds_serialize_as_their_inner_type() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let const_int = api.const_of(int);
    let handle = api.handle("Fence", int);
    let alias = api.alias("INT32", int);

    let expected = "    trace::localWriter.writeSInt(v);\n";
    assert_eq!(emit(&api, const_int, "v"), expected);
    assert_eq!(emit(&api, handle, "v"), expected);
    assert_eq!(emit(&api, alias, "v"), expected);
}

#[test]
fn struct_delegates_to_its_helper() {
    let mut api = Api::new();
    let float = api.literal("float", LiteralKind::Float);
    let point = api.structure("Point", vec![(float, "x"), (float, "y")]);
    assert_eq!(emit(&api, point, "p"), "    _write__Point(p);\n");
}

#[test]
fn enum_and_bitmask_pass_their_signatures() {
    let mut api = Api::new();
    let fruit = api.enumeration("Fruit", vec!["F_APPLE", "F_PEAR"]);
    let flags = api.bitmask("MapFlags", vec!["MAP_READ", "MAP_WRITE"]);
    assert_eq!(
        emit(&api, fruit, "f"),
        "    trace::localWriter.writeEnum(&__enumFruit_sig, f);\n"
    );
    assert_eq!(
        emit(&api, flags, "access"),
        "    trace::localWriter.writeBitmask(&__bitmaskMapFlags_sig, access);\n"
    );
}

#[test]
fn blob_writes_pointer_and_size() {
    let mut api = Api::new();
    let blob = api.blob("size");
    assert_eq!(
        emit(&api, blob, "data"),
        "    trace::localWriter.writeBlob(data, size);\n"
    );
}

#[test]
fn opaque_and_interface_record_identity() {
    let mut api = Api::new();
    let ctx = api.opaque("HGLRC");
    let iface = api.interface("IThing", vec![]);
    assert_eq!(
        emit(&api, ctx, "ctx"),
        "    trace::localWriter.writeOpaque((const void *)ctx);\n"
    );
    assert_eq!(
        emit(&api, iface, "*obj"),
        "    trace::localWriter.writeOpaque((const void *)&*obj);\n"
    );
}

#[test]
fn pointer_is_an_array_of_one() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let ptr = api.pointer(int);
    assert_eq!(
        emit(&api, ptr, "data"),
        concat!(
            "    if (data) {\n",
            "        trace::localWriter.beginArray(1);\n",
            "        trace::localWriter.beginElement();\n",
            "    trace::localWriter.writeSInt(*data);\n",
            "        trace::localWriter.endElement();\n",
            "        trace::localWriter.endArray();\n",
            "    } else {\n",
            "        trace::localWriter.writeNull();\n",
            "    }\n",
        )
    );
}

#[test]
fn array_loops_over_the_computed_length() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let arr = api.array(int, "count");
    assert_eq!(
        emit(&api, arr, "values"),
        concat!(
            "    if (values) {\n",
            "        size_t __cint = count;\n",
            "        trace::localWriter.beginArray(__cint);\n",
            "        for (size_t __iint = 0; __iint < __cint; ++__iint) {\n",
            "            trace::localWriter.beginElement();\n",
            "    trace::localWriter.writeSInt((values)[__iint]);\n",
            "            trace::localWriter.endElement();\n",
            "        }\n",
            "        trace::localWriter.endArray();\n",
            "    } else {\n",
            "        trace::localWriter.writeNull();\n",
            "    }\n",
        )
    );
}

#[test]
fn polymorphic_delegates_with_its_selector() {
    let mut api = Api::new();
    let int = api.literal("int", LiteralKind::SInt);
    let poly = api.polymorphic("GLvalue", "pname", vec![(vec!["GL_DEPTH"], int)]);
    assert_eq!(emit(&api, poly, "param"), "    _write__GLvalue(pname, param);\n");
}

#[test]
fn void_is_rejected() {
    let api = Api::new();
    let mut out = String::new();
    let err = ValueSerializer::new(&api)
        .serialize(Api::VOID, "x", &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::VoidValue(instance) if instance == "x"));
    assert!(out.is_empty());
}
