//! Integration tests for generic containment analysis over a materialized module.

use std::sync::Arc;

use cilgraph::{
    metadata::{
        provider::TokenResolver,
        signatures::SignatureMethodSpec,
        tables::TypeAttributes,
    },
    prelude::*,
};

/// Rows of the store built by [`generic_module`]
struct Rows {
    open_spec: Token,
    closed_spec: Token,
    cyclic_spec: Token,
    open_member: Token,
    closed_member: Token,
    open_instantiation: Token,
    closed_instantiation: Token,
    constrained: Token,
}

fn list_of(resolver: &dyn TokenResolver, list: Token, arg: TypeSignature) -> Option<TypeSignature> {
    Some(TypeSignature::GenericInst(
        Box::new(TypeSignature::Class(resolver.type_def_or_ref(list)?)),
        vec![arg],
    ))
}

fn generic_module() -> (ModuleRc, Rows) {
    let mut provider = MemoryProvider::new();
    provider.add_module("Generics.dll");
    provider.add_type_def("", "<Module>", 0, None);
    let corlib = provider.add_assembly_ref(
        &AssemblyIdentity::new("System.Runtime", AssemblyVersion::new(8, 0, 0, 0), None, None),
        0,
    );
    let list = provider.add_type_ref(corlib, "System.Collections.Generic", "List`1");

    let open =
        provider.add_type_signature(move |r| list_of(r, list, TypeSignature::GenericParamType(0)));
    let open_spec = provider.add_type_spec(open);
    let closed = provider.add_type_signature(move |r| list_of(r, list, TypeSignature::I4));
    let closed_spec = provider.add_type_spec(closed);

    // TypeSpec 3: List`1<TypeSpec 3>
    let cyclic_token = Token::from_parts(TableId::TypeSpec, 3);
    let cyclic = provider.add_type_signature(move |r| {
        let inner = TypeSignature::Class(r.type_def_or_ref(cyclic_token)?);
        list_of(r, list, inner)
    });
    let cyclic_spec = provider.add_type_spec(cyclic);
    assert_eq!(cyclic_spec, cyclic_token);

    let add = provider.add_signature(|_| {
        Some(Signature::Method(SignatureMethod {
            has_this: true,
            params: vec![TypeSignature::I4],
            ..SignatureMethod::default()
        }))
    });
    let open_member = provider.add_member_ref(open_spec, "Add", add);
    let closed_member = provider.add_member_ref(closed_spec, "Add", add);

    let open_args = provider.add_signature(|_| {
        Some(Signature::MethodSpec(SignatureMethodSpec {
            generic_args: vec![TypeSignature::SzArray(Box::new(
                TypeSignature::GenericParamMethod(0),
            ))],
        }))
    });
    let open_instantiation = provider.add_method_spec(closed_member, open_args);
    let closed_args = provider.add_signature(|_| {
        Some(Signature::MethodSpec(SignatureMethodSpec {
            generic_args: vec![TypeSignature::String],
        }))
    });
    let closed_instantiation = provider.add_method_spec(closed_member, closed_args);

    let holder = provider.add_type_def("Demo", "Holder`1", TypeAttributes::PUBLIC, None);
    let constrained = provider.add_generic_param(holder, 0, "T");
    provider.add_generic_param_constraint(constrained, open_spec);

    let module = Module::from_provider(Arc::new(provider), LoaderConfig::default()).unwrap();
    (
        module,
        Rows {
            open_spec,
            closed_spec,
            cyclic_spec,
            open_member,
            closed_member,
            open_instantiation,
            closed_instantiation,
            constrained,
        },
    )
}

#[test]
fn type_specs() {
    let (module, rows) = generic_module();
    let analyzer = GenericContainment::default();

    assert!(analyzer.type_spec(&module.type_spec(rows.open_spec.row()).unwrap()));
    assert!(!analyzer.type_spec(&module.type_spec(rows.closed_spec.row()).unwrap()));
}

#[test]
fn cyclic_type_spec_is_closed() {
    let (module, rows) = generic_module();
    let cyclic = module.type_spec(rows.cyclic_spec.row()).unwrap();
    assert!(!GenericContainment::default().type_spec(&cyclic));
    assert!(!GenericContainment::with_max_depth(3).type_spec(&cyclic));
}

#[test]
fn member_refs_inherit_their_parent() {
    let (module, rows) = generic_module();
    let analyzer = GenericContainment::default();

    let open = module.member_ref(rows.open_member.row()).unwrap();
    let closed = module.member_ref(rows.closed_member.row()).unwrap();
    assert!(analyzer.member_ref(&open));
    assert!(!analyzer.member_ref(&closed));

    closed.set_signature(Some(Signature::Method(SignatureMethod {
        has_this: true,
        params: vec![TypeSignature::GenericParamMethod(0)],
        ..SignatureMethod::default()
    })));
    assert!(analyzer.member_ref(&closed));
}

#[test]
fn method_specs_are_containing_whatever_their_arguments() {
    let (module, rows) = generic_module();
    let analyzer = GenericContainment::default();

    let open = module.method_spec(rows.open_instantiation.row()).unwrap();
    let closed = module.method_spec(rows.closed_instantiation.row()).unwrap();
    assert!(analyzer.method_spec(&open));
    assert!(analyzer.method_spec(&closed));

    assert!(analyzer.method_spec_sig(&open.instantiation().unwrap()));
    assert!(!analyzer.method_spec_sig(&closed.instantiation().unwrap()));
}

#[test]
fn constraints_are_analyzed() {
    let (module, rows) = generic_module();
    let param = module.generic_param(rows.constrained.row()).unwrap();
    let constraint = param.constraints().iter().next().map(|(_, c)| c.clone()).unwrap();
    assert!(GenericContainment::default().generic_param_constraint(&constraint));
}

#[test]
fn definitions_and_plain_references_are_closed() {
    let (module, _) = generic_module();
    let analyzer = GenericContainment::default();

    let holder = module.find_by_name("Demo", "Holder`1").unwrap();
    assert!(!analyzer.type_def(&holder));
    assert!(!analyzer.type_ref(&module.type_ref(1).unwrap()));
}
