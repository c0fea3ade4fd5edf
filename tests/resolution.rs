//! Integration tests for cross-assembly reference resolution.
//!
//! Every scenario wires up a set of in-memory assemblies behind an [`AssemblyCache`], then
//! resolves references from an application module that only knows the names of its targets.

mod common;

use std::sync::Arc;

use cilgraph::prelude::*;
use common::*;

#[test]
fn direct_reference_resolves_to_definition() {
    let widgets = widgets_assembly();
    let resolver = resolver_over(&[widgets.clone()], ResolverConfig::default());
    let app = app_module(&identity("Widgets", 1));

    let reference = app.type_ref(1).unwrap();
    let resolved = resolver.resolve_type(&reference, None).unwrap();
    let expected = widgets.find_by_name("Demo", "Widget").unwrap();
    assert!(Arc::ptr_eq(&resolved, &expected));
    assert_eq!(resolved.full_name(), "Demo.Widget");
}

#[test]
fn forwarder_chain_is_followed() {
    let widgets = widgets_assembly();
    let second = facade("Second", &identity("Widgets", 1));
    let first = facade("First", &identity("Second", 1));
    let resolver = resolver_over(&[widgets.clone(), second, first], ResolverConfig::default());

    let app = app_module(&identity("First", 1));
    let resolved = resolver.resolve_type(&app.type_ref(1).unwrap(), None).unwrap();
    let expected = widgets.find_by_name("Demo", "Widget").unwrap();
    assert!(Arc::ptr_eq(&resolved, &expected));
}

#[test]
fn forwarder_cycle_terminates() {
    let a = facade("CycleA", &identity("CycleB", 1));
    let b = facade("CycleB", &identity("CycleA", 1));
    let resolver = resolver_over(&[a, b], ResolverConfig::default());

    let app = app_module(&identity("CycleA", 1));
    assert!(resolver.resolve_type(&app.type_ref(1).unwrap(), None).is_none());
}

#[test]
fn hop_bound_limits_forwarders() {
    let widgets = widgets_assembly();
    let mut assemblies = vec![widgets];
    let mut next = identity("Widgets", 1);
    for index in (0..3).rev() {
        let name = format!("Hop{index}");
        assemblies.push(facade(&name, &next));
        next = identity(&name, 1);
    }
    let app = app_module(&identity("Hop0", 1));
    let reference = app.type_ref(1).unwrap();

    let enough = resolver_over(
        &assemblies,
        ResolverConfig::default().with_max_forwarder_hops(3),
    );
    assert!(enough.resolve_type(&reference, None).is_some());

    let too_few = resolver_over(
        &assemblies,
        ResolverConfig::default().with_max_forwarder_hops(2),
    );
    assert!(too_few.resolve_type(&reference, None).is_none());
}

#[test]
fn missing_assembly_is_not_found() {
    let resolver = resolver_over(&[widgets_assembly()], ResolverConfig::default());
    let app = app_module(&identity("Elsewhere", 1));
    assert!(resolver.resolve_type(&app.type_ref(1).unwrap(), None).is_none());
}

#[test]
fn older_assembly_does_not_satisfy_newer_reference() {
    let resolver = resolver_over(&[widgets_assembly()], ResolverConfig::default());
    let app = app_module(&identity("Widgets", 2));
    assert!(resolver.resolve_type(&app.type_ref(1).unwrap(), None).is_none());
}

#[test]
fn member_references_resolve_through_forwarders() {
    let widgets = widgets_assembly();
    let forwarder = facade("Forwarder", &identity("Widgets", 1));
    let resolver = resolver_over(&[widgets.clone(), forwarder], ResolverConfig::default());
    let app = app_module(&identity("Forwarder", 1));
    let widget = widgets.find_by_name("Demo", "Widget").unwrap();

    let spin = resolver.resolve_method(&app.member_ref(1).unwrap()).unwrap();
    assert_eq!(spin.name(), "Spin");
    assert!(Arc::ptr_eq(&spin.declaring_type().unwrap(), &widget));

    let size = resolver.resolve_field(&app.member_ref(2).unwrap()).unwrap();
    assert_eq!(size.name(), "size");
    assert!(resolver.resolve_method(&app.member_ref(2).unwrap()).is_none());
}

#[test]
fn member_signature_must_match() {
    let resolver = resolver_over(&[widgets_assembly()], ResolverConfig::default());
    let app = app_module(&identity("Widgets", 1));

    let spin = app.member_ref(1).unwrap();
    spin.set_signature(Some(Signature::Method(SignatureMethod {
        has_this: true,
        params: vec![TypeSignature::String],
        ..SignatureMethod::default()
    })));
    assert!(resolver.resolve_member(&spin).is_none());
}

#[test]
fn resolution_is_safe_from_many_threads() {
    use rayon::prelude::*;

    let widgets = widgets_assembly();
    let forwarder = facade("Forwarder", &identity("Widgets", 1));
    let resolver = resolver_over(&[widgets.clone(), forwarder], ResolverConfig::default());
    let app = app_module(&identity("Forwarder", 1));
    let reference = app.type_ref(1).unwrap();
    let expected = widgets.find_by_name("Demo", "Widget").unwrap();

    let all_match = (0..64)
        .into_par_iter()
        .map(|_| resolver.resolve_type(&reference, None))
        .all(|resolved| resolved.is_some_and(|ty| Arc::ptr_eq(&ty, &expected)));
    assert!(all_match);
}
