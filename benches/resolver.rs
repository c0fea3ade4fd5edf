//! Benchmarks for reference resolution and generic containment.
//!
//! - Direct `TypeRef` resolution against a registered assembly
//! - Resolution through forwarder chains of increasing length
//! - Member resolution by name and signature
//! - Containment analysis over nested generic signatures

extern crate cilgraph;

use std::{hint::black_box, sync::Arc};

use cilgraph::{
    metadata::tables::{FieldAttributes, TypeAttributes, FORWARDER},
    prelude::*,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn identity(name: &str) -> AssemblyIdentity {
    AssemblyIdentity::new(name, AssemblyVersion::new(1, 0, 0, 0), None, None)
}

fn spin() -> Signature {
    Signature::Method(SignatureMethod {
        has_this: true,
        params: vec![TypeSignature::I4],
        ..SignatureMethod::default()
    })
}

fn widgets() -> AssemblyRc {
    let mut provider = MemoryProvider::new();
    provider.add_module("Widgets.dll");
    provider.add_assembly(&identity("Widgets"));
    provider.add_type_def("", "<Module>", 0, None);
    let widget = provider.add_type_def("Demo", "Widget", TypeAttributes::PUBLIC, None);
    let field = provider.add_signature(|_| {
        Some(Signature::Field(SignatureField {
            base: TypeSignature::I4,
        }))
    });
    provider.add_field(widget, "size", FieldAttributes::PRIVATE, field);
    let method = provider.add_signature(|_| Some(spin()));
    provider.add_method(widget, "Spin", 0x0086, method);

    Assembly::from_provider(Arc::new(provider), LoaderConfig::default()).unwrap()
}

fn facade(name: &str, next: &AssemblyIdentity) -> AssemblyRc {
    let mut provider = MemoryProvider::new();
    provider.add_module(&format!("{name}.dll"));
    provider.add_assembly(&identity(name));
    provider.add_type_def("", "<Module>", 0, None);
    let next = provider.add_assembly_ref(next, 0);
    provider.add_exported_type("Demo", "Widget", FORWARDER, next);
    Assembly::from_provider(Arc::new(provider), LoaderConfig::default()).unwrap()
}

/// A resolver over `Widgets` and `hops` facades in front of it, and an application module
/// referencing `Demo.Widget` through the outermost facade
fn chain(hops: usize) -> (Resolver, ModuleRc) {
    let cache = Arc::new(AssemblyCache::new());
    cache.register(widgets());

    let mut next = identity("Widgets");
    for index in (0..hops).rev() {
        let name = format!("Facade{index}");
        cache.register(facade(&name, &next));
        next = identity(&name);
    }

    let mut provider = MemoryProvider::new();
    provider.add_module("App.exe");
    provider.add_type_def("", "<Module>", 0, None);
    let scope = provider.add_assembly_ref(&next, 0);
    let widget = provider.add_type_ref(scope, "Demo", "Widget");
    let signature = provider.add_signature(|_| Some(spin()));
    provider.add_member_ref(widget, "Spin", signature);
    let app = Module::from_provider(Arc::new(provider), LoaderConfig::default()).unwrap();

    let resolver = Resolver::builder().assembly_resolver(cache).build().unwrap();
    (resolver, app)
}

fn bench_resolve_direct(c: &mut Criterion) {
    let (resolver, app) = chain(0);
    let reference = app.type_ref(1).unwrap();

    c.bench_function("resolve_type_direct", |b| {
        b.iter(|| black_box(resolver.resolve_type(black_box(&reference), None)));
    });
}

fn bench_resolve_forwarders(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_type_forwarders");
    for hops in [1usize, 5, 20] {
        let (resolver, app) = chain(hops);
        let reference = app.type_ref(1).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(hops), &reference, |b, reference| {
            b.iter(|| black_box(resolver.resolve_type(black_box(reference), None)));
        });
    }
    group.finish();
}

fn bench_resolve_member(c: &mut Criterion) {
    let (resolver, app) = chain(1);
    let member = app.member_ref(1).unwrap();

    c.bench_function("resolve_method_through_forwarder", |b| {
        b.iter(|| black_box(resolver.resolve_method(black_box(&member))));
    });
}

fn bench_containment(c: &mut Criterion) {
    let analyzer = GenericContainment::default();

    let mut closed = TypeSignature::I4;
    for _ in 0..32 {
        closed = TypeSignature::SzArray(Box::new(closed));
    }
    let open = TypeSignature::FnPtr(Box::new(SignatureMethod {
        return_type: TypeSignature::Void,
        params: vec![closed.clone(), TypeSignature::GenericParamMethod(0)],
        ..SignatureMethod::default()
    }));

    c.bench_function("containment_closed_nested", |b| {
        b.iter(|| black_box(analyzer.type_sig(black_box(&closed))));
    });
    c.bench_function("containment_open_fn_ptr", |b| {
        b.iter(|| black_box(analyzer.type_sig(black_box(&open))));
    });
}

criterion_group!(
    benches,
    bench_resolve_direct,
    bench_resolve_forwarders,
    bench_resolve_member,
    bench_containment
);
criterion_main!(benches);
