//! Stores shared by the integration tests.
//!
//! Each integration test binary only uses a subset of these helpers.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use cilgraph::{
    metadata::{
        customdebuginformation::CustomDebugInfo,
        provider::{MetadataProvider, Relation, TokenResolver},
        tables::{FieldAttributes, MethodBody, TableId, TypeAttributes, FORWARDER},
    },
    prelude::*,
};

/// `public hidebysig`
pub const PUBLIC_METHOD: u32 = 0x0086;

pub fn identity(name: &str, major: u16) -> AssemblyIdentity {
    AssemblyIdentity::new(name, AssemblyVersion::new(major, 0, 0, 0), None, None)
}

pub fn spin_signature() -> Signature {
    Signature::Method(SignatureMethod {
        has_this: true,
        return_type: TypeSignature::Void,
        params: vec![TypeSignature::I4],
        ..SignatureMethod::default()
    })
}

pub fn int_field() -> Signature {
    Signature::Field(SignatureField {
        base: TypeSignature::I4,
    })
}

/// `Widgets` 1.0.0.0, defining `Demo.Widget` with `int32 size` and `void Spin(int32)`
pub fn widgets_provider() -> MemoryProvider {
    let mut provider = MemoryProvider::new();
    provider.add_module("Widgets.dll");
    provider.add_assembly(&identity("Widgets", 1));
    provider.add_type_def("", "<Module>", 0, None);

    let widget = provider.add_type_def("Demo", "Widget", TypeAttributes::PUBLIC, None);
    let field_sig = provider.add_signature(|_| Some(int_field()));
    provider.add_field(widget, "size", FieldAttributes::PRIVATE, field_sig);
    let spin_sig = provider.add_signature(|_| Some(spin_signature()));
    let spin = provider.add_method(widget, "Spin", PUBLIC_METHOD, spin_sig);
    provider.add_param(spin, 1, "turns");
    provider
}

pub fn widgets_assembly() -> AssemblyRc {
    Assembly::from_provider(Arc::new(widgets_provider()), LoaderConfig::default())
        .expect("widgets assembly must load")
}

/// An assembly forwarding `Demo.Widget` to `next`
pub fn facade(name: &str, next: &AssemblyIdentity) -> AssemblyRc {
    let mut provider = MemoryProvider::new();
    provider.add_module(&format!("{name}.dll"));
    provider.add_assembly(&identity(name, 1));
    provider.add_type_def("", "<Module>", 0, None);
    let next_ref = provider.add_assembly_ref(next, 0);
    provider.add_exported_type("Demo", "Widget", FORWARDER, next_ref);

    Assembly::from_provider(Arc::new(provider), LoaderConfig::default())
        .expect("facade must load")
}

/// A module with `TypeRef` 1 = `[scope]Demo.Widget` and `MemberRef`s 1 = `Spin(int32)`,
/// 2 = `size`
pub fn app_module(scope: &AssemblyIdentity) -> ModuleRc {
    let mut provider = MemoryProvider::new();
    provider.add_module("App.exe");
    provider.add_type_def("", "<Module>", 0, None);
    let scope = provider.add_assembly_ref(scope, 0);
    let widget = provider.add_type_ref(scope, "Demo", "Widget");

    let spin_sig = provider.add_signature(|_| Some(spin_signature()));
    provider.add_member_ref(widget, "Spin", spin_sig);
    let field_sig = provider.add_signature(|_| Some(int_field()));
    provider.add_member_ref(widget, "size", field_sig);

    Module::from_provider(Arc::new(provider), LoaderConfig::default())
        .expect("application module must load")
}

/// A resolver over `assemblies`
pub fn resolver_over(assemblies: &[AssemblyRc], config: ResolverConfig) -> Resolver {
    let cache = Arc::new(AssemblyCache::new());
    for assembly in assemblies {
        cache.register(assembly.clone());
    }
    Resolver::builder()
        .assembly_resolver(cache)
        .config(config)
        .build()
        .expect("resolver has an assembly resolver")
}

/// Counts the store queries a graph issues, per kind
#[derive(Default)]
pub struct QueryCounts {
    pub rows: AtomicUsize,
    pub children: AtomicUsize,
    pub signatures: AtomicUsize,
}

impl QueryCounts {
    pub fn rows(&self) -> usize {
        self.rows.load(Ordering::SeqCst)
    }

    pub fn children(&self) -> usize {
        self.children.load(Ordering::SeqCst)
    }

    pub fn signatures(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

/// A store that forwards to a [`MemoryProvider`] and counts the queries it answers
pub struct CountingProvider {
    inner: MemoryProvider,
    pub counts: Arc<QueryCounts>,
}

impl CountingProvider {
    pub fn new(inner: MemoryProvider) -> Self {
        CountingProvider {
            inner,
            counts: Arc::new(QueryCounts::default()),
        }
    }
}

impl MetadataProvider for CountingProvider {
    fn row_count(&self, table: TableId) -> u32 {
        self.inner.row_count(table)
    }

    fn row(&self, table: TableId, rid: u32) -> Option<RawRow> {
        self.counts.rows.fetch_add(1, Ordering::SeqCst);
        self.inner.row(table, rid)
    }

    fn children(&self, relation: Relation, owner: Token) -> Vec<u32> {
        self.counts.children.fetch_add(1, Ordering::SeqCst);
        self.inner.children(relation, owner)
    }

    fn parent(&self, relation: Relation, child: Token) -> Option<Token> {
        self.inner.parent(relation, child)
    }

    fn string(&self, index: u32) -> Option<Name> {
        self.inner.string(index)
    }

    fn blob(&self, index: u32) -> Option<Vec<u8>> {
        self.inner.blob(index)
    }

    fn guid(&self, index: u32) -> Option<uguid::Guid> {
        self.inner.guid(index)
    }

    fn signature(&self, index: u32, resolver: &dyn TokenResolver) -> Option<Signature> {
        self.counts.signatures.fetch_add(1, Ordering::SeqCst);
        self.inner.signature(index, resolver)
    }

    fn type_signature(&self, index: u32, resolver: &dyn TokenResolver) -> Option<TypeSignature> {
        self.counts.signatures.fetch_add(1, Ordering::SeqCst);
        self.inner.type_signature(index, resolver)
    }

    fn method_body(&self, method: Token, rva: u32) -> Option<MethodBody> {
        self.inner.method_body(method, rva)
    }

    fn custom_debug_infos(&self, token: Token) -> Vec<CustomDebugInfo> {
        self.inner.custom_debug_infos(token)
    }

    fn resource_data(&self, resource: Token, offset: u32) -> Option<Vec<u8>> {
        self.inner.resource_data(resource, offset)
    }
}
