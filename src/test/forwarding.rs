use std::sync::Arc;

use crate::{
    metadata::{
        config::LoaderConfig,
        identity::{AssemblyIdentity, AssemblyVersion},
        provider::MemoryProvider,
        resolver::{AssemblyCache, Resolver},
        tables::{Assembly, AssemblyRc, Module, ModuleRc, TypeDefRc, TypeRefRc, FORWARDER},
    },
    test::{widget_assembly, widgets_identity},
};

/// A chain of facade assemblies, each forwarding `Demo.Widget` to the next, ending in the
/// `Widgets` assembly that defines it
pub(crate) struct ForwardingFixture {
    /// The assembly the reference points at
    pub facade: AssemblyRc,
    /// `Demo.Widget` in `Widgets`
    pub target: TypeDefRc,
    /// Every assembly of the chain
    pub cache: Arc<AssemblyCache>,
    /// A resolver over `cache` with the default configuration
    pub resolver: Resolver,
    /// `[Facade0]Demo.Widget`, or `[Widgets]Demo.Widget` for a chain without facades
    pub reference: TypeRefRc,
    /// The module `reference` lives in, kept alive for the reference's sake
    #[allow(dead_code)]
    pub app: ModuleRc,
}

fn facade_identity(index: usize) -> AssemblyIdentity {
    AssemblyIdentity::new(
        format!("Facade{index}"),
        AssemblyVersion::new(1, 0, 0, 0),
        None,
        None,
    )
}

/// A facade forwarding `Demo.Widget` to the assembly `next`
pub(crate) fn facade_assembly(identity: &AssemblyIdentity, next: &AssemblyIdentity) -> AssemblyRc {
    let mut provider = MemoryProvider::new();
    provider.add_module(&format!("{}.dll", identity.name));
    provider.add_assembly(identity);
    provider.add_type_def("", "<Module>", 0, None);

    let next_ref = provider.add_assembly_ref(next, 0);
    provider.add_exported_type("Demo", "Widget", FORWARDER, next_ref);

    Assembly::from_provider(Arc::new(provider), LoaderConfig::default())
        .expect("facade assembly must materialize")
}

/// An application module referencing `Demo.Widget` in `scope`
pub(crate) fn app_module(scope: &AssemblyIdentity) -> ModuleRc {
    let mut provider = MemoryProvider::new();
    provider.add_module("App.exe");
    provider.add_type_def("", "<Module>", 0, None);
    let assembly_ref = provider.add_assembly_ref(scope, 0);
    provider.add_type_ref(assembly_ref, "Demo", "Widget");

    Module::from_provider(Arc::new(provider), LoaderConfig::default())
        .expect("application module must materialize")
}

/// A chain of `hops` forwarders in front of `Widgets`
pub(crate) fn forwarding_fixture(hops: usize) -> ForwardingFixture {
    let widgets = widget_assembly();
    let target = widgets
        .find_by_name("Demo", "Widget")
        .expect("Widgets defines Demo.Widget");

    let cache = Arc::new(AssemblyCache::new());
    cache.register(widgets.clone());

    let mut facade = widgets;
    for index in (0..hops).rev() {
        let next = if index + 1 == hops {
            widgets_identity()
        } else {
            facade_identity(index + 1)
        };
        facade = facade_assembly(&facade_identity(index), &next);
        cache.register(facade.clone());
    }

    let app = app_module(&facade.identity());
    let reference = app.type_ref(1).expect("application references Demo.Widget");
    let resolver = Resolver::builder()
        .assembly_resolver(cache.clone())
        .build()
        .expect("resolver has an assembly resolver");

    ForwardingFixture {
        facade,
        target,
        cache,
        resolver,
        reference,
        app,
    }
}
