//! Integration tests for lazy materialization.
//!
//! The counting store records every query the graph issues, which makes "computed once, on
//! first access" observable from the outside.

mod common;

use std::{
    sync::{Arc, Barrier},
    thread,
};

use cilgraph::prelude::*;
use common::*;

fn counted_module(config: LoaderConfig) -> (ModuleRc, Arc<QueryCounts>) {
    let provider = CountingProvider::new(widgets_provider());
    let counts = provider.counts.clone();
    let module = Module::from_provider(Arc::new(provider), config).unwrap();
    (module, counts)
}

#[test]
fn loading_a_module_reads_almost_nothing() {
    let (module, counts) = counted_module(LoaderConfig::default());
    let signatures_at_load = counts.signatures();

    let widget = module.find_by_name("Demo", "Widget").unwrap();
    assert_eq!(counts.signatures(), signatures_at_load);

    let children_before = counts.children();
    let fields = widget.fields();
    assert_eq!(counts.children(), children_before + 1);
    assert_eq!(fields.len(), 1);

    let _ = widget.fields();
    let _ = widget.fields();
    assert_eq!(counts.children(), children_before + 1);
}

#[test]
fn signatures_are_decoded_once() {
    for config in [LoaderConfig::single_threaded(), LoaderConfig::thread_safe()] {
        let (module, counts) = counted_module(config);
        let size = module.field(1).unwrap();

        let before = counts.signatures();
        let first = size.signature().unwrap();
        let second = size.signature().unwrap();
        assert_eq!(counts.signatures(), before + 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.base, TypeSignature::I4);
    }
}

#[test]
fn explicit_values_are_never_overwritten_by_the_store() {
    let (module, counts) = counted_module(LoaderConfig::default());
    let size = module.field(1).unwrap();

    let before = counts.signatures();
    size.set_signature(Some(SignatureField {
        base: TypeSignature::I8,
    }));
    assert_eq!(size.signature().unwrap().base, TypeSignature::I8);
    assert_eq!(counts.signatures(), before);

    size.set_signature(None);
    assert!(size.signature().is_none());
    assert_eq!(counts.signatures(), before);
}

#[test]
fn rows_are_materialized_once() {
    let (module, _) = counted_module(LoaderConfig::default());
    let a = module.method_def(1).unwrap();
    let b = module.method_def(1).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let widget = module.find_by_name("Demo", "Widget").unwrap();
    assert!(Arc::ptr_eq(&widget.find_method("Spin", None).unwrap(), &a));
}

#[test]
fn concurrent_first_access_computes_once() {
    const THREADS: usize = 16;

    let (module, counts) = counted_module(LoaderConfig::thread_safe());
    let size = module.field(1).unwrap();
    let before = counts.signatures();
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    size.signature().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counts.signatures(), before + 1);
    assert!(results.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn concurrent_collection_access_sees_one_list() {
    let (module, counts) = counted_module(LoaderConfig::thread_safe());
    let widget = module.find_by_name("Demo", "Widget").unwrap();
    let before = counts.children();

    let lists: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| widget.methods())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counts.children(), before + 1);
    assert!(lists.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(lists[0].len(), 1);
}

#[test]
fn initialize_all_forces_every_property() {
    let (module, counts) = counted_module(LoaderConfig::thread_safe());
    module.initialize_all();
    let after_init = (counts.rows(), counts.children(), counts.signatures());

    let widget = module.find_by_name("Demo", "Widget").unwrap();
    for method in widget.methods().iter() {
        let _ = method.signature();
        let _ = method.params();
    }
    for field in widget.fields().iter() {
        let _ = field.signature();
    }
    assert_eq!(
        (counts.rows(), counts.children(), counts.signatures()),
        after_init
    );
}
