use std::sync::Arc;

use crate::metadata::{
    config::LoaderConfig,
    identity::{AssemblyIdentity, AssemblyVersion},
    provider::MemoryProvider,
    signatures::{Signature, SignatureField, SignatureMethod, TypeSignature},
    tables::{
        Assembly, AssemblyRc, FieldAttributes, MethodSemanticsAttributes, Module, ModuleRc,
        TypeAttributes,
    },
    token::Token,
};

/// `public hidebysig`
pub(crate) const PUBLIC_METHOD: u32 = 0x0086;
/// `public hidebysig specialname rtspecialname`
pub(crate) const CONSTRUCTOR: u32 = 0x1886;

/// Tokens of the rows [`widget_provider`] creates
#[allow(dead_code)]
pub(crate) struct WidgetTokens {
    pub widget: Token,
    pub part: Token,
    pub container: Token,
    pub spin: Token,
    pub size: Token,
    pub get_size: Token,
    pub size_property: Token,
}

/// The identity of the `Widgets` assembly
pub(crate) fn widgets_identity() -> AssemblyIdentity {
    AssemblyIdentity::new("Widgets", AssemblyVersion::new(1, 2, 0, 0), None, None)
}

pub(crate) fn instance_method(params: Vec<TypeSignature>, return_type: TypeSignature) -> Signature {
    Signature::Method(SignatureMethod {
        has_this: true,
        return_type,
        params,
        ..SignatureMethod::default()
    })
}

/// A store for `Widgets.dll`:
///
/// ```text
/// <Module>
/// Demo.Widget : [System.Runtime]System.Object
///     int32 size
///     void .ctor()
///     void Spin(int32 turns)
///     int32 get_Size()
///     int32 Size { get; }
///     Demo.Widget/Part
/// Demo.Container`1<T>
///     !0 item
/// ```
pub(crate) fn widget_provider(with_assembly: bool) -> (MemoryProvider, WidgetTokens) {
    let mut provider = MemoryProvider::new();
    provider.add_module("Widgets.dll");
    if with_assembly {
        provider.add_assembly(&widgets_identity());
    }

    let runtime = provider.add_assembly_ref(
        &AssemblyIdentity::new("System.Runtime", AssemblyVersion::new(8, 0, 0, 0), None, None),
        0,
    );
    let object = provider.add_type_ref(runtime, "System", "Object");

    provider.add_type_def("", "<Module>", 0, None);
    let widget = provider.add_type_def(
        "Demo",
        "Widget",
        TypeAttributes::PUBLIC | TypeAttributes::BEFORE_FIELD_INIT,
        Some(object),
    );

    let int_field = provider.add_signature(|_| {
        Some(Signature::Field(SignatureField {
            base: TypeSignature::I4,
        }))
    });
    let size = provider.add_field(widget, "size", FieldAttributes::PRIVATE, int_field);

    let ctor_sig = provider.add_signature(|_| Some(instance_method(Vec::new(), TypeSignature::Void)));
    provider.add_method(widget, ".ctor", CONSTRUCTOR, ctor_sig);

    let spin_sig =
        provider.add_signature(|_| Some(instance_method(vec![TypeSignature::I4], TypeSignature::Void)));
    let spin = provider.add_method(widget, "Spin", PUBLIC_METHOD, spin_sig);
    provider.add_param(spin, 1, "turns");

    let getter_sig = provider.add_signature(|_| Some(instance_method(Vec::new(), TypeSignature::I4)));
    let get_size = provider.add_method(widget, "get_Size", PUBLIC_METHOD | 0x0800, getter_sig);

    let property_sig = provider.add_signature(|_| {
        Some(Signature::Property(crate::metadata::signatures::SignatureProperty {
            has_this: true,
            base: TypeSignature::I4,
            params: Vec::new(),
        }))
    });
    let size_property = provider.add_property(widget, "Size", property_sig);
    provider.add_method_semantics(MethodSemanticsAttributes::GETTER, get_size, size_property);

    let part = provider.add_nested_type(widget, "Part", TypeAttributes::NESTED_PUBLIC);

    let container = provider.add_type_def("Demo", "Container`1", TypeAttributes::PUBLIC, Some(object));
    provider.add_generic_param(container, 0, "T");
    let generic_field = provider.add_signature(|_| {
        Some(Signature::Field(SignatureField {
            base: TypeSignature::GenericParamType(0),
        }))
    });
    provider.add_field(container, "item", FieldAttributes::PRIVATE, generic_field);

    (
        provider,
        WidgetTokens {
            widget,
            part,
            container,
            spin,
            size,
            get_size,
            size_property,
        },
    )
}

/// `Widgets.dll` as a module without an assembly
pub(crate) fn widget_module() -> ModuleRc {
    let (provider, _) = widget_provider(false);
    Module::from_provider(Arc::new(provider), LoaderConfig::default())
        .expect("widget module must materialize")
}

/// The `Widgets` assembly, version 1.2.0.0, with `Widgets.dll` as its manifest module
pub(crate) fn widget_assembly() -> AssemblyRc {
    let (provider, _) = widget_provider(true);
    Assembly::from_provider(Arc::new(provider), LoaderConfig::default())
        .expect("widget assembly must materialize")
}
