//! The backing-store seam.
//!
//! The object model never touches bytes directly. Everything it knows about a persisted module
//! comes through a [`MetadataProvider`]: row access by table and rid, heap lookups, signature
//! decoding, and the relations that tie rows together (which methods a type declares, which
//! custom attributes decorate a field, ...).
//!
//! Relations come in two flavours. The range-list relations ([`Relation::Fields`],
//! [`Relation::Methods`], [`Relation::Params`], [`Relation::Properties`], [`Relation::Events`])
//! and nesting ([`Relation::NestedTypes`]) are explicit, and also answer the reverse question
//! through [`MetadataProvider::parent`]. The others are keyed by a coded index stored in the
//! child row, and are only queried from the owner side.
//!
//! [`MemoryProvider`] is a complete in-memory backing store with builder helpers; it backs the
//! test-suite and serves hosts that assemble metadata programmatically.

mod memory;

pub use memory::{MemoryProvider, SignatureThunk, TypeSignatureThunk};

use strum::{Display, EnumIter};

use crate::metadata::{
    customdebuginformation::CustomDebugInfo,
    signatures::{Signature, TypeSignature},
    streams::Name,
    tables::{
        AssemblyRaw, AssemblyRefRaw, ConstantRaw, CustomAttributeRaw, DeclSecurityRaw, EventRaw,
        ExportedTypeRaw, FieldRaw, FileRaw, GenericParamConstraintRaw, GenericParamRaw,
        ImplMapRaw, ManifestResourceRaw, MemberRefRaw, MethodBody, MethodDefRaw, MethodImplRaw,
        MethodSemanticsRaw, MethodSpecRaw, ModuleRaw, ModuleRefRaw, ParamRaw, PropertyRaw,
        TableId, TypeDefOrRef, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
    },
    token::Token,
};

/// Relations between rows, queried through [`MetadataProvider::children`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Relation {
    /// Top-level types of a module, owner is the `Module` row
    TypeDefs,
    /// Types nested in a type
    NestedTypes,
    /// Fields declared by a type
    Fields,
    /// Methods declared by a type
    Methods,
    /// Properties declared by a type
    Properties,
    /// Events declared by a type
    Events,
    /// Parameters of a method
    Params,
    /// Generic parameters of a type or method
    GenericParams,
    /// Constraints of a generic parameter
    GenericParamConstraints,
    /// Custom attributes of any entity
    CustomAttributes,
    /// The default value of a field, parameter or property
    Constant,
    /// The P/Invoke mapping of a method
    ImplMap,
    /// Explicit overrides declared by a type
    MethodImpls,
    /// Accessor bindings of a property or event
    MethodSemantics,
    /// Exported types of a module's assembly, owner is the `Module` row
    ExportedTypes,
    /// Declarative security of a type, method or assembly
    DeclSecurities,
    /// Manifest resources of a module's assembly, owner is the `Module` row
    ManifestResources,
}

impl Relation {
    /// Returns `true` for relations that also answer [`MetadataProvider::parent`]
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        matches!(
            self,
            Relation::TypeDefs
                | Relation::NestedTypes
                | Relation::Fields
                | Relation::Methods
                | Relation::Properties
                | Relation::Events
                | Relation::Params
        )
    }
}

/// One row of any table, heap indices unresolved
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum RawRow {
    Module(ModuleRaw),
    TypeRef(TypeRefRaw),
    TypeDef(TypeDefRaw),
    Field(FieldRaw),
    MethodDef(MethodDefRaw),
    Param(ParamRaw),
    MemberRef(MemberRefRaw),
    Constant(ConstantRaw),
    CustomAttribute(CustomAttributeRaw),
    DeclSecurity(DeclSecurityRaw),
    Event(EventRaw),
    Property(PropertyRaw),
    MethodSemantics(MethodSemanticsRaw),
    MethodImpl(MethodImplRaw),
    ModuleRef(ModuleRefRaw),
    TypeSpec(TypeSpecRaw),
    ImplMap(ImplMapRaw),
    Assembly(AssemblyRaw),
    AssemblyRef(AssemblyRefRaw),
    File(FileRaw),
    ExportedType(ExportedTypeRaw),
    ManifestResource(ManifestResourceRaw),
    GenericParam(GenericParamRaw),
    MethodSpec(MethodSpecRaw),
    GenericParamConstraint(GenericParamConstraintRaw),
}

macro_rules! raw_row_dispatch {
    ($self:ident, $row:ident => $body:expr) => {
        match $self {
            RawRow::Module($row) => $body,
            RawRow::TypeRef($row) => $body,
            RawRow::TypeDef($row) => $body,
            RawRow::Field($row) => $body,
            RawRow::MethodDef($row) => $body,
            RawRow::Param($row) => $body,
            RawRow::MemberRef($row) => $body,
            RawRow::Constant($row) => $body,
            RawRow::CustomAttribute($row) => $body,
            RawRow::DeclSecurity($row) => $body,
            RawRow::Event($row) => $body,
            RawRow::Property($row) => $body,
            RawRow::MethodSemantics($row) => $body,
            RawRow::MethodImpl($row) => $body,
            RawRow::ModuleRef($row) => $body,
            RawRow::TypeSpec($row) => $body,
            RawRow::ImplMap($row) => $body,
            RawRow::Assembly($row) => $body,
            RawRow::AssemblyRef($row) => $body,
            RawRow::File($row) => $body,
            RawRow::ExportedType($row) => $body,
            RawRow::ManifestResource($row) => $body,
            RawRow::GenericParam($row) => $body,
            RawRow::MethodSpec($row) => $body,
            RawRow::GenericParamConstraint($row) => $body,
        }
    };
}

impl RawRow {
    /// The row identifier
    #[must_use]
    pub fn rid(&self) -> u32 {
        raw_row_dispatch!(self, row => row.rid)
    }

    /// The token of the row
    #[must_use]
    pub fn token(&self) -> Token {
        raw_row_dispatch!(self, row => row.token)
    }

    /// The table the row belongs to
    #[must_use]
    pub fn table(&self) -> TableId {
        match self {
            RawRow::Module(_) => TableId::Module,
            RawRow::TypeRef(_) => TableId::TypeRef,
            RawRow::TypeDef(_) => TableId::TypeDef,
            RawRow::Field(_) => TableId::Field,
            RawRow::MethodDef(_) => TableId::MethodDef,
            RawRow::Param(_) => TableId::Param,
            RawRow::MemberRef(_) => TableId::MemberRef,
            RawRow::Constant(_) => TableId::Constant,
            RawRow::CustomAttribute(_) => TableId::CustomAttribute,
            RawRow::DeclSecurity(_) => TableId::DeclSecurity,
            RawRow::Event(_) => TableId::Event,
            RawRow::Property(_) => TableId::Property,
            RawRow::MethodSemantics(_) => TableId::MethodSemantics,
            RawRow::MethodImpl(_) => TableId::MethodImpl,
            RawRow::ModuleRef(_) => TableId::ModuleRef,
            RawRow::TypeSpec(_) => TableId::TypeSpec,
            RawRow::ImplMap(_) => TableId::ImplMap,
            RawRow::Assembly(_) => TableId::Assembly,
            RawRow::AssemblyRef(_) => TableId::AssemblyRef,
            RawRow::File(_) => TableId::File,
            RawRow::ExportedType(_) => TableId::ExportedType,
            RawRow::ManifestResource(_) => TableId::ManifestResource,
            RawRow::GenericParam(_) => TableId::GenericParam,
            RawRow::MethodSpec(_) => TableId::MethodSpec,
            RawRow::GenericParamConstraint(_) => TableId::GenericParamConstraint,
        }
    }
}

/// Resolves tokens found inside signatures to materialized entities.
///
/// Implemented by the loader; a provider receives one whenever it decodes a signature.
pub trait TokenResolver {
    /// The `TypeDef`, `TypeRef` or `TypeSpec` addressed by `token`, `None` if the row is missing
    fn type_def_or_ref(&self, token: Token) -> Option<TypeDefOrRef>;
}

/// Read access to a persisted module.
///
/// Every method is a pure query; implementations must be safe to call from several threads and
/// must tolerate arbitrary (including malformed) indices by returning `None` or an empty result.
pub trait MetadataProvider: Send + Sync {
    /// Number of rows in `table`
    fn row_count(&self, table: TableId) -> u32;

    /// Row `rid` of `table`
    fn row(&self, table: TableId, rid: u32) -> Option<RawRow>;

    /// Rids of the children of `owner` along `relation`, in table order
    fn children(&self, relation: Relation, owner: Token) -> Vec<u32>;

    /// The owner of `child` along an explicit `relation`.
    ///
    /// Malformed stores may list one child under several owners; the first owner wins.
    fn parent(&self, relation: Relation, child: Token) -> Option<Token>;

    /// Entry `index` of the string heap
    fn string(&self, index: u32) -> Option<Name>;

    /// Entry `index` of the blob heap
    fn blob(&self, index: u32) -> Option<Vec<u8>>;

    /// Entry `index` of the GUID heap, 1-based
    fn guid(&self, index: u32) -> Option<uguid::Guid>;

    /// Decode the member signature stored at blob `index`
    fn signature(&self, index: u32, resolver: &dyn TokenResolver) -> Option<Signature>;

    /// Decode the type signature stored at blob `index`
    fn type_signature(&self, index: u32, resolver: &dyn TokenResolver) -> Option<TypeSignature>;

    /// The body of `method`, stored at `rva`
    fn method_body(&self, _method: Token, _rva: u32) -> Option<MethodBody> {
        None
    }

    /// The bytes of the embedded `resource`, stored at `offset` in the resources directory
    fn resource_data(&self, _resource: Token, _offset: u32) -> Option<Vec<u8>> {
        None
    }

    /// Custom debug information attached to `token` by the symbol store
    fn custom_debug_infos(&self, _token: Token) -> Vec<CustomDebugInfo> {
        Vec::new()
    }
}
