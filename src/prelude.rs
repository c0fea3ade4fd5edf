//! # cilgraph Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cilgraph library. Import this module to get quick access to the essential
//! types for building, loading and resolving .NET metadata graphs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilgraph operations
pub use crate::Error;

/// The result type used throughout cilgraph
pub use crate::Result;

/// Settings for materializing modules and for resolving references
pub use crate::metadata::config::{LoaderConfig, ResolverConfig};

/// How lazy entity properties are initialized
pub use crate::utils::InitPolicy;

// ================================================================================================
// Backing Store
// ================================================================================================

/// The backing-store seam and its in-memory implementation
pub use crate::metadata::provider::{MemoryProvider, MetadataProvider, RawRow, Relation};

/// Metadata tokens
pub use crate::metadata::token::Token;

/// Heap names
pub use crate::metadata::streams::Name;

// ================================================================================================
// Entities
// ================================================================================================

/// Modules and assemblies
pub use crate::metadata::tables::{Assembly, AssemblyRc, Module, ModuleRc};

/// Type definitions, references and specifications
pub use crate::metadata::tables::{
    TypeDef, TypeDefOrRef, TypeDefRc, TypeRef, TypeRefRc, TypeSpec, TypeSpecRc,
};

/// Members
pub use crate::metadata::tables::{
    Event, EventRc, Field, FieldRc, MethodDef, MethodDefRc, Param, ParamRc, Property, PropertyRc,
};

/// References to members and other scopes
pub use crate::metadata::tables::{
    AssemblyRef, AssemblyRefRc, ExportedType, ExportedTypeRc, MemberDef, MemberRef,
    MemberRefParent, MemberRefRc, MethodSpec, MethodSpecRc, ModuleRef, ModuleRefRc,
    ResolutionScope,
};

/// Generic parameters
pub use crate::metadata::tables::{GenericParam, GenericParamRc};

/// Resources and declarative security
pub use crate::metadata::tables::{
    DeclSecurity, DeclSecurityRc, ManifestResource, ManifestResourceRc, ResourceType,
    SecurityAction,
};

/// Table identifiers
pub use crate::metadata::tables::TableId;

/// Common entity behaviour
pub use crate::metadata::entity::MetadataEntity;

/// Owner-tracking collections
pub use crate::metadata::ownership::{OwnedList, OwnershipEdge};

// ================================================================================================
// Identity
// ================================================================================================

/// Assembly identities and strong names
pub use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion, Identity};

// ================================================================================================
// Signatures
// ================================================================================================

/// The signature grammar
pub use crate::metadata::signatures::{
    Signature, SignatureField, SignatureLocalVariables, SignatureMethod, SignatureMethodSpec,
    SignatureProperty, TypeSignature,
};

// ================================================================================================
// Resolution and Analysis
// ================================================================================================

/// Reference resolution and its collaborators
pub use crate::metadata::resolver::{
    AssemblyCache, AssemblyResolver, ReferenceProjection, Resolver, ResolverBuilder, SigComparer,
    WinMdProjection,
};

/// Open generic parameter detection
pub use crate::metadata::typesystem::GenericContainment;
