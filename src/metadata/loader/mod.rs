//! Materialization of entities from a [`MetadataProvider`](crate::metadata::provider::MetadataProvider).
//!
//! The [`LoaderContext`] is the single point where rows become entities. It keeps one cache per
//! table, so every row is materialized at most once and repeated lookups hand out the same
//! `Arc`. When two threads race to materialize the same row, the first entry inserted wins and
//! the other copy is dropped.
//!
//! Entities created here only carry the scalar columns of their row. Everything that points at
//! another entity (declaring types, member lists, signatures, ...) is a lazy slot whose compute
//! hook lives in this module and runs on first access. Materialization therefore never recurses
//! into other rows, which keeps cyclic malformed input from overflowing the stack.

mod context;
mod lazy;

pub use context::LoaderContext;
