#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core name primitives for signa signatures.
//!
//! Every entity in a signature set is identified by a [`TypeName`]: an
//! optional absolute marker, a namespace path, and a simple name. The shape of
//! the simple name tells what it can denote ([`NameKind`]); what a declared
//! name actually denotes is recorded by the environment as an [`EntityKind`].

mod kind;
mod names;

#[cfg(test)]
mod names_tests;

pub use kind::{EntityKind, NameKind};
pub use names::{Namespace, TypeName};
