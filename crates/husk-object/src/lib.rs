//! In-memory model of a host runtime's object graph.
//!
//! This crate provides the data side of husk:
//! - Arena-backed registries for classes, callables, instances, opaque
//!   captures, and module roots ([`ObjectGraph`])
//! - Copyable [`Value`] handles referencing those registries by id
//! - Attribute slots that can hold a value or raise on read, modeling
//!   ill-behaved native getters
//! - A versioned JSON snapshot format so hosts can dump a graph and
//!   generation can run offline
//!
//! Generation itself lives in `husk-gen`; this crate performs no emission.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod graph;
pub mod snapshot;
pub mod value;

pub use graph::{
    Attr, CallableDef, CallableKind, ClassDef, InstanceDef, IntrospectionError, ModuleDef,
    ObjectGraph, OpaqueDef, Signature, INTERNAL_MEMBERS,
};
pub use snapshot::{SnapshotError, FORMAT_VERSION};
pub use value::{CallableId, ClassId, InstanceId, OpaqueId, StrId, Value};
