//! Declaration-shape classification.
//!
//! Given one named value read from the graph, [`classify`] decides which
//! declaration shape it gets. The predicates overlap on purpose (a bound
//! method is also an opaque-looking value, a class is callable), so the
//! first-match order below is part of the contract, not an implementation
//! detail.

use husk_object::{ClassId, InstanceId, IntrospectionError, ObjectGraph, Value};

/// Substrings of a textual representation that mark a value as callable even
/// when the host exposes no callable type for it.
pub const CALLABLE_MARKERS: [&str; 2] = ["method", "slot wrapper"];

/// Declaration shape for one named value.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Emit a no-op callable declaration
    Callable(Value),
    /// Emit a class block (recursive case)
    Class(ClassId),
    /// Emit a plain `name = <repr>` assignment
    Literal(Value),
    /// Emit the instance's class, then an instantiation line
    Instance(InstanceId),
    /// The read itself failed; emit a placeholder plus the error text
    Unintrospectable {
        /// Host-side error kind
        kind: String,
        /// Host-side error message
        message: String,
    },
}

/// Decide the declaration shape for one attribute read.
///
/// Pure decision function: no recursion, no emission, no state. First match
/// wins, in this order:
///
/// 1. failed read → [`Classification::Unintrospectable`]
/// 2. class object → [`Classification::Class`]
/// 3. callable value, or a repr carrying a callable marker →
///    [`Classification::Callable`]
/// 4. intrinsic literal (null, bool, number, string) →
///    [`Classification::Literal`]
/// 5. live instance (repr places it at a memory address) →
///    [`Classification::Instance`]
/// 6. anything else → [`Classification::Literal`] via its repr
pub fn classify(
    graph: &ObjectGraph,
    read: Result<Value, IntrospectionError>,
) -> Classification {
    let value = match read {
        Ok(value) => value,
        Err(err) => {
            return Classification::Unintrospectable {
                kind: err.kind,
                message: err.message,
            }
        }
    };

    if let Value::Class(id) = value {
        return Classification::Class(id);
    }

    if matches!(value, Value::Callable(_)) {
        return Classification::Callable(value);
    }
    let repr = graph.repr(value);
    if CALLABLE_MARKERS.iter().any(|marker| repr.contains(marker)) {
        return Classification::Callable(value);
    }

    if value.is_literal() {
        return Classification::Literal(value);
    }

    if let Value::Instance(id) = value {
        return Classification::Instance(id);
    }

    // Opaque values of unknown shape are still representable as data.
    Classification::Literal(value)
}
