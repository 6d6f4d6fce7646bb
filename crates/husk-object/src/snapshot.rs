//! Snapshot (de)serialization for object graphs.
//!
//! Hosts capture their live object graph and dump it as JSON; generation can
//! then run offline against the snapshot. The format is a versioned envelope
//! around the graph arenas. Loading validates every cross-reference so the
//! rest of the crate can index without checking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{Attr, CallableDef, ClassDef, InstanceDef, ModuleDef, ObjectGraph, OpaqueDef};
use crate::value::Value;

/// Current snapshot format version.
pub const FORMAT_VERSION: u32 = 1;

/// Snapshot load/store errors.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Malformed JSON or schema mismatch
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot written by an incompatible format version
    #[error("unsupported snapshot version {found} (expected {FORMAT_VERSION})")]
    Version {
        /// Version found in the envelope
        found: u32,
    },

    /// A cross-reference points outside its registry
    #[error("dangling {kind} id {id}")]
    DanglingId {
        /// Registry the id was meant for
        kind: &'static str,
        /// The out-of-range id
        id: usize,
    },

    /// A registry entry's id does not match its position
    #[error("{kind} entry {index} carries id {id}")]
    MisplacedEntry {
        /// Registry the entry belongs to
        kind: &'static str,
        /// Position in the registry
        index: usize,
        /// Id the entry carries
        id: usize,
    },

    /// The intrinsic root classes are missing
    #[error("snapshot is missing the intrinsic root classes")]
    MissingRoots,
}

/// Serializable envelope around the graph arenas.
#[derive(Serialize, Deserialize)]
struct GraphSnapshot {
    version: u32,
    strings: Vec<String>,
    classes: Vec<ClassDef>,
    callables: Vec<CallableDef>,
    instances: Vec<InstanceDef>,
    opaques: Vec<OpaqueDef>,
    modules: BTreeMap<String, ModuleDef>,
}

impl ObjectGraph {
    /// Serialize the graph to pretty-printed snapshot JSON.
    pub fn to_json(&self) -> String {
        let snapshot = GraphSnapshot {
            version: FORMAT_VERSION,
            strings: self.strings.clone(),
            classes: self.classes.clone(),
            callables: self.callables.clone(),
            instances: self.instances.clone(),
            opaques: self.opaques.clone(),
            modules: self.modules.clone(),
        };
        // The envelope contains no map with non-string keys, so
        // serialization cannot fail.
        serde_json::to_string_pretty(&snapshot).unwrap_or_default()
    }

    /// Deserialize and validate a snapshot.
    pub fn from_json(text: &str) -> Result<ObjectGraph, SnapshotError> {
        let snapshot: GraphSnapshot = serde_json::from_str(text)?;
        if snapshot.version != FORMAT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
            });
        }
        validate(&snapshot)?;

        let mut graph = ObjectGraph::default();
        graph.strings = snapshot.strings;
        graph.classes = snapshot.classes;
        graph.callables = snapshot.callables;
        graph.instances = snapshot.instances;
        graph.opaques = snapshot.opaques;
        graph.modules = snapshot.modules;
        graph.rebuild_indexes();
        Ok(graph)
    }
}

fn validate(snapshot: &GraphSnapshot) -> Result<(), SnapshotError> {
    if snapshot.classes.len() < 2 {
        return Err(SnapshotError::MissingRoots);
    }

    check_positions("class", snapshot.classes.iter().map(|c| c.id.0))?;
    check_positions("callable", snapshot.callables.iter().map(|c| c.id.0))?;
    check_positions("instance", snapshot.instances.iter().map(|i| i.id.0))?;
    check_positions("opaque", snapshot.opaques.iter().map(|o| o.id.0))?;

    for class in &snapshot.classes {
        for base in &class.bases {
            check_id("class", base.0, snapshot.classes.len())?;
        }
        for attr in class.attrs.values() {
            validate_attr(snapshot, attr)?;
        }
    }
    for instance in &snapshot.instances {
        check_id("class", instance.class.0, snapshot.classes.len())?;
    }
    for module in snapshot.modules.values() {
        for attr in module.attrs.values() {
            validate_attr(snapshot, attr)?;
        }
    }
    Ok(())
}

fn validate_attr(snapshot: &GraphSnapshot, attr: &Attr) -> Result<(), SnapshotError> {
    let value = match attr {
        Attr::Value(value) => *value,
        Attr::Raises { .. } => return Ok(()),
    };
    match value {
        Value::Str(id) => check_id("string", id.0, snapshot.strings.len()),
        Value::Class(id) => check_id("class", id.0, snapshot.classes.len()),
        Value::Callable(id) => check_id("callable", id.0, snapshot.callables.len()),
        Value::Instance(id) => check_id("instance", id.0, snapshot.instances.len()),
        Value::Opaque(id) => check_id("opaque", id.0, snapshot.opaques.len()),
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok(()),
    }
}

fn check_id(kind: &'static str, id: usize, len: usize) -> Result<(), SnapshotError> {
    if id < len {
        Ok(())
    } else {
        Err(SnapshotError::DanglingId { kind, id })
    }
}

fn check_positions(
    kind: &'static str,
    ids: impl Iterator<Item = usize>,
) -> Result<(), SnapshotError> {
    for (index, id) in ids.enumerate() {
        if id != index {
            return Err(SnapshotError::MisplacedEntry { kind, index, id });
        }
    }
    Ok(())
}
