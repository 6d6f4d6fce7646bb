//! Object graph model and registry.
//!
//! An [`ObjectGraph`] owns every definition captured from a host runtime:
//! classes with their base lists and attribute maps, callables with their
//! (possibly unrecoverable) signatures, live instances, opaque captures, and
//! the named module roots that generation starts from. All cross-references
//! are ids, so cyclic and self-referential graphs are representable without
//! ownership gymnastics.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::value::{CallableId, ClassId, InstanceId, OpaqueId, StrId, Value};

/// Members excluded from attribute listings as host-internal bookkeeping.
pub const INTERNAL_MEMBERS: [&str; 2] = ["__class__", "__dict__"];

/// Instance addresses are synthesized from this base so that graphs built in
/// the same order render identically.
const INSTANCE_ADDR_BASE: u64 = 0x7f_0000;

/// Reading an attribute raised inside the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct IntrospectionError {
    /// Host-side error kind (e.g. an exception type name)
    pub kind: String,
    /// Host-side error message, possibly multi-line
    pub message: String,
}

/// One attribute slot of a module or class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attr {
    /// A readable attribute holding a value
    Value(Value),
    /// An attribute whose read raises inside the host
    Raises {
        /// Error kind raised on read
        kind: String,
        /// Error message raised on read
        message: String,
    },
}

impl Attr {
    /// Read the slot, surfacing host-side read failures as errors.
    pub fn read(&self) -> Result<Value, IntrospectionError> {
        match self {
            Attr::Value(value) => Ok(*value),
            Attr::Raises { kind, message } => Err(IntrospectionError {
                kind: kind.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// Class definition metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    /// Class id (index into the graph's class registry)
    pub id: ClassId,
    /// Declared class name as exposed by the host
    pub name: String,
    /// Declared base classes, in declaration order
    pub bases: Vec<ClassId>,
    /// Attributes exposed by the class, keyed by name
    pub attrs: BTreeMap<String, Attr>,
}

/// How a callable presents itself to introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallableKind {
    /// Free function
    Function,
    /// Method bound to an instance (carries an implicit receiver)
    BoundMethod,
    /// Native built-in with no source-level definition
    Builtin,
    /// Attribute accessor / data descriptor
    Accessor,
    /// Slot wrapper exposed by the host object protocol
    SlotWrapper,
}

/// Formal parameters recovered from a callable.
///
/// `defaults` aligns with the tail of `params`: a callable `f(a, b=1)` has
/// `params = ["a", "b"]` and `defaults = ["1"]`, the default stored in its
/// textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Positional parameter names
    pub params: Vec<String>,
    /// Textual default values for the trailing parameters
    pub defaults: Vec<String>,
    /// Name of the variadic-positional parameter, if any
    pub varargs: Option<String>,
    /// Name of the variadic-keyword parameter, if any
    pub kwargs: Option<String>,
}

impl Signature {
    /// Signature with positional parameters only.
    pub fn positional(params: &[&str]) -> Self {
        Self {
            params: params.iter().map(|p| (*p).to_string()).collect(),
            ..Self::default()
        }
    }
}

/// Callable definition metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallableDef {
    /// Callable id (index into the graph's callable registry)
    pub id: CallableId,
    /// Callable name as exposed by the host
    pub name: String,
    /// Introspected callable kind
    pub kind: CallableKind,
    /// Recovered signature, or `None` when the host exposes no formal
    /// parameters (native stubs)
    pub signature: Option<Signature>,
}

/// A live instance captured from the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceDef {
    /// Instance id (index into the graph's instance registry)
    pub id: InstanceId,
    /// Class of the instance
    pub class: ClassId,
    /// Memory address reported by the host (rendered in the repr)
    pub addr: u64,
}

/// A value the host could not decompose; only its repr was captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpaqueDef {
    /// Opaque id (index into the graph's opaque registry)
    pub id: OpaqueId,
    /// Captured textual representation
    pub repr: String,
}

/// A module root: a named, enumerable set of top-level attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Module name
    pub name: String,
    /// Textual representation reported by the host
    pub repr: String,
    /// Whether the host marks this module as built-in (native extension)
    pub builtin: bool,
    /// Top-level attributes, keyed by name
    pub attrs: BTreeMap<String, Attr>,
}

/// Owning registry for a captured object graph.
///
/// Two intrinsic root classes (`type` and `object`) are seeded at
/// construction; hosts never re-declare them and generation elides them from
/// base chains.
#[derive(Debug)]
pub struct ObjectGraph {
    pub(crate) strings: Vec<String>,
    pub(crate) classes: Vec<ClassDef>,
    pub(crate) callables: Vec<CallableDef>,
    pub(crate) instances: Vec<InstanceDef>,
    pub(crate) opaques: Vec<OpaqueDef>,
    pub(crate) modules: BTreeMap<String, ModuleDef>,

    str_ids: FxHashMap<String, StrId>,
    class_names: FxHashMap<String, ClassId>,
}

impl ObjectGraph {
    /// Id of the intrinsic metaclass root (`type`).
    pub const TYPE_CLASS: ClassId = ClassId(0);
    /// Id of the intrinsic universal root (`object`).
    pub const OBJECT_CLASS: ClassId = ClassId(1);

    /// Create a graph seeded with the two intrinsic root classes.
    pub fn new() -> Self {
        let mut graph = Self {
            strings: Vec::new(),
            classes: Vec::new(),
            callables: Vec::new(),
            instances: Vec::new(),
            opaques: Vec::new(),
            modules: BTreeMap::new(),
            str_ids: FxHashMap::default(),
            class_names: FxHashMap::default(),
        };
        graph.add_class("type", &[]);
        graph.add_class("object", &[]);
        graph
    }

    /// Check whether a class is one of the intrinsic roots.
    pub fn is_intrinsic_root(&self, id: ClassId) -> bool {
        id == Self::TYPE_CLASS || id == Self::OBJECT_CLASS
    }

    /// Rebuild the name/string indexes after the arenas were replaced
    /// wholesale (snapshot loading).
    pub(crate) fn rebuild_indexes(&mut self) {
        self.str_ids = self
            .strings
            .iter()
            .enumerate()
            .map(|(index, text)| (text.clone(), StrId(index)))
            .collect();
        self.class_names = self
            .classes
            .iter()
            .map(|class| (class.name.clone(), class.id))
            .collect();
    }

    // ── Construction ────────────────────────────────────────────────

    /// Intern a string and return its id.
    pub fn add_str(&mut self, text: &str) -> StrId {
        if let Some(&id) = self.str_ids.get(text) {
            return id;
        }
        let id = StrId(self.strings.len());
        self.strings.push(text.to_string());
        self.str_ids.insert(text.to_string(), id);
        id
    }

    /// Convenience: intern a string and wrap it as a value.
    pub fn str_value(&mut self, text: &str) -> Value {
        Value::Str(self.add_str(text))
    }

    /// Register a class with the given declared bases.
    pub fn add_class(&mut self, name: &str, bases: &[ClassId]) -> ClassId {
        let id = ClassId(self.classes.len());
        self.classes.push(ClassDef {
            id,
            name: name.to_string(),
            bases: bases.to_vec(),
            attrs: BTreeMap::new(),
        });
        self.class_names.insert(name.to_string(), id);
        id
    }

    /// Set an attribute on a class.
    pub fn set_class_attr(&mut self, class: ClassId, name: &str, attr: Attr) {
        self.classes[class.0].attrs.insert(name.to_string(), attr);
    }

    /// Register a callable.
    pub fn add_callable(
        &mut self,
        name: &str,
        kind: CallableKind,
        signature: Option<Signature>,
    ) -> CallableId {
        let id = CallableId(self.callables.len());
        self.callables.push(CallableDef {
            id,
            name: name.to_string(),
            kind,
            signature,
        });
        id
    }

    /// Register a live instance of a class. The address is synthesized from
    /// a per-graph counter so equal construction orders render identically.
    pub fn add_instance(&mut self, class: ClassId) -> InstanceId {
        let id = InstanceId(self.instances.len());
        let addr = INSTANCE_ADDR_BASE + (id.0 as u64) * 0x40;
        self.instances.push(InstanceDef { id, class, addr });
        id
    }

    /// Register an opaque capture carrying only a textual representation.
    pub fn add_opaque(&mut self, repr: &str) -> OpaqueId {
        let id = OpaqueId(self.opaques.len());
        self.opaques.push(OpaqueDef {
            id,
            repr: repr.to_string(),
        });
        id
    }

    /// Register a module root. Returns an error string if the name is taken.
    pub fn add_module(&mut self, name: &str, builtin: bool) -> Result<(), String> {
        if self.modules.contains_key(name) {
            return Err(format!("module '{}' already exists", name));
        }
        let repr = if builtin {
            format!("<module '{}' (built-in)>", name)
        } else {
            format!("<module '{}'>", name)
        };
        self.modules.insert(
            name.to_string(),
            ModuleDef {
                name: name.to_string(),
                repr,
                builtin,
                attrs: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Set a top-level attribute on a module. Returns an error string if the
    /// module does not exist.
    pub fn set_module_attr(&mut self, module: &str, name: &str, attr: Attr) -> Result<(), String> {
        match self.modules.get_mut(module) {
            Some(def) => {
                def.attrs.insert(name.to_string(), attr);
                Ok(())
            }
            None => Err(format!("module '{}' not found", module)),
        }
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Get a class definition. Ids must come from this graph.
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0]
    }

    /// Get a callable definition. Ids must come from this graph.
    pub fn callable(&self, id: CallableId) -> &CallableDef {
        &self.callables[id.0]
    }

    /// Get an instance definition. Ids must come from this graph.
    pub fn instance(&self, id: InstanceId) -> &InstanceDef {
        &self.instances[id.0]
    }

    /// Get an opaque definition. Ids must come from this graph.
    pub fn opaque(&self, id: OpaqueId) -> &OpaqueDef {
        &self.opaques[id.0]
    }

    /// Get an interned string. Ids must come from this graph.
    pub fn str_text(&self, id: StrId) -> &str {
        &self.strings[id.0]
    }

    /// Look up a class by declared name.
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.class_names.get(name).copied()
    }

    /// Resolve a module root by name.
    pub fn module(&self, name: &str) -> Option<&ModuleDef> {
        self.modules.get(name)
    }

    /// All module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    /// All modules, in name order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDef> {
        self.modules.values()
    }

    // ── Introspection ───────────────────────────────────────────────

    /// Textual representation of a value, as the host would print it.
    pub fn repr(&self, value: Value) -> String {
        match value {
            Value::Null => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(f),
            Value::Str(id) => quote_str(self.str_text(id)),
            Value::Class(id) => format!("<class '{}'>", self.class(id).name),
            Value::Callable(id) => {
                let callable = self.callable(id);
                match callable.kind {
                    CallableKind::Function => format!("<function {}>", callable.name),
                    CallableKind::BoundMethod => format!("<bound method {}>", callable.name),
                    CallableKind::Builtin => {
                        format!("<built-in method {}>", callable.name)
                    }
                    CallableKind::Accessor => format!("<attribute '{}'>", callable.name),
                    CallableKind::SlotWrapper => {
                        format!("<slot wrapper '{}'>", callable.name)
                    }
                }
            }
            Value::Instance(id) => {
                let instance = self.instance(id);
                format!(
                    "<{} object at 0x{:08x}>",
                    self.class(instance.class).name,
                    instance.addr
                )
            }
            Value::Opaque(id) => self.opaque(id).repr.clone(),
        }
    }

    /// The name a value exposes for declaration purposes, if any.
    pub fn value_name(&self, value: Value) -> Option<&str> {
        match value {
            Value::Class(id) => Some(&self.class(id).name),
            Value::Callable(id) => Some(&self.callable(id).name),
            _ => None,
        }
    }

    /// Class of a live instance.
    pub fn class_of(&self, value: Value) -> Option<ClassId> {
        match value {
            Value::Instance(id) => Some(self.instance(id).class),
            _ => None,
        }
    }
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a float the way the host prints it: integral floats keep a
/// trailing `.0` so they stay distinguishable from integers.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// Single-quote a string with minimal escaping.
fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic_roots_seeded() {
        let graph = ObjectGraph::new();
        assert_eq!(graph.class(ObjectGraph::TYPE_CLASS).name, "type");
        assert_eq!(graph.class(ObjectGraph::OBJECT_CLASS).name, "object");
        assert!(graph.is_intrinsic_root(ObjectGraph::TYPE_CLASS));
        assert!(graph.is_intrinsic_root(ObjectGraph::OBJECT_CLASS));
    }

    #[test]
    fn test_string_interning() {
        let mut graph = ObjectGraph::new();
        let a = graph.add_str("hello");
        let b = graph.add_str("hello");
        let c = graph.add_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.str_text(a), "hello");
    }

    #[test]
    fn test_class_registration_and_lookup() {
        let mut graph = ObjectGraph::new();
        let base = graph.add_class("Entity", &[ObjectGraph::OBJECT_CLASS]);
        let derived = graph.add_class("Vehicle", &[base]);

        assert_eq!(graph.class(derived).name, "Vehicle");
        assert_eq!(graph.class(derived).bases, vec![base]);
        assert_eq!(graph.class_by_name("Entity"), Some(base));
        assert_eq!(graph.class_by_name("Missing"), None);
        assert!(!graph.is_intrinsic_root(base));
    }

    #[test]
    fn test_attr_read_raises() {
        let attr = Attr::Raises {
            kind: "AttributeError".to_string(),
            message: "not available".to_string(),
        };
        let err = attr.read().unwrap_err();
        assert_eq!(err.kind, "AttributeError");
        assert_eq!(err.message, "not available");

        let ok = Attr::Value(Value::Int(3)).read().unwrap();
        assert_eq!(ok, Value::Int(3));
    }

    #[test]
    fn test_duplicate_module_name() {
        let mut graph = ObjectGraph::new();
        graph.add_module("engine", true).unwrap();
        assert!(graph.add_module("engine", false).is_err());
    }

    #[test]
    fn test_module_repr_marks_builtin() {
        let mut graph = ObjectGraph::new();
        graph.add_module("engine", true).unwrap();
        graph.add_module("helpers", false).unwrap();
        assert_eq!(
            graph.module("engine").unwrap().repr,
            "<module 'engine' (built-in)>"
        );
        assert_eq!(graph.module("helpers").unwrap().repr, "<module 'helpers'>");
    }

    #[test]
    fn test_module_names_sorted() {
        let mut graph = ObjectGraph::new();
        graph.add_module("zeta", false).unwrap();
        graph.add_module("alpha", false).unwrap();
        graph.add_module("mid", false).unwrap();
        assert_eq!(graph.module_names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_literal_reprs() {
        let mut graph = ObjectGraph::new();
        assert_eq!(graph.repr(Value::Null), "None");
        assert_eq!(graph.repr(Value::Bool(true)), "True");
        assert_eq!(graph.repr(Value::Bool(false)), "False");
        assert_eq!(graph.repr(Value::Int(-7)), "-7");
        assert_eq!(graph.repr(Value::Float(2.5)), "2.5");
        assert_eq!(graph.repr(Value::Float(2.0)), "2.0");
        let s = graph.str_value("it's\na test");
        assert_eq!(graph.repr(s), "'it\\'s\\na test'");
    }

    #[test]
    fn test_object_reprs() {
        let mut graph = ObjectGraph::new();
        let class = graph.add_class("Camera", &[]);
        let func = graph.add_callable("update", CallableKind::BoundMethod, None);
        let inst = graph.add_instance(class);

        assert_eq!(graph.repr(Value::Class(class)), "<class 'Camera'>");
        assert_eq!(
            graph.repr(Value::Callable(func)),
            "<bound method update>"
        );
        let inst_repr = graph.repr(Value::Instance(inst));
        assert!(inst_repr.starts_with("<Camera object at 0x"));
        assert!(inst_repr.ends_with('>'));
    }

    #[test]
    fn test_instance_addresses_deterministic() {
        let build = || {
            let mut graph = ObjectGraph::new();
            let class = graph.add_class("Node", &[]);
            let a = graph.add_instance(class);
            let b = graph.add_instance(class);
            (graph.instance(a).addr, graph.instance(b).addr)
        };
        assert_eq!(build(), build());
        let (a, b) = build();
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_name() {
        let mut graph = ObjectGraph::new();
        let class = graph.add_class("Camera", &[]);
        let func = graph.add_callable("update", CallableKind::Function, None);
        assert_eq!(graph.value_name(Value::Class(class)), Some("Camera"));
        assert_eq!(graph.value_name(Value::Callable(func)), Some("update"));
        assert_eq!(graph.value_name(Value::Int(1)), None);
    }

    #[test]
    fn test_class_of() {
        let mut graph = ObjectGraph::new();
        let class = graph.add_class("Camera", &[]);
        let inst = graph.add_instance(class);
        assert_eq!(graph.class_of(Value::Instance(inst)), Some(class));
        assert_eq!(graph.class_of(Value::Int(1)), None);
    }
}
