//! Recursive declaration emission.
//!
//! [`StubEmitter`] turns classified values into ordered lines of declaration
//! text. It owns the per-run ledger of already-declared names: a class name
//! is entered into the ledger *before* its members are walked, which is what
//! makes self-referential and cyclic class graphs terminate. Later
//! references to a declared class degrade to a bare name reference.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

use husk_object::{
    Attr, CallableKind, ClassDef, ClassId, InstanceId, ObjectGraph, Signature, Value,
    INTERNAL_MEMBERS,
};

use crate::classify::{classify, Classification};
use crate::policy::RootPolicy;
use crate::report::DiagnosticReporter;
use crate::text::{comment_lines, indent_lines, sanitize_name, INDENT};

static SKIP_MEMBERS: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| INTERNAL_MEMBERS.iter().copied().collect());

/// A resolved base of a class header: either a class in the graph or a bare
/// name supplied by the root policy.
enum BaseRef {
    Class(ClassId),
    Named(String),
}

impl BaseRef {
    fn name(&self, graph: &ObjectGraph) -> String {
        match self {
            BaseRef::Class(id) => sanitize_name(&graph.class(*id).name),
            BaseRef::Named(name) => name.clone(),
        }
    }
}

/// Emits declaration lines for one generation run.
///
/// One emitter exists per run; its ledger is created fresh and discarded
/// with it, so concurrent runs never share dedup state.
pub struct StubEmitter<'a> {
    graph: &'a ObjectGraph,
    policy: &'a dyn RootPolicy,
    reporter: &'a mut dyn DiagnosticReporter,
    ledger: FxHashSet<String>,
}

impl<'a> StubEmitter<'a> {
    /// Create an emitter with an empty ledger.
    pub fn new(
        graph: &'a ObjectGraph,
        policy: &'a dyn RootPolicy,
        reporter: &'a mut dyn DiagnosticReporter,
    ) -> Self {
        Self {
            graph,
            policy,
            reporter,
            ledger: FxHashSet::default(),
        }
    }

    /// Emit declarations for every member of an attribute map, sorted by
    /// member name. Host-internal bookkeeping names are skipped.
    pub fn emit_members(&mut self, owner: &str, attrs: &BTreeMap<String, Attr>) -> Vec<String> {
        let mut lines = Vec::new();
        for (name, attr) in attrs {
            if SKIP_MEMBERS.contains(name.as_str()) {
                continue;
            }
            let read = attr.read();
            if let Err(err) = &read {
                self.reporter.introspection_failure(owner, name, err);
            }
            let classification = classify(self.graph, read);
            lines.extend(self.emit_member(name, classification));
        }
        lines
    }

    fn emit_member(&mut self, name: &str, classification: Classification) -> Vec<String> {
        match classification {
            Classification::Unintrospectable { kind, message } => {
                emit_unintrospectable(name, &kind, &message)
            }
            Classification::Class(id) => self.emit_class_member(name, id),
            Classification::Callable(value) => self.emit_callable(name, value),
            Classification::Literal(value) => {
                vec![format!(
                    "{} = {}",
                    sanitize_name(name),
                    self.graph.repr(value)
                )]
            }
            Classification::Instance(id) => self.emit_instance(name, id),
        }
    }

    /// A class-valued member: the full block on first sight, a bare name
    /// reference afterwards. A member whose name differs from the class's
    /// declared name additionally gets an alias assignment so the member
    /// itself is never silently dropped.
    fn emit_class_member(&mut self, name: &str, id: ClassId) -> Vec<String> {
        let decl_name = self.class_decl_name(id);
        let member_name = sanitize_name(name);
        let mut lines = self.emit_class_decl(id);
        if lines.is_empty() || member_name != decl_name {
            lines.push(format!("{} = {}", member_name, decl_name));
        }
        lines
    }

    /// A live instance: declare its class, then construct one under the
    /// member's name.
    fn emit_instance(&mut self, name: &str, id: InstanceId) -> Vec<String> {
        let class = self.graph.instance(id).class;
        let mut lines = self.emit_class_decl(class);
        lines.push(format!(
            "{} = {}()",
            sanitize_name(name),
            self.class_decl_name(class)
        ));
        lines
    }

    /// Emit a full class declaration block, or nothing if the class is an
    /// intrinsic root or already in the ledger.
    pub fn emit_class_decl(&mut self, id: ClassId) -> Vec<String> {
        let graph = self.graph;
        if graph.is_intrinsic_root(id) {
            return Vec::new();
        }
        let class = graph.class(id);
        let name = sanitize_name(&class.name);
        if self.ledger.contains(&name) {
            return Vec::new();
        }
        // Entered before recursing into members, so a class reachable from
        // its own body terminates at the guard above.
        self.ledger.insert(name.clone());

        let bases = self.resolve_bases(class);

        let mut lines = Vec::new();
        for base in &bases {
            if let BaseRef::Class(base_id) = base {
                lines.extend(self.emit_class_decl(*base_id));
            }
        }

        lines.push(String::new());
        let base_names: Vec<String> = bases.iter().map(|base| base.name(graph)).collect();
        if base_names.is_empty() {
            lines.push(format!("class {}:", name));
        } else {
            lines.push(format!("class {}({}):", name, base_names.join(", ")));
        }

        let owner = graph.repr(Value::Class(id));
        let body = self.emit_members(&owner, &class.attrs);
        if body.is_empty() {
            lines.push(format!("{}pass", INDENT));
        } else {
            lines.extend(indent_lines(body, 1));
        }
        lines.push(String::new());
        lines
    }

    /// Resolve a class's header bases: unique declared bases with intrinsic
    /// roots elided, the policy's fallback when nothing remains, sorted by
    /// resolved name.
    fn resolve_bases(&self, class: &ClassDef) -> Vec<BaseRef> {
        let graph = self.graph;
        let mut seen = FxHashSet::default();
        let mut bases = Vec::new();
        for &base in &class.bases {
            if graph.is_intrinsic_root(base) {
                continue;
            }
            if seen.insert(base) {
                bases.push(BaseRef::Class(base));
            }
        }
        if bases.is_empty() {
            for name in self.policy.fallback_bases(&sanitize_name(&class.name)) {
                bases.push(BaseRef::Named(name));
            }
        }
        bases.sort_by_key(|base| base.name(graph));
        bases
    }

    fn emit_callable(&mut self, name: &str, value: Value) -> Vec<String> {
        let decl_name = sanitize_name(name);
        if let Value::Callable(id) = value {
            let callable = self.graph.callable(id);
            if callable.kind == CallableKind::Accessor {
                return vec![format!("{} = property(lambda self: None)", decl_name)];
            }
            let args = match &callable.signature {
                Some(signature) => render_signature(signature),
                None => fallback_signature(callable.kind == CallableKind::BoundMethod),
            };
            return vec![format!("def {}({}): pass", decl_name, args)];
        }
        // Callable-looking value with nothing to introspect.
        vec![format!(
            "def {}({}): pass",
            decl_name,
            fallback_signature(false)
        )]
    }

    /// Declared name of a class, sanitized.
    fn class_decl_name(&self, id: ClassId) -> String {
        sanitize_name(&self.graph.class(id).name)
    }
}

fn emit_unintrospectable(name: &str, kind: &str, message: &str) -> Vec<String> {
    let mut lines = vec![format!("# {}:", kind)];
    lines.extend(comment_lines(message));
    lines.push(format!(
        "{} = None  # attribute read failed, error above",
        sanitize_name(name)
    ));
    lines
}

/// Render a recovered signature. Defaulted parameters are replaced by their
/// default's textual form, positionally from the tail of the parameter list.
fn render_signature(signature: &Signature) -> String {
    let mut args = signature.params.clone();
    let start = args.len().saturating_sub(signature.defaults.len());
    for (slot, default) in args[start..].iter_mut().zip(&signature.defaults) {
        *slot = default.clone();
    }
    if let Some(varargs) = &signature.varargs {
        args.push(format!("*{}", varargs));
    }
    if let Some(kwargs) = &signature.kwargs {
        args.push(format!("**{}", kwargs));
    }
    args.join(", ")
}

/// Generic signature for callables whose formal parameters are unknown.
fn fallback_signature(bound: bool) -> String {
    if bound {
        "self, *args, **kwargs".to_string()
    } else {
        "*args, **kwargs".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{NoSyntheticRoot, SyntheticRoot};
    use crate::report::SilentReporter;
    use husk_object::CallableKind;

    fn emit_one(graph: &ObjectGraph, name: &str, attr: Attr) -> Vec<String> {
        let policy = SyntheticRoot::new("GameObject");
        let mut reporter = SilentReporter;
        let mut emitter = StubEmitter::new(graph, &policy, &mut reporter);
        let mut attrs = BTreeMap::new();
        attrs.insert(name.to_string(), attr);
        emitter.emit_members("<test>", &attrs)
    }

    #[test]
    fn test_literal_member() {
        let graph = ObjectGraph::new();
        let lines = emit_one(&graph, "x", Attr::Value(Value::Int(5)));
        assert_eq!(lines, vec!["x = 5"]);
    }

    #[test]
    fn test_callable_with_signature() {
        let mut graph = ObjectGraph::new();
        let f = graph.add_callable(
            "greet",
            CallableKind::Function,
            Some(Signature::positional(&["name"])),
        );
        let lines = emit_one(&graph, "greet", Attr::Value(Value::Callable(f)));
        assert_eq!(lines, vec!["def greet(name): pass"]);
    }

    #[test]
    fn test_callable_defaults_replace_tail() {
        let signature = Signature {
            params: vec!["a".into(), "b".into(), "c".into()],
            defaults: vec!["1".into(), "'two'".into()],
            varargs: Some("rest".into()),
            kwargs: Some("extra".into()),
        };
        assert_eq!(render_signature(&signature), "a, 1, 'two', *rest, **extra");
    }

    #[test]
    fn test_callable_without_signature_unbound() {
        let mut graph = ObjectGraph::new();
        let f = graph.add_callable("native", CallableKind::Builtin, None);
        let lines = emit_one(&graph, "native", Attr::Value(Value::Callable(f)));
        assert_eq!(lines, vec!["def native(*args, **kwargs): pass"]);
    }

    #[test]
    fn test_callable_without_signature_bound() {
        let mut graph = ObjectGraph::new();
        let f = graph.add_callable("update", CallableKind::BoundMethod, None);
        let lines = emit_one(&graph, "update", Attr::Value(Value::Callable(f)));
        assert_eq!(lines, vec!["def update(self, *args, **kwargs): pass"]);
    }

    #[test]
    fn test_accessor_becomes_property() {
        let mut graph = ObjectGraph::new();
        let f = graph.add_callable("position", CallableKind::Accessor, None);
        let lines = emit_one(&graph, "position", Attr::Value(Value::Callable(f)));
        assert_eq!(lines, vec!["position = property(lambda self: None)"]);
    }

    #[test]
    fn test_opaque_callable_marker_gets_generic_def() {
        let mut graph = ObjectGraph::new();
        let o = graph.add_opaque("<slot wrapper '__eq__'>");
        let lines = emit_one(&graph, "__eq__", Attr::Value(Value::Opaque(o)));
        assert_eq!(lines, vec!["def __eq__(*args, **kwargs): pass"]);
    }

    #[test]
    fn test_unintrospectable_member() {
        let graph = ObjectGraph::new();
        let lines = emit_one(
            &graph,
            "broken",
            Attr::Raises {
                kind: "RuntimeError".to_string(),
                message: "first\n  second".to_string(),
            },
        );
        assert_eq!(
            lines,
            vec![
                "# RuntimeError:",
                "# first",
                "# second",
                "broken = None  # attribute read failed, error above",
            ]
        );
    }

    #[test]
    fn test_internal_members_skipped() {
        let mut graph = ObjectGraph::new();
        let kept = graph.str_value("v");
        let policy = SyntheticRoot::new("GameObject");
        let mut reporter = SilentReporter;
        let mut emitter = StubEmitter::new(&graph, &policy, &mut reporter);
        let mut attrs = BTreeMap::new();
        attrs.insert("__class__".to_string(), Attr::Value(Value::Int(0)));
        attrs.insert("__dict__".to_string(), Attr::Value(Value::Int(0)));
        attrs.insert("kept".to_string(), Attr::Value(kept));
        let lines = emitter.emit_members("<test>", &attrs);
        assert_eq!(lines, vec!["kept = 'v'"]);
    }

    #[test]
    fn test_class_block_shape() {
        let mut graph = ObjectGraph::new();
        let helper = graph.add_class("Helper", &[]);
        let run = graph.add_callable(
            "run",
            CallableKind::BoundMethod,
            Some(Signature::positional(&["self"])),
        );
        graph.set_class_attr(helper, "run", Attr::Value(Value::Callable(run)));

        let lines = emit_one(&graph, "Helper", Attr::Value(Value::Class(helper)));
        assert_eq!(
            lines,
            vec![
                "",
                "class Helper(GameObject):",
                "\tdef run(self): pass",
                "",
            ]
        );
    }

    #[test]
    fn test_empty_class_body_gets_pass() {
        let mut graph = ObjectGraph::new();
        let marker = graph.add_class("Marker", &[]);
        let lines = emit_one(&graph, "Marker", Attr::Value(Value::Class(marker)));
        assert_eq!(lines, vec!["", "class Marker(GameObject):", "\tpass", ""]);
    }

    #[test]
    fn test_bases_sorted_and_deduplicated() {
        let mut graph = ObjectGraph::new();
        let zeta = graph.add_class("Zeta", &[]);
        let alpha = graph.add_class("Alpha", &[]);
        let both = graph.add_class("Both", &[zeta, alpha, zeta]);

        let policy = NoSyntheticRoot;
        let mut reporter = SilentReporter;
        let mut emitter = StubEmitter::new(&graph, &policy, &mut reporter);
        let lines = emitter.emit_class_decl(both);
        let header = lines
            .iter()
            .find(|line| line.starts_with("class Both"))
            .unwrap();
        assert_eq!(header, "class Both(Alpha, Zeta):");
    }

    #[test]
    fn test_bases_emitted_before_dependent_class() {
        let mut graph = ObjectGraph::new();
        let base = graph.add_class("Base", &[]);
        let derived = graph.add_class("Derived", &[base]);

        let policy = NoSyntheticRoot;
        let mut reporter = SilentReporter;
        let mut emitter = StubEmitter::new(&graph, &policy, &mut reporter);
        let lines = emitter.emit_class_decl(derived);
        let base_pos = lines.iter().position(|l| l == "class Base:").unwrap();
        let derived_pos = lines
            .iter()
            .position(|l| l == "class Derived(Base):")
            .unwrap();
        assert!(base_pos < derived_pos);
    }

    #[test]
    fn test_intrinsic_roots_elided_from_bases() {
        let mut graph = ObjectGraph::new();
        let plain = graph.add_class("Plain", &[ObjectGraph::OBJECT_CLASS]);

        let policy = NoSyntheticRoot;
        let mut reporter = SilentReporter;
        let mut emitter = StubEmitter::new(&graph, &policy, &mut reporter);
        let lines = emitter.emit_class_decl(plain);
        assert!(lines.contains(&"class Plain:".to_string()));
    }

    #[test]
    fn test_second_reference_degrades_to_bare_name() {
        let mut graph = ObjectGraph::new();
        let helper = graph.add_class("Helper", &[]);

        let policy = NoSyntheticRoot;
        let mut reporter = SilentReporter;
        let mut emitter = StubEmitter::new(&graph, &policy, &mut reporter);
        let mut attrs = BTreeMap::new();
        attrs.insert("Alias".to_string(), Attr::Value(Value::Class(helper)));
        attrs.insert("Helper".to_string(), Attr::Value(Value::Class(helper)));
        let lines = emitter.emit_members("<test>", &attrs);
        // "Alias" sorts first and carries the block plus an alias line;
        // "Helper" is already in the ledger and degrades to a bare reference.
        assert_eq!(
            lines,
            vec![
                "",
                "class Helper:",
                "\tpass",
                "",
                "Alias = Helper",
                "Helper = Helper",
            ]
        );
    }

    #[test]
    fn test_self_referential_class_terminates() {
        let mut graph = ObjectGraph::new();
        let node = graph.add_class("Node", &[]);
        graph.set_class_attr(node, "prototype", Attr::Value(Value::Class(node)));

        let policy = NoSyntheticRoot;
        let mut reporter = SilentReporter;
        let mut emitter = StubEmitter::new(&graph, &policy, &mut reporter);
        let lines = emitter.emit_class_decl(node);
        let headers = lines.iter().filter(|l| l.starts_with("class Node")).count();
        assert_eq!(headers, 1);
        assert!(lines.contains(&"\tprototype = Node".to_string()));
    }

    #[test]
    fn test_instance_lifting() {
        let mut graph = ObjectGraph::new();
        let helper = graph.add_class("Helper", &[]);
        let inst = graph.add_instance(helper);

        let lines = emit_one(&graph, "singleton", Attr::Value(Value::Instance(inst)));
        assert_eq!(
            lines,
            vec![
                "",
                "class Helper(GameObject):",
                "\tpass",
                "",
                "singleton = Helper()",
            ]
        );
    }

    #[test]
    fn test_sanitized_class_name() {
        let mut graph = ObjectGraph::new();
        let vec3 = graph.add_class("Math:Vector3", &[]);
        let lines = emit_one(&graph, "Vector3", Attr::Value(Value::Class(vec3)));
        assert!(lines.contains(&"class Math_Vector3(GameObject):".to_string()));
        // Member name differs from the declared name, so an alias line binds it.
        assert!(lines.contains(&"Vector3 = Math_Vector3".to_string()));
    }
}
