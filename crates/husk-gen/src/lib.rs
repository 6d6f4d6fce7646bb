//! Declaration-stub generation for captured object graphs.
//!
//! Given an [`ObjectGraph`](husk_object::ObjectGraph), this crate decides a
//! declaration shape for every named value (classification), renders classes,
//! callables, literals, and lifted instances as declaration text (emission),
//! and orchestrates whole-module runs with per-root failure isolation
//! (driver). Output is deterministic: members and base lists are sorted, and
//! a per-run ledger guarantees each class is declared at most once, which
//! also makes cyclic type graphs terminate.
//!
//! ```text
//! Generator::generate(root)
//!     └─ StubEmitter::emit_members        (per top-level member)
//!          └─ classify                     (pure shape decision)
//!               └─ StubEmitter::emit_*     (recursing into classes/bases)
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod classify;
pub mod driver;
pub mod emit;
pub mod error;
pub mod policy;
pub mod report;
pub mod sink;
pub mod text;

pub use classify::{classify, Classification, CALLABLE_MARKERS};
pub use driver::{BatchReport, Generator, DEFAULT_ROOT_BASE};
pub use emit::StubEmitter;
pub use error::{GenError, PersistError};
pub use policy::{NoSyntheticRoot, RootPolicy, SyntheticRoot};
pub use report::{CollectingReporter, DiagnosticReporter, SilentReporter, StderrReporter};
pub use sink::{DirectorySink, MemorySink, Sink};
