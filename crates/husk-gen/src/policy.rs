//! Fallback-base policy for classes whose declared bases were all elided.
//!
//! Intrinsic root types never appear in emitted base lists. A class left
//! with no bases after that elision gets its header bases from a
//! [`RootPolicy`], so hosts with a distinguished common ancestor can keep
//! their emitted hierarchy single-rooted.

/// Decides the base names of a class whose declared base chain is empty
/// after intrinsic-root elision.
pub trait RootPolicy {
    /// Base names to declare for `class_name`. May be empty.
    fn fallback_bases(&self, class_name: &str) -> Vec<String>;
}

/// Substitute a single synthetic root for every base-less class. The
/// synthetic root class itself keeps an empty base list, so the hierarchy
/// bottoms out instead of referencing itself.
#[derive(Debug, Clone)]
pub struct SyntheticRoot {
    name: String,
}

impl SyntheticRoot {
    /// Policy substituting `name` as the synthetic root.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The synthetic root name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RootPolicy for SyntheticRoot {
    fn fallback_bases(&self, class_name: &str) -> Vec<String> {
        if class_name == self.name {
            Vec::new()
        } else {
            vec![self.name.clone()]
        }
    }
}

/// Leave empty base chains empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSyntheticRoot;

impl RootPolicy for NoSyntheticRoot {
    fn fallback_bases(&self, _class_name: &str) -> Vec<String> {
        Vec::new()
    }
}
