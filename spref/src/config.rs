//! Binding configuration
//!
//! Controls how a const reference treats a source that could be aliased.

/// How a const reference chooses between aliasing and copying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindPolicy {
    /// Alias when the layout matches, copy otherwise
    #[default]
    Auto,
    /// Always materialize an owned copy, detaching from the source
    AlwaysCopy,
}

/// Configuration for binding const references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindConfig {
    /// Alias/copy policy
    pub policy: BindPolicy,
    /// Validate compressed arrays before aliasing them
    pub validate_source: bool,
}

impl BindConfig {
    /// Config that always produces an owned copy
    pub fn always_copy() -> Self {
        Self::default().with_policy(BindPolicy::AlwaysCopy)
    }

    /// Set the alias/copy policy
    pub fn with_policy(mut self, policy: BindPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable or disable structural validation of aliased sources
    pub fn with_validation(mut self, validate_source: bool) -> Self {
        self.validate_source = validate_source;
        self
    }

    /// Whether a source with matching layout may be aliased
    pub fn allows_aliasing(&self) -> bool {
        self.policy == BindPolicy::Auto
    }
}
