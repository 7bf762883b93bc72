//! Configuration for graph construction and table assembly.

use strum_macros::Display;

/// Policy for label volumes that produce zero adjacencies
/// (e.g. a single-region volume).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EmptyGraphPolicy {
    /// Fail graph construction with [`crate::Error::EmptyGraph`].
    /// A zero-edge graph is almost always an input mistake, so this is
    /// the default.
    #[default]
    Reject,
    /// Accept the degenerate graph; feature tables built from it have
    /// zero rows.
    Allow,
}

/// Policy for resolving feature-column name collisions between accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ColumnNaming {
    /// Fail assembly with [`crate::Error::ColumnNameCollision`] when two
    /// accumulators emit the same column name.
    #[default]
    Strict,
    /// Disambiguate by prefixing every column with its accumulator name.
    PrefixAccumulator,
}

/// Configuration for one graph-build invocation.
///
/// All state is scoped to the invocation; there are no module-level
/// singletons.
#[derive(Debug, Clone, Copy)]
pub struct RagConfig {
    /// What to do when the scan yields zero adjacencies.
    pub empty_graph: EmptyGraphPolicy,
    /// Allow the per-axis scan to run on the rayon pool for large volumes.
    /// The result is identical to the sequential scan.
    pub parallel_scan: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            empty_graph: EmptyGraphPolicy::Reject,
            parallel_scan: true,
        }
    }
}
