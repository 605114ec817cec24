#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do when a non-sink cell has no unique strictly-lower neighbor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TiePolicy {
    /// Fail with `BasinError::AmbiguousFlow` when the cell is level with its
    /// lowest neighbor, or its tied lowest neighbors drain to different sinks.
    #[default]
    Reject,
    /// A cell level with its lowest neighbor is a sink; otherwise the first
    /// lowest neighbor in up, right, down, left order (`Dir4::FLOW_ORDER`)
    /// wins.
    FirstInOrder,
}

/// Worklist discipline for the upstream traversal from each sink.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Traversal {
    #[default]
    DepthFirst,
    BreadthFirst,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrainageConfig {
    pub tie_policy: TiePolicy,
    pub traversal: Traversal,
    /// Check that the basins partition every cell.
    pub verify: bool,
    /// Only honored when built with the `parallel` feature.
    pub parallel: bool,
}

impl Default for DrainageConfig {
    fn default() -> Self {
        Self {
            tie_policy: TiePolicy::Reject,
            traversal: Traversal::DepthFirst,
            verify: true,
            parallel: false,
        }
    }
}

impl DrainageConfig {
    pub fn with_tie_policy(mut self, tie_policy: TiePolicy) -> Self {
        self.tie_policy = tie_policy;
        self
    }

    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    pub(crate) fn use_parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.parallel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_strict_and_verified() {
        let cfg = DrainageConfig::default();
        assert_eq!(cfg.tie_policy, TiePolicy::Reject);
        assert_eq!(cfg.traversal, Traversal::DepthFirst);
        assert!(cfg.verify);
        assert!(!cfg.use_parallel());
    }

    #[test]
    fn builders_override_fields() {
        let cfg = DrainageConfig::default()
            .with_tie_policy(TiePolicy::FirstInOrder)
            .with_traversal(Traversal::BreadthFirst)
            .with_verify(false);
        assert_eq!(cfg.tie_policy, TiePolicy::FirstInOrder);
        assert_eq!(cfg.traversal, Traversal::BreadthFirst);
        assert!(!cfg.verify);
    }

    #[test]
    fn parallel_requires_feature() {
        let cfg = DrainageConfig::default().with_parallel(true);
        assert_eq!(cfg.use_parallel(), cfg!(feature = "parallel"));
    }
}
