//! Configuration for a comparison session.
//!
//! [`MatcherConfig`] collects the naming convention used to recognise obfuscated names and
//! the limits that bound the heuristic propagation passes of the resolver.

/// Name prefix emitted by the common SWF obfuscators for generated identifiers.
pub const DEFAULT_OBFUSCATED_PREFIX: &str = "_-";

/// Default instruction-count cap for bodies aligned during propagation.
pub const DEFAULT_MAX_PROPAGATION_INSTRUCTIONS: usize = 1000;

/// Configuration for the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Names starting with this prefix are considered obfuscated (default: `"_-"`).
    pub obfuscated_prefix: String,

    /// Bodies with more instructions than this are skipped by the propagation passes
    /// (default: 1000). `usize::MAX` disables the cap.
    pub max_propagation_instructions: usize,

    /// Maximum relative difference in instruction count for the size-matched
    /// propagation pass (default: 0.1).
    pub size_tolerance: f64,

    /// Number of size-matched propagation rounds (default: 2).
    pub size_match_rounds: usize,

    /// Keep running both propagation passes until one full round maps nothing new
    /// (default: false).
    ///
    /// When set, `size_match_rounds` is ignored.
    pub propagate_until_stable: bool,

    /// Build indices and decode bodies on the rayon pool (default: true).
    pub parallel: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            obfuscated_prefix: DEFAULT_OBFUSCATED_PREFIX.to_string(),
            max_propagation_instructions: DEFAULT_MAX_PROPAGATION_INSTRUCTIONS,
            size_tolerance: 0.1,
            size_match_rounds: 2,
            propagate_until_stable: false,
            parallel: true,
        }
    }
}

impl MatcherConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Propagates to a fixed point and never skips large bodies.
    #[must_use]
    pub fn exhaustive() -> Self {
        Self {
            max_propagation_instructions: usize::MAX,
            propagate_until_stable: true,
            ..Self::default()
        }
    }

    /// Sets the obfuscated-name prefix.
    #[must_use]
    pub fn with_obfuscated_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.obfuscated_prefix = prefix.into();
        self
    }

    /// Sets the instruction-count cap for propagation.
    #[must_use]
    pub fn with_max_propagation_instructions(mut self, limit: usize) -> Self {
        self.max_propagation_instructions = limit;
        self
    }

    /// Sets the size tolerance of the size-matched pass.
    #[must_use]
    pub fn with_size_tolerance(mut self, tolerance: f64) -> Self {
        self.size_tolerance = tolerance;
        self
    }

    /// Sets the number of size-matched rounds.
    #[must_use]
    pub fn with_size_match_rounds(mut self, rounds: usize) -> Self {
        self.size_match_rounds = rounds;
        self
    }

    /// Enables or disables fixed-point propagation.
    #[must_use]
    pub fn with_propagate_until_stable(mut self, enabled: bool) -> Self {
        self.propagate_until_stable = enabled;
        self
    }

    /// Enables or disables parallel index construction.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// True if `name` follows the obfuscated naming convention.
    ///
    /// An empty prefix disables the convention entirely.
    #[must_use]
    pub fn is_obfuscated(&self, name: &str) -> bool {
        !self.obfuscated_prefix.is_empty() && name.starts_with(&self.obfuscated_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatcherConfig::default();
        assert_eq!(config.obfuscated_prefix, "_-");
        assert_eq!(config.max_propagation_instructions, 1000);
        assert_eq!(config.size_match_rounds, 2);
        assert!(!config.propagate_until_stable);
        assert!(config.parallel);
    }

    #[test]
    fn test_exhaustive() {
        let config = MatcherConfig::exhaustive();
        assert!(config.propagate_until_stable);
        assert_eq!(config.max_propagation_instructions, usize::MAX);
    }

    #[test]
    fn test_obfuscation_convention() {
        let config = MatcherConfig::default();
        assert!(config.is_obfuscated("_-a4"));
        assert!(!config.is_obfuscated("update"));
        assert!(!config.is_obfuscated("_a4"));

        let custom = MatcherConfig::new().with_obfuscated_prefix("§");
        assert!(custom.is_obfuscated("§x"));
        assert!(!custom.is_obfuscated("_-a4"));

        let disabled = MatcherConfig::new().with_obfuscated_prefix("");
        assert!(!disabled.is_obfuscated("_-a4"));
    }
}
