//! Analysis configuration.
//!
//! Every option has a documented default and can be overridden on its own:
//! each field carries a serde default, so a TOML file only needs to name the
//! values it changes.
//!
//! ```toml
//! [layout]
//! dimensions = 3
//! iterations = 800
//! damping = { kind = "exponential", final_ratio = 0.01 }
//!
//! [conflicts]
//! max_path_degree = 3
//!
//! [clustering.strategy]
//! kind = "hybrid"
//! key = "industry"
//! min_strength = 0.4
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub centrality: CentralityConfig,
    #[serde(default)]
    pub conflicts: ConflictConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

impl AnalysisConfig {
    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        self.centrality.validate()?;
        self.conflicts.validate()?;
        self.clustering.validate()
    }

    /// Parse a TOML document. Missing sections and fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML for this schema.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content).context("Failed to parse analysis config")
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize analysis config")
    }

    /// Stable fingerprint of every option, used in cache keys.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        format!("blake3:{}", blake3::hash(&bytes))
    }
}

/// Load an [`AnalysisConfig`] from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "finite and > 0",
        })
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected: "within [0, 1]",
        })
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// How the layout temperature decays from `initial_temperature` to ~0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DampingSchedule {
    /// `t(i) = t0 * (1 - i / n)`.
    #[default]
    Linear,
    /// `t(i) = t0 * final_ratio^(i / n)`.
    Exponential { final_ratio: f64 },
}

impl DampingSchedule {
    /// Temperature for step `iteration` out of `total`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn temperature(self, initial: f64, iteration: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let progress = (iteration as f64 / total as f64).clamp(0.0, 1.0);
        match self {
            Self::Linear => initial * (1.0 - progress),
            Self::Exponential { final_ratio } => initial * final_ratio.powf(progress),
        }
    }

    fn validate(self) -> Result<(), ConfigError> {
        match self {
            Self::Linear => Ok(()),
            Self::Exponential { final_ratio } => {
                if final_ratio.is_finite() && final_ratio > 0.0 && final_ratio < 1.0 {
                    Ok(())
                } else {
                    Err(ConfigError::OutOfRange {
                        field: "layout.damping.final_ratio",
                        value: final_ratio,
                        expected: "within (0, 1)",
                    })
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// 2 or 3.
    #[serde(default = "default_dimensions")]
    pub dimensions: u8,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Spring constant scaling `strength * distance`.
    #[serde(default = "default_one")]
    pub attraction: f64,
    /// Coulomb constant scaling `1 / distance^2`.
    #[serde(default = "default_one")]
    pub repulsion: f64,
    #[serde(default = "default_one")]
    pub initial_temperature: f64,
    /// Hard per-step displacement cap, applied after the temperature cap.
    #[serde(default = "default_one")]
    pub max_displacement: f64,
    /// Side length of the cube initial positions are drawn from.
    #[serde(default = "default_bounds")]
    pub bounds: f64,
    #[serde(default)]
    pub damping: DampingSchedule,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Stop early once total displacement of a step falls below this.
    #[serde(default)]
    pub convergence_epsilon: Option<f64>,
    /// Wall-clock budget for the whole solve.
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
    /// Scale attraction by edge confidence as well as strength.
    #[serde(default)]
    pub confidence_weighting: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            iterations: default_iterations(),
            attraction: default_one(),
            repulsion: default_one(),
            initial_temperature: default_one(),
            max_displacement: default_one(),
            bounds: default_bounds(),
            damping: DampingSchedule::default(),
            seed: default_seed(),
            convergence_epsilon: None,
            time_budget_ms: None,
            confidence_weighting: false,
        }
    }
}

impl LayoutConfig {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.dimensions, 2 | 3) {
            return Err(ConfigError::OutOfRange {
                field: "layout.dimensions",
                value: f64::from(self.dimensions),
                expected: "2 or 3",
            });
        }
        if self.iterations == 0 {
            return Err(ConfigError::OutOfRange {
                field: "layout.iterations",
                value: 0.0,
                expected: ">= 1",
            });
        }
        check_positive("layout.attraction", self.attraction)?;
        check_positive("layout.repulsion", self.repulsion)?;
        check_positive("layout.initial_temperature", self.initial_temperature)?;
        check_positive("layout.max_displacement", self.max_displacement)?;
        check_positive("layout.bounds", self.bounds)?;
        self.damping.validate()?;
        if let Some(eps) = self
            .convergence_epsilon
            .filter(|eps| !eps.is_finite() || *eps < 0.0)
        {
            return Err(ConfigError::OutOfRange {
                field: "layout.convergence_epsilon",
                value: eps,
                expected: "finite and >= 0",
            });
        }
        Ok(())
    }
}

const fn default_dimensions() -> u8 {
    2
}

const fn default_iterations() -> usize {
    500
}

const fn default_one() -> f64 {
    1.0
}

const fn default_bounds() -> f64 {
    10.0
}

const fn default_seed() -> u64 {
    42
}

// ---------------------------------------------------------------------------
// Centrality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    /// Iteration cap for eigenvector centrality and PageRank.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// L2 convergence threshold for eigenvector centrality and PageRank.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_pagerank_damping")]
    pub pagerank_damping: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            pagerank_damping: default_pagerank_damping(),
        }
    }
}

impl CentralityConfig {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::OutOfRange {
                field: "centrality.max_iterations",
                value: 0.0,
                expected: ">= 1",
            });
        }
        check_positive("centrality.tolerance", self.tolerance)?;
        let d = self.pagerank_damping;
        if !(d.is_finite() && d > 0.0 && d < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "centrality.pagerank_damping",
                value: d,
                expected: "within (0, 1)",
            });
        }
        Ok(())
    }
}

const fn default_max_iterations() -> usize {
    100
}

const fn default_tolerance() -> f64 {
    1e-6
}

const fn default_pagerank_damping() -> f64 {
    0.85
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictConfig {
    /// Rules only see edges whose confidence is above this floor.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Longest indirect path, in edges (2..=4).
    #[serde(default = "default_max_path_degree")]
    pub max_path_degree: usize,
    #[serde(default = "default_true")]
    pub direct_interlock: bool,
    #[serde(default = "default_true")]
    pub indirect_paths: bool,
    #[serde(default = "default_true")]
    pub financial_overlap: bool,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_path_degree: default_max_path_degree(),
            direct_interlock: true,
            indirect_paths: true,
            financial_overlap: true,
        }
    }
}

impl ConflictConfig {
    pub const MIN_PATH_DEGREE: usize = 2;
    pub const MAX_PATH_DEGREE: usize = 4;

    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first invalid field.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("conflicts.min_confidence", self.min_confidence)?;
        if !(Self::MIN_PATH_DEGREE..=Self::MAX_PATH_DEGREE).contains(&self.max_path_degree) {
            return Err(ConfigError::OutOfRange {
                field: "conflicts.max_path_degree",
                value: self.max_path_degree as f64,
                expected: "2..=4",
            });
        }
        Ok(())
    }
}

const fn default_min_confidence() -> f64 {
    0.5
}

const fn default_max_path_degree() -> usize {
    4
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// How nodes are grouped into clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusteringStrategy {
    /// Group by the value of one node attribute.
    Attribute { key: String },
    /// Connected components over edges with `strength >= min_strength`.
    Structural { min_strength: f64 },
    /// Structural components, each subdivided by attribute value.
    Hybrid { key: String, min_strength: f64 },
}

impl Default for ClusteringStrategy {
    fn default() -> Self {
        Self::Structural { min_strength: 0.3 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub strategy: ClusteringStrategy,
}

impl ClusteringConfig {
    /// Check ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty key or out-of-range threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.strategy {
            ClusteringStrategy::Attribute { key } => {
                if key.trim().is_empty() {
                    return Err(ConfigError::Empty("clustering.strategy.key"));
                }
            }
            ClusteringStrategy::Structural { min_strength } => {
                check_unit("clustering.strategy.min_strength", *min_strength)?;
            }
            ClusteringStrategy::Hybrid { key, min_strength } => {
                if key.trim().is_empty() {
                    return Err(ConfigError::Empty("clustering.strategy.key"));
                }
                check_unit("clustering.strategy.min_strength", *min_strength)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        config.validate().expect("defaults must validate");
        assert_eq!(config.layout.dimensions, 2);
        assert_eq!(config.layout.iterations, 500);
        assert!((config.centrality.pagerank_damping - 0.85).abs() < f64::EPSILON);
        assert!((config.conflicts.min_confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_toml_overrides_single_fields() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [layout]
            seed = 7
            damping = { kind = "exponential", final_ratio = 0.01 }

            [clustering.strategy]
            kind = "attribute"
            key = "industry"
            "#,
        )
        .expect("parse");

        assert_eq!(config.layout.seed, 7);
        assert_eq!(config.layout.iterations, 500, "untouched field keeps default");
        assert_eq!(
            config.layout.damping,
            DampingSchedule::Exponential { final_ratio: 0.01 }
        );
        assert_eq!(
            config.clustering.strategy,
            ClusteringStrategy::Attribute {
                key: "industry".into()
            }
        );
        assert_eq!(config.conflicts, ConflictConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = AnalysisConfig::default();
        config.layout.iterations = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.layout.damping = DampingSchedule::Exponential { final_ratio: 1.5 };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "layout.damping.final_ratio",
                ..
            })
        ));

        let mut config = AnalysisConfig::default();
        config.conflicts.max_path_degree = 5;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.centrality.pagerank_damping = 1.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.layout.dimensions = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_iterations_fail_to_parse() {
        assert!(AnalysisConfig::from_toml_str("[layout]\niterations = -3").is_err());
    }

    #[test]
    fn linear_schedule_decays_to_zero() {
        let s = DampingSchedule::Linear;
        assert!((s.temperature(2.0, 0, 10) - 2.0).abs() < 1e-12);
        assert!((s.temperature(2.0, 5, 10) - 1.0).abs() < 1e-12);
        assert!(s.temperature(2.0, 10, 10).abs() < 1e-12);
    }

    #[test]
    fn exponential_schedule_reaches_final_ratio() {
        let s = DampingSchedule::Exponential { final_ratio: 0.01 };
        assert!((s.temperature(1.0, 100, 100) - 0.01).abs() < 1e-12);
        assert!(s.temperature(1.0, 50, 100) < 1.0);
    }

    #[test]
    fn fingerprint_tracks_changes() {
        let a = AnalysisConfig::default();
        let mut b = AnalysisConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.layout.seed += 1;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn toml_round_trip_of_defaults() {
        let text = AnalysisConfig::default().to_toml_string().expect("serialize");
        let back = AnalysisConfig::from_toml_str(&text).expect("parse");
        assert_eq!(back, AnalysisConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("boardnet.toml");
        std::fs::write(&path, "[conflicts]\nmin_confidence = 0.25\n").expect("write");
        let config = load_config(&path).expect("load");
        assert!((config.conflicts.min_confidence - 0.25).abs() < f64::EPSILON);

        let missing = load_config(&dir.path().join("nope.toml"));
        assert!(missing.is_err());
    }
}
