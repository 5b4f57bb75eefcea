use serde::{Deserialize, Serialize};

/// Sheet name of the per-store daily table.
pub const DAILY_TABLE: &str = "pulso_consulta_diaria";

/// Sheet name of the per-store cluster gap table.
pub const CLUSTER_TABLE: &str = "pulso_consulta_diaria_cluster_a";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GapConfig {
    /// Target capture percentage reported as `percentual_captura`.
    /// Policy input, not derived from the data.
    pub capture_percentage: f64,
    /// Row limit for the opportunity and performer rankings.
    pub top_n: usize,
    /// Absolute revenue gap beyond which a store is flagged in insights.
    pub insight_threshold: f64,
    /// Allowed |GapRevenue - sum(components)| before a row is reported.
    pub consistency_tolerance: f64,
    pub daily_table: String,
    pub cluster_table: String,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            capture_percentage: 40.0,
            top_n: 10,
            insight_threshold: 10_000.0,
            consistency_tolerance: 0.01,
            daily_table: DAILY_TABLE.into(),
            cluster_table: CLUSTER_TABLE.into(),
        }
    }
}

impl GapConfig {
    /// Load from a JSON file. Missing keys fall back to the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GapConfig = serde_json::from_str(&content)?;
        if !config.capture_percentage.is_finite() {
            anyhow::bail!("capture_percentage must be finite in {path}");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GapConfig = serde_json::from_str(r#"{ "top_n": 5 }"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.capture_percentage, 40.0);
        assert_eq!(config.cluster_table, CLUSTER_TABLE);
    }
}
