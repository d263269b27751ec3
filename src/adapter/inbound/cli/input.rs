//! Planning input document read by `compile`, `check` and `solve`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::candidate::Candidate;
use crate::domain::kpi::{KpiCatalog, KpiDefinition};
use crate::domain::row::{ConstraintRow, TargetRow};
use crate::domain::scenario::Scenario;
use crate::error::{Error, Result};

/// Everything one planning run needs, as authored.
///
/// `kpis`, when present, replaces the catalog from the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningInput {
    #[serde(default)]
    pub kpis: Vec<KpiDefinition>,
    #[serde(default)]
    pub constraints: Vec<ConstraintRow>,
    #[serde(default)]
    pub targets: Vec<TargetRow>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl PlanningInput {
    /// Read a JSON input document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid document.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Input(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Input(format!("invalid input document {}: {e}", path.display())))
    }

    /// KPI catalog from the document, falling back to `configured`.
    ///
    /// # Errors
    ///
    /// Returns an error if the KPI definitions are inconsistent.
    pub fn kpi_catalog(
        &self,
        configured: impl FnOnce() -> Result<KpiCatalog>,
    ) -> Result<KpiCatalog> {
        if self.kpis.is_empty() {
            configured()
        } else {
            Ok(KpiCatalog::new(self.kpis.iter().cloned())?)
        }
    }

    /// Scenario by trimmed name.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no such scenario.
    pub fn scenario(&self, name: &str) -> Result<&Scenario> {
        let name = name.trim();
        self.scenarios
            .iter()
            .find(|scenario| scenario.name.trim() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = self.scenarios.iter().map(|s| s.name.as_str()).collect();
                Error::Input(format!(
                    "scenario '{name}' not found (available: {})",
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kpi::KpiLevel;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "kpis": [{ "key": "revenue", "level": "north_star" }],
        "constraints": [{
            "scenario_name": "base",
            "constraint_set_name": "default",
            "constraint_type": "mandatory",
            "dimension": "initiative",
            "dimension_key": "A"
        }],
        "candidates": [{ "id": "A", "token_cost": 100, "kpi_contributions": { "revenue": 80 } }],
        "scenarios": [{ "name": "base" }]
    }"#;

    #[test]
    fn loads_a_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, DOCUMENT).unwrap();

        let input = PlanningInput::load(&path).unwrap();
        assert_eq!(input.constraints.len(), 1);
        assert!(input.targets.is_empty());
        assert_eq!(input.candidates[0].token_cost, dec!(100));
        assert_eq!(input.scenario(" base ").unwrap().name, "base");
    }

    #[test]
    fn document_kpis_override_config() {
        let input: PlanningInput = serde_json::from_str(DOCUMENT).unwrap();
        let catalog = input.kpi_catalog(|| Ok(KpiCatalog::default())).unwrap();
        assert_eq!(
            catalog.get(&"revenue".into()).unwrap().level,
            Some(KpiLevel::NorthStar)
        );

        let bare = PlanningInput::default();
        assert!(bare.kpi_catalog(|| Ok(KpiCatalog::default())).unwrap().is_empty());
    }

    #[test]
    fn unknown_scenario_lists_available() {
        let input: PlanningInput = serde_json::from_str(DOCUMENT).unwrap();
        let err = input.scenario("stretch").unwrap_err();
        assert!(err.to_string().contains("available: base"));
    }

    #[test]
    fn malformed_document_is_an_input_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, "{ \"constraints\": 3 }").unwrap();
        assert!(matches!(PlanningInput::load(&path), Err(Error::Input(_))));
    }
}
