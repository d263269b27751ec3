//! KPI registry port.

use std::collections::BTreeSet;

use crate::domain::id::KpiKey;
use crate::domain::kpi::{KpiCatalog, KpiLevel};

/// Source of truth for which KPIs exist and how they relate.
pub trait KpiRegistry: Send + Sync {
    /// Every KPI key a target row may reference.
    fn valid_kpi_keys(&self) -> BTreeSet<KpiKey>;

    /// Tier of a KPI, or `None` for supporting metrics and unknown keys.
    fn kpi_level(&self, key: &KpiKey) -> Option<KpiLevel>;

    /// The single North Star KPI, if declared.
    fn north_star(&self) -> Option<KpiKey>;

    /// True when `input` causally feeds `output`, directly or transitively.
    fn is_causal_input(&self, input: &KpiKey, output: &KpiKey) -> bool;

    /// North Star and Strategic KPIs; the only keys allowed in objectives.
    fn objective_kpis(&self) -> BTreeSet<KpiKey> {
        self.valid_kpi_keys()
            .into_iter()
            .filter(|key| self.kpi_level(key).is_some())
            .collect()
    }
}

impl KpiRegistry for KpiCatalog {
    fn valid_kpi_keys(&self) -> BTreeSet<KpiKey> {
        self.keys()
    }

    fn kpi_level(&self, key: &KpiKey) -> Option<KpiLevel> {
        self.level(key)
    }

    fn north_star(&self) -> Option<KpiKey> {
        self.north_star_key().cloned()
    }

    fn is_causal_input(&self, input: &KpiKey, output: &KpiKey) -> bool {
        self.reaches(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kpi::KpiDefinition;

    #[test]
    fn objective_kpis_exclude_supporting_metrics() {
        let catalog = KpiCatalog::new([
            KpiDefinition::new("revenue", Some(KpiLevel::NorthStar)),
            KpiDefinition::new("nps", Some(KpiLevel::Strategic)),
            KpiDefinition::new("conversion", None).feeding("revenue"),
        ])
        .unwrap();
        let keys: Vec<_> = catalog.objective_kpis().into_iter().map(String::from).collect();
        assert_eq!(keys, vec!["nps", "revenue"]);
        assert!(catalog.is_causal_input(&"conversion".into(), &"revenue".into()));
    }
}
