//! Dimension literals used to scope constraint and target rows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Every dimension a row may name.
///
/// Capacity and target rows are restricted to the [`CapacityDimension`]
/// subset; `initiative` and `bundle` scope per-candidate rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Country,
    Product,
    Department,
    Category,
    Program,
    All,
    Initiative,
    Bundle,
}

impl Dimension {
    /// Row literal for this dimension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Product => "product",
            Self::Department => "department",
            Self::Category => "category",
            Self::Program => "program",
            Self::All => "all",
            Self::Initiative => "initiative",
            Self::Bundle => "bundle",
        }
    }

    /// Narrow to the capacity subset, if possible.
    #[must_use]
    pub const fn as_capacity(self) -> Option<CapacityDimension> {
        match self {
            Self::Country => Some(CapacityDimension::Country),
            Self::Product => Some(CapacityDimension::Product),
            Self::Department => Some(CapacityDimension::Department),
            Self::Category => Some(CapacityDimension::Category),
            Self::Program => Some(CapacityDimension::Program),
            Self::All => Some(CapacityDimension::All),
            Self::Initiative | Self::Bundle => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_literal(s);
        let dimension = match normalized.as_str() {
            "country" => Self::Country,
            "product" => Self::Product,
            "department" => Self::Department,
            "category" => Self::Category,
            "program" => Self::Program,
            "all" => Self::All,
            "initiative" => Self::Initiative,
            "bundle" => Self::Bundle,
            _ => {
                return Err(DomainError::UnknownDimension {
                    value: s.to_string(),
                })
            }
        };
        Ok(dimension)
    }
}

/// Dimensions that may scope capacity floors, caps and KPI targets.
///
/// This closed enum deliberately has no per-initiative member, so a capacity
/// rule can never be keyed by a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityDimension {
    Country,
    Product,
    Department,
    Category,
    Program,
    All,
}

impl CapacityDimension {
    /// All capacity dimensions in canonical order.
    pub const ALL: [CapacityDimension; 6] = [
        CapacityDimension::Country,
        CapacityDimension::Product,
        CapacityDimension::Department,
        CapacityDimension::Category,
        CapacityDimension::Program,
        CapacityDimension::All,
    ];

    /// Row literal for this dimension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.widen().as_str()
    }

    /// Widen back into the row-level enum.
    #[must_use]
    pub const fn widen(self) -> Dimension {
        match self {
            Self::Country => Dimension::Country,
            Self::Product => Dimension::Product,
            Self::Department => Dimension::Department,
            Self::Category => Dimension::Category,
            Self::Program => Dimension::Program,
            Self::All => Dimension::All,
        }
    }

    /// True for the global scope.
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::All)
    }

    /// Human label for a slice: `country/UK`, or `all` for the global scope.
    #[must_use]
    pub fn slice_label(self, key: &str) -> String {
        if self.is_global() {
            self.as_str().to_string()
        } else {
            format!("{self}/{key}")
        }
    }
}

impl fmt::Display for CapacityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapacityDimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dimension = Dimension::from_str(s)?;
        dimension
            .as_capacity()
            .ok_or_else(|| DomainError::NotCapacityDimension {
                value: s.to_string(),
            })
    }
}

/// Lowercase a row literal and fold `-` and spaces into `_`.
pub(crate) fn normalize_literal(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Country".parse::<Dimension>().unwrap(), Dimension::Country);
        assert_eq!(" ALL ".parse::<Dimension>().unwrap(), Dimension::All);
    }

    #[test]
    fn initiative_is_not_a_capacity_dimension() {
        let result = "initiative".parse::<CapacityDimension>();
        assert!(matches!(
            result,
            Err(DomainError::NotCapacityDimension { .. })
        ));
    }

    #[test]
    fn unknown_literal_is_rejected() {
        assert!(matches!(
            "region".parse::<Dimension>(),
            Err(DomainError::UnknownDimension { .. })
        ));
    }

    #[test]
    fn slice_labels() {
        assert_eq!(CapacityDimension::Country.slice_label("UK"), "country/UK");
        assert_eq!(CapacityDimension::All.slice_label(""), "all");
    }

    #[test]
    fn capacity_round_trips_through_widen() {
        for dim in CapacityDimension::ALL {
            assert_eq!(dim.widen().as_capacity(), Some(dim));
        }
    }
}
