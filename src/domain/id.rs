//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Candidate (initiative) identifier - newtype for type safety.
///
/// The inner String is private and always trimmed, so `" A "` and `"A"`
/// name the same candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CandidateId(String);

impl CandidateId {
    /// Create a new `CandidateId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Get the candidate ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return true when the identifier is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CandidateId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for CandidateId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<CandidateId> for String {
    fn from(id: CandidateId) -> Self {
        id.0
    }
}

/// KPI identifier as published by the external KPI registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KpiKey(String);

impl KpiKey {
    /// Create a new `KpiKey` from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// Get the KPI key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KpiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for KpiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for KpiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<KpiKey> for String {
    fn from(key: KpiKey) -> Self {
        key.0
    }
}

/// Key under which a compiled constraint set is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintSetKey {
    /// Planning scenario the rules belong to.
    pub scenario_name: String,
    /// Named constraint set within the scenario.
    pub constraint_set_name: String,
}

impl ConstraintSetKey {
    /// Create a key, trimming both parts.
    pub fn new(scenario_name: impl Into<String>, constraint_set_name: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into().trim().to_string(),
            constraint_set_name: constraint_set_name.into().trim().to_string(),
        }
    }
}

impl fmt::Display for ConstraintSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scenario_name, self.constraint_set_name)
    }
}

/// An unordered pair of distinct candidates, stored sorted.
///
/// `IdPair::new(A, B)` and `IdPair::new(B, A)` are equal, which keeps pairwise
/// exclusions and synergies deduplicated regardless of authoring order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(CandidateId, CandidateId)", into = "(CandidateId, CandidateId)")]
pub struct IdPair {
    first: CandidateId,
    second: CandidateId,
}

impl IdPair {
    /// Build a normalized pair.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::SelfPair`] when both ids are the same.
    pub fn new(a: CandidateId, b: CandidateId) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::SelfPair { id: a.to_string() });
        }
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    /// Lexicographically smaller member.
    #[must_use]
    pub const fn first(&self) -> &CandidateId {
        &self.first
    }

    /// Lexicographically larger member.
    #[must_use]
    pub const fn second(&self) -> &CandidateId {
        &self.second
    }

    /// Return true if `id` is one of the two members.
    #[must_use]
    pub fn contains(&self, id: &CandidateId) -> bool {
        &self.first == id || &self.second == id
    }

    /// The member that is not `id`, if `id` belongs to the pair.
    #[must_use]
    pub fn partner_of(&self, id: &CandidateId) -> Option<&CandidateId> {
        if &self.first == id {
            Some(&self.second)
        } else if &self.second == id {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for IdPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

impl TryFrom<(CandidateId, CandidateId)> for IdPair {
    type Error = DomainError;

    fn try_from((a, b): (CandidateId, CandidateId)) -> Result<Self, Self::Error> {
        Self::new(a, b)
    }
}

impl From<IdPair> for (CandidateId, CandidateId) {
    fn from(pair: IdPair) -> Self {
        (pair.first, pair.second)
    }
}
