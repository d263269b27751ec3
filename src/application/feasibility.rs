//! Pre-solve feasibility checks.
//!
//! A fast, deterministic pass over a built problem that catches hard
//! contradictions and capacity impossibilities before any solver time is
//! spent. The check never mutates the problem.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::domain::candidate::Candidate;
use crate::domain::compiled::CompiledConstraintSet;
use crate::domain::dimension::CapacityDimension;
use crate::domain::feasibility::{
    FeasibilityDetails, FeasibilityIssue, FeasibilityReport, IssueCode, RuleRef,
};
use crate::domain::id::CandidateId;
use crate::domain::problem::OptimizationProblem;
use crate::domain::row::TargetKind;

/// Run every check against `problem`.
pub fn check(problem: &OptimizationProblem) -> FeasibilityReport {
    let mut checker = Checker::new(problem);
    checker.contradictions();
    checker.unknown_references();
    checker.prerequisite_cycles();
    checker.forced_selection();
    checker.bundles();
    checker.capacity();
    checker.forced_cost();
    checker.slice_supply();
    checker.targets();
    checker.soft_warnings();
    checker.finish()
}

struct Checker<'a> {
    problem: &'a OptimizationProblem,
    set: &'a CompiledConstraintSet,
    errors: Vec<FeasibilityIssue>,
    warnings: Vec<FeasibilityIssue>,
    details: FeasibilityDetails,
    /// Explicit exclusions, partners of forced candidates and members of
    /// bundles that can never be selected.
    excluded: BTreeSet<CandidateId>,
}

impl<'a> Checker<'a> {
    fn new(problem: &'a OptimizationProblem) -> Self {
        let set = &problem.compiled;
        Self {
            problem,
            set,
            errors: Vec::new(),
            warnings: Vec::new(),
            details: FeasibilityDetails {
                global_capacity: problem.global_capacity,
                ..FeasibilityDetails::default()
            },
            excluded: set.exclusions_initiatives.clone(),
        }
    }

    fn error(&mut self, code: IssueCode, message: String, rules: Vec<RuleRef>) {
        debug!(?code, %message, "feasibility error");
        self.errors.push(FeasibilityIssue::new(code, message, rules));
    }

    fn warn(&mut self, code: IssueCode, message: String, rules: Vec<RuleRef>) {
        self.warnings.push(FeasibilityIssue::new(code, message, rules));
    }

    fn cost(&self, id: &CandidateId) -> Decimal {
        self.problem
            .candidate(id)
            .map_or(Decimal::ZERO, |c| c.token_cost)
    }

    /// Rule ref for whichever bound produced the global capacity.
    fn global_ref(&self) -> RuleRef {
        match (self.set.cap(CapacityDimension::All, ""), self.problem.global_capacity) {
            (Some(cap), Some(global)) if cap == global => RuleRef::CapacityCap {
                dimension: CapacityDimension::All,
                key: String::new(),
            },
            _ => RuleRef::TotalCapacity,
        }
    }

    fn contradictions(&mut self) {
        let both: Vec<CandidateId> = self
            .set
            .mandatory
            .intersection(&self.set.exclusions_initiatives)
            .cloned()
            .collect();
        for id in both {
            self.error(
                IssueCode::MandatoryExcluded,
                format!("{id} is both mandatory and excluded"),
                vec![
                    RuleRef::Mandatory { id: id.clone() },
                    RuleRef::ExcludeInitiative { id },
                ],
            );
        }
    }

    fn unknown_references(&mut self) {
        let problem = self.problem;
        let set = self.set;
        for id in set.mandatory.iter().filter(|id| !problem.contains(id)) {
            self.error(
                IssueCode::UnknownCandidate,
                format!("mandatory candidate {id} is not in the candidate pool"),
                vec![RuleRef::Mandatory { id: id.clone() }],
            );
        }
        for (dependent, required) in &set.prerequisites {
            let missing: Vec<&CandidateId> = std::iter::once(dependent)
                .chain(required)
                .filter(|id| !problem.contains(id))
                .collect();
            if !missing.is_empty() {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                self.error(
                    IssueCode::UnknownCandidate,
                    format!(
                        "prerequisite rule for {dependent} names candidates not in the pool: {}",
                        names.join(", ")
                    ),
                    vec![RuleRef::RequirePrereq {
                        dependent: dependent.clone(),
                    }],
                );
            }
        }
        for id in set.exclusions_initiatives.iter().filter(|id| !problem.contains(id)) {
            self.warn(
                IssueCode::UnknownCandidate,
                format!("excluded candidate {id} is not in the candidate pool"),
                vec![RuleRef::ExcludeInitiative { id: id.clone() }],
            );
        }
        for pair in &set.exclusions_pairs {
            for id in [pair.first(), pair.second()] {
                if !problem.contains(id) {
                    self.warn(
                        IssueCode::UnknownCandidate,
                        format!("exclude_pair member {id} is not in the candidate pool"),
                        vec![RuleRef::ExcludePair { pair: pair.clone() }],
                    );
                }
            }
        }
        for bundle in &set.bundles {
            for id in bundle.members.iter().filter(|id| !problem.contains(id)) {
                self.warn(
                    IssueCode::UnknownCandidate,
                    format!(
                        "bundle '{}' member {id} is not in the candidate pool",
                        bundle.bundle_key
                    ),
                    vec![RuleRef::Bundle {
                        bundle_key: bundle.bundle_key.clone(),
                    }],
                );
            }
        }
        for pair in &set.synergy_bonuses {
            for id in [pair.first(), pair.second()] {
                if !problem.contains(id) {
                    self.warn(
                        IssueCode::UnknownCandidate,
                        format!("synergy pair member {id} is not in the candidate pool"),
                        vec![RuleRef::SynergyBonus { pair: pair.clone() }],
                    );
                }
            }
        }
    }

    fn prerequisite_cycles(&mut self) {
        let set = self.set;
        let mut reported: BTreeSet<BTreeSet<CandidateId>> = BTreeSet::new();
        for start in set.prerequisites.keys() {
            let mut path = vec![start.clone()];
            if let Some(cycle) = find_cycle(&set.prerequisites, &mut path, &mut BTreeSet::new()) {
                let members: BTreeSet<CandidateId> = cycle.iter().cloned().collect();
                if reported.insert(members) {
                    let rules = cycle[..cycle.len() - 1]
                        .iter()
                        .map(|id| RuleRef::RequirePrereq {
                            dependent: id.clone(),
                        })
                        .collect();
                    let text: Vec<String> = cycle.iter().map(ToString::to_string).collect();
                    self.error(
                        IssueCode::PrerequisiteCycle,
                        format!("prerequisite cycle: {}", text.join(" -> ")),
                        rules,
                    );
                }
            }
        }
    }

    /// Close mandatory candidates over prerequisites and bundle partners, then
    /// derive the pair partners that can never be selected.
    fn forced_selection(&mut self) {
        let set = self.set;
        let mut forced: BTreeSet<CandidateId> = set.mandatory.clone();
        let mut queue: Vec<CandidateId> = forced.iter().cloned().collect();
        while let Some(id) = queue.pop() {
            let pulled = set
                .prerequisites
                .get(&id)
                .into_iter()
                .flatten()
                .chain(
                    set.bundles
                        .iter()
                        .filter(|b| b.members.contains(&id))
                        .flat_map(|b| b.members.iter()),
                );
            for next in pulled {
                if forced.insert(next.clone()) {
                    queue.push(next.clone());
                }
            }
        }

        for id in forced.intersection(&set.exclusions_initiatives) {
            if set.mandatory.contains(id) {
                continue;
            }
            self.errors.push(FeasibilityIssue::new(
                IssueCode::ForcedSelectionExcluded,
                format!("{id} is excluded but required by mandatory selections"),
                vec![RuleRef::ExcludeInitiative { id: id.clone() }],
            ));
        }

        for pair in &set.exclusions_pairs {
            let first = forced.contains(pair.first());
            let second = forced.contains(pair.second());
            if first && second {
                let mut rules = vec![RuleRef::ExcludePair { pair: pair.clone() }];
                rules.extend(
                    [pair.first(), pair.second()]
                        .into_iter()
                        .filter(|id| set.mandatory.contains(*id))
                        .map(|id| RuleRef::Mandatory { id: id.clone() }),
                );
                self.errors.push(FeasibilityIssue::new(
                    IssueCode::ExcludedPairForced,
                    format!(
                        "{} and {} are excluded together but both must be selected",
                        pair.first(),
                        pair.second()
                    ),
                    rules,
                ));
            } else if first {
                self.details.forced_exclusions.insert(pair.second().clone());
            } else if second {
                self.details.forced_exclusions.insert(pair.first().clone());
            }
        }

        let mandatory_tokens = set.mandatory.iter().map(|id| self.cost(id)).sum();
        let forced_tokens = forced.iter().map(|id| self.cost(id)).sum();
        self.excluded
            .extend(self.details.forced_exclusions.iter().cloned());
        self.details.mandatory_tokens = mandatory_tokens;
        self.details.forced_tokens = forced_tokens;
        self.details.forced_selection = forced;
    }

    /// A bundle with an excluded or unknown member can only be left out
    /// whole; its remaining members count as excluded for the later checks.
    fn bundles(&mut self) {
        let set = self.set;
        let problem = self.problem;
        let mut unselectable = BTreeSet::new();
        for bundle in &set.bundles {
            let forced: Vec<&CandidateId> = bundle
                .members
                .iter()
                .filter(|id| self.details.forced_selection.contains(*id))
                .collect();
            let blocked: Vec<String> = bundle
                .members
                .iter()
                .filter_map(|id| {
                    if !problem.contains(id) {
                        Some(format!("{id} (not in the candidate pool)"))
                    } else if self.excluded.contains(id) {
                        Some(format!("{id} (excluded)"))
                    } else {
                        None
                    }
                })
                .collect();
            if blocked.is_empty() {
                continue;
            }
            let rule = RuleRef::Bundle {
                bundle_key: bundle.bundle_key.clone(),
            };
            if let Some(first_forced) = forced.first() {
                self.error(
                    IssueCode::BundleConflict,
                    format!(
                        "bundle '{}' must be selected because of {first_forced} but contains {}",
                        bundle.bundle_key,
                        blocked.join(", ")
                    ),
                    vec![rule],
                );
            } else {
                self.warn(
                    IssueCode::BundleNeverSelectable,
                    format!(
                        "bundle '{}' can never be selected because of {}",
                        bundle.bundle_key,
                        blocked.join(", ")
                    ),
                    vec![rule],
                );
                unselectable.extend(
                    bundle
                        .members
                        .iter()
                        .filter(|id| problem.contains(id))
                        .cloned(),
                );
            }
        }
        self.excluded.extend(unselectable);
    }

    fn capacity(&mut self) {
        let set = self.set;
        let global = self.problem.global_capacity;
        for (dimension, slices) in &set.floors {
            let total: Decimal = slices.values().copied().sum();
            self.details.floor_totals.insert(*dimension, total);

            if let Some(global) = global.filter(|_| !dimension.is_global()) {
                if total > global {
                    let mut rules: Vec<RuleRef> = slices
                        .keys()
                        .map(|key| RuleRef::CapacityFloor {
                            dimension: *dimension,
                            key: key.clone(),
                        })
                        .collect();
                    rules.push(self.global_ref());
                    self.error(
                        IssueCode::FloorsExceedCapacity,
                        format!(
                            "{dimension} floors need {total} tokens but global capacity is {global}"
                        ),
                        rules,
                    );
                }
            }

            for (key, floor) in slices {
                let Some(cap) = set.cap(*dimension, key) else {
                    continue;
                };
                if *floor > cap {
                    self.error(
                        IssueCode::FloorExceedsCap,
                        format!("floor {floor} exceeds cap {cap} on the same slice"),
                        vec![
                            RuleRef::CapacityFloor {
                                dimension: *dimension,
                                key: key.clone(),
                            },
                            RuleRef::CapacityCap {
                                dimension: *dimension,
                                key: key.clone(),
                            },
                        ],
                    );
                }
            }
        }

        // A total_capacity below an `all` cap makes the cap non-binding; the
        // `all` floor is still checked against the effective limit.
        if let (Some(floor), Some(global)) = (set.floor(CapacityDimension::All, ""), global) {
            let cap_binds = set
                .cap(CapacityDimension::All, "")
                .is_some_and(|cap| cap <= global);
            if !cap_binds && floor > global {
                self.error(
                    IssueCode::FloorExceedsCap,
                    format!("global floor {floor} exceeds total capacity {global}"),
                    vec![
                        RuleRef::CapacityFloor {
                            dimension: CapacityDimension::All,
                            key: String::new(),
                        },
                        RuleRef::TotalCapacity,
                    ],
                );
            }
        }
    }

    fn forced_cost(&mut self) {
        let set = self.set;
        if let Some(global) = self.problem.global_capacity {
            let mandatory_tokens = self.details.mandatory_tokens;
            let forced_tokens = self.details.forced_tokens;
            if mandatory_tokens > global {
                let mut rules: Vec<RuleRef> = set
                    .mandatory
                    .iter()
                    .map(|id| RuleRef::Mandatory { id: id.clone() })
                    .collect();
                rules.push(self.global_ref());
                self.error(
                    IssueCode::ForcedCostExceedsCapacity,
                    format!("mandatory candidates cost {mandatory_tokens} tokens but global capacity is {global}"),
                    rules,
                );
            } else if forced_tokens > global {
                let names: Vec<String> = self
                    .details
                    .forced_selection
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                let rules = vec![self.global_ref()];
                self.error(
                    IssueCode::ForcedCostExceedsCapacity,
                    format!(
                        "forced selection {} costs {forced_tokens} tokens but global capacity is {global}",
                        names.join(", ")
                    ),
                    rules,
                );
            }
        }

        for (dimension, slices) in &set.caps {
            if dimension.is_global() {
                continue;
            }
            for (key, cap) in slices {
                let forced_in_slice: Decimal = self
                    .details
                    .forced_selection
                    .iter()
                    .filter_map(|id| self.problem.candidate(id))
                    .filter(|c| c.matches(*dimension, key))
                    .map(|c| c.token_cost)
                    .sum();
                if forced_in_slice > *cap {
                    self.error(
                        IssueCode::ForcedCostExceedsCapacity,
                        format!(
                            "forced candidates in {} cost {forced_in_slice} tokens, above the cap of {cap}",
                            dimension.slice_label(key)
                        ),
                        vec![RuleRef::CapacityCap {
                            dimension: *dimension,
                            key: key.clone(),
                        }],
                    );
                }
            }
        }
    }

    /// Tokens eligible candidates in a slice could supply.
    fn slice_supply(&mut self) {
        let set = self.set;
        for (dimension, slices) in &set.floors {
            for (key, floor) in slices {
                let supply: Decimal = self
                    .eligible(*dimension, key)
                    .map(|c| c.token_cost)
                    .sum();
                if supply < *floor {
                    self.error(
                        IssueCode::FloorUnreachable,
                        format!(
                            "floor {floor} on {} cannot be met: eligible candidates total {supply} tokens",
                            dimension.slice_label(key)
                        ),
                        vec![RuleRef::CapacityFloor {
                            dimension: *dimension,
                            key: key.clone(),
                        }],
                    );
                }
            }
        }
    }

    fn targets(&mut self) {
        let set = self.set;
        for (dimension, key, kpi, spec) in set.iter_targets() {
            let reachable: Decimal = self
                .eligible(dimension, key)
                .map(|c| c.contribution(kpi))
                .filter(|v| v.is_sign_positive())
                .sum();
            if reachable >= spec.value {
                continue;
            }
            let message = format!(
                "{} target {} for '{kpi}' on {} is unreachable: eligible candidates contribute at most {reachable}",
                spec.kind,
                spec.value,
                dimension.slice_label(key)
            );
            let rules = vec![RuleRef::Target {
                dimension,
                key: key.to_string(),
                kpi: kpi.clone(),
            }];
            // Floor targets become hard constraints in the model, so an unreachable
            // floor is infeasible and must block the solve. Goals only shape the objective.
            match spec.kind {
                TargetKind::Floor => self.error(IssueCode::TargetUnreachable, message, rules),
                TargetKind::Goal => self.warn(IssueCode::TargetUnreachable, message, rules),
            }
        }
    }

    fn soft_warnings(&mut self) {
        let set = self.set;
        let mut by_key: BTreeMap<&str, usize> = BTreeMap::new();
        for bundle in &set.bundles {
            *by_key.entry(bundle.bundle_key.as_str()).or_default() += 1;
        }
        for (bundle_key, count) in by_key.into_iter().filter(|(_, n)| *n > 1) {
            self.warn(
                IssueCode::DuplicateBundleKey,
                format!("bundle key '{bundle_key}' is used by {count} bundles with different members"),
                vec![RuleRef::Bundle {
                    bundle_key: bundle_key.to_string(),
                }],
            );
        }

        for pair in &set.synergy_bonuses {
            if let Some(id) = [pair.first(), pair.second()]
                .into_iter()
                .find(|id| self.excluded.contains(*id))
            {
                self.warn(
                    IssueCode::SynergyWithExcluded,
                    format!("synergy {pair} can never pay out because {id} is excluded"),
                    vec![RuleRef::SynergyBonus { pair: pair.clone() }],
                );
            }
        }

        for warning in &self.problem.warnings {
            self.warnings.push(FeasibilityIssue::new(
                IssueCode::BuilderWarning,
                warning.to_string(),
                Vec::new(),
            ));
        }
    }

    fn eligible(
        &self,
        dimension: CapacityDimension,
        key: &'a str,
    ) -> impl Iterator<Item = &'a Candidate> + '_ {
        self.problem
            .candidates
            .iter()
            .filter(move |c| c.matches(dimension, key) && !self.excluded.contains(&c.id))
    }

    fn finish(self) -> FeasibilityReport {
        let scenario = &self.problem.scenario.name;
        let report = FeasibilityReport {
            is_feasible: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            details: self.details,
        };
        info!(
            scenario = %scenario,
            feasible = report.is_feasible,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "feasibility check complete"
        );
        report
    }
}

/// Depth-first search for a cycle reachable from the last id on `path`.
/// Returns the cycle closed on its first member, e.g. `[A, B, A]`.
fn find_cycle(
    graph: &BTreeMap<CandidateId, BTreeSet<CandidateId>>,
    path: &mut Vec<CandidateId>,
    done: &mut BTreeSet<CandidateId>,
) -> Option<Vec<CandidateId>> {
    let current = path.last()?.clone();
    for next in graph.get(&current).into_iter().flatten() {
        if let Some(pos) = path.iter().position(|id| id == next) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(next.clone());
            return Some(cycle);
        }
        if done.contains(next) {
            continue;
        }
        path.push(next.clone());
        if let Some(cycle) = find_cycle(graph, path, done) {
            return Some(cycle);
        }
        path.pop();
    }
    done.insert(current);
    None
}
