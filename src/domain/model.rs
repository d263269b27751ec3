//! Solver-agnostic mixed-integer linear model.
//!
//! Variables are addressed by index. Constraints and objectives are sparse
//! `(variable, coefficient)` lists so any MILP backend can consume them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Index of a variable inside a [`MilpModel`].
pub type VarIndex = usize;

/// Integrality of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Binary,
    Continuous,
}

/// Bounds on a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBounds {
    /// Lower bound (None = -infinity).
    pub lower: Option<Decimal>,
    /// Upper bound (None = +infinity).
    pub upper: Option<Decimal>,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: Some(Decimal::ZERO),
            upper: None,
        }
    }
}

impl VariableBounds {
    /// Binary variable bounds [0, 1].
    #[must_use]
    pub const fn binary() -> Self {
        Self {
            lower: Some(Decimal::ZERO),
            upper: Some(Decimal::ONE),
        }
    }

    /// Bounded variable [lower, upper].
    #[must_use]
    pub const fn bounded(lower: Decimal, upper: Decimal) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub bounds: VariableBounds,
}

/// Constraint sense (comparison operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintSense {
    /// Greater than or equal (>=).
    GreaterEqual,
    /// Less than or equal (<=).
    LessEqual,
    /// Equal (=).
    Equal,
}

impl ConstraintSense {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Equal => "=",
        }
    }
}

/// A labeled linear constraint: `sum(coef * x[var]) {>=, <=, =} rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Names the rule the constraint came from, e.g. `capacity_cap[country/UK]`.
    pub label: String,
    pub terms: Vec<(VarIndex, Decimal)>,
    pub sense: ConstraintSense,
    pub rhs: Decimal,
}

impl LinearConstraint {
    /// Create a >= constraint.
    pub fn geq(label: impl Into<String>, terms: Vec<(VarIndex, Decimal)>, rhs: Decimal) -> Self {
        Self {
            label: label.into(),
            terms,
            sense: ConstraintSense::GreaterEqual,
            rhs,
        }
    }

    /// Create a <= constraint.
    pub fn leq(label: impl Into<String>, terms: Vec<(VarIndex, Decimal)>, rhs: Decimal) -> Self {
        Self {
            label: label.into(),
            terms,
            sense: ConstraintSense::LessEqual,
            rhs,
        }
    }

    /// Create an = constraint.
    pub fn eq(label: impl Into<String>, terms: Vec<(VarIndex, Decimal)>, rhs: Decimal) -> Self {
        Self {
            label: label.into(),
            terms,
            sense: ConstraintSense::Equal,
            rhs,
        }
    }

    /// Left-hand side value under an assignment.
    #[must_use]
    pub fn lhs(&self, values: &[Decimal]) -> Decimal {
        evaluate_terms(&self.terms, values)
    }

    /// Whether the assignment satisfies the constraint within `tolerance`.
    #[must_use]
    pub fn is_satisfied(&self, values: &[Decimal], tolerance: Decimal) -> bool {
        let lhs = self.lhs(values);
        match self.sense {
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

/// One linear objective, solved as a stage of a lexicographic sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub label: String,
    pub sense: ObjectiveSense,
    pub terms: Vec<(VarIndex, Decimal)>,
    /// Fraction of this stage's optimum later stages may give up.
    #[serde(default)]
    pub slack: Decimal,
}

impl Objective {
    pub fn maximize(label: impl Into<String>, terms: Vec<(VarIndex, Decimal)>) -> Self {
        Self {
            label: label.into(),
            sense: ObjectiveSense::Maximize,
            terms,
            slack: Decimal::ZERO,
        }
    }

    pub fn minimize(label: impl Into<String>, terms: Vec<(VarIndex, Decimal)>) -> Self {
        Self {
            label: label.into(),
            sense: ObjectiveSense::Minimize,
            terms,
            slack: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn with_slack(mut self, slack: Decimal) -> Self {
        self.slack = slack;
        self
    }

    #[must_use]
    pub fn evaluate(&self, values: &[Decimal]) -> Decimal {
        evaluate_terms(&self.terms, values)
    }

    /// Constraint that keeps this objective within `slack` and `epsilon` of
    /// an optimum `value`.
    #[must_use]
    pub fn retain(&self, value: Decimal, epsilon: Decimal) -> LinearConstraint {
        let label = format!("retain[{}]", self.label);
        let give = value.abs() * self.slack + epsilon;
        match self.sense {
            ObjectiveSense::Maximize => {
                LinearConstraint::geq(label, self.terms.clone(), value - give)
            }
            ObjectiveSense::Minimize => {
                LinearConstraint::leq(label, self.terms.clone(), value + give)
            }
        }
    }
}

/// Variables plus hard constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilpModel {
    pub variables: Vec<Variable>,
    pub constraints: Vec<LinearConstraint>,
}

impl MilpModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binary variable and return its index.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarIndex {
        self.add_variable(Variable {
            name: name.into(),
            kind: VariableKind::Binary,
            bounds: VariableBounds::binary(),
        })
    }

    /// Add a continuous variable in `[lower, upper]` and return its index.
    pub fn add_continuous(&mut self, name: impl Into<String>, lower: Decimal, upper: Decimal) -> VarIndex {
        self.add_variable(Variable {
            name: name.into(),
            kind: VariableKind::Continuous,
            bounds: VariableBounds::bounded(lower, upper),
        })
    }

    pub fn add_variable(&mut self, variable: Variable) -> VarIndex {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// First constraint or bound the assignment violates, if any.
    #[must_use]
    pub fn first_violation(&self, values: &[Decimal], tolerance: Decimal) -> Option<String> {
        if values.len() != self.variables.len() {
            return Some(format!(
                "expected {} values, got {}",
                self.variables.len(),
                values.len()
            ));
        }
        for (var, value) in self.variables.iter().zip(values) {
            let below = var.bounds.lower.is_some_and(|lo| *value < lo - tolerance);
            let above = var.bounds.upper.is_some_and(|hi| *value > hi + tolerance);
            if below || above {
                return Some(format!("{} = {value} is out of bounds", var.name));
            }
        }
        self.constraints
            .iter()
            .find(|c| !c.is_satisfied(values, tolerance))
            .map(|c| {
                format!(
                    "{}: {} {} {} violated",
                    c.label,
                    c.lhs(values).normalize(),
                    c.sense.symbol(),
                    c.rhs
                )
            })
    }
}

fn evaluate_terms(terms: &[(VarIndex, Decimal)], values: &[Decimal]) -> Decimal {
    terms
        .iter()
        .map(|(var, coef)| values.get(*var).copied().unwrap_or(Decimal::ZERO) * *coef)
        .sum()
}
