// 📒 Budget Planner
// savings = income − expenses, compared against a savings goal.
// The goal never changes the savings arithmetic.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalcError;
use crate::input::{ensure_non_negative, round2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetInput {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub savings_goal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetResult {
    /// Positive = money left over, negative = overspend
    pub savings_or_deficit: f64,

    pub savings_goal: f64,

    /// savings ≥ goal
    pub goal_met: bool,

    /// How far savings fall short of the goal (0 when met)
    pub goal_gap: f64,

    pub message: String,
}

impl BudgetResult {
    pub fn is_over_budget(&self) -> bool {
        self.savings_or_deficit < 0.0
    }
}

pub fn plan_budget(input: &BudgetInput) -> Result<BudgetResult, CalcError> {
    let income = ensure_non_negative("monthly_income", input.monthly_income)?;
    let expenses = ensure_non_negative("monthly_expenses", input.monthly_expenses)?;
    let goal = ensure_non_negative("savings_goal", input.savings_goal)?;

    let savings = income - expenses;
    let message = if savings >= 0.0 {
        format!("You can save {:.2}.", savings)
    } else {
        format!("You're over budget by {:.2}.", savings.abs())
    };

    debug!(savings, goal, "budget planned");

    Ok(BudgetResult {
        savings_or_deficit: round2(savings),
        savings_goal: goal,
        goal_met: savings >= goal,
        goal_gap: round2((goal - savings).max(0.0)),
        message,
    })
}
