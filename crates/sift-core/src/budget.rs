//! Budget engine
//!
//! Computes budget constraints and savings potential from historical
//! spending, allocates the projected savings across financial goals in
//! proportion to each goal's required monthly contribution, and writes the
//! replacement recommendation and insight views.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::aggregate::round2;
use crate::config::BudgetConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::{BudgetRecommendation, Goal, Insight, InsightSlot};

/// Outcome of a monthly analysis run (for display; the durable output
/// lives in the recommendations and insights tables)
#[derive(Debug, Clone)]
pub struct BudgetSummary {
    /// Total monthly savings potential across reducible categories
    pub total_savings: f64,
    /// Goal name -> allocated monthly amount
    pub allocations: Vec<(String, f64)>,
    /// Categories with a recommendation record
    pub categories: usize,
}

pub struct BudgetEngine<'a> {
    db: &'a Database,
    config: &'a BudgetConfig,
}

impl<'a> BudgetEngine<'a> {
    pub fn new(db: &'a Database, config: &'a BudgetConfig) -> Self {
        Self { db, config }
    }

    /// Run the full monthly analysis and replace the stored
    /// recommendation and insight views
    pub fn run_monthly_analysis(&self) -> Result<BudgetSummary> {
        info!("Running monthly budget analysis");

        let goals = self.load_goals()?;
        let monthly_spending = self.historical_spending()?;
        let constraints = self.budget_constraints(&monthly_spending);
        let total_savings = self.savings_potential(&monthly_spending, &constraints);
        let allocations = allocate_savings(total_savings, &goals);
        let current = self.current_spending()?;

        let recommendations: Vec<BudgetRecommendation> = constraints
            .iter()
            .map(|(category, recommended)| BudgetRecommendation {
                category: category.clone(),
                current: round2(current.get(category).copied().unwrap_or(0.0)),
                recommended: round2(*recommended),
            })
            .collect();
        self.db.replace_recommendations(&recommendations)?;

        let insights = generate_insights(total_savings, &allocations, &goals);
        self.db.replace_insights(&insights)?;

        info!(
            "Monthly analysis complete: {:.2} savings potential across {} categories",
            total_savings,
            recommendations.len()
        );
        Ok(BudgetSummary {
            total_savings,
            allocations,
            categories: recommendations.len(),
        })
    }

    /// Goals with excluded names dropped (malformed rows are already
    /// skipped at the db layer)
    fn load_goals(&self) -> Result<Vec<Goal>> {
        let goals = self
            .db
            .list_goals()?
            .into_iter()
            .filter(|g| !self.config.is_excluded(&g.name))
            .collect::<Vec<_>>();
        Ok(goals)
    }

    /// Historical per-category monthly spend: total debit amount divided by
    /// (distinct active days / 30). Transfer and non-discretionary
    /// categories never enter budgeting math.
    fn historical_spending(&self) -> Result<BTreeMap<String, f64>> {
        let days = self.db.distinct_debit_days()?;
        if days == 0 {
            return Ok(BTreeMap::new());
        }
        let months = days as f64 / 30.0;

        let mut spending = BTreeMap::new();
        for (category, total) in self.db.debit_totals_by_category()? {
            if category == self.config.transfer_category || self.config.is_excluded(&category) {
                continue;
            }
            spending.insert(category, total / months);
        }
        Ok(spending)
    }

    /// Recommended ceiling per category: historical spend times the
    /// category's reduction factor (unlisted categories are unconstrained)
    fn budget_constraints(&self, spending: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        spending
            .iter()
            .map(|(category, amount)| {
                (category.clone(), amount * self.config.factor_for(category))
            })
            .collect()
    }

    /// Total monthly savings potential. Each category contributes
    /// spend - ceiling, clamped at zero; a factor above 1.0 in the config
    /// must never produce negative savings.
    fn savings_potential(
        &self,
        spending: &BTreeMap<String, f64>,
        constraints: &BTreeMap<String, f64>,
    ) -> f64 {
        spending
            .iter()
            .map(|(category, amount)| {
                let ceiling = constraints.get(category).copied().unwrap_or(*amount);
                let saved = amount - ceiling;
                if saved < 0.0 {
                    warn!(
                        "Negative savings for {} (factor > 1.0?), clamping to zero",
                        category
                    );
                    0.0
                } else {
                    saved
                }
            })
            .sum()
    }

    /// Current per-category debit spend with excluded categories dropped
    fn current_spending(&self) -> Result<BTreeMap<String, f64>> {
        let mut current = BTreeMap::new();
        for (category, total) in self.db.debit_totals_by_category()? {
            if self.config.is_excluded(&category) {
                continue;
            }
            current.insert(category, total);
        }
        Ok(current)
    }
}

/// Proportional goal allocation: each valid goal (timeframe > 0) receives
/// savings in proportion to its required monthly contribution. Empty when
/// no valid goals exist.
pub fn allocate_savings(total_savings: f64, goals: &[Goal]) -> Vec<(String, f64)> {
    let valid: Vec<&Goal> = goals.iter().filter(|g| g.timeframe_months > 0).collect();
    let total_monthly_target: f64 = valid.iter().map(|g| g.monthly_target()).sum();
    if total_monthly_target == 0.0 {
        return Vec::new();
    }

    valid
        .iter()
        .map(|g| {
            (
                g.name.clone(),
                (g.monthly_target() / total_monthly_target) * total_savings,
            )
        })
        .collect()
}

/// Build the fixed-order narrative insight records.
///
/// Always emits the summary and allocation slots; the simulation and
/// recommendation slots only exist when at least one goal is underfunded.
pub fn generate_insights(
    total_savings: f64,
    allocations: &[(String, f64)],
    goals: &[Goal],
) -> Vec<Insight> {
    let mut insights = vec![Insight {
        slot: InsightSlot::Summary,
        title: "Total Savings Potential".to_string(),
        body: format!("₹{:.2}/month", total_savings),
    }];

    let allocated_lines: Vec<String> = allocations
        .iter()
        .map(|(goal, amount)| format!("{}: ₹{:.2}/month", goal, amount))
        .collect();
    insights.push(Insight {
        slot: InsightSlot::Allocated,
        title: "Allocated Savings".to_string(),
        body: if allocated_lines.is_empty() {
            "No goals set".to_string()
        } else {
            allocated_lines.join("\n")
        },
    });

    // A goal is underfunded when its allocation is below its monthly target
    let mut sim_lines = Vec::new();
    let mut rec_lines = Vec::new();
    for (name, allocated) in allocations {
        let Some(goal) = goals.iter().find(|g| &g.name == name) else {
            continue;
        };
        let target = goal.monthly_target();
        let shortfall = target - allocated;
        if shortfall > 0.0 {
            sim_lines.push(format!(
                "You need to save more to meet your {} goal. (₹{:.2}/month vs ₹{:.2}/month)",
                name, allocated, target
            ));
            rec_lines.push(format!(
                "- To meet your {} goal, you need to save an additional ₹{:.2}/month.",
                name, shortfall
            ));
        }
    }

    if !sim_lines.is_empty() {
        insights.push(Insight {
            slot: InsightSlot::Simulation,
            title: "Savings Simulation".to_string(),
            body: sim_lines.join("\n"),
        });
    }
    if !rec_lines.is_empty() {
        rec_lines.push(
            "- Consider reducing spending in non-essential categories or increasing your income."
                .to_string(),
        );
        insights.push(Insight {
            slot: InsightSlot::Recommendations,
            title: "Recommendations".to_string(),
            body: rec_lines.join("\n"),
        });
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{CategorizedTransaction, Direction};

    fn goal(name: &str, target: f64, months: i64) -> Goal {
        Goal {
            id: name.to_lowercase(),
            name: name.to_string(),
            target_amount: target,
            timeframe_months: months,
        }
    }

    fn debit(id: &str, category: &str, amount: f64, day: &str) -> CategorizedTransaction {
        CategorizedTransaction {
            id: id.to_string(),
            date: format!("{} 10:00:00", day),
            sender: "X".to_string(),
            amount,
            counterpart: "N/A".to_string(),
            direction: Direction::Debit,
            body: "b".to_string(),
            category: category.to_string(),
            verified: true,
        }
    }

    #[test]
    fn allocation_is_proportional_and_sum_preserving() {
        // Monthly targets 200 and 800; savings 500 must split 100/400
        let goals = vec![goal("Trip", 2400.0, 12), goal("Laptop", 4800.0, 6)];
        let allocations = allocate_savings(500.0, &goals);

        assert_eq!(allocations.len(), 2);
        assert!((allocations[0].1 - 100.0).abs() < 1e-9);
        assert!((allocations[1].1 - 400.0).abs() < 1e-9);
        let sum: f64 = allocations.iter().map(|(_, a)| a).sum();
        assert!((sum - 500.0).abs() < 1e-9);
    }

    #[test]
    fn zero_timeframe_goals_are_invalid() {
        let goals = vec![goal("Broken", 1000.0, 0)];
        assert!(allocate_savings(500.0, &goals).is_empty());
    }

    #[test]
    fn no_goals_means_no_allocation() {
        assert!(allocate_savings(500.0, &[]).is_empty());
    }

    #[test]
    fn savings_contribution_is_non_negative() {
        let db = Database::in_memory().unwrap();
        let mut config = Config::default().budget;
        // A misconfigured factor above 1.0 must clamp, not go negative
        config
            .reduction_factors
            .insert("Shopping".to_string(), 1.5);

        db.insert_categorized(&debit("a", "Shopping", 3000.0, "2024-03-01"))
            .unwrap();

        let engine = BudgetEngine::new(&db, &config);
        let summary = engine.run_monthly_analysis().unwrap();
        assert_eq!(summary.total_savings, 0.0);
    }

    #[test]
    fn monthly_analysis_end_to_end() {
        let db = Database::in_memory().unwrap();
        let config = Config::default().budget;

        // One active day -> months = 1/30, so monthly spend = total * 30
        db.insert_categorized(&debit("a", "Shopping", 100.0, "2024-03-01"))
            .unwrap();
        db.insert_goal(&goal("Trip", 3000.0, 10)).unwrap();

        let engine = BudgetEngine::new(&db, &config);
        let summary = engine.run_monthly_analysis().unwrap();

        // Monthly spend 3000, factor 0.8 -> ceiling 2400, savings 600
        assert!((summary.total_savings - 600.0).abs() < 1e-9);
        // Single goal receives everything
        assert_eq!(summary.allocations.len(), 1);
        assert!((summary.allocations[0].1 - 600.0).abs() < 1e-9);

        let recs = db.list_recommendations().unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, "Shopping");
        assert!((recs[0].current - 100.0).abs() < 1e-9);
        assert!((recs[0].recommended - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn excluded_and_transfer_categories_stay_out_of_budgeting() {
        let db = Database::in_memory().unwrap();
        let config = Config::default().budget;

        db.insert_categorized(&debit("a", "Healthcare", 5000.0, "2024-03-01"))
            .unwrap();
        db.insert_categorized(&debit("b", "Savings & Transfers", 2000.0, "2024-03-01"))
            .unwrap();

        let engine = BudgetEngine::new(&db, &config);
        let summary = engine.run_monthly_analysis().unwrap();

        assert_eq!(summary.total_savings, 0.0);
        assert_eq!(summary.categories, 0);
        assert!(db.list_recommendations().unwrap().is_empty());
    }

    #[test]
    fn excluded_goal_names_are_dropped() {
        let db = Database::in_memory().unwrap();
        let config = Config::default().budget;

        db.insert_categorized(&debit("a", "Shopping", 100.0, "2024-03-01"))
            .unwrap();
        db.insert_goal(&goal("Healthcare", 1000.0, 10)).unwrap();
        db.insert_goal(&goal("Trip", 1000.0, 10)).unwrap();

        let engine = BudgetEngine::new(&db, &config);
        let summary = engine.run_monthly_analysis().unwrap();
        assert_eq!(summary.allocations.len(), 1);
        assert_eq!(summary.allocations[0].0, "Trip");
    }

    #[test]
    fn underfunded_goals_produce_simulation_and_recommendations() {
        let goals = vec![goal("Trip", 12000.0, 12)]; // target 1000/month
        let allocations = allocate_savings(400.0, &goals);
        let insights = generate_insights(400.0, &allocations, &goals);

        assert_eq!(insights.len(), 4);
        assert_eq!(insights[0].slot, InsightSlot::Summary);
        assert_eq!(insights[0].body, "₹400.00/month");
        assert_eq!(insights[1].slot, InsightSlot::Allocated);
        assert_eq!(insights[2].slot, InsightSlot::Simulation);
        assert!(insights[2].body.contains("Trip"));
        assert_eq!(insights[3].slot, InsightSlot::Recommendations);
        assert!(insights[3]
            .body
            .contains("save an additional ₹600.00/month"));
        assert!(insights[3].body.contains("Consider reducing spending"));
    }

    #[test]
    fn fully_funded_goals_omit_simulation_and_recommendations() {
        let goals = vec![goal("Trip", 1200.0, 12)]; // target 100/month
        let allocations = allocate_savings(500.0, &goals);
        let insights = generate_insights(500.0, &allocations, &goals);

        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].slot, InsightSlot::Summary);
        assert_eq!(insights[1].slot, InsightSlot::Allocated);
    }

    #[test]
    fn no_goals_reads_as_no_goals_set() {
        let insights = generate_insights(250.0, &[], &[]);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[1].body, "No goals set");
    }
}
