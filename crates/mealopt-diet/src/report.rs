use std::fmt;

use mealopt_solver::{Solution, SolutionStatus, SolveStats};
use serde::Serialize;

use crate::diet::CompiledDiet;

/// Slack allowed when checking nutrient bounds against a solution
const BOUND_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientLine {
    pub name: String,
    pub servings: f64,
    pub cost: f64,
    /// Fraction of the total cost, zero when the meal is free
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientLine {
    pub nutrient: String,
    pub total: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub satisfied: bool,
}

/// Human- and machine-readable summary of a solved diet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealReport {
    pub name: String,
    pub status: SolutionStatus,
    pub total_cost: Option<f64>,
    pub ingredients: Vec<IngredientLine>,
    pub nutrients: Vec<NutrientLine>,
    pub diagnostics: Vec<String>,
    pub stats: SolveStats,
}

impl MealReport {
    pub fn new(compiled: &CompiledDiet, solution: &Solution) -> Self {
        let diet = &compiled.diet;
        let servings: Option<Vec<f64>> = solution
            .assignment
            .as_ref()
            .map(|a| diet.ingredients.iter().map(|i| a.get(&i.name).unwrap_or(0.0)).collect());

        let mut ingredients = Vec::new();
        let mut nutrients = Vec::new();
        if let Some(servings) = &servings {
            let total: f64 = diet
                .ingredients
                .iter()
                .zip(servings)
                .map(|(i, s)| i.cost * s)
                .sum();
            for (ingredient, &amount) in diet.ingredients.iter().zip(servings) {
                if amount.abs() < BOUND_TOLERANCE {
                    continue;
                }
                let cost = ingredient.cost * amount;
                ingredients.push(IngredientLine {
                    name: ingredient.name.clone(),
                    servings: amount,
                    cost,
                    share: if total > 0.0 { cost / total } else { 0.0 },
                });
            }

            for nutrient in &compiled.nutrients {
                let total = diet.nutrient_total(nutrient, servings);
                let (min, max) = bounds_for(compiled, nutrient);
                let satisfied = min.is_none_or(|m| total >= m - BOUND_TOLERANCE)
                    && max.is_none_or(|m| total <= m + BOUND_TOLERANCE);
                nutrients.push(NutrientLine {
                    nutrient: nutrient.clone(),
                    total,
                    min,
                    max,
                    satisfied,
                });
            }
        }

        Self {
            name: diet.name.clone(),
            status: solution.status,
            total_cost: solution.objective_value,
            ingredients,
            nutrients,
            diagnostics: solution.diagnostics.clone(),
            stats: solution.stats,
        }
    }
}

/// Tightest bounds over every requirement on `nutrient`
fn bounds_for(compiled: &CompiledDiet, nutrient: &str) -> (Option<f64>, Option<f64>) {
    compiled
        .diet
        .requirements
        .iter()
        .filter(|r| r.nutrient == nutrient)
        .fold((None, None), |(min, max), r| {
            (
                tighter(min, r.min, f64::max),
                tighter(max, r.max, f64::min),
            )
        })
}

fn tighter(current: Option<f64>, next: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (current, next) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

impl fmt::Display for MealReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "Status: {}", self.status.as_str().to_uppercase())?;
        if let Some(cost) = self.total_cost {
            writeln!(f, "Total cost: {cost:.4}")?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f)?;
            writeln!(f, "Ingredients:")?;
            for line in &self.ingredients {
                writeln!(
                    f,
                    "  {:<20} {:>8} servings  {:>9.4}  {:>5.1}%",
                    line.name,
                    format_servings(line.servings),
                    line.cost,
                    line.share * 100.0
                )?;
            }
        }

        if !self.nutrients.is_empty() {
            writeln!(f)?;
            writeln!(f, "Nutrients:")?;
            for line in &self.nutrients {
                let range = match (line.min, line.max) {
                    (Some(min), Some(max)) => format!("[{min}, {max}]"),
                    (Some(min), None) => format!(">= {min}"),
                    (None, Some(max)) => format!("<= {max}"),
                    (None, None) => String::new(),
                };
                let mark = if line.satisfied { "" } else { "  VIOLATED" };
                writeln!(
                    f,
                    "  {:<20} {:>10.3}  {}{}",
                    line.nutrient, line.total, range, mark
                )?;
            }
        }

        for diagnostic in &self.diagnostics {
            writeln!(f, "warning: {diagnostic}")?;
        }
        write!(
            f,
            "\n{} nodes, {} pruned, {} pivots in {:.2?}",
            self.stats.nodes, self.stats.pruned, self.stats.iterations, self.stats.elapsed
        )
    }
}

fn format_servings(servings: f64) -> String {
    if servings.fract() == 0.0 {
        format!("{servings:.0}")
    } else {
        format!("{servings:.3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diet::{Diet, Requirement};
    use mealopt_solver::Solver;

    fn compiled() -> CompiledDiet {
        Diet::from_json(
            r#"{
                "name": "breakfast",
                "ingredients": [
                    { "name": "oats", "cost": 0.5, "nutrients": { "fibre": 4.0, "energy": 150 } },
                    { "name": "milk", "cost": 1.0, "nutrients": { "energy": 100, "calcium": 300 } },
                    { "name": "jam", "cost": 2.0, "nutrients": { "energy": 50 } }
                ],
                "requirements": [
                    { "nutrient": "fibre", "min": 8 },
                    { "nutrient": "calcium", "min": 250, "max": 400 }
                ]
            }"#,
        )
        .unwrap()
        .compile()
        .unwrap()
    }

    #[test]
    fn test_report_lines() {
        let compiled = compiled();
        let solution = Solver::new().solve(&compiled.model);
        let report = MealReport::new(&compiled, &solution);

        assert_eq!(report.status, SolutionStatus::Optimal);
        assert_eq!(report.total_cost, Some(2.0));

        let names: Vec<&str> = report.ingredients.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["oats", "milk"]);
        assert_eq!(report.ingredients[0].servings, 2.0);
        assert_eq!(report.ingredients[0].share, 0.5);

        let fibre = &report.nutrients[0];
        assert_eq!(fibre.nutrient, "fibre");
        assert_eq!(fibre.total, 8.0);
        assert_eq!(fibre.min, Some(8.0));
        assert!(fibre.satisfied);

        let energy = report.nutrients.iter().find(|n| n.nutrient == "energy").unwrap();
        assert_eq!(energy.total, 400.0);
        assert_eq!((energy.min, energy.max), (None, None));
    }

    #[test]
    fn test_report_without_solution() {
        let mut diet = compiled().diet;
        diet.requirements.push(Requirement {
            nutrient: "energy".to_string(),
            min: None,
            max: Some(100.0),
            name: None,
        });
        let compiled = diet.compile().unwrap();
        let solution = Solver::new().solve(&compiled.model);
        let report = MealReport::new(&compiled, &solution);

        assert_eq!(report.status, SolutionStatus::Infeasible);
        assert_eq!(report.total_cost, None);
        assert!(report.ingredients.is_empty());
        assert!(report.nutrients.is_empty());
        assert!(report.to_string().contains("Status: INFEASIBLE"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let compiled = compiled();
        let report = MealReport::new(&compiled, &Solver::new().solve(&compiled.model));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "optimal");
        assert_eq!(json["ingredients"][1]["name"], "milk");
        assert_eq!(json["nutrients"][1]["max"], 400.0);
    }

    #[test]
    fn test_display_marks_violations() {
        let compiled = compiled();
        let solution = Solver::new().solve(&compiled.model);
        let mut report = MealReport::new(&compiled, &solution);
        report.nutrients[0].satisfied = false;

        let text = report.to_string();
        assert!(text.contains("Total cost: 2.0000"));
        assert!(text.contains("VIOLATED"));
        assert!(text.contains("oats"));
    }
}
