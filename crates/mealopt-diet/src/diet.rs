use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use mealopt_solver::{LinearExpr, Model, ModelBuilder, ModelError, Variable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DietError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown nutrient: {0}")]
    UnknownNutrient(String),
    #[error("Requirement on {0} has neither min nor max")]
    EmptyRequirement(String),
    #[error("Requirement on {nutrient} has min {min} above max {max}")]
    InvalidRange { nutrient: String, min: f64, max: f64 },
    #[error("Ingredient {0} must have a finite, non-negative cost")]
    NegativeCost(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A food that can be served in whole (or fractional) servings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Cost of one serving
    pub cost: f64,
    #[serde(default)]
    pub min_servings: Option<f64>,
    #[serde(default)]
    pub max_servings: Option<f64>,
    /// Nutrient amount per serving
    #[serde(default)]
    pub nutrients: BTreeMap<String, f64>,
}

impl Ingredient {
    pub fn amount(&self, nutrient: &str) -> f64 {
        self.nutrients.get(nutrient).copied().unwrap_or(0.0)
    }
}

/// Bounds on the total amount of one nutrient in the meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub nutrient: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Constraint label; derived from the nutrient when absent
    #[serde(default)]
    pub name: Option<String>,
}

/// A least-cost meal problem: ingredients, their nutrients and the bounds
/// the meal has to meet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diet {
    #[serde(default = "default_name")]
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    /// Whether servings are whole numbers
    #[serde(default = "default_integer_servings")]
    pub integer_servings: bool,
}

fn default_name() -> String {
    "meal".to_string()
}

fn default_integer_servings() -> bool {
    true
}

/// A diet together with the model it compiles to
#[derive(Debug, Clone)]
pub struct CompiledDiet {
    pub diet: Diet,
    /// Nutrients in report order: required ones first, then the rest by name
    pub nutrients: Vec<String>,
    pub model: Model,
}

impl Diet {
    pub fn from_json(source: &str) -> Result<Self, DietError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DietError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Every nutrient mentioned by at least one ingredient
    pub fn known_nutrients(&self) -> BTreeSet<&str> {
        self.ingredients
            .iter()
            .flat_map(|i| i.nutrients.keys().map(String::as_str))
            .collect()
    }

    /// Total amount of `nutrient` for the given servings, in ingredient order
    pub fn nutrient_total(&self, nutrient: &str, servings: &[f64]) -> f64 {
        self.ingredients
            .iter()
            .zip(servings)
            .map(|(i, s)| i.amount(nutrient) * s)
            .sum()
    }

    /// Build the minimum-cost model
    pub fn compile(&self) -> Result<CompiledDiet, DietError> {
        let known = self.known_nutrients();
        let mut builder = ModelBuilder::new(self.name.clone());

        for ingredient in &self.ingredients {
            if !ingredient.cost.is_finite() || ingredient.cost < 0.0 {
                return Err(DietError::NegativeCost(ingredient.name.clone()));
            }
            let variable = if self.integer_servings {
                Variable::integer(ingredient.name.clone())
            } else {
                Variable::continuous(ingredient.name.clone())
            };
            builder.add_variable(variable.with_bounds(
                ingredient.min_servings.unwrap_or(0.0),
                ingredient.max_servings.unwrap_or(f64::INFINITY),
            ))?;
        }

        builder.minimize(
            self.ingredients
                .iter()
                .map(|i| (i.name.as_str(), i.cost))
                .collect(),
        )?;

        for requirement in &self.requirements {
            self.add_requirement(&mut builder, requirement, &known)?;
        }

        let mut nutrients: Vec<String> = Vec::new();
        for requirement in &self.requirements {
            if !nutrients.contains(&requirement.nutrient) {
                nutrients.push(requirement.nutrient.clone());
            }
        }
        for nutrient in known {
            if !nutrients.iter().any(|n| n == nutrient) {
                nutrients.push(nutrient.to_string());
            }
        }

        let model = builder.build();
        tracing::debug!(
            component = "diet",
            operation = "compile",
            ingredients = self.ingredients.len(),
            requirements = self.requirements.len(),
            rows = model.num_constraints(),
            "Compiled diet {}",
            self.name
        );

        Ok(CompiledDiet {
            diet: self.clone(),
            nutrients,
            model,
        })
    }

    fn add_requirement(
        &self,
        builder: &mut ModelBuilder,
        requirement: &Requirement,
        known: &BTreeSet<&str>,
    ) -> Result<(), DietError> {
        let nutrient = requirement.nutrient.as_str();
        if !known.contains(nutrient) {
            return Err(DietError::UnknownNutrient(nutrient.to_string()));
        }

        let expr: LinearExpr = self
            .ingredients
            .iter()
            .map(|i| (i.name.as_str(), i.amount(nutrient)))
            .filter(|(_, amount)| *amount != 0.0)
            .collect();
        let label = |suffix: &str, both: bool| match &requirement.name {
            Some(name) if both => format!("{name}_{suffix}"),
            Some(name) => name.clone(),
            None => format!("{nutrient}_{suffix}"),
        };

        match (requirement.min, requirement.max) {
            (None, None) => return Err(DietError::EmptyRequirement(nutrient.to_string())),
            (Some(min), Some(max)) if min > max => {
                return Err(DietError::InvalidRange {
                    nutrient: nutrient.to_string(),
                    min,
                    max,
                });
            }
            (Some(min), Some(max)) if min == max => {
                builder.add_constraint(expr.equals(min).named(label("eq", false)))?;
            }
            (Some(min), Some(max)) => {
                builder.add_constraint(expr.clone().ge(min).named(label("min", true)))?;
                builder.add_constraint(expr.le(max).named(label("max", true)))?;
            }
            (Some(min), None) => {
                builder.add_constraint(expr.ge(min).named(label("min", false)))?;
            }
            (None, Some(max)) => {
                builder.add_constraint(expr.le(max).named(label("max", false)))?;
            }
        }
        Ok(())
    }
}
