pub mod diet;
pub mod report;

pub use diet::{CompiledDiet, Diet, DietError, Ingredient, Requirement};
pub use report::{IngredientLine, MealReport, NutrientLine};
