//! Recipe ingredients.
//!
//! A recipe is an ordered list of ingredients. The full form carries the
//! ingredient name; the summary form served on the public listing only
//! carries what is needed to draw the drink (color and parts).

use serde::{Deserialize, Serialize};

/// One entry of a drink recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// Ingredient as shown on the public listing. The name is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientSummary {
    pub color: String,
    pub parts: u32,
}

impl From<Ingredient> for IngredientSummary {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            color: ingredient.color,
            parts: ingredient.parts,
        }
    }
}

/// Serialize a recipe to the text stored in the `recipe` column.
pub fn encode_recipe(recipe: &[Ingredient]) -> Result<String, serde_json::Error> {
    serde_json::to_string(recipe)
}

/// Parse the text stored in the `recipe` column.
pub fn decode_recipe(stored: &str) -> Result<Vec<Ingredient>, serde_json::Error> {
    serde_json::from_str(stored)
}
