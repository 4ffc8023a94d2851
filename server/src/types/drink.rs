//! The drink resource and its request/response shapes.
//!
//! # Invariants
//!
//! - A persisted drink always has a non-empty title and a non-empty recipe.
//! - `Drink` serializes to the full ("detail") form; `DrinkSummary` is the
//!   reduced form served on the public listing.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::{DrinkId, Ingredient, IngredientSummary};

/// A drink as stored, with its recipe already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drink {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Reduced drink representation: no ingredient names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrinkSummary {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

impl From<Drink> for DrinkSummary {
    fn from(drink: Drink) -> Self {
        Self {
            id: drink.id,
            title: drink.title,
            recipe: drink.recipe.into_iter().map(IngredientSummary::from).collect(),
        }
    }
}

/// Validated title and recipe, as submitted for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Reasons a submitted drink body is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDrink {
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("No title provided")]
    MissingTitle,
    #[error("Title must be a non-empty string")]
    InvalidTitle,
    #[error("No recipe provided")]
    MissingRecipe,
    #[error("Recipe must be a list of ingredients, each with a name, color and parts")]
    InvalidRecipe,
    #[error("Recipe must contain at least one ingredient")]
    EmptyRecipe,
    #[error("Ingredient parts must be a positive number")]
    ZeroParts,
}

impl TryFrom<Value> for NewDrink {
    type Error = InvalidDrink;

    fn try_from(body: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = body else {
            return Err(InvalidDrink::NotAnObject);
        };

        let title = match fields.remove("title") {
            None | Some(Value::Null) => return Err(InvalidDrink::MissingTitle),
            Some(Value::String(title)) if !title.trim().is_empty() => title,
            Some(_) => return Err(InvalidDrink::InvalidTitle),
        };

        let recipe = match fields.remove("recipe") {
            None | Some(Value::Null) => return Err(InvalidDrink::MissingRecipe),
            Some(recipe) => parse_recipe(recipe)?,
        };

        Ok(Self { title, recipe })
    }
}

/// Accepts either a list of ingredients or a single ingredient object.
fn parse_recipe(value: Value) -> Result<Vec<Ingredient>, InvalidDrink> {
    let recipe: Vec<Ingredient> = match value {
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|_| InvalidDrink::InvalidRecipe)?
        }
        Value::Object(_) => {
            vec![serde_json::from_value(value).map_err(|_| InvalidDrink::InvalidRecipe)?]
        }
        _ => return Err(InvalidDrink::InvalidRecipe),
    };

    if recipe.is_empty() {
        return Err(InvalidDrink::EmptyRecipe);
    }
    if recipe.iter().any(|ingredient| ingredient.parts == 0) {
        return Err(InvalidDrink::ZeroParts);
    }

    Ok(recipe)
}
