pub mod drink;
pub mod ids;
pub mod recipe;

pub use drink::{Drink, DrinkSummary, InvalidDrink, NewDrink};
pub use ids::DrinkId;
pub use recipe::{Ingredient, IngredientSummary};
