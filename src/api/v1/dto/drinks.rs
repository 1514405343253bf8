/*
 * Responsibility
 * - Drinks の request/response DTO
 * - recipe (JSON 文字列) ⇔ Vec<Ingredient> の変換はここで行う
 * - request の値は serde_json::Value で受けて、validate で型付けする
 *   (型不一致を Json extractor の 400 にせず、操作ごとの status に振り分けるため)
 * - 「キーなし」と「null」は区別する (update の title: null は 400)
 * - ingredient の未知フィールドは受け付けない (保存時に黙って落とさない)
 */
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::repos::DrinkRow;

pub const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

pub type Recipe = Vec<Ingredient>;

fn parse_title(value: Value) -> Result<String, &'static str> {
    let Value::String(title) = value else {
        return Err("title must be a string");
    };
    if title.trim().is_empty() {
        return Err("title cannot be empty");
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err("title must be <= 80 chars");
    }
    Ok(title)
}

// Present key => Some(value), including Some(Value::Null). Absent key => None via `default`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn parse_recipe(value: Value) -> Result<Recipe, serde_json::Error> {
    serde_json::from_value(value)
}

/// A drink ready to be stored.
#[derive(Debug)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub recipe: Option<Value>,
}

impl CreateDrinkRequest {
    pub fn into_new_drink(self) -> Result<NewDrink, &'static str> {
        let title = parse_title(self.title.ok_or("title is required")?)?;
        let recipe = parse_recipe(self.recipe.ok_or("recipe is required")?)
            .map_err(|_| "recipe must be a list of {name, color, parts}")?;

        Ok(NewDrink { title, recipe })
    }
}

/// Fields to change on an existing drink. `None` = keep.
#[derive(Debug, Default)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Recipe>,
}

#[derive(Debug)]
pub enum UpdateRejection {
    InvalidTitle(&'static str),
    InvalidRecipe(serde_json::Error),
}

#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub recipe: Option<Value>,
}

impl UpdateDrinkRequest {
    // title is checked before recipe: a bad title is a 400 even when the recipe is also bad
    pub fn validate(self) -> Result<DrinkChanges, UpdateRejection> {
        let title = self
            .title
            .map(parse_title)
            .transpose()
            .map_err(UpdateRejection::InvalidTitle)?;

        // recipe: null means "keep"
        let recipe = self
            .recipe
            .filter(|value| !value.is_null())
            .map(parse_recipe)
            .transpose()
            .map_err(UpdateRejection::InvalidRecipe)?;

        Ok(DrinkChanges { title, recipe })
    }
}

pub fn serialize_recipe(recipe: &Recipe) -> Result<String, serde_json::Error> {
    serde_json::to_string(recipe)
}

/// `short` form: never carries the recipe.
#[derive(Debug, Serialize)]
pub struct DrinkSummary {
    pub id: i64,
    pub title: String,
}

impl From<DrinkRow> for DrinkSummary {
    fn from(row: DrinkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
        }
    }
}

/// `long` form.
#[derive(Debug, Serialize)]
pub struct DrinkDetail {
    pub id: i64,
    pub title: String,
    pub recipe: Recipe,
}

impl TryFrom<DrinkRow> for DrinkDetail {
    type Error = serde_json::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            recipe: serde_json::from_str(&row.recipe)?,
            title: row.title,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    pub delete: i64,
}

impl DeleteDrinkResponse {
    pub fn new(id: i64) -> Self {
        Self {
            success: true,
            delete: id,
        }
    }
}
