/*
 * Responsibility
 * - /drinks 系 CRUD handler
 * - 引数順: Authorized<P> → State → Path → Json (認可エラーを最初に返す)
 * - RepoError は操作ごとに status を決める
 *   - create / update の書き込み失敗: 422
 *   - delete の失敗: 500
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::drinks::{
            CreateDrinkRequest, DeleteDrinkResponse, DrinkDetail, DrinkSummary, DrinksResponse,
            UpdateDrinkRequest, UpdateRejection, serialize_recipe,
        },
        extractors::{
            ApiJson, CanDeleteDrinks, CanGetDrinksDetail, CanPatchDrinks, CanPostDrinks, DrinkId,
        },
    },
    error::AppError,
    repos::{DrinkRow, RepoError},
    state::AppState,
};

fn row_to_detail(row: DrinkRow) -> Result<DrinkDetail, AppError> {
    let id = row.id;
    DrinkDetail::try_from(row).map_err(|e| {
        tracing::error!(drink_id = id, error = %e, "stored recipe is malformed");
        AppError::Unprocessable
    })
}

fn store_write_failed(e: RepoError) -> AppError {
    tracing::warn!(error = ?e, "drink write failed");
    AppError::Unprocessable
}

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkSummary>>, AppError> {
    let rows = state.drinks.list().await?;
    let drinks = rows.into_iter().map(DrinkSummary::from).collect();

    Ok(Json(DrinksResponse::new(drinks)))
}

pub async fn list_drink_details(
    _auth: CanGetDrinksDetail,
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    let rows = state.drinks.list().await?;
    let drinks = rows
        .into_iter()
        .map(row_to_detail)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DrinksResponse::new(drinks)))
}

pub async fn create_drink(
    auth: CanPostDrinks,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateDrinkRequest>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    let new = req.into_new_drink().map_err(|reason| {
        tracing::debug!(reason, "create drink rejected");
        AppError::Unprocessable
    })?;
    let recipe = serialize_recipe(&new.recipe).map_err(|_| AppError::Unprocessable)?;

    let row = state
        .drinks
        .create(&new.title, &recipe)
        .await
        .map_err(store_write_failed)?;

    tracing::info!(drink_id = row.id, sub = %auth.claims.sub, "drink created");

    Ok(Json(DrinksResponse::new(vec![row_to_detail(row)?])))
}

pub async fn update_drink(
    auth: CanPatchDrinks,
    State(state): State<AppState>,
    drink_id: DrinkId,
    ApiJson(req): ApiJson<UpdateDrinkRequest>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    state
        .drinks
        .get(drink_id.id)
        .await
        .map_err(store_write_failed)?
        .ok_or(AppError::NotFound)?;

    let changes = req.validate().map_err(|rejection| match rejection {
        UpdateRejection::InvalidTitle(reason) => {
            tracing::debug!(reason, "update drink rejected");
            AppError::BadRequest
        }
        UpdateRejection::InvalidRecipe(e) => {
            tracing::debug!(error = %e, "update drink recipe rejected");
            AppError::Unprocessable
        }
    })?;

    let recipe = changes
        .recipe
        .as_ref()
        .map(serialize_recipe)
        .transpose()
        .map_err(|_| AppError::Unprocessable)?;

    // the row can still disappear between the lookup and the write
    let row = state
        .drinks
        .update(drink_id.id, changes.title.as_deref(), recipe.as_deref())
        .await
        .map_err(store_write_failed)?
        .ok_or(AppError::NotFound)?;

    tracing::info!(drink_id = row.id, sub = %auth.claims.sub, "drink updated");

    Ok(Json(DrinksResponse::new(vec![row_to_detail(row)?])))
}

pub async fn delete_drink(
    auth: CanDeleteDrinks,
    State(state): State<AppState>,
    drink_id: DrinkId,
) -> Result<Json<DeleteDrinkResponse>, AppError> {
    state
        .drinks
        .get(drink_id.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let deleted = state.drinks.delete(drink_id.id).await.map_err(|e| {
        tracing::error!(error = ?e, drink_id = drink_id.id, "drink delete failed");
        AppError::Internal
    })?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!(drink_id = drink_id.id, sub = %auth.claims.sub, "drink deleted");

    Ok(Json(DeleteDrinkResponse::new(drink_id.id)))
}
