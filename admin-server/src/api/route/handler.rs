//! Route Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{LogDetailType, MenuFilter};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::menu;
use crate::navigation::{SimpleRoute, UserRoutes, build_user_routes, route_tree};
use crate::services::audit;
use crate::utils::AppResult;

/// GET /api/v1/route/constant-routes
pub async fn constant_routes(State(state): State<ServerState>) -> AppResult<Json<Vec<SimpleRoute>>> {
    let menus = menu::list(&state.pool, MenuFilter::constant()).await?;
    Ok(Json(route_tree(&menus)))
}

/// GET /api/v1/route/user-routes
pub async fn user_routes(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserRoutes>> {
    let routes = build_user_routes(state.store.as_ref(), current_user.id).await?;
    tracing::debug!(
        user_id = current_user.id,
        home = %routes.home,
        roots = routes.routes.len(),
        "Resolved user routes"
    );
    audit::user(&state.pool, Some(current_user.id), LogDetailType::RouteGetUserRoutes).await;
    Ok(Json(routes))
}

/// GET /api/v1/route/{route_name}/exists
pub async fn route_exists(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(route_name): Path<String>,
) -> AppResult<Json<bool>> {
    let exists = menu::route_exists(&state.pool, &route_name).await?;
    audit::user(&state.pool, Some(current_user.id), LogDetailType::RouteExists).await;
    Ok(Json(exists))
}
