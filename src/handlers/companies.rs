use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::models::company::Company;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

pub async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<Response, AppError> {
    user.require_admin()?;

    let company = Company::create(&state.pool, &request.name).await?;

    Ok(created(company, "Company created"))
}

pub async fn list_companies(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    user.require_admin()?;

    let companies = Company::list(&state.pool).await?;

    Ok(success(companies, "Companies retrieved"))
}
