use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    accounts::{AccountView, NewAccount, StoreError},
    auth::{
        dto::{non_blank, AuthResponse, LoginRequest, RegisterRequest, ValidateResponse},
        extractors::{Authenticated, BearerToken},
        password::{hash_password, verify_against_dummy, verify_password},
    },
    config::TokenValidation,
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/validate", get(validate))
}

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/accounts/:id", get(get_account))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    let Some(email) = non_blank(payload.email) else {
        warn!("register with blank email");
        return Err(ApiError::Validation("Email is required".into()));
    };
    let Some(password) = non_blank(payload.password) else {
        warn!("register with blank password");
        return Err(ApiError::Validation("Password is required".into()));
    };

    let password_hash = hash_password(&password)?;

    // The store's uniqueness constraint decides conflicts; no lookup beforehand.
    let account = match state
        .accounts
        .create(NewAccount {
            email,
            password_hash,
            full_name: payload.full_name,
        })
        .await
    {
        Ok(a) => a,
        Err(StoreError::DuplicateEmail) => {
            warn!("email already registered");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.keys.issue(&account)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&format!("/accounts/{}", account.id))
            .context("build Location header")?,
    );

    info!(account_id = %account.id, "account registered");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            token,
            email: account.email,
            full_name: account.full_name,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let Some(account) = state.accounts.find_by_email(&email).await? else {
        // Same argon2 cost as a wrong password, so timing does not reveal the email.
        verify_against_dummy(&password);
        warn!("login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&password, &account.password_hash) {
        warn!(account_id = %account.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let last_login_at = state.accounts.record_login(account.id).await?;
    let token = state.keys.issue(&account)?;

    info!(account_id = %account.id, %last_login_at, "account logged in");
    Ok(Json(AuthResponse {
        token,
        email: account.email,
        full_name: account.full_name,
    }))
}

#[instrument(skip_all)]
pub async fn validate(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ValidateResponse>, ApiError> {
    match state.config.jwt.validation {
        TokenValidation::Presence => Ok(Json(ValidateResponse {
            valid: true,
            claims: None,
        })),
        TokenValidation::Verify => {
            let claims = state.keys.verify(&token)?;
            Ok(Json(ValidateResponse {
                valid: true,
                claims: Some(claims),
            }))
        }
    }
}

#[instrument(skip(state, claims))]
pub async fn get_account(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ApiError> {
    if claims.sub != id {
        warn!(token_sub = %claims.sub, "token does not belong to requested account");
        return Err(ApiError::Forbidden(
            "Token does not belong to this account".into(),
        ));
    }

    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".into()))?;

    Ok(Json(account.into()))
}
