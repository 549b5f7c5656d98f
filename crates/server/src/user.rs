//! Signup, login and the current-user endpoint.

use api_types::user::{AuthResponse, Login, Signup, UserView};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use engine::{Caller, EngineError};

use crate::{ServerError, server::ServerState};

fn user_view(caller: &Caller) -> UserView {
    let user = caller.user();
    UserView {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    }
}

fn auth_response(state: &ServerState, caller: &Caller) -> Result<Json<AuthResponse>, ServerError> {
    let token = state
        .tokens
        .issue(caller.id())
        .map_err(|err| ServerError::Internal(format!("failed to sign token: {err}")))?;
    Ok(Json(AuthResponse {
        token,
        user: user_view(caller),
    }))
}

/// Register a user and hand back a token for it.
pub async fn signup(
    State(state): State<ServerState>,
    payload: Result<Json<Signup>, JsonRejection>,
) -> Result<Json<AuthResponse>, ServerError> {
    let Json(payload) = payload?;
    let caller = state
        .engine
        .signup(
            payload.email.as_deref(),
            payload.password.as_deref(),
            payload.name.as_deref(),
        )
        .await?;

    tracing::info!("new user {} signed up", caller.id());
    auth_response(&state, &caller)
}

pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<Login>, JsonRejection>,
) -> Result<Json<AuthResponse>, ServerError> {
    let Json(payload) = payload?;
    let caller = match state
        .engine
        .login(payload.email.as_deref(), payload.password.as_deref())
        .await
    {
        Ok(caller) => caller,
        Err(EngineError::InvalidCredentials) => {
            tracing::debug!("login rejected");
            return Err(EngineError::InvalidCredentials.into());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::debug!("user {} logged in", caller.id());
    auth_response(&state, &caller)
}

pub async fn me(Extension(caller): Extension<Caller>) -> Json<UserView> {
    Json(user_view(&caller))
}
