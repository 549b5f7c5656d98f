use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::Utc;

use std::sync::Arc;

use crate::{ServerError, TokenSigner, expenses, queries, statistics, user};
use api_types::health::Health;
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenSigner>,
}

impl ServerState {
    pub fn new(engine: Engine, tokens: TokenSigner) -> Self {
        Self {
            engine: Arc::new(engine),
            tokens: Arc::new(tokens),
        }
    }
}

/// Resolve the bearer token into a `Caller` and attach it to the request.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(ServerError::Unauthenticated("No token provided".to_string()));
    };

    let user_id = state.tokens.verify(bearer.token()).map_err(|err| {
        tracing::debug!("rejected bearer token: {err}");
        ServerError::Unauthenticated("Invalid token".to_string())
    })?;

    let caller = match state.engine.caller(user_id).await {
        Ok(caller) => caller,
        Err(EngineError::KeyNotFound(_)) => {
            tracing::debug!("rejected bearer token: user {user_id} no longer exists");
            return Err(ServerError::Unauthenticated("Invalid token".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "OK".to_string(),
        timestamp: Utc::now(),
    })
}

/// Every route, mounted under `/api`.
pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(user::me))
        .route(
            "/expenses",
            get(expenses::list)
                .post(expenses::create)
                .delete(expenses::delete_all),
        )
        .route("/expenses/search", get(queries::search))
        .route("/expenses/filter", get(queries::filter))
        .route("/expenses/sort", get(queries::sort))
        .route("/expenses/summary", get(statistics::summary))
        .route("/expenses/statistics", get(statistics::statistics))
        .route(
            "/expenses/users/{user_id}/expenses",
            get(expenses::list_for_user),
        )
        .route(
            "/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(user::signup))
        .route("/auth/login", post(user::login));

    Router::new()
        .nest("/api", public.merge(protected))
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
