// auth.rs — Password verification with the legacy-plaintext migration.
//
// No session or token issuance here: the endpoint verifies a credential
// and returns the account (credential field never serialized). Accounts
// predating the hashing rollout still hold plaintext; a successful login
// against one opportunistically rewrites it as a salted hash. A failed
// rewrite is logged and otherwise ignored — the login already succeeded.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use ops_credentials::CredentialCheck;
use ops_model::User;

use crate::http::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .find_user_by_username(&body.username)?
        .ok_or_else(|| ApiError::NotFound(format!("user '{}' not found", body.username)))?;

    match ops_credentials::check(&body.password, &user.credential) {
        CredentialCheck::Valid { needs_rehash } => {
            if needs_rehash {
                let rehashed = ops_credentials::hash(&body.password);
                if let Err(e) = state.store.update_credential(&user.id, &rehashed) {
                    tracing::warn!(user_id = %user.id, error = %e, "credential rehash failed");
                } else {
                    tracing::info!(user_id = %user.id, "legacy credential rehashed");
                }
            }
            Ok(Json(user))
        }
        CredentialCheck::Invalid => Err(ApiError::PermissionDenied(
            "invalid credentials".to_string(),
        )),
    }
}
