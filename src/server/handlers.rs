use super::AppState;
use super::extract::CurrentUser;
use crate::error::{AppError, Result};
use crate::google::AuthorizationRequest;
use crate::models::{SheetData, SpreadsheetInfo, UserId};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

const SERVICE_NAME: &str = "Google Sheets Integration API";

pub(super) async fn root() -> Json<Value> {
    Json(json!({ "message": SERVICE_NAME }))
}

pub(super) async fn login(State(state): State<AppState>) -> Result<Json<AuthorizationRequest>> {
    Ok(Json(state.oauth.authorize_url()?))
}

// `state` is echoed back by the provider but the initiator keeps nothing to
// check it against, so it isn't read.
#[derive(Debug, Deserialize)]
pub(super) struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

/// Finish the authorization flow and send the browser back to the front end.
///
/// Failures never surface as an error status here: they become an
/// `auth=error` redirect carrying the message.
#[instrument(name = "Authorization callback", skip_all, fields(user = %user))]
pub(super) async fn callback(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    params: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Redirect {
    let outcome = match params {
        Ok(Query(params)) => complete_authorization(&state, &user, params).await,
        Err(rejection) => Err(AppError::Auth(format!(
            "Invalid callback parameters: {}",
            rejection.body_text()
        ))),
    };

    match outcome {
        Ok(()) => {
            info!("Authorization completed");
            Redirect::temporary(&frontend_redirect(
                &state.frontend_url,
                &[("auth", "success")],
            ))
        }
        Err(e) => {
            warn!(error = %e, "Authorization failed");
            let message = e.to_string();
            Redirect::temporary(&frontend_redirect(
                &state.frontend_url,
                &[("auth", "error"), ("message", &message)],
            ))
        }
    }
}

async fn complete_authorization(
    state: &AppState,
    user: &UserId,
    params: CallbackParams,
) -> Result<()> {
    if let Some(error) = params.error {
        return Err(AppError::Auth(format!("Authorization denied: {}", error)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Auth("No code in callback".to_string()))?;

    let credential = state.oauth.exchange_code(&code).await?;
    state.credentials.store(user, credential).await
}

/// Append form-encoded `params` to the front-end URL.
fn frontend_redirect(frontend_url: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let separator = match frontend_url.contains('?') {
        true => '&',
        false => '?',
    };
    format!("{}{}{}", frontend_url, separator, query)
}

pub(super) async fn status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    let authenticated = state.credentials.is_authenticated(&user).await?;
    Ok(Json(json!({ "authenticated": authenticated })))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>> {
    state.credentials.remove(&user).await?;
    info!(user = %user, "Logged out");
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub(super) async fn list_spreadsheets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<SpreadsheetInfo>>> {
    let listings = state.sheets.list_spreadsheets(&user).await?;
    Ok(Json(listings.into_iter().map(|l| l.into_info()).collect()))
}

pub(super) async fn get_sheet_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((spreadsheet_id, sheet_name)): Path<(String, String)>,
) -> Result<Json<SheetData>> {
    let data = state
        .sheets
        .get_sheet_data(&user, &spreadsheet_id, &sheet_name)
        .await?;
    Ok(Json(data))
}
