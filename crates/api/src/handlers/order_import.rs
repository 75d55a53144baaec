//! Spreadsheet import endpoint.
//!
//! Accepts a multipart upload with a single `file` field and returns the
//! batch summary directly (no `data` envelope). Structural failures come
//! back as `400 { success: false, message, foundHeaders? }`.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shopfloor_core::importer::{ImportBatchResult, ImportError};
use shopfloor_pipeline::import_workbook;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Multipart field carrying the workbook.
pub const UPLOAD_FIELD: &str = "file";

/// Body returned when a batch is rejected as a whole.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_headers: Option<Vec<String>>,
}

/// Why an import request produced no batch result.
#[derive(Debug)]
pub enum ImportRejection {
    NoFile,
    Upload(MultipartError),
    Structural(ImportError),
}

impl IntoResponse for ImportRejection {
    fn into_response(self) -> Response {
        let (status, message, found_headers) = match self {
            Self::NoFile => (StatusCode::BAD_REQUEST, "No file uploaded".to_string(), None),
            Self::Upload(err) => (err.status(), err.body_text(), None),
            Self::Structural(err) => {
                let found = err.found_headers().map(<[String]>::to_vec);
                (StatusCode::BAD_REQUEST, err.to_string(), found)
            }
        };

        let body = ImportFailure {
            success: false,
            message,
            found_headers,
        };
        (status, Json(body)).into_response()
    }
}

/// POST /api/v1/orders/import
///
/// Imports the third sheet of the uploaded workbook. Row-level failures are
/// reported inside the summary with a 200; only structural problems fail
/// the request.
pub async fn import_orders(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ImportBatchResult>, ImportRejection> {
    let mut payload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ImportRejection::Upload)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(ImportRejection::Upload)?;
        tracing::info!(
            filename = %filename,
            size = bytes.len(),
            actor_id = user.user_id,
            actor_role = %user.role,
            "Order import upload received"
        );
        payload = Some(bytes);
        break;
    }

    let bytes = match payload {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(ImportRejection::NoFile),
    };

    let result = import_workbook(&state.orders, bytes.to_vec(), user.user_id)
        .await
        .map_err(|err| {
            tracing::info!(error = %err, actor_id = user.user_id, "Order import rejected");
            ImportRejection::Structural(err)
        })?;

    Ok(Json(result))
}
