//! Wire types for the HTTP boundary and the error-to-status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use copilot_core::CopilotError;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub context: ChatContext,
}

/// Client-supplied situational context; the server re-derives everything else
/// from the path and the authenticated caller.
#[derive(Debug, Deserialize)]
pub struct ChatContext {
    pub current_path: String,
}

#[derive(Debug, serde::Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<copilot_core::ConversationSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteBody {
    pub action_id: String,
    pub conversation_id: String,
    pub confirmed: bool,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "unauthorized".to_string(),
        }
    }
}

impl From<CopilotError> for ApiError {
    fn from(error: CopilotError) -> Self {
        let status = match &error {
            CopilotError::Unauthorized => StatusCode::UNAUTHORIZED,
            CopilotError::InvalidRequest(_)
            | CopilotError::MissingArgument { .. }
            | CopilotError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            CopilotError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            CopilotError::ConversationNotFound(_) | CopilotError::ToolNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            CopilotError::StaleAction(_) => StatusCode::CONFLICT,
            CopilotError::IllegalTransition { .. }
            | CopilotError::Llm(_)
            | CopilotError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
