//! API error type and its JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::drafts::DraftError;
use crate::validation::{FieldError, ValidationErrors};
use crate::wizard::WizardError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("缺少必要参数")]
    MissingParameter,

    #[error("请求参数格式错误: {0}")]
    BadRequest(String),

    #[error("表单验证失败")]
    Validation(ValidationErrors),

    #[error("数据存在需要确认的警告")]
    Warnings(Vec<String>),

    #[error("会话不存在")]
    SessionNotFound,

    #[error("草稿不存在")]
    DraftNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("草稿数量已达上限 ({0})")]
    DraftStoreFull(usize),

    #[error("服务器内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Warnings(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::SessionNotFound | ApiError::DraftNotFound => StatusCode::NOT_FOUND,
            ApiError::DraftStoreFull(_) => StatusCode::INSUFFICIENT_STORAGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<&'a [String]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            errors: match &self {
                ApiError::Validation(errors) => Some(errors.0.as_slice()),
                _ => None,
            },
            warnings: match &self {
                ApiError::Warnings(warnings) => Some(warnings.as_slice()),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<WizardError> for ApiError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Invalid(errors) => ApiError::Validation(errors),
            WizardError::UnacknowledgedWarnings(warnings) => ApiError::Warnings(warnings),
            other => ApiError::Conflict(other.to_string()),
        }
    }
}

impl From<DraftError> for ApiError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::InvalidKey(_) => ApiError::BadRequest(err.to_string()),
            DraftError::Full(max) => ApiError::DraftStoreFull(max),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
