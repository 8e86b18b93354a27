//! JSON extractors that answer rejections in the API error format

use axum::{
    Json as AxumJson,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use super::error::{ApiErrorDetail, ApiErrorResponse, ApiErrorType};

pub const INVALID_CONTENT_TYPE: &str = "invalid content type";

/// JSON body extractor requiring an `application/json` content type
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// JSON body extractor that ignores the content type
///
/// Browser clients post some bodies as `text/plain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientJson<T>(pub T);

/// Body rejection; `413` when the body exceeds the route limit, `400` otherwise
#[derive(Debug)]
pub struct JsonRejection {
    status: StatusCode,
    message: String,
}

impl JsonRejection {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unreadable_body(status: StatusCode, body_text: String) -> Self {
        let status = if status == StatusCode::PAYLOAD_TOO_LARGE {
            status
        } else {
            StatusCode::BAD_REQUEST
        };

        Self {
            status,
            message: format!("failed to read body: {}", body_text),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> &'static str {
        if self.status == StatusCode::PAYLOAD_TOO_LARGE {
            "body_too_large"
        } else {
            "json_parse_error"
        }
    }
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        let code = self.code();
        let response = ApiErrorResponse {
            error: ApiErrorDetail {
                message: self.message,
                error_type: ApiErrorType::InvalidRequestError,
                param: None,
                code: Some(code.to_string()),
            },
        };

        (self.status, AxumJson(response)).into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(axum::extract::rejection::JsonRejection::BytesRejection(err)) => Err(
                JsonRejection::unreadable_body(err.status(), err.body_text()),
            ),
            Err(rejection) => Err(JsonRejection::bad_request(format_rejection_message(
                &rejection,
            ))),
        }
    }
}

impl<S, T> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| JsonRejection::unreadable_body(e.status(), e.body_text()))?;

        serde_json::from_slice(&body)
            .map(LenientJson)
            .map_err(|e| JsonRejection::bad_request(format!("failed to unmarshal body: {}", e)))
    }
}

fn format_rejection_message(rejection: &axum::extract::rejection::JsonRejection) -> String {
    use axum::extract::rejection::JsonRejection::*;

    match rejection {
        MissingJsonContentType(_) => INVALID_CONTENT_TYPE.to_string(),
        JsonDataError(err) => format!("failed to unmarshal body: {}", err.body_text()),
        JsonSyntaxError(err) => format!("failed to unmarshal body: {}", err.body_text()),
        _ => "failed to unmarshal body".to_string(),
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
