//! Uniform response envelope and domain-error → HTTP mapping.
//!
//! Every success body is `{statusCode, data, message, success}`; every
//! failure mirrors it with `success: false` and an `errors` list. The
//! mapping from [`ErrorCode`] to a transport status happens here and
//! nowhere else.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::domain::ids::InvalidId;
use crate::domain::{Error, ErrorCode};

/// Success payload wrapper.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

/// 200 envelope.
pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        status_code: 200,
        data,
        message: message.into(),
        success: true,
    })
}

/// 201 envelope.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Created().json(Envelope {
        status_code: 201,
        data,
        message: message.into(),
        success: true,
    })
}

/// Transport wrapper around a domain error.
#[derive(Debug, Clone)]
pub struct ApiError(Error);

impl ApiError {
    /// The wrapped domain error.
    pub fn inner(&self) -> &Error {
        &self.0
    }

    fn to_status(&self) -> StatusCode {
        match self.0.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<InvalidId> for ApiError {
    fn from(error: InvalidId) -> Self {
        Self(Error::from(error))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.to_status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.to_status();
        // Internal details stay in the logs, not in the response.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(message = %self.0, "internal error surfaced to a request");
            "internal server error".to_owned()
        } else {
            self.0.message().to_owned()
        };
        let errors: Vec<Value> = self.0.details().cloned().into_iter().collect();

        HttpResponse::build(status).json(json!({
            "statusCode": status.as_u16(),
            "data": Value::Null,
            "message": message,
            "success": false,
            "errors": errors,
        }))
    }
}

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("nope"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("not yours"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("taken"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn every_code_maps_to_its_status(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(error).status_code(), expected);
    }

    #[test]
    fn error_body_carries_the_envelope_shape() {
        let response = ApiError::from(Error::not_found("video not found")).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_messages_are_redacted() {
        let api_error = ApiError::from(Error::internal("secret db details"));
        let response = api_error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
