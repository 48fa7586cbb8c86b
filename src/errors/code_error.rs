use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_derive::Serialize;
use std::error::Error;
use std::fmt;
use tracing::Level;

pub type HandlerResponse<T> = Result<T, CodeErrorResp>;

pub struct CodeError {
    pub success: bool,
    pub error_code: u16,
    pub http_status_code: StatusCode,
    pub message: &'static str,
    pub log_level: Level,
}

impl CodeError {
    pub const GATEWAY_READ_ERROR: CodeError = CodeError {
        success: false,
        error_code: 1,
        http_status_code: StatusCode::BAD_GATEWAY,
        message: "Could not read from the gallery backend!",
        log_level: Level::ERROR,
    };
    pub const GATEWAY_WRITE_ERROR: CodeError = CodeError {
        success: false,
        error_code: 2,
        http_status_code: StatusCode::BAD_GATEWAY,
        message: "Could not write to the gallery backend!",
        log_level: Level::ERROR,
    };
    pub const UNAUTHORIZED_ACCESS: CodeError = CodeError {
        success: false,
        error_code: 3,
        http_status_code: StatusCode::UNAUTHORIZED,
        message: "Unauthorized access!",
        log_level: Level::INFO,
    };
    pub const NOT_AUTHORIZED: CodeError = CodeError {
        success: false,
        error_code: 4,
        http_status_code: StatusCode::FORBIDDEN,
        message: "Only administrators may modify the gallery!",
        log_level: Level::WARN,
    };
    pub const AUTHORIZATION_LOOKUP_ERROR: CodeError = CodeError {
        success: false,
        error_code: 5,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not determine user role!",
        log_level: Level::ERROR,
    };
    pub const IMAGE_NOT_FOUND: CodeError = CodeError {
        success: false,
        error_code: 6,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Image not found!",
        log_level: Level::INFO,
    };
    pub const INVALID_REORDER: CodeError = CodeError {
        success: false,
        error_code: 7,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Reorder indices are out of range!",
        log_level: Level::INFO,
    };
    pub const REORDER_WRITE_BACK_ERROR: CodeError = CodeError {
        success: false,
        error_code: 8,
        http_status_code: StatusCode::CONFLICT,
        message: "Reorder could not be saved; gallery was reloaded!",
        log_level: Level::WARN,
    };
    pub const IMAGE_DELETION_ERROR: CodeError = CodeError {
        success: false,
        error_code: 9,
        http_status_code: StatusCode::BAD_GATEWAY,
        message: "Some images could not be deleted!",
        log_level: Level::ERROR,
    };
    pub const FILE_UPLOAD_ERROR: CodeError = CodeError {
        success: false,
        error_code: 10,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "File upload failed!",
        log_level: Level::WARN,
    };
    pub const VIEW_NOT_FOUND: CodeError = CodeError {
        success: false,
        error_code: 11,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Gallery view not found or expired!",
        log_level: Level::INFO,
    };
    pub const INVALID_CURSOR: CodeError = CodeError {
        success: false,
        error_code: 12,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Invalid pagination cursor!",
        log_level: Level::INFO,
    };
    pub const USER_NOT_FOUND: CodeError = CodeError {
        success: false,
        error_code: 13,
        http_status_code: StatusCode::NOT_FOUND,
        message: "User not found!",
        log_level: Level::INFO,
    };
    pub const WRONG_PW: CodeError = CodeError {
        success: false,
        error_code: 14,
        http_status_code: StatusCode::UNAUTHORIZED,
        message: "Wrong password!",
        log_level: Level::INFO,
    };
    pub const COULD_NOT_VERIFY_PW: CodeError = CodeError {
        success: false,
        error_code: 15,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not verify password!",
        log_level: Level::ERROR,
    };
    pub const SESSION_ID_ALREADY_EXISTS: CodeError = CodeError {
        success: false,
        error_code: 16,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Session ID already exists!",
        log_level: Level::ERROR,
    };
    pub const INVALID_REQUEST: CodeError = CodeError {
        success: false,
        error_code: 17,
        http_status_code: StatusCode::BAD_REQUEST,
        message: "Invalid request!",
        log_level: Level::INFO,
    };
    pub const ROUTE_NOT_FOUND: CodeError = CodeError {
        success: false,
        error_code: 18,
        http_status_code: StatusCode::NOT_FOUND,
        message: "Invalid path!",
        log_level: Level::DEBUG,
    };
    pub const TOO_MANY_VIEWS: CodeError = CodeError {
        success: false,
        error_code: 19,
        http_status_code: StatusCode::TOO_MANY_REQUESTS,
        message: "Too many gallery views are open!",
        log_level: Level::WARN,
    };
}

pub fn code_err(cerr: CodeError, e: impl ToString) -> CodeErrorResp {
    CodeErrorResp {
        success: cerr.success,
        error_code: cerr.error_code,
        http_status_code: cerr.http_status_code,
        message: cerr.message.to_string(),
        error_message: e.to_string(),
        log_level: cerr.log_level,
    }
}

impl From<CodeError> for CodeErrorResp {
    fn from(cerr: CodeError) -> Self {
        CodeErrorResp {
            success: cerr.success,
            error_code: cerr.error_code,
            http_status_code: cerr.http_status_code,
            message: cerr.message.to_string(),
            error_message: String::new(),
            log_level: cerr.log_level,
        }
    }
}

#[derive(Serialize, Debug, utoipa::ToSchema)]
pub struct CodeErrorResp {
    pub success: bool,
    pub error_code: u16,
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub http_status_code: StatusCode,
    pub message: String,
    pub error_message: String,
    #[serde(skip)]
    pub log_level: Level,
}

fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

impl fmt::Display for CodeErrorResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.error_message)
    }
}

impl Error for CodeErrorResp {}

// The logging middleware reads the x-error-* headers back out and strips them.
impl IntoResponse for CodeErrorResp {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string());
        let mut response = (
            self.http_status_code,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();

        let headers = response.headers_mut();
        let pairs = [
            ("x-error-log-level", self.log_level.to_string()),
            (
                "x-error-status-code",
                self.http_status_code.as_u16().to_string(),
            ),
            ("x-error-code", self.error_code.to_string()),
            ("x-error-message", self.message.clone()),
            ("x-error-detail", self.error_message.clone()),
        ];
        for (name, value) in pairs {
            if let Ok(value) = HeaderValue::from_str(&value) {
                headers.insert(name, value);
            }
        }

        response
    }
}
