use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use error_stack::Report;

use super::Error;
use crate::{crypto, database, types::Error as ErrorType};

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self.error_type {
      ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      ErrorType::Dependency => StatusCode::SERVICE_UNAVAILABLE,
      ErrorType::Conflict => StatusCode::CONFLICT,
      ErrorType::NotFound { .. } => StatusCode::NOT_FOUND,
      ErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
      ErrorType::Forbidden => StatusCode::FORBIDDEN,
      ErrorType::InvalidFormBody(..) => StatusCode::BAD_REQUEST,
    }
  }

  fn error_response(&self) -> HttpResponse<BoxBody> {
    tracing::warn!(error = %self, "Error");
    HttpResponse::build(self.status_code()).json(&self.error_type)
  }
}

impl From<Report<database::Error>> for Error {
  fn from(value: Report<database::Error>) -> Self {
    match value.current_context() {
      database::Error::Duplicate => Error::from_report(ErrorType::Conflict, value),
      _ => Error::from_report(ErrorType::Dependency, value),
    }
  }
}

impl From<validator::ValidateError> for Error {
  fn from(value: validator::ValidateError) -> Self {
    #[derive(Debug, thiserror::Error)]
    #[error("Validation error occurred")]
    struct ValidateError;
    Error::from_context(ErrorType::InvalidFormBody(value), ValidateError)
  }
}

impl From<Report<crypto::HashPasswordError>> for Error {
  fn from(value: Report<crypto::HashPasswordError>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}

impl From<Report<crypto::VerifyPasswordError>> for Error {
  fn from(value: Report<crypto::VerifyPasswordError>) -> Self {
    Error::from_report(ErrorType::Internal, value)
  }
}
