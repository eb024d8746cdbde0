use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::ErrorHandlerResponse;
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use validator::ValidateError;

use crate::types;

/// Emits request spans at DEBUG so per-request noise stays out of
/// the default INFO output.
pub struct QuieterRootSpanBuilder;

impl RootSpanBuilder for QuieterRootSpanBuilder {
  fn on_request_start(request: &ServiceRequest) -> Span {
    tracing_actix_web::root_span!(level = tracing::Level::DEBUG, request)
  }

  fn on_request_end<B: MessageBody>(
    span: Span,
    outcome: &Result<ServiceResponse<B>, actix_web::Error>,
  ) {
    DefaultRootSpanBuilder::on_request_end(span, outcome);
  }
}

/// Rewrites error responses produced by the framework itself (route
/// misses, rejected payloads) into the same JSON shape the rest of
/// the API speaks. Responses that are already JSON pass through
/// untouched.
pub fn handle_actix_web_error<B>(
  res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
  let already_json = res
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|value| value.to_str().ok())
    .is_some_and(|value| value.starts_with("application/json"));
  if already_json {
    return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
  }

  let body = serde_json::to_string(&error_body(res.status())).unwrap_or_default();
  let (req, res) = res.into_parts();
  let mut res = res.set_body(body);
  res.headers_mut().insert(
    header::CONTENT_TYPE,
    header::HeaderValue::from_static("application/json"),
  );

  let res = ServiceResponse::new(req, res)
    .map_into_boxed_body()
    .map_into_right_body();
  Ok(ErrorHandlerResponse::Response(res))
}

fn error_body(status: StatusCode) -> types::Error {
  match status {
    StatusCode::NOT_FOUND => types::Error::not_found("Resource not found"),
    StatusCode::UNAUTHORIZED => types::Error::Unauthorized,
    StatusCode::FORBIDDEN => types::Error::Forbidden,
    StatusCode::CONFLICT => types::Error::Conflict,
    status if status.is_client_error() => {
      let mut error = ValidateError::msg_builder();
      error.insert("Malformed request");
      types::Error::InvalidFormBody(error.build())
    }
    _ => types::Error::Internal,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn framework_statuses_map_into_the_error_taxonomy() {
    assert!(matches!(
      error_body(StatusCode::NOT_FOUND),
      types::Error::NotFound { .. }
    ));
    assert!(matches!(
      error_body(StatusCode::BAD_REQUEST),
      types::Error::InvalidFormBody(..)
    ));
    assert!(matches!(
      error_body(StatusCode::METHOD_NOT_ALLOWED),
      types::Error::InvalidFormBody(..)
    ));
    assert!(matches!(
      error_body(StatusCode::INTERNAL_SERVER_ERROR),
      types::Error::Internal
    ));
  }
}
