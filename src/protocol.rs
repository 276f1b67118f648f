use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            err: "".to_string(),
        }
    }
}

pub trait ErrResponse: Serialize {
    fn err<S: ToString>(err: S) -> Self;
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $crate::protocol::ErrResponse for $type {
                fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}

/// Failures that change the HTTP status instead of the `success` flag.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
}

pub fn error_response<R: ErrResponse>(err: anyhow::Error) -> HttpResponse {
    match err.downcast_ref::<AccessError>() {
        Some(AccessError::Unauthorized(_)) => {
            debug!(%err, "rejected unauthenticated request");
            HttpResponse::Unauthorized().json(R::err(err))
        }
        Some(AccessError::Forbidden(_)) => {
            warn!(%err, "rejected request for wrong role");
            HttpResponse::Forbidden().json(R::err(err))
        }
        None => {
            debug!(err = %format!("{:#}", err), "request failed");
            HttpResponse::Ok().json(R::err(err))
        }
    }
}

/// Request type for routes that take no parameters.
#[derive(Default, Deserialize)]
pub struct EmptyRequest {}
