// src/application/controllers/mod.rs
//
// Controllers
//
// RULES:
// - Accept DTOs
// - Call services through a fresh unit of work
// - Return ApiResponse with DTOs
// - Never contain business logic

pub mod author_controller;
pub mod book_author_controller;
pub mod book_controller;
pub mod book_price_controller;
pub mod book_subject_controller;
pub mod status_controller;
pub mod subject_controller;

#[cfg(test)]
mod controller_tests;

use serde::Serialize;

use crate::config::Environment;
use crate::error::AppResult;

use super::error_handling::ErrorResponse;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;

/// Status code plus body, the shape every controller returns
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: ResponseBody<T>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseBody<T> {
    Data(T),
    Error(ErrorResponse),
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(STATUS_OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(STATUS_CREATED, data)
    }

    fn with_status(status: u16, data: T) -> Self {
        Self {
            status,
            body: ResponseBody::Data(data),
        }
    }

    pub fn error(error: ErrorResponse) -> Self {
        Self {
            status: error.status,
            body: ResponseBody::Error(error),
        }
    }

    pub(crate) fn from_result(result: AppResult<T>, status: u16, environment: Environment) -> Self {
        match result {
            Ok(data) => Self::with_status(status, data),
            Err(e) => Self::error(ErrorResponse::from_app_error(e, environment)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, ResponseBody::Data(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.body {
            ResponseBody::Data(data) => Some(data),
            ResponseBody::Error(_) => None,
        }
    }

    pub fn error_body(&self) -> Option<&ErrorResponse> {
        match &self.body {
            ResponseBody::Data(_) => None,
            ResponseBody::Error(e) => Some(e),
        }
    }
}

pub use author_controller::*;
pub use book_author_controller::*;
pub use book_controller::*;
pub use book_price_controller::*;
pub use book_subject_controller::*;
pub use status_controller::*;
pub use subject_controller::*;
