// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - The boundary between callers and the domain services
// - Translates between DTOs and domain entities
// - Turns errors into status codes, nowhere else

pub mod controllers;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use controllers::{ApiResponse, ResponseBody};
pub use error_handling::{ErrorResponse, ErrorType};
pub use state::AppState;
