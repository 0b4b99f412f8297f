// src/application/controllers/status_controller.rs
//
// Operator health snapshot

use super::{ApiResponse, STATUS_OK};
use crate::application::dto::StatusDto;
use crate::application::state::AppState;
use crate::error::AppResult;

pub async fn get_status(state: &AppState) -> ApiResponse<StatusDto> {
    ApiResponse::from_result(status(state).await, STATUS_OK, state.environment)
}

async fn status(state: &AppState) -> AppResult<StatusDto> {
    let database = state.unit_of_work().await?.database_stats().await?;

    Ok(StatusDto {
        circuit_state: state.executor.circuit_state(),
        consecutive_failures: state.executor.consecutive_failures(),
        database,
    })
}
