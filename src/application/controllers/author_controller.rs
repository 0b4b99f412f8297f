// src/application/controllers/author_controller.rs

use super::{ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::application::dto::{AuthorDto, CreateAuthorDto, UpdateAuthorDto};
use crate::application::state::AppState;
use crate::domain::{DomainError, EntityKind};
use crate::error::AppResult;

pub async fn list_authors(state: &AppState) -> ApiResponse<Vec<AuthorDto>> {
    ApiResponse::from_result(list(state).await, STATUS_OK, state.environment)
}

pub async fn get_author(state: &AppState, id: i64) -> ApiResponse<AuthorDto> {
    ApiResponse::from_result(get(state, id).await, STATUS_OK, state.environment)
}

pub async fn create_author(state: &AppState, dto: CreateAuthorDto) -> ApiResponse<AuthorDto> {
    ApiResponse::from_result(create(state, dto).await, STATUS_CREATED, state.environment)
}

pub async fn update_author(state: &AppState, dto: UpdateAuthorDto) -> ApiResponse<AuthorDto> {
    ApiResponse::from_result(update(state, dto).await, STATUS_OK, state.environment)
}

pub async fn delete_author(state: &AppState, id: i64) -> ApiResponse<AuthorDto> {
    ApiResponse::from_result(delete(state, id).await, STATUS_OK, state.environment)
}

async fn list(state: &AppState) -> AppResult<Vec<AuthorDto>> {
    let authors = state.authors().await?.get_all().await?;
    Ok(authors.into_iter().map(AuthorDto::from).collect())
}

async fn get(state: &AppState, id: i64) -> AppResult<AuthorDto> {
    state
        .authors()
        .await?
        .get_by_id(id)
        .await?
        .map(AuthorDto::from)
        .ok_or_else(|| DomainError::not_found(EntityKind::Author, id).into())
}

async fn create(state: &AppState, dto: CreateAuthorDto) -> AppResult<AuthorDto> {
    let saved = state.authors().await?.add(dto.into()).await?;
    Ok(saved.into())
}

async fn update(state: &AppState, dto: UpdateAuthorDto) -> AppResult<AuthorDto> {
    let saved = state.authors().await?.update(dto.into()).await?;
    Ok(saved.into())
}

async fn delete(state: &AppState, id: i64) -> AppResult<AuthorDto> {
    let deleted = state.authors().await?.delete(id).await?;
    Ok(deleted.into())
}
