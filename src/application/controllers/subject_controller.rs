// src/application/controllers/subject_controller.rs

use super::{ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::application::dto::{CreateSubjectDto, SubjectDto, UpdateSubjectDto};
use crate::application::state::AppState;
use crate::domain::{DomainError, EntityKind};
use crate::error::AppResult;

pub async fn list_subjects(state: &AppState) -> ApiResponse<Vec<SubjectDto>> {
    ApiResponse::from_result(list(state).await, STATUS_OK, state.environment)
}

pub async fn get_subject(state: &AppState, id: i64) -> ApiResponse<SubjectDto> {
    ApiResponse::from_result(get(state, id).await, STATUS_OK, state.environment)
}

pub async fn create_subject(state: &AppState, dto: CreateSubjectDto) -> ApiResponse<SubjectDto> {
    ApiResponse::from_result(create(state, dto).await, STATUS_CREATED, state.environment)
}

pub async fn update_subject(state: &AppState, dto: UpdateSubjectDto) -> ApiResponse<SubjectDto> {
    ApiResponse::from_result(update(state, dto).await, STATUS_OK, state.environment)
}

pub async fn delete_subject(state: &AppState, id: i64) -> ApiResponse<SubjectDto> {
    ApiResponse::from_result(delete(state, id).await, STATUS_OK, state.environment)
}

async fn list(state: &AppState) -> AppResult<Vec<SubjectDto>> {
    let subjects = state.subjects().await?.get_all().await?;
    Ok(subjects.into_iter().map(SubjectDto::from).collect())
}

async fn get(state: &AppState, id: i64) -> AppResult<SubjectDto> {
    state
        .subjects()
        .await?
        .get_by_id(id)
        .await?
        .map(SubjectDto::from)
        .ok_or_else(|| DomainError::not_found(EntityKind::Subject, id).into())
}

async fn create(state: &AppState, dto: CreateSubjectDto) -> AppResult<SubjectDto> {
    let saved = state.subjects().await?.add(dto.into()).await?;
    Ok(saved.into())
}

async fn update(state: &AppState, dto: UpdateSubjectDto) -> AppResult<SubjectDto> {
    let saved = state.subjects().await?.update(dto.into()).await?;
    Ok(saved.into())
}

async fn delete(state: &AppState, id: i64) -> AppResult<SubjectDto> {
    let deleted = state.subjects().await?.delete(id).await?;
    Ok(deleted.into())
}
