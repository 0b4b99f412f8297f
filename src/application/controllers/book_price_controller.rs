// src/application/controllers/book_price_controller.rs
//
// Book price endpoints, including the per-book listing

use super::{ApiResponse, STATUS_CREATED, STATUS_OK};
use crate::application::dto::{BookPriceDto, CreateBookPriceDto, UpdateBookPriceDto};
use crate::application::state::AppState;
use crate::domain::{DomainError, EntityKind, PurchaseType};
use crate::error::AppResult;

pub async fn list_book_prices(state: &AppState) -> ApiResponse<Vec<BookPriceDto>> {
    ApiResponse::from_result(list(state).await, STATUS_OK, state.environment)
}

pub async fn get_book_price(state: &AppState, id: i64) -> ApiResponse<BookPriceDto> {
    ApiResponse::from_result(get(state, id).await, STATUS_OK, state.environment)
}

/// Prices of one book for one purchase type, 10 per page (1-based)
pub async fn list_prices_by_book_and_type(
    state: &AppState,
    book_id: i64,
    purchase_type: PurchaseType,
    page_number: u32,
) -> ApiResponse<Vec<BookPriceDto>> {
    ApiResponse::from_result(
        by_book_and_type(state, book_id, purchase_type, page_number).await,
        STATUS_OK,
        state.environment,
    )
}

/// Every price of one book
pub async fn list_prices_by_book(state: &AppState, book_id: i64) -> ApiResponse<Vec<BookPriceDto>> {
    ApiResponse::from_result(by_book(state, book_id).await, STATUS_OK, state.environment)
}

pub async fn create_book_price(
    state: &AppState,
    dto: CreateBookPriceDto,
) -> ApiResponse<BookPriceDto> {
    ApiResponse::from_result(create(state, dto).await, STATUS_CREATED, state.environment)
}

pub async fn update_book_price(
    state: &AppState,
    dto: UpdateBookPriceDto,
) -> ApiResponse<BookPriceDto> {
    ApiResponse::from_result(update(state, dto).await, STATUS_OK, state.environment)
}

pub async fn delete_book_price(state: &AppState, id: i64) -> ApiResponse<BookPriceDto> {
    ApiResponse::from_result(delete(state, id).await, STATUS_OK, state.environment)
}

fn to_dtos(prices: Vec<crate::domain::BookPrice>) -> Vec<BookPriceDto> {
    prices.into_iter().map(BookPriceDto::from).collect()
}

async fn list(state: &AppState) -> AppResult<Vec<BookPriceDto>> {
    Ok(to_dtos(state.book_prices().await?.get_all().await?))
}

async fn get(state: &AppState, id: i64) -> AppResult<BookPriceDto> {
    state
        .book_prices()
        .await?
        .get_by_id(id)
        .await?
        .map(BookPriceDto::from)
        .ok_or_else(|| DomainError::not_found(EntityKind::BookPrice, id).into())
}

async fn by_book_and_type(
    state: &AppState,
    book_id: i64,
    purchase_type: PurchaseType,
    page_number: u32,
) -> AppResult<Vec<BookPriceDto>> {
    let prices = state
        .book_prices()
        .await?
        .list_by_book_and_type(book_id, purchase_type, page_number)
        .await?;
    Ok(to_dtos(prices))
}

async fn by_book(state: &AppState, book_id: i64) -> AppResult<Vec<BookPriceDto>> {
    Ok(to_dtos(state.book_prices().await?.list_by_book(book_id).await?))
}

async fn create(state: &AppState, dto: CreateBookPriceDto) -> AppResult<BookPriceDto> {
    let saved = state.book_prices().await?.add(dto.into()).await?;
    Ok(saved.into())
}

async fn update(state: &AppState, dto: UpdateBookPriceDto) -> AppResult<BookPriceDto> {
    let saved = state.book_prices().await?.update(dto.into()).await?;
    Ok(saved.into())
}

async fn delete(state: &AppState, id: i64) -> AppResult<BookPriceDto> {
    let deleted = state.book_prices().await?.delete(id).await?;
    Ok(deleted.into())
}
