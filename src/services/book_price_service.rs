// src/services/book_price_service.rs
use std::sync::Arc;

use log::info;

use crate::domain::{
    validate_book_price, BookPrice, DomainError, EntityKind, Operation, PurchaseType,
};
use crate::error::AppResult;
use crate::repositories::{
    BaseRepository, BookPriceColumn, BookPriceInclude, Predicate, QueryOptions, QueryRepository,
    UnitOfWork,
};

/// Page size of the per-book price listing
pub const PRICE_PAGE_SIZE: u32 = 10;

pub struct BookPriceService {
    uow: Arc<UnitOfWork>,
}

impl BookPriceService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn add(&self, price: BookPrice) -> AppResult<BookPrice> {
        validate_book_price(&price, Operation::Insert)?;

        if price.id != 0 && self.uow.book_prices().get_by_id(&price.id).await?.is_some() {
            return Err(DomainError::already_exists(EntityKind::BookPrice, price.id).into());
        }
        if self.uow.books().get_by_id(&price.book_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Book, price.book_id).into());
        }

        let saved = self.uow.book_prices().add(price).await?;
        self.uow.save_changes().await?;

        info!(
            "event=price_created id={} book_id={} purchase_type={}",
            saved.id, saved.book_id, saved.purchase_type
        );
        Ok(saved)
    }

    pub async fn update(&self, price: BookPrice) -> AppResult<BookPrice> {
        validate_book_price(&price, Operation::Update)?;
        self.ensure_exists(price.id).await?;

        self.uow.book_prices().update(price.clone()).await?;
        self.uow.save_changes().await?;
        Ok(price)
    }

    pub async fn delete(&self, id: i64) -> AppResult<BookPrice> {
        let price = self.ensure_exists(id).await?;
        validate_book_price(&price, Operation::Delete)?;

        self.uow.book_prices().delete(price.clone()).await?;
        self.uow.save_changes().await?;
        Ok(price)
    }

    pub async fn get_all(&self) -> AppResult<Vec<BookPrice>> {
        self.uow.book_prices().get_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<BookPrice>> {
        self.uow.book_prices().get_by_id(&id).await
    }

    pub async fn get_by_condition(
        &self,
        options: QueryOptions<BookPrice>,
    ) -> AppResult<Vec<BookPrice>> {
        self.uow.book_prices().get_by_condition(options).await
    }

    /// Prices of one book for one purchase type, 10 per page, with the book loaded
    pub async fn list_by_book_and_type(
        &self,
        book_id: i64,
        purchase_type: PurchaseType,
        page_number: u32,
    ) -> AppResult<Vec<BookPrice>> {
        let options = QueryOptions::new()
            .filter(
                Predicate::eq(BookPriceColumn::BookId, book_id)
                    .and(Predicate::eq(BookPriceColumn::PurchaseType, purchase_type)),
            )
            .order_by(BookPriceColumn::Id)
            .include(BookPriceInclude::Book)
            .page(PRICE_PAGE_SIZE, page_number);

        self.get_by_condition(options).await
    }

    /// Every price of one book, with the book loaded
    pub async fn list_by_book(&self, book_id: i64) -> AppResult<Vec<BookPrice>> {
        if self.uow.books().get_by_id(&book_id).await?.is_none() {
            return Err(DomainError::not_found(EntityKind::Book, book_id).into());
        }

        self.get_by_condition(
            QueryOptions::new()
                .filter(Predicate::eq(BookPriceColumn::BookId, book_id))
                .order_by(BookPriceColumn::PurchaseType)
                .include(BookPriceInclude::Book),
        )
        .await
    }

    /// Loads the stored price and detaches it
    async fn ensure_exists(&self, id: i64) -> AppResult<BookPrice> {
        let price = self
            .uow
            .book_prices()
            .get_by_id(&id)
            .await?
            .ok_or_else(|| DomainError::not_found(EntityKind::BookPrice, id))?;
        self.uow.detach::<BookPrice>(&id).await;
        Ok(price)
    }
}
