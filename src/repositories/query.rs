// src/repositories/query.rs
//
// Conditional queries: typed predicates, ordering, paging, eager loading.
//
// Predicates name columns through per-entity enums, so only real columns
// reach the SQL text; every value travels as a bound parameter.

use std::fmt::Debug;

use rusqlite::types::Value;

use super::entity::Entity;
use crate::db::{sql, Session};
use crate::error::{AppError, AppResult};

/// A filterable, sortable column of one entity
pub trait Column: Copy + Debug + Send + Sync + 'static {
    fn name(self) -> &'static str;
}

/// An entity the conditional query repository can serve
pub trait Queryable: Entity {
    type Column: Column;
    /// Navigations that can be eager-loaded
    type Include: Copy + Debug + Send + Sync + 'static;

    /// Fill navigation `include` on every row
    fn load_include(session: &mut Session, rows: &mut [Self], include: Self::Include)
        -> AppResult<()>;
}

/// Entity without navigations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoInclude {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
}

impl CompareOp {
    fn sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Like => "LIKE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C> {
    Compare {
        column: C,
        op: CompareOp,
        value: Value,
    },
    And(Box<Predicate<C>>, Box<Predicate<C>>),
    Or(Box<Predicate<C>>, Box<Predicate<C>>),
    Not(Box<Predicate<C>>),
}

impl<C: Column> Predicate<C> {
    pub fn compare(column: C, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    pub fn ne(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    pub fn gt(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    pub fn ge(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ge, value)
    }

    pub fn lt(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    pub fn le(column: C, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Le, value)
    }

    /// SQL LIKE pattern (`%` and `_` wildcards)
    pub fn like(column: C, pattern: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Like, Value::Text(pattern.into()))
    }

    pub fn and(self, other: Self) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    fn render(&self, out: &mut String, params: &mut Vec<Value>) {
        match self {
            Predicate::Compare { column, op, value } => {
                out.push_str(column.name());
                out.push(' ');
                out.push_str(op.sql());
                out.push_str(" ?");
                params.push(value.clone());
            }
            Predicate::And(left, right) => Self::render_pair(left, "AND", right, out, params),
            Predicate::Or(left, right) => Self::render_pair(left, "OR", right, out, params),
            Predicate::Not(inner) => {
                out.push_str("NOT (");
                inner.render(out, params);
                out.push(')');
            }
        }
    }

    fn render_pair(left: &Self, op: &str, right: &Self, out: &mut String, params: &mut Vec<Value>) {
        out.push('(');
        left.render(out, params);
        out.push_str(") ");
        out.push_str(op);
        out.push_str(" (");
        right.render(out, params);
        out.push(')');
    }
}

impl<C: Column> std::ops::Not for Predicate<C> {
    type Output = Self;

    fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }
}

// ============================================================================
// QUERY OPTIONS
// ============================================================================

/// Filter, ordering, paging and eager loading for one query.
///
/// Paging applies only when both page size and page number are set;
/// page numbers start at 1.
pub struct QueryOptions<E: Queryable> {
    page_size: Option<u32>,
    page_number: Option<u32>,
    filter: Option<Predicate<E::Column>>,
    order_by: Vec<E::Column>,
    ascending: bool,
    includes: Vec<E::Include>,
}

impl<E: Queryable> Default for QueryOptions<E> {
    fn default() -> Self {
        Self {
            page_size: None,
            page_number: None,
            filter: None,
            order_by: Vec::new(),
            ascending: true,
            includes: Vec::new(),
        }
    }
}

impl<E: Queryable> Clone for QueryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            page_size: self.page_size,
            page_number: self.page_number,
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
            ascending: self.ascending,
            includes: self.includes.clone(),
        }
    }
}

impl<E: Queryable> std::fmt::Debug for QueryOptions<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOptions")
            .field("table", &E::TABLE)
            .field("page_size", &self.page_size)
            .field("page_number", &self.page_number)
            .field("filter", &self.filter)
            .field("order_by", &self.order_by)
            .field("ascending", &self.ascending)
            .field("includes", &self.includes)
            .finish()
    }
}

impl<E: Queryable> QueryOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page_size: u32, page_number: u32) -> Self {
        self.page_size = Some(page_size);
        self.page_number = Some(page_number);
        self
    }

    pub fn filter(mut self, predicate: Predicate<E::Column>) -> Self {
        self.filter = Some(predicate);
        self
    }

    /// Add a sort column; earlier columns take precedence
    pub fn order_by(mut self, column: E::Column) -> Self {
        self.order_by.push(column);
        self
    }

    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }

    pub fn include(mut self, include: E::Include) -> Self {
        self.includes.push(include);
        self
    }

    pub fn includes(&self) -> &[E::Include] {
        &self.includes
    }

    /// SELECT text and its parameters
    pub(crate) fn to_sql(&self) -> AppResult<(String, Vec<Value>)> {
        if self.page_size == Some(0) {
            return Err(AppError::InvalidQuery("page size must be at least 1".to_string()));
        }
        if self.page_number == Some(0) {
            return Err(AppError::InvalidQuery("page number must be at least 1".to_string()));
        }

        let mut text = sql::select_all::<E>();
        let mut params = Vec::new();

        if let Some(filter) = &self.filter {
            text.push_str(" WHERE ");
            filter.render(&mut text, &mut params);
        }

        let paging = self.page_size.zip(self.page_number);
        let direction = if self.ascending { "ASC" } else { "DESC" };

        let order: Vec<&str> = if !self.order_by.is_empty() {
            self.order_by.iter().map(|c| c.name()).collect()
        } else if paging.is_some() {
            // stable pages need a total order
            E::KEY_COLUMNS.to_vec()
        } else {
            Vec::new()
        };

        if !order.is_empty() {
            let direction = if self.order_by.is_empty() { "ASC" } else { direction };
            text.push_str(" ORDER BY ");
            text.push_str(
                &order
                    .iter()
                    .map(|c| format!("{} {}", c, direction))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }

        if let Some((size, number)) = paging {
            text.push_str(" LIMIT ? OFFSET ?");
            params.push(Value::Integer(i64::from(size)));
            params.push(Value::Integer(i64::from(number - 1) * i64::from(size)));
        }

        Ok((text, params))
    }
}
