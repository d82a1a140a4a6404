use std::num::IntErrorKind;

use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use uuid::Uuid;

use crate::entity::video;
use crate::error::AppError;
use crate::models::shared::Pagination;
use crate::utils::id::parse_optional_id;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest row offset the SQL drivers accept.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Page window for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: u64,
    pub limit: u64,
}

impl Pager {
    /// Build from raw `page`/`limit` query values.
    ///
    /// Missing or non-numeric values fall back to the defaults. Numeric values
    /// must be positive, and the resulting row offset must fit the database's
    /// signed 64-bit range.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Result<Self, AppError> {
        let pager = Self {
            page: parse_positive(page, DEFAULT_PAGE, "page")?,
            limit: parse_positive(limit, DEFAULT_LIMIT, "limit")?,
        };
        match (pager.page - 1).checked_mul(pager.limit) {
            Some(offset) if offset <= MAX_OFFSET => Ok(pager),
            _ => Err(AppError::Validation("page is out of range".into())),
        }
    }

    pub fn offset(&self) -> u64 {
        Ord::min((self.page - 1).saturating_mul(self.limit), MAX_OFFSET)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: self.total_pages(total),
        }
    }
}

fn parse_positive(raw: Option<&str>, default: u64, name: &str) -> Result<u64, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as u64),
        Ok(_) => Err(AppError::Validation(format!(
            "{name} must be a positive integer"
        ))),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(AppError::Validation(
                format!("{name} is out of range"),
            )),
            _ => Ok(default),
        },
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Predicate and ordering for the video discovery listing.
#[derive(Debug, Clone)]
pub struct VideoFilter {
    /// Lowercased title search term.
    pub title_contains: Option<String>,
    pub owner_id: Option<Uuid>,
    pub sort_column: video::Column,
    pub order: Order,
}

impl VideoFilter {
    pub fn from_params(
        query: Option<&str>,
        user_id: Option<&str>,
        sort_by: Option<&str>,
        sort_type: Option<&str>,
    ) -> Result<Self, AppError> {
        let title_contains = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let owner_id = parse_optional_id(user_id, "user")?;

        let sort_column = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("createdAt") => video::Column::CreatedAt,
            Some("updatedAt") => video::Column::UpdatedAt,
            Some("title") => video::Column::Title,
            Some("duration") => video::Column::Duration,
            Some(_) => {
                return Err(AppError::Validation(
                    "sortBy must be one of: createdAt, updatedAt, title, duration".into(),
                ));
            }
        };

        let order = if sort_type == Some("desc") {
            Order::Desc
        } else {
            Order::Asc
        };

        Ok(Self {
            title_contains,
            owner_id,
            sort_column,
            order,
        })
    }

    /// Restrict `select` to matching rows. Absent criteria add nothing.
    pub fn filter(&self, mut select: Select<video::Entity>) -> Select<video::Entity> {
        if let Some(ref term) = self.title_contains {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(video::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", escape_like(term))).escape('\\')),
            );
        }
        if let Some(owner_id) = self.owner_id {
            select = select.filter(video::Column::OwnerId.eq(owner_id));
        }
        select
    }

    /// Apply the requested ordering, with the id as a stable tiebreaker.
    pub fn order(&self, select: Select<video::Entity>) -> Select<video::Entity> {
        select
            .order_by(self.sort_column, self.order.clone())
            .order_by(video::Column::Id, self.order.clone())
    }
}
