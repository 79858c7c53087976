//! Product rules on top of a repository: validation before storage, merge on update, list envelope.

use crate::error::AppError;
use crate::models::{Product, ProductCreateRequest, ProductUpdateRequest};
use crate::pagination::PageRequest;
use crate::query::{parse_ordering, OrderBy, Predicate};
use crate::repository::Repository;
use crate::response::{Page, PageLinks};
use crate::table::product::{CREATED_AT, ID, NAME, PRICE, STOCK};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Filters and ordering accepted by the product listing, besides `page`/`size`.
#[derive(Clone, Debug, Default)]
pub struct ProductListQuery {
    pub page: PageRequest,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub max_stock: Option<i32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

fn parse_param<T: FromStr>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, AppError> {
    params
        .get(key)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| AppError::Validation(format!("invalid value for {}: '{}'", key, v)))
        })
        .transpose()
}

impl ProductListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, AppError> {
        Ok(ProductListQuery {
            page: PageRequest::from_params(params)?,
            min_price: parse_param(params, "min_price")?,
            max_price: parse_param(params, "max_price")?,
            min_stock: parse_param(params, "min_stock")?,
            max_stock: parse_param(params, "max_stock")?,
            search: params.get("search").filter(|s| !s.trim().is_empty()).cloned(),
            ordering: params.get("ordering").cloned(),
        })
    }

    pub fn filters(&self) -> Vec<Predicate> {
        let mut filters = Vec::new();
        if let Some(p) = self.min_price {
            filters.push(PRICE.ge(p.to_string()));
        }
        if let Some(p) = self.max_price {
            filters.push(PRICE.le(p.to_string()));
        }
        if let Some(s) = self.min_stock {
            filters.push(STOCK.ge(s));
        }
        if let Some(s) = self.max_stock {
            filters.push(STOCK.le(s));
        }
        if let Some(q) = &self.search {
            filters.push(NAME.contains(q.trim()));
        }
        filters
    }

    /// Requested ordering, always ending with `id` so pages are stable.
    pub fn ordering(&self) -> Result<Vec<OrderBy>, AppError> {
        let mut ordering = match &self.ordering {
            Some(spec) => parse_ordering(spec, &[ID, NAME, PRICE, STOCK, CREATED_AT])?,
            None => Vec::new(),
        };
        if !ordering.iter().any(|o| o.column.name == ID.name) {
            ordering.push(ID.asc());
        }
        Ok(ordering)
    }

    /// Link template carrying the active filters.
    pub fn links(&self, base: impl Into<String>) -> PageLinks {
        PageLinks::new(base)
            .with("min_price", self.min_price)
            .with("max_price", self.max_price)
            .with("min_stock", self.min_stock)
            .with("max_stock", self.max_stock)
            .with("search", self.search.as_deref())
            .with("ordering", self.ordering.as_deref())
    }
}

pub struct ProductService {
    repository: Box<dyn Repository>,
}

impl ProductService {
    pub fn new(repository: Box<dyn Repository>) -> Self {
        ProductService { repository }
    }

    pub async fn create(&mut self, request: ProductCreateRequest) -> Result<Product, AppError> {
        request.validate()?;
        let row = self.repository.insert(&request.to_record()).await?;
        self.repository.commit().await?;
        let product = Product::try_from(row)?;
        tracing::info!(id = product.id, name = %product.name, "product created");
        Ok(product)
    }

    pub async fn paginate(&mut self, query: &ProductListQuery, base_url: &str) -> Result<Page<Product>, AppError> {
        let filters = query.filters();
        let ordering = query.ordering()?;
        let select = self.repository.table().select();
        let rows = self
            .repository
            .paginate(&select, &filters, &ordering, query.page.offset(), query.page.limit())
            .await?;
        let count = self.repository.get_count(&select, &filters).await?;
        let results = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(results, query.page, count, &query.links(base_url)))
    }

    pub async fn get_detail(&mut self, id: i64) -> Result<Product, AppError> {
        let row = self
            .repository
            .get_one(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;
        Product::try_from(row)
    }

    /// Merge: only fields present in `request` change.
    pub async fn update(&mut self, id: i64, request: ProductUpdateRequest) -> Result<Product, AppError> {
        request.validate()?;
        let changes = request.to_record();
        let row = self
            .repository
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;
        self.repository.commit().await?;
        let product = Product::try_from(row)?;
        tracing::info!(id, fields = changes.len(), "product updated");
        Ok(product)
    }

    /// Idempotent.
    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        self.repository.delete(id).await?;
        self.repository.commit().await?;
        tracing::info!(id, "product deleted");
        Ok(())
    }
}
