//! Order rules: create, list and fetch.

use crate::error::AppError;
use crate::models::{Order, OrderCreateRequest};
use crate::pagination::PageRequest;
use crate::query::{parse_ordering, OrderBy, Predicate};
use crate::repository::Repository;
use crate::response::{Page, PageLinks};
use crate::table::order::{CREATED_AT, CUSTOMER_NAME, ID};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct OrderListQuery {
    pub page: PageRequest,
    pub customer_name: Option<String>,
    pub ordering: Option<String>,
}

impl OrderListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, AppError> {
        Ok(OrderListQuery {
            page: PageRequest::from_params(params)?,
            customer_name: params
                .get("customer_name")
                .filter(|s| !s.trim().is_empty())
                .cloned(),
            ordering: params.get("ordering").cloned(),
        })
    }

    pub fn filters(&self) -> Vec<Predicate> {
        self.customer_name
            .iter()
            .map(|name| CUSTOMER_NAME.contains(name.trim()))
            .collect()
    }

    pub fn ordering(&self) -> Result<Vec<OrderBy>, AppError> {
        let mut ordering = match &self.ordering {
            Some(spec) => parse_ordering(spec, &[ID, CUSTOMER_NAME, CREATED_AT])?,
            None => Vec::new(),
        };
        if !ordering.iter().any(|o| o.column.name == ID.name) {
            ordering.push(ID.asc());
        }
        Ok(ordering)
    }

    pub fn links(&self, base: impl Into<String>) -> PageLinks {
        PageLinks::new(base)
            .with("customer_name", self.customer_name.as_deref())
            .with("ordering", self.ordering.as_deref())
    }
}

pub struct OrderService {
    repository: Box<dyn Repository>,
}

impl OrderService {
    pub fn new(repository: Box<dyn Repository>) -> Self {
        OrderService { repository }
    }

    pub async fn create(&mut self, request: OrderCreateRequest) -> Result<Order, AppError> {
        request.validate()?;
        let row = self.repository.insert(&request.to_record()).await?;
        self.repository.commit().await?;
        let order = Order::try_from(row)?;
        tracing::info!(id = order.id, "order created");
        Ok(order)
    }

    pub async fn paginate(&mut self, query: &OrderListQuery, base_url: &str) -> Result<Page<Order>, AppError> {
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
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(results, query.page, count, &query.links(base_url)))
    }

    pub async fn get_detail(&mut self, id: i64) -> Result<Order, AppError> {
        let row = self
            .repository
            .get_one(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", id)))?;
        Order::try_from(row)
    }
}
