//! Response envelope helpers.

use crate::pagination::PageRequest;
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// List envelope: one page of results plus the total under the same filters and page links.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// Absolute collection URL plus the query pairs (filters, ordering) every page link must repeat.
#[derive(Clone, Debug)]
pub struct PageLinks {
    pub base: String,
    pub query: Vec<(&'static str, String)>,
}

impl PageLinks {
    pub fn new(base: impl Into<String>) -> Self {
        PageLinks {
            base: base.into(),
            query: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: Option<impl ToString>) -> Self {
        if let Some(v) = value {
            self.query.push((key, v.to_string()));
        }
        self
    }

    pub fn link(&self, page: u32, size: u32) -> String {
        let mut qs = url::form_urlencoded::Serializer::new(String::new());
        qs.append_pair("page", &page.to_string());
        qs.append_pair("size", &size.to_string());
        for (k, v) in &self.query {
            qs.append_pair(k, v);
        }
        format!("{}?{}", self.base, qs.finish())
    }
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, request: PageRequest, count: u64, links: &PageLinks) -> Self {
        let next = request
            .has_next(count)
            .then(|| links.link(request.page + 1, request.size));
        let previous = request
            .previous_page(count)
            .map(|page| links.link(page, request.size));
        Page {
            results,
            page: request.page,
            size: request.size,
            count,
            next,
            previous,
        }
    }
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_repeat_filters() {
        let links = PageLinks::new("http://localhost:5000/products/")
            .with("max_price", Some("1500"))
            .with("search", None::<String>);
        let page = Page::new(vec![1, 2], PageRequest::new(1, 2).unwrap(), 5, &links);
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:5000/products/?page=2&size=2&max_price=1500")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:5000/products/?page=0&size=2&max_price=1500")
        );
    }

    #[test]
    fn last_page_has_no_next() {
        let links = PageLinks::new("http://x/orders/");
        let page: Page<u8> = Page::new(vec![], PageRequest::new(0, 20).unwrap(), 3, &links);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
        assert_eq!(page.count, 3);
    }

    #[test]
    fn previous_past_the_data_points_at_last_page() {
        let links = PageLinks::new("http://x/products/");
        let page: Page<u8> = Page::new(vec![], PageRequest::new(9, 2).unwrap(), 5, &links);
        assert!(page.next.is_none());
        assert_eq!(page.previous.as_deref(), Some("http://x/products/?page=2&size=2"));
    }
}
