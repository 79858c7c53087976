//! Page descriptor: `page` (from 0) and `size` (1..=200), validated at the request boundary.

use crate::error::AppError;
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, AppError> {
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(AppError::Validation(format!(
                "size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(PageRequest { page, size })
    }

    /// Read `page` and `size` from query parameters; other keys are left to the caller.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let page = match params.get("page") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .map_err(|_| AppError::Validation("page must be an integer >= 0".into()))?,
            None => 0,
        };
        let size = match params.get("size") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .map_err(|_| AppError::Validation(format!("size must be an integer between 1 and {}", MAX_PAGE_SIZE)))?,
            None => DEFAULT_PAGE_SIZE,
        };
        Self::new(page, size)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// Whether rows exist after this page, given the total count.
    pub fn has_next(&self, count: u64) -> bool {
        self.offset() + self.limit() < count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Page to link back to: `page - 1`, or the last page holding rows when this one is past the data.
    pub fn previous_page(&self, count: u64) -> Option<u32> {
        if !self.has_previous() {
            return None;
        }
        let last = count.saturating_sub(1) / u64::from(self.size);
        Some(u64::from(self.page - 1).min(last) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let p = PageRequest::from_params(&params(&[])).unwrap();
        assert_eq!(p, PageRequest::default());
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn offset_is_page_times_size() {
        let p = PageRequest::from_params(&params(&[("page", "3"), ("size", "50")])).unwrap();
        assert_eq!(p.offset(), 150);
    }

    #[test]
    fn size_is_bounded() {
        assert!(PageRequest::new(0, 0).is_err());
        assert!(PageRequest::new(0, 201).is_err());
        assert!(PageRequest::new(0, 200).is_ok());
        assert!(PageRequest::from_params(&params(&[("page", "-1")])).is_err());
        assert!(PageRequest::from_params(&params(&[("size", "many")])).is_err());
    }

    #[test]
    fn next_and_previous_follow_count() {
        let first = PageRequest::new(0, 20).unwrap();
        assert!(!first.has_previous());
        assert!(first.has_next(21));
        assert!(!first.has_next(20));
        let beyond = PageRequest::new(5, 20).unwrap();
        assert!(beyond.has_previous());
        assert!(!beyond.has_next(40));
    }

    #[test]
    fn previous_page_clamps_to_last_page_with_rows() {
        let p = PageRequest::new(2, 20).unwrap();
        assert_eq!(p.previous_page(100), Some(1));
        let beyond = PageRequest::new(9, 20).unwrap();
        assert_eq!(beyond.previous_page(45), Some(2));
        assert_eq!(beyond.previous_page(40), Some(1));
        assert_eq!(beyond.previous_page(0), Some(0));
        assert_eq!(PageRequest::new(0, 20).unwrap().previous_page(45), None);
    }
}
