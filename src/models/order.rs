//! Order request and response shapes.

use super::{from_record, Record};
use crate::error::AppError;
use crate::service::validation;
use crate::table::order::{ADDRESS, CONTENTS, CUSTOMER_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub address: String,
    pub contents: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<Record> for Order {
    type Error = AppError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        from_record(record)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderCreateRequest {
    pub customer_name: String,
    pub address: String,
    pub contents: String,
}

impl OrderCreateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::not_blank("customer_name", &self.customer_name)?;
        validation::max_length("customer_name", &self.customer_name, 255)?;
        validation::not_blank("address", &self.address)?;
        validation::max_length("contents", &self.contents, 1024)?;
        Ok(())
    }

    pub fn to_record(&self) -> Record {
        let mut r = Record::new();
        r.insert(CUSTOMER_NAME.name.into(), Value::String(self.customer_name.clone()));
        r.insert(ADDRESS.name.into(), Value::String(self.address.clone()));
        r.insert(CONTENTS.name.into(), Value::String(self.contents.clone()));
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_needs_every_field() {
        assert!(serde_json::from_value::<OrderCreateRequest>(json!({
            "customer_name": "Ada", "address": "1 Loop Rd"
        }))
        .is_err());
        let req: OrderCreateRequest = serde_json::from_value(json!({
            "customer_name": "Ada", "address": "1 Loop Rd", "contents": "2x Widget"
        }))
        .unwrap();
        req.validate().unwrap();
        assert_eq!(req.to_record().len(), 3);
    }

    #[test]
    fn long_names_are_rejected() {
        let req = OrderCreateRequest {
            customer_name: "a".repeat(256),
            address: "x".into(),
            contents: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
