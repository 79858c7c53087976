//! Product request and response shapes.

use super::{from_record, present, Record};
use crate::error::AppError;
use crate::service::validation;
use crate::table::product::{DESCRIPTION, IMAGE, NAME, PRICE, STOCK};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

const NAME_MAX: usize = 255;
const IMAGE_MAX: usize = 1024;
const PRICE_DIGITS: u32 = 12;
const PRICE_PLACES: u32 = 2;

/// Stored product, as returned by every endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<Url>,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<Record> for Product {
    type Error = AppError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        from_record(record)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductCreateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<Url>,
    pub price: Decimal,
    /// Absent or null means the table default (0).
    #[serde(default)]
    pub stock: Option<i32>,
}

impl ProductCreateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::not_blank("name", &self.name)?;
        validation::max_length("name", &self.name, NAME_MAX)?;
        if let Some(image) = &self.image {
            validation::http_url("image", image, IMAGE_MAX)?;
        }
        validation::decimal("price", &self.price, PRICE_DIGITS, PRICE_PLACES)?;
        Ok(())
    }

    pub fn to_record(&self) -> Record {
        let mut r = Record::new();
        r.insert(NAME.name.into(), Value::String(self.name.clone()));
        if let Some(d) = &self.description {
            r.insert(DESCRIPTION.name.into(), Value::String(d.clone()));
        }
        if let Some(image) = &self.image {
            r.insert(IMAGE.name.into(), Value::String(image.to_string()));
        }
        r.insert(PRICE.name.into(), Value::String(self.price.to_string()));
        if let Some(stock) = self.stock {
            r.insert(STOCK.name.into(), Value::from(stock));
        }
        r
    }
}

/// Partial update. Outer `None`: field absent, left untouched. `Some(None)`: explicit null.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductUpdateRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<Url>>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "present")]
    pub stock: Option<Option<i32>>,
}

impl ProductUpdateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validation::required("name", name)?;
        }
        if let Some(price) = &self.price {
            validation::required("price", price)?;
        }
        if let Some(stock) = &self.stock {
            validation::required("stock", stock)?;
        }
        if let Some(Some(name)) = &self.name {
            validation::not_blank("name", name)?;
            validation::max_length("name", name, NAME_MAX)?;
        }
        if let Some(Some(image)) = &self.image {
            validation::http_url("image", image, IMAGE_MAX)?;
        }
        if let Some(Some(price)) = &self.price {
            validation::decimal("price", price, PRICE_DIGITS, PRICE_PLACES)?;
        }
        Ok(())
    }

    /// Only the fields present in the payload; explicit nulls become NULL.
    pub fn to_record(&self) -> Record {
        let mut r = Record::new();
        if let Some(v) = &self.name {
            r.insert(NAME.name.into(), v.clone().map(Value::String).unwrap_or(Value::Null));
        }
        if let Some(v) = &self.description {
            r.insert(DESCRIPTION.name.into(), v.clone().map(Value::String).unwrap_or(Value::Null));
        }
        if let Some(v) = &self.image {
            r.insert(
                IMAGE.name.into(),
                v.as_ref().map(|u| Value::String(u.to_string())).unwrap_or(Value::Null),
            );
        }
        if let Some(v) = &self.price {
            r.insert(
                PRICE.name.into(),
                v.map(|p| Value::String(p.to_string())).unwrap_or(Value::Null),
            );
        }
        if let Some(v) = &self.stock {
            r.insert(STOCK.name.into(), v.map(Value::from).unwrap_or(Value::Null));
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_distinguishes_absent_from_null() {
        let req: ProductUpdateRequest =
            serde_json::from_value(json!({"stock": 6, "description": null})).unwrap();
        assert_eq!(req.stock, Some(Some(6)));
        assert_eq!(req.description, Some(None));
        assert!(req.name.is_none());

        let record = req.to_record();
        assert_eq!(record.len(), 2);
        assert_eq!(record["stock"], json!(6));
        assert_eq!(record["description"], Value::Null);
    }

    #[test]
    fn update_rejects_null_required_fields() {
        let req: ProductUpdateRequest = serde_json::from_value(json!({"price": null})).unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn create_requires_name_and_price() {
        assert!(serde_json::from_value::<ProductCreateRequest>(json!({"price": 1})).is_err());
        assert!(serde_json::from_value::<ProductCreateRequest>(json!({"name": "x"})).is_err());
        let req: ProductCreateRequest =
            serde_json::from_value(json!({"name": "Widget", "price": "10.00", "stock": 5})).unwrap();
        req.validate().unwrap();
        let record = req.to_record();
        assert_eq!(record["price"], json!("10.00"));
        assert!(!record.contains_key("description"));
    }

    #[test]
    fn create_rejects_three_decimal_places() {
        let req: ProductCreateRequest =
            serde_json::from_value(json!({"name": "Widget", "price": "1.005"})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn product_reads_stored_record() {
        let record = json!({
            "id": 1, "name": "Widget", "description": null, "image": "http://example.com/w.png",
            "price": "10.00", "stock": 5,
            "created_at": "2025-01-22T01:19:16+00:00", "updated_at": "2025-01-22T01:19:16+00:00"
        });
        let p = Product::try_from(record.as_object().cloned().unwrap()).unwrap();
        assert_eq!(p.price.to_string(), "10.00");
        assert_eq!(p.image.unwrap().as_str(), "http://example.com/w.png");
    }
}
