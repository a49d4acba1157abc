use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

/// Storage and display format for invoice dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("customer name is required")]
    MissingCustomer,
    #[error("item {0}: description is required")]
    MissingDescription(usize),
    #[error("item {0}: quantity must be at least 1")]
    ZeroQuantity(usize),
    #[error("item {index}: price must be greater than zero (got {price})")]
    NonPositivePrice { index: usize, price: Decimal },
    #[error("invoice has no id; it must be saved before it can be updated")]
    MissingId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: Option<i64>,
    pub invoice_id: Option<i64>,
    pub description: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl LineItem {
    pub fn new(description: String, price: Decimal, quantity: u32) -> Self {
        Self {
            id: None,
            invoice_id: None,
            description,
            quantity,
            price,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: Option<i64>,
    pub date: NaiveDateTime,
    pub customer: String,
    pub archived: bool,
    pub items: Vec<LineItem>,
}

impl Invoice {
    pub fn new(customer: String, date: NaiveDateTime, items: Vec<LineItem>) -> Self {
        Self {
            id: None,
            date,
            customer,
            archived: false,
            items,
        }
    }

    /// Sum of every line item's subtotal. Never cached.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer.trim().is_empty() {
            return Err(ValidationError::MissingCustomer);
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.description.trim().is_empty() {
                return Err(ValidationError::MissingDescription(index + 1));
            }
            if item.quantity == 0 {
                return Err(ValidationError::ZeroQuantity(index + 1));
            }
            if item.price <= Decimal::ZERO {
                return Err(ValidationError::NonPositivePrice {
                    index: index + 1,
                    price: item.price,
                });
            }
        }
        Ok(())
    }

    pub fn format_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Parse a stored or user-entered date. A bare `YYYY-MM-DD` means midnight.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
