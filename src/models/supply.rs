use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CommodityType, ProcurementStatus, PurchaseOrderStatus, TransactionType};
use super::validation::*;

/// Stock expiring within this many days is flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 90;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commodity {
    pub id: Uuid,
    pub name: String,
    pub commodity_code: String,
    pub commodity_type: CommodityType,
    pub generic_name: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    /// Tablets, Vials, Boxes, ...
    pub unit_of_measure: String,
    pub reorder_level: i32,
    pub ideal_stock_level: i32,
    pub is_essential: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub supplier_code: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub physical_address: String,
    pub kra_pin: Option<String>,
    pub is_active: bool,
    /// 0-5.
    pub rating: Option<f64>,
}

/// Quantity of one commodity batch held at one facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: Uuid,
    pub commodity_id: Uuid,
    pub facility_id: Uuid,
    pub quantity: i64,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub unit_cost: Option<f64>,
    pub updated_by_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: Uuid,
    pub transaction_number: String,
    pub stock_id: Uuid,
    pub transaction_type: TransactionType,
    /// Signed change applied to the stock quantity.
    pub quantity: i64,
    pub transaction_date: NaiveDateTime,
    pub from_facility_id: Option<Uuid>,
    pub to_facility_id: Option<Uuid>,
    /// PO, GRN or issue number.
    pub reference_number: Option<String>,
    pub performed_by_id: Option<Uuid>,
    pub approved_by_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementItem {
    pub commodity_id: Uuid,
    pub quantity: i64,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcurementRequest {
    pub id: Uuid,
    pub request_number: String,
    pub facility_id: Uuid,
    pub requested_by_id: Option<Uuid>,
    pub request_date: NaiveDate,
    pub items: Vec<ProcurementItem>,
    pub justification: String,
    pub priority: String,
    pub status: ProcurementStatus,
    pub reviewed_by_id: Option<Uuid>,
    pub review_date: Option<NaiveDateTime>,
    pub review_notes: Option<String>,
    pub approved_by_id: Option<Uuid>,
    pub approval_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub commodity_id: Uuid,
    pub quantity: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Uuid,
    pub procurement_request_id: Option<Uuid>,
    pub po_date: NaiveDate,
    pub expected_delivery_date: NaiveDate,
    pub actual_delivery_date: Option<NaiveDate>,
    pub items: Vec<PurchaseOrderItem>,
    pub total_amount: f64,
    pub vat_amount: f64,
    pub status: PurchaseOrderStatus,
    pub created_by_id: Option<Uuid>,
    pub approved_by_id: Option<Uuid>,
    pub terms_and_conditions: Option<String>,
    pub notes: Option<String>,
}

impl PurchaseOrder {
    pub fn items_total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.quantity as f64 * i.unit_price)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Expired,
    ExpiringSoon,
    OutOfStock,
    LowStock,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryWindow {
    Expired,
    ExpiringSoon,
    Valid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Out,
    Low,
    Adequate,
}

/// Expiry takes precedence over quantity.
pub fn classify_stock(
    quantity: i64,
    expiry_date: NaiveDate,
    reorder_level: i32,
    today: NaiveDate,
) -> StockStatus {
    if expiry_date < today {
        StockStatus::Expired
    } else if expiry_date < today + Duration::days(EXPIRY_WARNING_DAYS) {
        StockStatus::ExpiringSoon
    } else if quantity == 0 {
        StockStatus::OutOfStock
    } else if quantity < i64::from(reorder_level) {
        StockStatus::LowStock
    } else {
        StockStatus::Ok
    }
}

impl Validate for Commodity {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("commodity.commodity_code", &self.commodity_code)?;
        validate_not_blank("commodity.unit_of_measure", &self.unit_of_measure)?;
        validate_min("commodity.reorder_level", self.reorder_level.into(), 0)?;
        validate_min("commodity.ideal_stock_level", self.ideal_stock_level.into(), 0)
    }
}

impl Validate for Supplier {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("supplier.supplier_code", &self.supplier_code)?;
        validate_phone("supplier.phone", &self.phone)?;
        validate_email("supplier.email", &self.email)?;
        if let Some(rating) = self.rating {
            validate_range("supplier.rating", rating, 0.0, 5.0)?;
        }
        Ok(())
    }
}

impl Validate for Stock {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("stock.batch_number", &self.batch_number)?;
        validate_min("stock.quantity", self.quantity, 0)
    }
}

impl Validate for StockTransaction {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("stock_transaction.transaction_number", &self.transaction_number)
    }
}

impl Validate for ProcurementRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("procurement.request_number", &self.request_number)?;
        for item in &self.items {
            validate_min("procurement.items.quantity", item.quantity, 1)?;
        }
        Ok(())
    }
}

impl Validate for PurchaseOrder {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_blank("purchase_order.po_number", &self.po_number)?;
        if self.total_amount < 0.0 || self.vat_amount < 0.0 {
            return Err(ValidationError::BelowMinimum {
                field: "purchase_order.total_amount",
                min: 0,
                value: self.total_amount.min(self.vat_amount) as i64,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expiry_dominates_quantity() {
        let today = day(2024, 6, 1);
        assert_eq!(classify_stock(0, day(2024, 5, 1), 100, today), StockStatus::Expired);
        assert_eq!(classify_stock(0, day(2024, 7, 1), 100, today), StockStatus::ExpiringSoon);
    }

    #[test]
    fn quantity_levels() {
        let today = day(2024, 6, 1);
        let far = day(2026, 1, 1);
        assert_eq!(classify_stock(0, far, 100, today), StockStatus::OutOfStock);
        assert_eq!(classify_stock(99, far, 100, today), StockStatus::LowStock);
        assert_eq!(classify_stock(100, far, 100, today), StockStatus::Ok);
    }

    #[test]
    fn expiry_warning_boundary() {
        let today = day(2024, 6, 1);
        let boundary = today + Duration::days(EXPIRY_WARNING_DAYS);
        assert_eq!(classify_stock(500, boundary, 100, today), StockStatus::Ok);
        assert_eq!(
            classify_stock(500, boundary - Duration::days(1), 100, today),
            StockStatus::ExpiringSoon
        );
    }

    #[test]
    fn negative_stock_rejected() {
        let stock = Stock {
            id: Uuid::new_v4(),
            commodity_id: Uuid::new_v4(),
            facility_id: Uuid::new_v4(),
            quantity: -5,
            batch_number: "BATCH1234".into(),
            expiry_date: day(2025, 1, 1),
            unit_cost: None,
            updated_by_id: None,
        };
        assert!(stock.validate().is_err());
    }

    #[test]
    fn supplier_rating_bounded() {
        let mut supplier = Supplier {
            id: Uuid::new_v4(),
            name: "KEMSA".into(),
            supplier_code: "KEMSA".into(),
            contact_person: "John Kamau".into(),
            phone: "+254722111111".into(),
            email: "orders@kemsa.co.ke".into(),
            physical_address: "Nairobi, Kenya".into(),
            kra_pin: None,
            is_active: true,
            rating: Some(4.5),
        };
        assert!(supplier.validate().is_ok());
        supplier.rating = Some(5.5);
        assert!(supplier.validate().is_err());
    }
}
