use super::entity::{CrmEntity, EntityService};
use crate::convert;
use crate::error::Result;
use crate::response::UpdatedItemResult;
use crate::time::Time;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DealItem {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub type_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub stage_id: Option<String>,
    /// P (in progress), S (won) or F (lost)
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub stage_semantic_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub is_new: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub is_recurring: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub probability: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub currency_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub opportunity: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub is_manual_opportunity: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub tax_value: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub lead_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub contact_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub begindate: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub closedate: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub opened: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub closed: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub comments: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub assigned_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub created_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub modify_by_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_create: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_time")]
    pub date_modify: Option<Time>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub source_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub source_description: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub originator_id: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub origin_id: Option<String>,
    /// User fields (`UF_CRM_*`) and anything not mapped above
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl CrmEntity for DealItem {
    const PREFIX: &'static str = "crm.deal";
}

/// Product row attached to a deal
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProductRow {
    #[serde(deserialize_with = "convert::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub owner_type: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub price_exclusive: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub price_netto: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub price_brutto: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub quantity: Option<f64>,
    /// 1 for a fixed amount, 2 for a percentage
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub discount_type_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub discount_rate: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub discount_sum: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_float")]
    pub tax_rate: Option<f64>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub tax_included: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub measure_code: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub measure_name: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub sort: Option<i64>,
}

/// Product row to store on a deal
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewProductRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub price: f64,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(serialize_with = "convert::yn_flag")]
    pub tax_included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_code: Option<i64>,
}

impl<'a> EntityService<'a, DealItem> {
    pub fn product_rows_get(&self, deal_id: i64) -> Result<Vec<ProductRow>> {
        self.core
            .call_typed("crm.deal.productrows.get", json!({ "id": deal_id }))
    }

    /// Replace all product rows of a deal
    pub fn product_rows_set(&self, deal_id: i64, rows: &[NewProductRow]) -> Result<UpdatedItemResult> {
        self.core
            .call_typed("crm.deal.productrows.set", json!({ "id": deal_id, "rows": rows }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_item_mapping() {
        let deal: DealItem = serde_json::from_value(json!({
            "ID": "10",
            "TITLE": "Website redesign",
            "TYPE_ID": "SALE",
            "CATEGORY_ID": "0",
            "STAGE_ID": "NEW",
            "STAGE_SEMANTIC_ID": "P",
            "IS_NEW": "Y",
            "PROBABILITY": null,
            "CURRENCY_ID": "USD",
            "OPPORTUNITY": "15000.00",
            "TAX_VALUE": "0.00",
            "COMPANY_ID": "0",
            "CONTACT_ID": "3",
            "BEGINDATE": "2024-03-01T03:00:00+03:00",
            "CLOSEDATE": "",
            "OPENED": "Y",
            "CLOSED": "N",
            "ASSIGNED_BY_ID": "1",
            "DATE_CREATE": "2024-03-01T10:00:00+03:00",
            "UF_CRM_1700000000": "custom"
        }))
        .unwrap();

        assert_eq!(deal.id, 10);
        assert_eq!(deal.category_id, Some(0));
        assert_eq!(deal.opportunity, Some(15000.0));
        assert_eq!(deal.contact_id, Some(3));
        assert_eq!(deal.closedate, None);
        assert_eq!(deal.closed, Some(false));
        assert_eq!(deal.extra.get("UF_CRM_1700000000"), Some(&json!("custom")));
    }

    #[test]
    fn test_new_product_row() {
        let row = NewProductRow {
            product_id: Some(7),
            price: 100.0,
            quantity: 2.0,
            tax_included: true,
            ..NewProductRow::default()
        };

        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"PRODUCT_ID": 7, "PRICE": 100.0, "QUANTITY": 2.0, "TAX_INCLUDED": "Y"})
        );
    }
}
