//! CRM entities: deals, contacts, companies, leads, products, activities
//! and the status dictionaries behind their stage and source fields.

pub mod activity;
pub mod company;
pub mod contact;
pub mod deal;
pub mod entity;
pub mod lead;
pub mod product;
pub mod status;

pub use activity::ActivityItem;
pub use company::CompanyItem;
pub use contact::ContactItem;
pub use deal::{DealItem, NewProductRow, ProductRow};
pub use entity::{CrmEntity, EntityService, ListQuery};
pub use lead::LeadItem;
pub use product::ProductItem;
pub use status::{Status, StatusItem};

use crate::convert;
use crate::core::Core;
use serde::{Deserialize, Serialize};

/// Multi-value communication field (PHONE, EMAIL, WEB, IM)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MultiField {
    #[serde(
        default,
        deserialize_with = "convert::opt_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    /// WORK, HOME, MOBILE, OTHER ...
    #[serde(default)]
    pub value_type: String,
    pub value: String,
}

impl MultiField {
    pub fn new(value: impl Into<String>, value_type: impl Into<String>) -> Self {
        MultiField {
            id: None,
            type_id: None,
            value_type: value_type.into(),
            value: value.into(),
        }
    }
}

pub type DealService<'a> = EntityService<'a, DealItem>;
pub type ContactService<'a> = EntityService<'a, ContactItem>;
pub type CompanyService<'a> = EntityService<'a, CompanyItem>;
pub type LeadService<'a> = EntityService<'a, LeadItem>;
pub type ProductService<'a> = EntityService<'a, ProductItem>;
pub type ActivityService<'a> = EntityService<'a, ActivityItem>;

pub struct Crm<'a> {
    core: &'a Core,
}

impl<'a> Crm<'a> {
    pub fn new(core: &'a Core) -> Self {
        Crm { core }
    }

    pub fn deal(&self) -> DealService<'a> {
        EntityService::new(self.core)
    }

    pub fn contact(&self) -> ContactService<'a> {
        EntityService::new(self.core)
    }

    pub fn company(&self) -> CompanyService<'a> {
        EntityService::new(self.core)
    }

    pub fn lead(&self) -> LeadService<'a> {
        EntityService::new(self.core)
    }

    pub fn product(&self) -> ProductService<'a> {
        EntityService::new(self.core)
    }

    pub fn activity(&self) -> ActivityService<'a> {
        EntityService::new(self.core)
    }

    pub fn status(&self) -> Status<'a> {
        Status::new(self.core)
    }
}
