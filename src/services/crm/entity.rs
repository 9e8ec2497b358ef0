use crate::batch::fetch_all_pages;
use crate::core::{to_param, Core};
use crate::error::Result;
use crate::response::{
    AddedItemResult, DeletedItemResult, FieldsResult, ItemsResult, Param, UpdatedItemResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::marker::PhantomData;

/// A CRM entity exposed through the uniform `crm.<entity>.*` methods
pub trait CrmEntity: DeserializeOwned {
    /// Method prefix, e.g. `crm.deal`
    const PREFIX: &'static str;
}

/// Ordering, filtering and projection for list methods
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Param::is_empty")]
    pub order: Param,
    #[serde(skip_serializing_if = "Param::is_empty")]
    pub filter: Param,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition; the key may carry an operator prefix such as `>ID`
    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter.insert(field.to_string(), value.into());
        self
    }

    /// Sort by a field, `ASC` or `DESC`
    pub fn order(mut self, field: &str, direction: &str) -> Self {
        self.order.insert(field.to_string(), json!(direction));
        self
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.select.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }
}

/// Generic CRUD service for a CRM entity
pub struct EntityService<'a, T> {
    pub(crate) core: &'a Core,
    _entity: PhantomData<T>,
}

impl<'a, T: CrmEntity> EntityService<'a, T> {
    pub fn new(core: &'a Core) -> Self {
        EntityService {
            core,
            _entity: PhantomData,
        }
    }

    fn method(&self, operation: &str) -> String {
        format!("{}.{}", T::PREFIX, operation)
    }

    /// Create an item from a field map
    pub fn add<F: Serialize>(&self, fields: F) -> Result<AddedItemResult> {
        self.core
            .call_typed(&self.method("add"), json!({ "fields": to_param(fields)? }))
    }

    /// Create an item with extra method parameters, e.g. `REGISTER_SONET_EVENT`
    pub fn add_with_params<F: Serialize, P: Serialize>(&self, fields: F, params: P) -> Result<AddedItemResult> {
        self.core.call_typed(
            &self.method("add"),
            json!({ "fields": to_param(fields)?, "params": to_param(params)? }),
        )
    }

    pub fn get(&self, id: i64) -> Result<T> {
        self.core.call_typed(&self.method("get"), json!({ "id": id }))
    }

    /// Fetch one page of items
    pub fn list(&self, query: &ListQuery) -> Result<ItemsResult<T>> {
        self.core.call(&self.method("list"), query)?.into_items()
    }

    /// Fetch every item matching the query, paging through batches
    pub fn list_all(&self, query: &ListQuery) -> Result<Vec<T>> {
        let mut query = query.clone();
        query.start = None;
        fetch_all_pages(self.core, &self.method("list"), &query)
    }

    pub fn update<F: Serialize>(&self, id: i64, fields: F) -> Result<UpdatedItemResult> {
        self.core.call_typed(
            &self.method("update"),
            json!({ "id": id, "fields": to_param(fields)? }),
        )
    }

    pub fn delete(&self, id: i64) -> Result<DeletedItemResult> {
        self.core.call_typed(&self.method("delete"), json!({ "id": id }))
    }

    /// Field descriptions, including user fields
    pub fn fields(&self) -> Result<FieldsResult> {
        self.core.call_typed(&self.method("fields"), ())
    }

    /// Number of items matching a filter, fetched without item bodies
    pub fn count_by_filter(&self, filter: Param) -> Result<u64> {
        let query = ListQuery {
            filter,
            select: vec!["ID".to_string()],
            ..ListQuery::default()
        };
        let page = self.core.call(&self.method("list"), &query)?;
        Ok(page.total.unwrap_or_default())
    }
}
