use crate::convert;
use crate::core::{to_param, Core};
use crate::error::{Bitrix24Error, Result};
use crate::query::build_query;
use crate::response::{unwrap_items, ErrorEnvelope, ItemsResult, Param};
use crate::time::ResponseTime;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Maximum number of commands the portal accepts in one `batch` call
pub const MAX_BATCH_COMMANDS: usize = 50;

/// Page size of list methods
pub const PAGE_SIZE: u64 = 50;

/// Single command inside a batch
#[derive(Debug, Clone)]
pub struct Command {
    pub id: String,
    pub method: String,
    pub params: Param,
}

impl Command {
    /// Encode as `method?key=value&...`
    pub fn encode(&self) -> String {
        let query = build_query(&Value::Object(self.params.clone()));
        if query.is_empty() {
            self.method.clone()
        } else {
            format!("{}?{}", self.method, query)
        }
    }
}

/// Collects commands and sends them in `batch` calls of at most
/// [`MAX_BATCH_COMMANDS`] each.
pub struct Batch<'a> {
    core: &'a Core,
    commands: Vec<Command>,
    halt: bool,
}

impl<'a> Batch<'a> {
    pub fn new(core: &'a Core) -> Self {
        Batch {
            core,
            commands: Vec::new(),
            halt: false,
        }
    }

    /// Stop executing a chunk at the first failing command
    pub fn with_halt(mut self, halt: bool) -> Self {
        self.halt = halt;
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Add a command under a generated id and return that id
    pub fn add<P: Serialize>(&mut self, method: &str, params: P) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.add_named(&id, method, params)?;
        Ok(id)
    }

    /// Add a command under a caller-chosen id.
    /// Later commands of the same chunk can reference its result as `$result[id]`.
    pub fn add_named<P: Serialize>(&mut self, id: &str, method: &str, params: P) -> Result<()> {
        if id.is_empty() {
            return Err(Bitrix24Error::InvalidArgument("empty batch command id".to_string()));
        }
        if self.commands.iter().any(|c| c.id == id) {
            return Err(Bitrix24Error::InvalidArgument(format!(
                "duplicate batch command id {:?}",
                id
            )));
        }

        self.commands.push(Command {
            id: id.to_string(),
            method: method.to_string(),
            params: to_param(params)?,
        });
        Ok(())
    }

    /// Queue one `<method>` call per item, passing the item as `fields`
    pub fn add_items<I, P>(&mut self, method: &str, items: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = P>,
        P: Serialize,
    {
        items
            .into_iter()
            .map(|fields| {
                let fields = serde_json::to_value(fields)?;
                self.add(method, json!({ "fields": fields }))
            })
            .collect()
    }

    /// Queue one `<method>` call per identifier
    pub fn delete_items<I>(&mut self, method: &str, ids: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = i64>,
    {
        ids.into_iter()
            .map(|id| self.add(method, json!({ "id": id })))
            .collect()
    }

    /// Send all queued commands
    pub fn execute(self) -> Result<BatchResult> {
        let mut result = BatchResult::default();

        for chunk in self.commands.chunks(MAX_BATCH_COMMANDS) {
            let cmd: Param = chunk
                .iter()
                .map(|c| (c.id.clone(), Value::String(c.encode())))
                .collect();

            let reply: BatchReply = self
                .core
                .call("batch", json!({ "halt": i32::from(self.halt), "cmd": cmd }))?
                .into_result()?;

            debug!(
                commands = chunk.len(),
                errors = reply.result_error.len(),
                "batch chunk finished"
            );

            let failed = !reply.result_error.is_empty();
            result.merge(chunk, reply);

            if self.halt && failed {
                break;
            }
        }

        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct BatchReply {
    #[serde(default, deserialize_with = "convert::php_map")]
    result: HashMap<String, Value>,
    #[serde(default, deserialize_with = "convert::php_map")]
    result_error: HashMap<String, ErrorEnvelope>,
    #[serde(default, deserialize_with = "convert::php_map")]
    result_total: HashMap<String, Value>,
    #[serde(default, deserialize_with = "convert::php_map")]
    result_next: HashMap<String, Value>,
    #[serde(default, deserialize_with = "convert::php_map")]
    result_time: HashMap<String, ResponseTime>,
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Per-command outcome of a batch, in command order
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    results: IndexMap<String, Value>,
    errors: IndexMap<String, ErrorEnvelope>,
    methods: HashMap<String, String>,
    totals: HashMap<String, u64>,
    nexts: HashMap<String, u64>,
    times: HashMap<String, ResponseTime>,
}

impl BatchResult {
    fn merge(&mut self, chunk: &[Command], mut reply: BatchReply) {
        for command in chunk {
            let id = &command.id;
            self.methods.insert(id.clone(), command.method.clone());

            if let Some(value) = reply.result.remove(id) {
                self.results.insert(id.clone(), value);
            }
            if let Some(error) = reply.result_error.remove(id) {
                self.errors.insert(id.clone(), error);
            }
            if let Some(total) = reply.result_total.get(id).and_then(as_count) {
                self.totals.insert(id.clone(), total);
            }
            if let Some(next) = reply.result_next.get(id).and_then(as_count) {
                self.nexts.insert(id.clone(), next);
            }
            if let Some(time) = reply.result_time.remove(id) {
                self.times.insert(id.clone(), time);
            }
        }
    }

    /// Unmarshal the result of one command
    pub fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        self.check(id)?;
        let value = self.results.get(id).cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// Unmarshal the page returned by a list command
    pub fn get_items<T: DeserializeOwned>(&self, id: &str) -> Result<ItemsResult<T>> {
        self.check(id)?;
        let value = self.results.get(id).cloned().unwrap_or(Value::Null);
        Ok(ItemsResult {
            items: serde_json::from_value(unwrap_items(value))?,
            total: self.total(id),
            next: self.next(id),
        })
    }

    fn check(&self, id: &str) -> Result<()> {
        if let Some(error) = self.errors.get(id) {
            let method = self.methods.get(id).map(String::as_str).unwrap_or_default();
            return Err(Bitrix24Error::from_api(400, method, error.clone()));
        }
        if !self.methods.contains_key(id) {
            return Err(Bitrix24Error::InvalidArgument(format!(
                "unknown batch command id {:?}",
                id
            )));
        }
        Ok(())
    }

    pub fn raw(&self, id: &str) -> Option<&Value> {
        self.results.get(id)
    }

    pub fn error(&self, id: &str) -> Option<&ErrorEnvelope> {
        self.errors.get(id)
    }

    pub fn total(&self, id: &str) -> Option<u64> {
        self.totals.get(id).copied()
    }

    pub fn next(&self, id: &str) -> Option<u64> {
        self.nexts.get(id).copied()
    }

    pub fn time(&self, id: &str) -> Option<&ResponseTime> {
        self.times.get(id)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Iterate over successful results in command order
    pub fn results(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All results, or the first command error
    pub fn into_result(self) -> Result<IndexMap<String, Value>> {
        if let Some((id, error)) = self.errors.into_iter().next() {
            let method = self.methods.get(&id).cloned().unwrap_or_default();
            return Err(Bitrix24Error::from_api(400, &method, error));
        }
        Ok(self.results)
    }
}

/// Fetch every page of a list method: the first page tells the total,
/// the remaining pages are requested through batches.
pub fn fetch_all_pages<T, P>(core: &Core, method: &str, params: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: Serialize,
{
    let mut params = to_param(params)?;
    params.insert("start".to_string(), Value::from(0u64));

    let first = core.call(method, &params)?;
    let total = first.total;
    let page: ItemsResult<T> = first.into_items()?;
    let mut items = page.items;

    let next = match page.next {
        Some(next) => next,
        None => return Ok(items),
    };
    let total = match total {
        Some(total) => total,
        None => {
            // Page count unknown, walk the offsets one call at a time
            debug!(method, next, "reply carries no total, following next");
            params.insert("start".to_string(), Value::from(next));
            items.extend(core.list_all::<T, _>(method, &params)?);
            return Ok(items);
        }
    };

    let mut batch = Batch::new(core);
    let mut ids = Vec::new();
    let mut start = PAGE_SIZE;
    while start < total {
        params.insert("start".to_string(), Value::from(start));
        ids.push(batch.add(method, &params)?);
        start += PAGE_SIZE;
    }

    debug!(method, total, pages = ids.len() + 1, "fetching pages");

    let result = batch.execute()?;
    for id in ids {
        let page: ItemsResult<T> = result.get_items(&id)?;
        items.extend(page.items);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_encoding() {
        let command = Command {
            id: "deal".to_string(),
            method: "crm.deal.list".to_string(),
            params: to_param(json!({"filter": {"STAGE_ID": "NEW"}, "start": 50})).unwrap(),
        };
        assert_eq!(
            command.encode(),
            "crm.deal.list?filter%5BSTAGE_ID%5D=NEW&start=50"
        );

        let bare = Command {
            id: "t".to_string(),
            method: "server.time".to_string(),
            params: Param::new(),
        };
        assert_eq!(bare.encode(), "server.time");
    }

    #[test]
    fn test_reply_with_empty_php_arrays() {
        let reply: BatchReply = serde_json::from_value(json!({
            "result": {"a": 5, "b": true},
            "result_error": [],
            "result_total": [],
            "result_next": [],
            "result_time": []
        }))
        .unwrap();

        let commands = vec![
            Command { id: "a".to_string(), method: "crm.deal.add".to_string(), params: Param::new() },
            Command { id: "b".to_string(), method: "crm.deal.update".to_string(), params: Param::new() },
        ];

        let mut result = BatchResult::default();
        result.merge(&commands, reply);

        assert!(!result.has_errors());
        assert_eq!(result.get::<i64>("a").unwrap(), 5);
        assert!(result.get::<bool>("b").unwrap());
        assert!(result.get::<i64>("missing").is_err());

        let ids: Vec<&str> = result.results().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_command_error_surfaces() {
        let reply: BatchReply = serde_json::from_value(json!({
            "result": [],
            "result_error": {"a": {"error": "", "error_description": "Not found"}},
        }))
        .unwrap();

        let commands = vec![Command {
            id: "a".to_string(),
            method: "crm.deal.get".to_string(),
            params: Param::new(),
        }];

        let mut result = BatchResult::default();
        result.merge(&commands, reply);

        assert!(result.has_errors());
        assert!(result.get::<Value>("a").unwrap_err().is_not_found());
        assert!(result.into_result().is_err());
    }
}
