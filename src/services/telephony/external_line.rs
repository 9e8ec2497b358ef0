use crate::convert;
use crate::core::Core;
use crate::error::Result;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExternalLineItem {
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub id: Option<i64>,
    pub number: String,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct LineId {
    #[serde(deserialize_with = "convert::int")]
    id: i64,
}

/// PBX numbers calls are registered on
pub struct ExternalLine<'a> {
    core: &'a Core,
}

impl<'a> ExternalLine<'a> {
    pub fn new(core: &'a Core) -> Self {
        ExternalLine { core }
    }

    /// Add a line and return its identifier
    pub fn add(&self, number: &str, name: &str) -> Result<i64> {
        let line: LineId = self.core.call_typed(
            "telephony.externalLine.add",
            json!({ "NUMBER": number, "NAME": name }),
        )?;
        Ok(line.id)
    }

    pub fn get(&self) -> Result<Vec<ExternalLineItem>> {
        self.core.call_typed("telephony.externalLine.get", ())
    }

    /// Rename a line
    pub fn update(&self, number: &str, name: &str) -> Result<i64> {
        let line: LineId = self.core.call_typed(
            "telephony.externalLine.update",
            json!({ "NUMBER": number, "NAME": name }),
        )?;
        Ok(line.id)
    }

    pub fn delete(&self, number: &str) -> Result<()> {
        self.core
            .call("telephony.externalLine.delete", json!({ "NUMBER": number }))
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item() {
        let lines: Vec<ExternalLineItem> = serde_json::from_value(json!([
            {"NUMBER": "+15550100", "NAME": "Sales"},
            {"NUMBER": "+15550101", "NAME": ""}
        ]))
        .unwrap();

        assert_eq!(lines[0].name.as_deref(), Some("Sales"));
        assert_eq!(lines[1].name, None);
    }
}
