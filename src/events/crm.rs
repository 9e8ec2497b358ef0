use crate::convert;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrmEntityKind {
    Deal,
    Contact,
    Company,
    Lead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrmAction {
    Add,
    Update,
    Delete,
}

/// `data[FIELDS]` of a CRM entity event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CrmEntityChanged {
    #[serde(rename = "ID", deserialize_with = "convert::int")]
    pub id: i64,
}

/// Split an `ONCRM<ENTITY><ACTION>` code
pub(crate) fn parse_code(code: &str) -> Option<(CrmEntityKind, CrmAction)> {
    let rest = code.strip_prefix("ONCRM")?;

    let (kind, action) = [
        ("DEAL", CrmEntityKind::Deal),
        ("CONTACT", CrmEntityKind::Contact),
        ("COMPANY", CrmEntityKind::Company),
        ("LEAD", CrmEntityKind::Lead),
    ]
    .into_iter()
    .find_map(|(prefix, kind)| rest.strip_prefix(prefix).map(|action| (kind, action)))?;

    let action = match action {
        "ADD" => CrmAction::Add,
        "UPDATE" => CrmAction::Update,
        "DELETE" => CrmAction::Delete,
        _ => return None,
    };
    Some((kind, action))
}
