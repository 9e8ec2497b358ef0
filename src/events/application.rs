use crate::convert;
use serde::Deserialize;

pub(crate) const ON_APP_INSTALL: &str = "ONAPPINSTALL";
pub(crate) const ON_APP_UNINSTALL: &str = "ONAPPUNINSTALL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ApplicationInstalled {
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub version: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub installed: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub language_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ApplicationUninstalled {
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub language_id: Option<String>,
    /// Application data was removed along with it
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub clean: Option<bool>,
}
