use crate::convert;
use serde::Deserialize;

pub(crate) const ON_EXTERNAL_CALL_START: &str = "ONEXTERNALCALLSTART";

/// Click-to-call from the portal interface
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExternalCallStarted {
    pub phone_number: String,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub call_id: Option<String>,
    #[serde(deserialize_with = "convert::int")]
    pub user_id: i64,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub line_number: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_yes_no")]
    pub is_mobile: Option<bool>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub call_list_id: Option<i64>,
    #[serde(default, deserialize_with = "convert::opt_string")]
    pub crm_entity_type: Option<String>,
    #[serde(default, deserialize_with = "convert::opt_int")]
    pub crm_entity_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use crate::events::Event;

    #[test]
    fn test_external_call_start() {
        let body = "event=ONEXTERNALCALLSTART&data%5BPHONE_NUMBER%5D=%2B15550001\
            &data%5BUSER_ID%5D=7&data%5BIS_MOBILE%5D=0&data%5BCALL_ID%5D=externalCall.abc\
            &data%5BCRM_ENTITY_TYPE%5D=CONTACT&data%5BCRM_ENTITY_ID%5D=12";

        match Event::from_form(body).unwrap() {
            Event::ExternalCallStart(event) => {
                let call = event.payload();
                assert_eq!(call.phone_number, "+15550001");
                assert_eq!(call.user_id, 7);
                assert_eq!(call.is_mobile, Some(false));
                assert_eq!(call.crm_entity_id, Some(12));
            }
            other => panic!("expected call start, got {:?}", other),
        }
    }
}
