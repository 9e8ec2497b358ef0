//! # bitrix24-sdk - client for the Bitrix24 REST API
//!
//! Typed services over the portal REST API: CRM entities, telephony,
//! messaging, placements and users. Calls are blocking HTTP requests
//! authenticated either by an incoming webhook or by an OAuth application
//! token that is renewed transparently when it expires.
//!
//! ## Features
//!
//! - Webhook and OAuth2 authentication with automatic token renewal
//! - Typed DTOs over the loosely typed API payloads (`"Y"`/`"N"` flags,
//!   numeric strings, `[]` for empty maps)
//! - Batch execution of up to 50 commands per request and page fetching
//! - Typed inbound event notifications and placement frames
//!
//! ## Basic Usage
//!
//! ```no_run
//! use bitrix24_sdk::{Bitrix24, ListQuery};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let b24 = Bitrix24::from_webhook("https://example.bitrix24.com/rest/1/abc123/")?;
//!
//!     let deals = b24
//!         .crm()
//!         .deal()
//!         .list(&ListQuery::new().filter("STAGE_ID", "NEW").select(&["ID", "TITLE"]))?;
//!
//!     for deal in deals.items {
//!         println!("{}: {:?}", deal.id, deal.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## OAuth Applications
//!
//! ```no_run
//! use bitrix24_sdk::{AccessToken, ApplicationProfile, Bitrix24};
//!
//! let profile = ApplicationProfile::from_env()?;
//! let token = AccessToken::new("access".to_string(), "refresh".to_string(), None);
//! let b24 = Bitrix24::from_oauth("example.bitrix24.com", token, profile)?;
//!
//! // Persist renewed tokens
//! b24.on_token_renewed(|renewed| {
//!     println!("new token expires at {:?}", renewed.expires);
//! });
//! # Ok::<(), bitrix24_sdk::Bitrix24Error>(())
//! ```
//!
//! ## Inbound Events
//!
//! ```no_run
//! use bitrix24_sdk::events::Event;
//!
//! # let body = "";
//! match Event::from_form(body)? {
//!     Event::Crm { kind, action, event } => {
//!         println!("{:?} {:?} #{}", kind, action, event.payload().id);
//!     }
//!     other => println!("unhandled {}", other.code()),
//! }
//! # Ok::<(), bitrix24_sdk::Bitrix24Error>(())
//! ```

pub mod batch;
pub mod client;
pub mod convert;
pub mod core;
pub mod credentials;
pub mod error;
pub mod events;
pub mod query;
pub mod request;
pub mod response;
pub mod sdk;
pub mod services;
pub mod time;
pub mod token;

// Re-export main types for convenience
pub use batch::{fetch_all_pages, Batch, BatchResult, MAX_BATCH_COMMANDS, PAGE_SIZE};
pub use client::Config;
pub use crate::core::Core;
pub use credentials::{ApplicationProfile, Credentials, Scope, ScopeCode, WebhookUrl};
pub use error::{Bitrix24Error, Result};
pub use request::PlacementRequest;
pub use response::{
    AddedItemResult, DeletedItemResult, FieldDescription, FieldsResult, ItemsResult, Param,
    Response, UpdatedItemResult,
};
pub use sdk::Bitrix24;
pub use services::crm::ListQuery;
pub use time::{ResponseTime, Time};
pub use token::{AccessToken, RenewedAccessToken};
