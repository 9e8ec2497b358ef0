//! Messenger: chat messages and user notifications.

pub mod message;
pub mod notify;

pub use message::{Messages, NewMessage};
pub use notify::{Notification, Notify};

use crate::core::Core;

pub struct Im<'a> {
    core: &'a Core,
}

impl<'a> Im<'a> {
    pub fn new(core: &'a Core) -> Self {
        Im { core }
    }

    pub fn notify(&self) -> Notify<'a> {
        Notify::new(self.core)
    }

    pub fn message(&self) -> Messages<'a> {
        Messages::new(self.core)
    }
}
