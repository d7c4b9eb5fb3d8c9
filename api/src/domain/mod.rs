pub mod collection;
pub mod history;
pub mod request;
pub mod response;
pub mod tab;
pub mod ui;

use uuid::Uuid;

/// Fresh identifier for tabs, saved requests, history entries and collections.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
