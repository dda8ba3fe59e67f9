//! Shared response types.

mod response;

pub use response::{CreatedResponse, ListResponse, StatusMessage};
