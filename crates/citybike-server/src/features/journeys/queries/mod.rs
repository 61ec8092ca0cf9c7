pub mod list;

pub use list::{ListJourneysError, ListJourneysQuery, ListJourneysResponse};
