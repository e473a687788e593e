pub mod fetch;
pub mod query;
pub mod url;
