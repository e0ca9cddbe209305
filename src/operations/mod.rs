pub mod add;
pub mod edit;
pub mod form;
pub mod import;
pub mod list;
pub mod remove;
pub mod summary;
