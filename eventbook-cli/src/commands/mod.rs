pub mod add;
pub mod archive;
pub mod dashboard;
pub mod delete;
pub mod edit;
pub mod list;
pub mod pending;
pub mod report;
pub mod session;
pub mod taxonomy;
