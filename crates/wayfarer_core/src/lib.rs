pub mod classify;
pub mod core_api;
pub mod diff;
pub mod document;
pub mod format;
pub mod generate;
pub mod merge;
pub mod naming;
pub mod ownership;
pub mod profile;
pub mod region;
pub mod templates;
