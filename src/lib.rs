#[macro_use]
extern crate rust_i18n;

pub mod components;
pub mod config;
pub mod error;
pub mod session;
pub mod shutdown;
pub mod startup;
pub mod workflow;

// Initialize i18n
i18n!("locales", fallback = "en");
