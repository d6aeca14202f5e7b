mod client;
pub mod mime;

pub use client::GmailClient;
