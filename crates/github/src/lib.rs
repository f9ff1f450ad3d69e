//! GitHub notifications API access: polling and subject link lookup.

pub mod client;
pub mod notifications;
pub mod subject;

pub use client::GitHubClient;
