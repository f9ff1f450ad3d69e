//! The relay loop: GitHub notifications in, ntfy pushes out.

pub mod poller;
pub mod shutdown;
