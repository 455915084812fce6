//! of-alert — overdue and due-soon work-order ("OF") email alerts.

pub mod config;
pub mod delivery;
pub mod error;
pub mod pipeline;
pub mod source;
