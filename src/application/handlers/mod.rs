//! Command handlers grouped by feature area.

pub mod payments;
