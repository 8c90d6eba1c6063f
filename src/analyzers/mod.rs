//! Score aggregation.
//!
//! Each aggregator reads the cleaned table and produces one summary: the
//! overall distribution, per evaluation group, per month, and per observer.
//! Aggregators are independent of each other and of the renderers.

pub mod by_category;
pub mod by_observer;
pub mod distribution;
pub mod monthly;
pub mod types;
pub mod utility;
