//! Domain model of the lease review workflow.

pub mod activity;
pub mod cell;
pub mod extraction;
pub mod field_update;
pub mod review;
pub mod types;
pub mod wizard;
