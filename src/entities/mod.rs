//! SeaORM entities for the shipyard console tables.
//!
//! `work_orders`, `work_details`, `permit_to_work`, `bastp` and
//! `work_verification` are soft-deleted through `deleted_at`; every read path
//! filters on it.

pub mod bastp;
pub mod permit_to_work;
pub mod vessel;
pub mod work_details;
pub mod work_order;
pub mod work_progress;
pub mod work_verification;
