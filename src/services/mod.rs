pub mod access;
pub mod booking;
pub mod catalog;
pub mod pricing;
pub mod scheduling;
