//! Request middleware.

pub mod cors;
