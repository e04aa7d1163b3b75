//! HTTP middleware for the admin site.

pub mod trace;
