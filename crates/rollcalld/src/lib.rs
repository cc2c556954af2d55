//! rollcalld - attendance session service
//!
//! Library surface for the daemon binary: the HTTP router and the
//! periodic background jobs, exposed so integration tests can drive them
//! without a running process.

pub mod http;
pub mod jobs;
