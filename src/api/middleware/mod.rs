//! API middleware stack.
//!
//! Only request logging: the service has no auth, nonce or rate limits.

pub mod audit;
