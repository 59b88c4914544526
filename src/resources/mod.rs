//! WAF resources
//!
//! Only action resources are provided: creating one triggers a server-side
//! operation once, and the remaining lifecycle steps keep the recorded state.

pub mod tamper_refresh;
