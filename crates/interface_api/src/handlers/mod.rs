//! HTTP request handlers
//!
//! Handlers stay thin: parse and validate the request, hand it to the
//! domain service with the authenticated [`Actor`](core_kernel::Actor),
//! and map the result into a response DTO. Authorization verdicts come
//! back from the domain as errors; nothing here inspects roles.

pub mod admin;
pub mod claims;
pub mod health;
pub mod schemes;
