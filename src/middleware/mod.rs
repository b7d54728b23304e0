pub mod auth;
pub mod response;

pub use auth::{access_gate, AccessGate, GateDecision, GuardRule, Rejection};
pub use response::{ApiResponse, ApiResult};
