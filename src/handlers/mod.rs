// handlers/mod.rs - request handlers grouped by audience
//
// catalog: public reads (no auth)
// auth:    login / logout / verify
// admin:   CRUD under /api/admin, behind the access gate

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;

use crate::error::ApiError;

/// Record ids in paths are positive integers; anything else is a 400.
pub(crate) fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("12").unwrap(), 12);
        for raw in ["abc", "0", "-3", "1.5", ""] {
            assert!(parse_id(raw).is_err(), "{raw:?}");
        }
    }
}
