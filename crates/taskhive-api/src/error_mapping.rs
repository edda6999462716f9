// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use serde_json::json;
use taskhive_policies::Denied;
use taskhive_store::StoreError;

/// Store failures map onto the wire taxonomy; sqlite internals are
/// never echoed to the client.
#[must_use]
pub fn store_error(err: &StoreError) -> ApiError {
    match err {
        StoreError::NotFound(what) => ApiError::not_found(what),
        StoreError::Conflict(msg) => ApiError::conflict(msg.clone()),
        StoreError::Invalid(field, reason) => {
            ApiError::validation_failed(json!([{"field": field, "reason": reason}]))
        }
        _ => ApiError::internal(),
    }
}

#[must_use]
pub fn denied_error(denied: &Denied) -> ApiError {
    ApiError::authorization_denied(denied.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiErrorCode;

    #[test]
    fn store_errors_map_to_codes() {
        assert_eq!(
            store_error(&StoreError::NotFound("task")).code,
            ApiErrorCode::NotFound
        );
        assert_eq!(
            store_error(&StoreError::Conflict("dup".to_string())).code,
            ApiErrorCode::Conflict
        );
        assert_eq!(
            store_error(&StoreError::Invalid("title", "empty".to_string())).code,
            ApiErrorCode::ValidationFailed
        );
        assert_eq!(
            store_error(&StoreError::Sqlite("disk".to_string())).code,
            ApiErrorCode::Internal
        );
    }

    #[test]
    fn sqlite_detail_is_not_echoed() {
        let err = store_error(&StoreError::Sqlite("no such table: users".to_string()));
        assert!(!err.message.contains("table"));
    }
}
