//! Global ID (GID) normalization.
//!
//! The Admin API identifies records with fully-qualified global ids of the
//! form `gid://shopify/<Type>/<id>`. `find` accepts arbitrary identifiers
//! and normalizes them before querying; a gid naming a different resource
//! type than the model being queried is a usage error, not a silent miss.

use crate::error::UsageError;

const GID_PREFIX: &str = "gid://shopify/";

/// Normalizes an identifier into a global id for the given resource type.
///
/// Bare ids are prefixed; ids already in gid form are validated against
/// the expected resource segment and returned unchanged.
///
/// # Errors
///
/// Returns [`UsageError::MismatchedGid`] when a gid names a different
/// resource type.
///
/// # Example
///
/// ```rust
/// use shopify_orm::schema::normalize_gid;
///
/// assert_eq!(
///     normalize_gid("123", "Order").unwrap(),
///     "gid://shopify/Order/123"
/// );
/// assert!(normalize_gid("gid://shopify/Product/1", "Order").is_err());
/// ```
pub fn normalize_gid(id: &str, resource: &str) -> Result<String, UsageError> {
    if let Some(rest) = id.strip_prefix(GID_PREFIX) {
        if rest.split('/').next() == Some(resource) {
            Ok(id.to_string())
        } else {
            Err(UsageError::MismatchedGid {
                expected: resource.to_string(),
                found: id.to_string(),
            })
        }
    } else {
        Ok(format!("{GID_PREFIX}{resource}/{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id_is_prefixed() {
        assert_eq!(
            normalize_gid("123", "Order").unwrap(),
            "gid://shopify/Order/123"
        );
    }

    #[test]
    fn test_matching_gid_passes_through() {
        let gid = "gid://shopify/Order/123";
        assert_eq!(normalize_gid(gid, "Order").unwrap(), gid);
    }

    #[test]
    fn test_mismatched_gid_is_a_usage_error() {
        let result = normalize_gid("gid://shopify/Product/123", "Order");
        assert!(matches!(result, Err(UsageError::MismatchedGid { .. })));
    }
}
