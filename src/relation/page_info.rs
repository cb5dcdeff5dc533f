//! Cursor pagination metadata.

use serde_json::Value;

use crate::error::UsageError;

/// The `pageInfo` block of a GraphQL connection.
///
/// Built leniently from response JSON: missing keys read as `false` or
/// absent, so partial pageInfo selections still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    has_next_page: bool,
    has_previous_page: bool,
    start_cursor: Option<String>,
    end_cursor: Option<String>,
}

impl PageInfo {
    /// Reads a `pageInfo` object from response JSON.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let flag = |key: &str| value.get(key).and_then(Value::as_bool).unwrap_or(false);
        let cursor = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        Self {
            has_next_page: flag("hasNextPage"),
            has_previous_page: flag("hasPreviousPage"),
            start_cursor: cursor("startCursor"),
            end_cursor: cursor("endCursor"),
        }
    }

    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    /// The cursor of the first node on the page.
    #[must_use]
    pub fn start_cursor(&self) -> Option<&str> {
        self.start_cursor.as_deref()
    }

    /// The cursor of the last node on the page.
    #[must_use]
    pub fn end_cursor(&self) -> Option<&str> {
        self.end_cursor.as_deref()
    }

    /// A page is empty exactly when both cursors are absent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_cursor.is_none() && self.end_cursor.is_none()
    }
}

/// Cursor arguments for one page fetch.
///
/// An `after` cursor pages forward (`first`/`after`), a `before` cursor
/// pages backward (`last`/`before`). Supplying both is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// Fetch the page after this cursor.
    pub after: Option<String>,
    /// Fetch the page before this cursor.
    pub before: Option<String>,
}

impl PageArgs {
    /// Forward paging from an optional cursor.
    #[must_use]
    pub const fn forward(after: Option<String>) -> Self {
        Self {
            after,
            before: None,
        }
    }

    /// Backward paging from a cursor.
    #[must_use]
    pub const fn backward(before: String) -> Self {
        Self {
            after: None,
            before: Some(before),
        }
    }

    /// Whether this fetch pages backward.
    #[must_use]
    pub const fn is_backward(&self) -> bool {
        self.before.is_some()
    }

    /// Rejects a fetch that supplies both cursors.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::ConflictingCursors`] when both `after` and
    /// `before` are set.
    pub fn validate(&self) -> Result<(), UsageError> {
        if self.after.is_some() && self.before.is_some() {
            return Err(UsageError::ConflictingCursors);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_info_reads_full_block() {
        let info = PageInfo::from_json(&json!({
            "hasNextPage": true,
            "hasPreviousPage": false,
            "startCursor": "a",
            "endCursor": "b"
        }));
        assert!(info.has_next_page());
        assert!(!info.has_previous_page());
        assert_eq!(info.start_cursor(), Some("a"));
        assert_eq!(info.end_cursor(), Some("b"));
        assert!(!info.is_empty());
    }

    #[test]
    fn test_missing_keys_read_as_absent() {
        let info = PageInfo::from_json(&json!({}));
        assert!(!info.has_next_page());
        assert!(info.is_empty());
    }

    #[test]
    fn test_empty_means_both_cursors_absent() {
        let info = PageInfo::from_json(&json!({"startCursor": "a"}));
        assert!(!info.is_empty());
    }

    #[test]
    fn test_both_cursors_are_rejected() {
        let args = PageArgs {
            after: Some("a".to_string()),
            before: Some("b".to_string()),
        };
        assert_eq!(args.validate(), Err(UsageError::ConflictingCursors));
        assert!(PageArgs::forward(Some("a".to_string())).validate().is_ok());
        assert!(PageArgs::backward("b".to_string()).validate().is_ok());
    }
}
