//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers answer a missing field with one stable, endpoint-specific code
//! such as `startupId_required`, never with a generic message.

use crate::domain::Error;

/// Non-blank text or `code`.
pub(crate) fn required_text(value: Option<String>, code: &str) -> Result<String, Error> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::invalid_request(code))
}

/// Blank strings count as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn blank_text_is_missing(#[case] value: Option<&str>) {
        let err = required_text(value.map(str::to_owned), "startupId_required").expect_err("missing");
        assert_eq!(err.code(), "startupId_required");
    }

    #[test]
    fn optional_text_drops_blanks() {
        assert_eq!(optional_text(Some(" ".to_owned())), None);
        assert_eq!(optional_text(Some("n1".to_owned())).as_deref(), Some("n1"));
    }
}
