//! `gs://bucket/object` locations.

use std::fmt;

/// Location of an object in a bucket.
///
/// # Examples
/// ```
/// use dealroom::domain::GcsUri;
///
/// let uri = GcsUri::parse("gs://uploads/pitch_decks/s1/deck.pdf").expect("valid uri");
/// assert_eq!(uri.bucket(), "uploads");
/// assert_eq!(uri.object(), "pitch_decks/s1/deck.pdf");
/// assert!(GcsUri::parse("https://example.com/deck.pdf").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GcsUri {
    bucket: String,
    object: String,
}

impl GcsUri {
    /// Build a location from parts.
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
        }
    }

    /// Parse a `gs://` URI. Both bucket and object must be non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix("gs://")?;
        let (bucket, object) = rest.split_once('/')?;
        if bucket.is_empty() || object.is_empty() {
            return None;
        }
        Some(Self::new(bucket, object))
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object name within the bucket.
    pub fn object(&self) -> &str {
        &self.object
    }
}

impl fmt::Display for GcsUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("gs://b")]
    #[case("gs:///object")]
    #[case("gs://bucket/")]
    #[case("s3://bucket/object")]
    fn rejects_incomplete_uris(#[case] raw: &str) {
        assert!(GcsUri::parse(raw).is_none());
    }

    #[test]
    fn display_round_trips() {
        let raw = "gs://startup-analyst-uploads/pitch_decks/s/1_deck.pdf";
        let uri = GcsUri::parse(raw).expect("valid uri");
        assert_eq!(uri.to_string(), raw);
    }
}
