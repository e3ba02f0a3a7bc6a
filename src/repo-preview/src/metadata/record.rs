//! Repository metadata records.

use crate::targets::RepositoryIdentifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Description shown when a repository has none.
pub const MISSING_DESCRIPTION: &str = "No description provided";

/// Description shown when the metadata request failed.
pub const UNAVAILABLE_DESCRIPTION: &str = "Could not fetch repository details";

/// Language shown when GitHub reports none.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Repository fields displayed on a preview card. Every field is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryMetadata {
    /// Repository name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Primary language, or [`UNKNOWN_LANGUAGE`].
    pub language: String,
    /// Stargazer count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Repository web URL.
    pub url: String,
}

/// Repository payload as returned by `GET /repos/{owner}/{repo}`.
///
/// Only the displayed fields are read, and all of them are optional so a
/// sparse payload still maps to a complete record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryResponse {
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: Option<String>,
}

impl RepositoryMetadata {
    /// Record used when nothing could be fetched for `identifier`.
    #[must_use]
    pub fn placeholder(
        organization: &str,
        identifier: &RepositoryIdentifier,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: identifier.to_string(),
            description: UNAVAILABLE_DESCRIPTION.to_string(),
            language: UNKNOWN_LANGUAGE.to_string(),
            stars: 0,
            forks: 0,
            updated_at: now,
            url: repository_url(organization, identifier),
        }
    }

    /// Maps a provider response, defaulting each missing or blank field.
    #[must_use]
    pub fn from_response(
        organization: &str,
        identifier: &RepositoryIdentifier,
        response: RepositoryResponse,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: non_blank(response.name).unwrap_or_else(|| identifier.to_string()),
            description: non_blank(response.description)
                .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
            language: non_blank(response.language)
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            stars: response.stargazers_count.unwrap_or(0),
            forks: response.forks_count.unwrap_or(0),
            updated_at: response.updated_at.unwrap_or(now),
            url: non_blank(response.html_url)
                .unwrap_or_else(|| repository_url(organization, identifier)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn repository_url(organization: &str, identifier: &RepositoryIdentifier) -> String {
    format!("https://github.com/{organization}/{identifier}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 12, 0, 0).unwrap()
    }

    fn demo() -> RepositoryIdentifier {
        RepositoryIdentifier::new("demo").unwrap()
    }

    #[test]
    fn maps_full_response() {
        let response: RepositoryResponse = serde_json::from_str(
            r#"{
                "name": "demo",
                "description": "A demo repository",
                "language": "Rust",
                "stargazers_count": 42,
                "forks_count": 3,
                "updated_at": "2024-11-02T08:30:00Z",
                "html_url": "https://github.com/acme/demo",
                "private": false
            }"#,
        )
        .unwrap();

        let metadata = RepositoryMetadata::from_response("acme", &demo(), response, now());

        assert_eq!(metadata.name, "demo");
        assert_eq!(metadata.description, "A demo repository");
        assert_eq!(metadata.language, "Rust");
        assert_eq!(metadata.stars, 42);
        assert_eq!(metadata.forks, 3);
        assert_eq!(
            metadata.updated_at,
            Utc.with_ymd_and_hms(2024, 11, 2, 8, 30, 0).unwrap()
        );
        assert_eq!(metadata.url, "https://github.com/acme/demo");
    }

    #[test]
    fn defaults_every_missing_field() {
        let response: RepositoryResponse = serde_json::from_str("{}").unwrap();
        let metadata = RepositoryMetadata::from_response("acme", &demo(), response, now());

        assert_eq!(metadata.name, "demo");
        assert_eq!(metadata.description, MISSING_DESCRIPTION);
        assert_eq!(metadata.language, UNKNOWN_LANGUAGE);
        assert_eq!(metadata.stars, 0);
        assert_eq!(metadata.forks, 0);
        assert_eq!(metadata.updated_at, now());
        assert_eq!(metadata.url, "https://github.com/acme/demo");
    }

    #[test]
    fn treats_null_and_blank_as_missing() {
        let response: RepositoryResponse = serde_json::from_str(
            r#"{"name": " ", "description": null, "language": "", "html_url": null}"#,
        )
        .unwrap();
        let metadata = RepositoryMetadata::from_response("acme", &demo(), response, now());

        assert_eq!(metadata.name, "demo");
        assert_eq!(metadata.description, MISSING_DESCRIPTION);
        assert_eq!(metadata.language, UNKNOWN_LANGUAGE);
    }

    #[test]
    fn placeholder_is_complete() {
        let metadata = RepositoryMetadata::placeholder("acme", &demo(), now());

        assert_eq!(metadata.name, "demo");
        assert_eq!(metadata.description, UNAVAILABLE_DESCRIPTION);
        assert_eq!(metadata.language, UNKNOWN_LANGUAGE);
        assert_eq!(metadata.stars, 0);
        assert_eq!(metadata.forks, 0);
        assert_eq!(metadata.updated_at, now());
        assert_eq!(metadata.url, "https://github.com/acme/demo");
    }
}
