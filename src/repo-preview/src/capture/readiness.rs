//! Readiness policies.

use serde::Deserialize;
use std::str::FromStr;

/// When a loaded document is considered stable enough to capture.
///
/// `NetworkIdle` waits for the page load, web fonts and a `complete` ready
/// state, which gives the most faithful image. `DomContentLoaded` only waits
/// for the markup to be parsed, which is faster and more reliable on
/// constrained CI runners but may capture before fonts or images arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadinessPolicy {
    /// Wait for network and resource loading to settle.
    #[default]
    NetworkIdle,
    /// Wait only until the document structure is parsed.
    DomContentLoaded,
}

impl ReadinessPolicy {
    /// `document.readyState` values accepted by this policy.
    #[must_use]
    pub fn accepted_ready_states(self) -> &'static [&'static str] {
        match self {
            Self::NetworkIdle => &["complete"],
            Self::DomContentLoaded => &["interactive", "complete"],
        }
    }

    /// Script reporting the page state checked against
    /// [`ReadinessPolicy::accepted_ready_states`].
    ///
    /// For network idle a loaded page reports `fonts-loading` until its web
    /// fonts are in. Neither script awaits a promise.
    #[must_use]
    pub fn ready_state_script(self) -> &'static str {
        match self {
            Self::NetworkIdle => {
                "(document.readyState === 'complete' \
                 && document.fonts && document.fonts.status !== 'loaded') \
                 ? 'fonts-loading' : document.readyState"
            }
            Self::DomContentLoaded => "document.readyState",
        }
    }

    /// Returns the configuration name of the policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkIdle => "network-idle",
            Self::DomContentLoaded => "dom-content-loaded",
        }
    }
}

impl FromStr for ReadinessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network-idle" => Ok(Self::NetworkIdle),
            "dom-content-loaded" | "dom" => Ok(Self::DomContentLoaded),
            other => Err(format!(
                "unknown readiness policy '{other}', expected network-idle or dom-content-loaded"
            )),
        }
    }
}
