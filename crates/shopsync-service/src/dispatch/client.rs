//! ERP client identification from the User-Agent header.

use std::cmp::Ordering;
use std::fmt;

/// Dotted numeric version, compared component-wise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientVersion(Vec<u32>);

impl ClientVersion {
    /// Parse the leading dotted digits of `raw`. `None` if there are none.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<u32> = raw
            .split('.')
            .map_while(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().ok()
            })
            .collect();
        if parts.is_empty() { None } else { Some(Self(parts)) }
    }
}

impl Ord for ClientVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ClientVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// What is known about the calling client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub version: Option<ClientVersion>,
}

impl ClientInfo {
    /// Look for `<marker>/<version>` in the User-Agent.
    pub fn from_user_agent(user_agent: Option<&str>, marker: &str) -> Self {
        let version = user_agent.and_then(|ua| {
            let start = ua.find(marker)? + marker.len();
            let rest = ua[start..].strip_prefix('/')?;
            ClientVersion::parse(rest.split_whitespace().next().unwrap_or_default())
        });
        Self { version }
    }

    /// Unknown clients count as older than any version.
    pub fn is_at_least(&self, minimum: &ClientVersion) -> bool {
        self.version.as_ref().is_some_and(|v| v >= minimum)
    }
}
