use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stable identifier of a repository entry in `repos.yml`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(pub String);

/// Stable identifier of a capability entry in `actions.yml`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(pub String);

/// Stable identifier of an action entry in `actions.yml`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

macro_rules! id_accessors {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn as_str(&self) -> &str {
                    &self.0
                }

                /// True when the id is absent or whitespace only.
                pub fn is_blank(&self) -> bool {
                    self.0.trim().is_empty()
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $ty {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

id_accessors!(RepoId, CapabilityId, ActionId);

/// Deployment tier of a repository.
///
/// Catalogs write tiers either as bare integers (`tier: 0`) or as labels
/// (`tier: tier_0`); both normalize to the same variant. `Other` keeps
/// unrecognized values around so the validator can name them.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Tier {
    Tier0,
    Tier1,
    Tier2,
    Other(String),
}

pub const RECOGNIZED_TIERS: &[&str] = &["tier_0", "tier_1", "tier_2"];

impl Tier {
    pub fn as_str(&self) -> &str {
        match self {
            Tier::Tier0 => "tier_0",
            Tier::Tier1 => "tier_1",
            Tier::Tier2 => "tier_2",
            Tier::Other(value) => value.as_str(),
        }
    }

    /// Parse a tier label, accepting `tier_<n>`, `<n>`, and `tier<n>`.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("tier_")
            .or_else(|| trimmed.strip_prefix("tier"))
            .unwrap_or(trimmed);
        match digits {
            "0" => Tier::Tier0,
            "1" => Tier::Tier1,
            "2" => Tier::Tier2,
            _ => Tier::Other(trimmed.to_string()),
        }
    }

    fn from_number(value: i64) -> Self {
        Self::parse(&format!("tier_{value}"))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Tier::Other(_))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTier {
            Number(i64),
            Label(String),
        }

        Ok(match RawTier::deserialize(deserializer)? {
            RawTier::Number(value) => Tier::from_number(value),
            RawTier::Label(label) => Tier::parse(&label),
        })
    }
}

/// HTTP verbs an action may declare.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

pub const RECOGNIZED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD"];

impl HttpMethod {
    /// Case-insensitive parse of a declared method.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Lower-cased key used for OpenAPI path items.
    pub fn openapi_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}
