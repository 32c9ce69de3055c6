use super::parse_bool_env;
use anyhow::Result;
use serde::Serialize;
use std::{env, fmt, str::FromStr};

/// Depth of the content tree below a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLayout {
    /// Category → Forum → Topic → Post
    Nested,
    /// Category → Post → Comment
    Flat,
}

impl FromStr for HierarchyLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nested" => Ok(Self::Nested),
            "flat" => Ok(Self::Flat),
            other => Err(anyhow::anyhow!(
                "FORUM_LAYOUT must be 'nested' or 'flat', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for HierarchyLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nested => f.write_str("nested"),
            Self::Flat => f.write_str("flat"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForumConfig {
    pub layout: HierarchyLayout,
    pub seed_demo_content: bool,
}

impl ForumConfig {
    pub fn from_env() -> Result<Self> {
        let layout = match env::var("FORUM_LAYOUT") {
            Ok(raw) => raw.parse()?,
            Err(_) => HierarchyLayout::Nested,
        };

        Ok(Self {
            layout,
            seed_demo_content: parse_bool_env("SEED_DEMO_CONTENT", false),
        })
    }
}
