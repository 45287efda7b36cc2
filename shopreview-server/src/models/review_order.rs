//! Sort orders for the per-shop review listing

use std::str::FromStr;

use super::ValidationError;

/// Review listing order.
///
/// Every order ends with `r.id` so pages are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOrder {
    #[default]
    Like,
    Scrap,
    /// Oldest first.
    Recent,
}

impl ReviewOrder {
    /// `ORDER BY` clause over the `r` alias of `review`.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Like => "r.like_count DESC, r.scrap_count DESC, r.id",
            Self::Scrap => "r.scrap_count DESC, r.like_count DESC, r.id",
            Self::Recent => "r.created_at, r.scrap_count DESC, r.id",
        }
    }

    /// Parse the optional `sort` query value, defaulting to `like`.
    pub fn from_param(value: Option<&str>) -> Result<Self, ValidationError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for ReviewOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "scrap" => Ok(Self::Scrap),
            "recent" => Ok(Self::Recent),
            _ => Err(ValidationError::InvalidVariant {
                field: "sort",
                value: s.to_owned(),
            }),
        }
    }
}
