//! Like and scrap share one storage shape: a `(user_id, review_id)` keyed
//! table with an `is_deleted` flag, plus a denormalized counter on `review`.

/// Kind of per-user reaction on a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    Like,
    Scrap,
}

impl Reaction {
    /// Table holding the per-user rows.
    pub fn table(self) -> &'static str {
        match self {
            Self::Like => "review_like",
            Self::Scrap => "review_scrap",
        }
    }

    /// Counter column on `review`.
    pub fn count_column(self) -> &'static str {
        match self {
            Self::Like => "like_count",
            Self::Scrap => "scrap_count",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Scrap => "scrap",
        }
    }
}
