//! Area/theme filter for the shop listing

use super::{messages, ValidationError};

/// At least one of `area` or `theme`; both narrows to shops matching both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopFilter {
    area: Option<String>,
    theme: Option<String>,
}

impl ShopFilter {
    /// Build a filter, treating blank values as absent.
    pub fn new(area: Option<String>, theme: Option<String>) -> Result<Self, ValidationError> {
        let area = non_blank(area);
        let theme = non_blank(theme);

        if area.is_none() && theme.is_none() {
            return Err(ValidationError::Missing {
                field: "area or theme",
            });
        }

        Ok(Self { area, theme })
    }

    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Success message matching the filter kind.
    pub fn message(&self) -> &'static str {
        match (&self.area, &self.theme) {
            (Some(_), Some(_)) => messages::SHOP_BY_AREA_AND_THEME_SUCCESS,
            (None, Some(_)) => messages::SHOP_BY_THEME_SUCCESS,
            _ => messages::SHOP_BY_AREA_SUCCESS,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_area_or_theme() {
        assert!(ShopFilter::new(None, None).is_err());
        assert!(ShopFilter::new(Some("  ".into()), Some(String::new())).is_err());
    }

    #[test]
    fn message_follows_filter() {
        let area = ShopFilter::new(Some("seongsu".into()), None).unwrap();
        assert_eq!(area.message(), messages::SHOP_BY_AREA_SUCCESS);
        assert_eq!(area.theme(), None);

        let theme = ShopFilter::new(None, Some("vintage".into())).unwrap();
        assert_eq!(theme.message(), messages::SHOP_BY_THEME_SUCCESS);

        let both = ShopFilter::new(Some("seongsu".into()), Some("vintage".into())).unwrap();
        assert_eq!(both.message(), messages::SHOP_BY_AREA_AND_THEME_SUCCESS);
        assert_eq!(both.area(), Some("seongsu"));
    }
}
