/// SP-API selling regions, each served by its own host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellingRegion {
    NorthAmerica,
    Europe,
    FarEast,
}

const NORTH_AMERICA_HINTS: &[&str] = &[
    "na",
    "north america",
    "us",
    "canada",
    "mexico",
    "brazil",
    "us-east-1",
];

const EUROPE_HINTS: &[&str] = &[
    "eu", "europe", "uk", "germany", "france", "italy", "spain", "india",
];

const FAR_EAST_HINTS: &[&str] = &["fe", "far east", "japan", "australia", "singapore"];

impl SellingRegion {
    pub fn endpoint(self) -> &'static str {
        match self {
            SellingRegion::NorthAmerica => "https://sellingpartnerapi-na.amazon.com",
            SellingRegion::Europe => "https://sellingpartnerapi-eu.amazon.com",
            SellingRegion::FarEast => "https://sellingpartnerapi-fe.amazon.com",
        }
    }

    /// Map a free-form region hint ("us-east-1", "Germany", "FE") to a region.
    ///
    /// Matching is a case-insensitive substring test with North America checked
    /// first, so "australia" (which contains "us") maps to North America.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.to_lowercase();
        let matches = |needles: &[&str]| needles.iter().any(|n| hint.contains(n));

        if matches(NORTH_AMERICA_HINTS) {
            Some(SellingRegion::NorthAmerica)
        } else if matches(EUROPE_HINTS) {
            Some(SellingRegion::Europe)
        } else if matches(FAR_EAST_HINTS) {
            Some(SellingRegion::FarEast)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_hints() {
        assert_eq!(SellingRegion::from_hint("us-east-1"), Some(SellingRegion::NorthAmerica));
        assert_eq!(SellingRegion::from_hint("Canada"), Some(SellingRegion::NorthAmerica));
        assert_eq!(SellingRegion::from_hint("Europe"), Some(SellingRegion::Europe));
        assert_eq!(SellingRegion::from_hint("Germany"), Some(SellingRegion::Europe));
        assert_eq!(SellingRegion::from_hint("JAPAN"), Some(SellingRegion::FarEast));
        assert_eq!(SellingRegion::from_hint("singapore"), Some(SellingRegion::FarEast));
    }

    #[test]
    fn north_america_wins_substring_ties() {
        assert_eq!(SellingRegion::from_hint("australia"), Some(SellingRegion::NorthAmerica));
    }

    #[test]
    fn unknown_hint_is_none() {
        assert_eq!(SellingRegion::from_hint("mars"), None);
        assert_eq!(SellingRegion::from_hint(""), None);
    }

    #[test]
    fn endpoints() {
        assert_eq!(
            SellingRegion::Europe.endpoint(),
            "https://sellingpartnerapi-eu.amazon.com"
        );
    }
}
