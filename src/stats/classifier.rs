//! Classification rules and headline percentages.

use crate::data::DerivedSeries;

/// Travel-mode keywords that indicate a private vehicle.
pub const PRIVATE_VEHICLE_KEYWORDS: [&str; 3] = ["own car", "personal", "bike"];
/// Carpool answers counted as open to carpooling.
pub const OPEN_TO_CARPOOL_VALUES: [&str; 2] = ["yes", "maybe"];
/// Cab availability answers counted as reporting an issue.
pub const CAB_ISSUE_VALUES: [&str; 2] = ["yes", "sometimes"];

/// A membership rule applied to match-normalized values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// True when the value contains any keyword as a substring.
    ContainsAny(Vec<String>),
    /// True when the value equals one of the allowed values.
    OneOf(Vec<String>),
}

impl Rule {
    pub fn contains_any<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Rule::ContainsAny(Self::lowered(keywords))
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Rule::OneOf(Self::lowered(values))
    }

    pub fn private_vehicle() -> Self {
        Self::contains_any(PRIVATE_VEHICLE_KEYWORDS)
    }

    pub fn open_to_carpool() -> Self {
        Self::one_of(OPEN_TO_CARPOOL_VALUES)
    }

    pub fn cab_issue_reported() -> Self {
        Self::one_of(CAB_ISSUE_VALUES)
    }

    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        match self {
            Rule::ContainsAny(keywords) => keywords.iter().any(|k| value.contains(k.as_str())),
            Rule::OneOf(allowed) => allowed.iter().any(|a| *a == value),
        }
    }

    // Empty keywords would match every value
    fn lowered<I, S>(items: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Per-row true/false classification, aligned with the table by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanMask {
    flags: Vec<bool>,
}

impl BooleanMask {
    pub fn new(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn count_true(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Apply `rule` to every value of a match-normalized series.
pub fn classify(series: &DerivedSeries, rule: &Rule) -> BooleanMask {
    BooleanMask::new(series.iter().map(|v| rule.matches(v)).collect())
}

/// Share of true flags over `total` rows, as a percentage in [0, 100].
///
/// Zero rows give 0 rather than a division error.
pub fn metric_percentage(mask: &BooleanMask, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = mask.count_true() as f64 / total as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[&str]) -> DerivedSeries {
        DerivedSeries::new("test", values.iter().map(|v| v.to_lowercase()).collect())
    }

    #[test]
    fn test_private_vehicle_mask() {
        let modes = series(&["Own Car", "Ola/Uber", "Bike"]);
        let mask = classify(&modes, &Rule::private_vehicle());

        assert_eq!(mask.as_slice(), &[true, false, true]);
        let pct = metric_percentage(&mask, modes.len());
        assert!((pct - 66.666_666).abs() < 0.01);
    }

    #[test]
    fn test_private_vehicle_matches_substrings() {
        let modes = series(&["personal scooter", "my own car daily", "bus", ""]);
        let mask = classify(&modes, &Rule::private_vehicle());
        assert_eq!(mask.as_slice(), &[true, true, false, false]);
    }

    #[test]
    fn test_open_to_carpool_is_exact_membership() {
        let answers = series(&["Yes", "No", "Maybe", "yes", "yes please"]);
        let mask = classify(&answers, &Rule::open_to_carpool());

        assert_eq!(mask.as_slice(), &[true, false, true, true, false]);
        assert_eq!(mask.count_true(), 3);
    }

    #[test]
    fn test_cab_issue_values() {
        let answers = series(&["Sometimes", "No", "YES", ""]);
        let mask = classify(&answers, &Rule::cab_issue_reported());
        assert_eq!(mask.as_slice(), &[true, false, true, false]);
    }

    #[test]
    fn test_metric_percentage_zero_total() {
        let mask = BooleanMask::new(Vec::new());
        assert_eq!(metric_percentage(&mask, 0), 0.0);
    }

    #[test]
    fn test_metric_percentage_is_bounded() {
        let mask = BooleanMask::new(vec![true, true, true]);
        assert_eq!(metric_percentage(&mask, 3), 100.0);
        assert_eq!(metric_percentage(&mask, 1), 100.0);
    }

    #[test]
    fn test_empty_keywords_are_ignored() {
        let rule = Rule::contains_any(["", "  ", "Bike"]);
        assert_eq!(rule, Rule::ContainsAny(vec!["bike".to_string()]));
        assert!(!rule.matches("bus"));
    }
}
