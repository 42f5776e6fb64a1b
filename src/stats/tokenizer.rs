//! Reason Tokenizer Module
//! Splits multi-reason free-text answers into individual reason tokens.

use super::aggregator::{value_counts, FrequencyTable};
use crate::data::TextSeries;

/// Characters treated as separators in addition to the comma.
const EXTRA_SEPARATORS: [char; 2] = ['/', ';'];

/// Split every present cell into trimmed, title-cased reasons.
///
/// Output is in row order, then split order within a row. Missing cells
/// contribute nothing.
pub fn tokenize_reasons(series: &TextSeries) -> Vec<String> {
    series.present().flat_map(split_reasons).collect()
}

/// Split one answer on `,`, `/` and `;`.
pub fn split_reasons(text: &str) -> Vec<String> {
    text.replace(&EXTRA_SEPARATORS[..], ",")
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(title_case)
        .collect()
}

/// Frequency table over tokens, most frequent first.
pub fn count_tokens(tokens: &[String]) -> FrequencyTable {
    value_counts(tokens)
}

/// Upper-case the first letter of each word and lower-case the rest.
///
/// A word starts after any character that is neither alphanumeric nor an
/// apostrophe, so "don't" stays "Don't" and "wi-fi" becomes "Wi-Fi".
/// Unlike Python's `str.title()`, a letter after a digit or an apostrophe
/// is not capitalized: "2nd" stays "2nd" rather than "2Nd".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = !(ch.is_alphanumeric() || ch == '\'');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(cells: &[Option<&str>]) -> TextSeries {
        TextSeries::new(cells.iter().map(|c| c.map(str::to_string)).collect())
    }

    #[test]
    fn test_mixed_separators() {
        let tokens = split_reasons("High Cost/Safety Concerns; Inconvenient");
        assert_eq!(tokens, vec!["High Cost", "Safety Concerns", "Inconvenient"]);
    }

    #[test]
    fn test_empty_pieces_are_dropped() {
        let tokens = split_reasons(" , high cost,, ;/ ");
        assert_eq!(tokens, vec!["High Cost"]);
    }

    #[test]
    fn test_tokenize_row_then_split_order() {
        let series = text(&[
            Some("availability issues, HIGH COST"),
            None,
            Some("safety concerns"),
        ]);
        assert_eq!(
            tokenize_reasons(&series),
            vec!["Availability Issues", "High Cost", "Safety Concerns"]
        );
    }

    #[test]
    fn test_absent_column_yields_nothing() {
        let tokens = tokenize_reasons(&TextSeries::default());
        assert!(tokens.is_empty());
        assert!(count_tokens(&tokens).is_empty());
    }

    #[test]
    fn test_clean_token_is_stable() {
        let once = split_reasons("Preference For Personal Vehicle");
        assert_eq!(once, vec!["Preference For Personal Vehicle"]);
        assert_eq!(split_reasons(&once[0]), once);
    }

    #[test]
    fn test_title_case_word_boundaries() {
        assert_eq!(title_case("inconvenient pick-up"), "Inconvenient Pick-Up");
        assert_eq!(title_case("don't trust drivers"), "Don't Trust Drivers");
        assert_eq!(title_case("2nd option"), "2nd Option");
        assert_eq!(title_case("(late) arrivals"), "(Late) Arrivals");
    }

    #[test]
    fn test_count_tokens_orders_by_frequency() {
        let series = text(&[
            Some("High Cost/Safety"),
            Some("high cost"),
            Some("Safety; High cost"),
            Some("Availability"),
        ]);
        let counts = count_tokens(&tokenize_reasons(&series));

        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            vec![("High Cost", 3), ("Safety", 2), ("Availability", 1)]
        );
    }
}
