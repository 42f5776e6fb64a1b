//! Report module - assembles every survey metric into one value.
//!
//! A [`Report`] is built once from a [`ResponseTable`] and handed to the
//! renderer as a list of [`ChartRequest`]s. Nothing here is mutated after
//! construction.

use crate::charts::{ChartKind, ChartRequest, ChartTable};
use crate::config::ReportSettings;
use crate::data::{load, FieldNormalizer, LoaderError, ResponseTable};
use crate::stats::{
    classify, count_tokens, cross_tab, metric_percentage, row_normalize, tokenize_reasons, top_n,
    value_counts, FrequencyTable, PercentageTable, Rule,
};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const TRAVEL_MODE: &str = "Travel Mode";
pub const CARPOOL_WILLINGNESS: &str = "Carpool Willingness";
pub const CAB_AVAILABILITY_ISSUES: &str = "Cab Availability Issues";
pub const RIDE_HAILING_REASONS: &str = "Reason for not using Ola/Uber/Rapido frequently";
pub const CARPOOL_REASONS: &str = "Reason for not preferring carpooling";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Load(#[from] LoaderError),
}

/// One KPI card: label and formatted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlineMetric {
    pub label: &'static str,
    pub value: String,
}

/// Every named result of one report generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub total_responses: usize,
    pub pct_private_vehicle: f64,
    pub pct_open_carpool: f64,
    pub pct_cab_issues: f64,
    /// Drawn as a donut.
    pub travel_mode_distribution: FrequencyTable,
    /// Drawn as a stacked bar.
    pub cab_issue_by_mode_pct: PercentageTable,
    /// Drawn as a bar.
    pub carpool_willingness_counts: FrequencyTable,
    /// Drawn as a horizontal bar.
    pub top_reasons_no_ride_hailing: Vec<(String, usize)>,
    /// Drawn as a treemap with 2+ labels, otherwise a horizontal bar.
    pub reasons_against_carpooling: FrequencyTable,
}

impl Report {
    /// Compute all metrics from `table`. Never fails; absent columns yield
    /// empty aggregates and zero rows yield zero percentages.
    pub fn generate(table: &ResponseTable, settings: &ReportSettings) -> Self {
        let total_responses = table.height();

        let travel_mode = FieldNormalizer::normalize_for_match(table, TRAVEL_MODE);
        let carpool = FieldNormalizer::normalize_for_match(table, CARPOOL_WILLINGNESS);
        let cab_issue = FieldNormalizer::normalize_for_match(table, CAB_AVAILABILITY_ISSUES);

        let pct_private_vehicle = metric_percentage(
            &classify(&travel_mode, &Rule::private_vehicle()),
            total_responses,
        );
        let pct_open_carpool =
            metric_percentage(&classify(&carpool, &Rule::open_to_carpool()), total_responses);
        let pct_cab_issues = metric_percentage(
            &classify(&cab_issue, &Rule::cab_issue_reported()),
            total_responses,
        );

        let mode_display = FieldNormalizer::normalize_for_display(table, TRAVEL_MODE);
        let issue_display = FieldNormalizer::normalize_for_display(table, CAB_AVAILABILITY_ISSUES);
        let carpool_display = FieldNormalizer::normalize_for_display(table, CARPOOL_WILLINGNESS);

        let travel_mode_distribution = value_counts(mode_display.values());
        let cab_issue_by_mode_pct =
            row_normalize(&cross_tab(mode_display.values(), issue_display.values()));
        let carpool_willingness_counts = value_counts(carpool_display.values());

        let ride_hailing_tokens =
            tokenize_reasons(&FieldNormalizer::free_text(table, RIDE_HAILING_REASONS));
        let top_reasons_no_ride_hailing =
            top_n(&count_tokens(&ride_hailing_tokens), settings.top_reasons);

        let carpool_tokens = tokenize_reasons(&FieldNormalizer::free_text(table, CARPOOL_REASONS));
        let reasons_against_carpooling = count_tokens(&carpool_tokens);

        debug!(
            ride_hailing_tokens = ride_hailing_tokens.len(),
            carpool_tokens = carpool_tokens.len(),
            "tokenized reason fields"
        );
        info!(
            total_responses,
            pct_private_vehicle, pct_open_carpool, pct_cab_issues, "report generated"
        );

        Self {
            total_responses,
            pct_private_vehicle,
            pct_open_carpool,
            pct_cab_issues,
            travel_mode_distribution,
            cab_issue_by_mode_pct,
            carpool_willingness_counts,
            top_reasons_no_ride_hailing,
            reasons_against_carpooling,
        }
    }

    /// The four KPI cards shown above the charts.
    pub fn headline_metrics(&self) -> Vec<HeadlineMetric> {
        vec![
            HeadlineMetric {
                label: "Total responses",
                value: self.total_responses.to_string(),
            },
            HeadlineMetric {
                label: "Private vehicle %",
                value: format!("{:.0}%", self.pct_private_vehicle),
            },
            HeadlineMetric {
                label: "Open to carpool %",
                value: format!("{:.0}%", self.pct_open_carpool),
            },
            HeadlineMetric {
                label: "Report cab availability issues %",
                value: format!("{:.0}%", self.pct_cab_issues),
            },
        ]
    }

    /// One chart request per charted result, in page order.
    ///
    /// Every request has already been through the fallback chain, so each
    /// one is drawable as given.
    pub fn chart_requests(&self, settings: &ReportSettings) -> Vec<ChartRequest> {
        let mut requests = Vec::with_capacity(5);

        requests.push(ChartRequest::new(
            "travel_mode_distribution",
            ChartKind::Donut,
            "Travel Mode Distribution",
            frequency_categories(self.travel_mode_distribution.iter()),
        ));

        let pct = &self.cab_issue_by_mode_pct;
        requests.push(
            ChartRequest::new(
                "cab_issue_by_mode_pct",
                ChartKind::StackedBar,
                "Cab Availability Issues across Travel Modes",
                ChartTable::Matrix {
                    rows: pct.rows.clone(),
                    columns: pct.columns.clone(),
                    values: pct.values.clone(),
                },
            )
            .with_axes(TRAVEL_MODE, "Percentage %"),
        );

        requests.push(
            ChartRequest::new(
                "carpool_willingness_counts",
                ChartKind::Bar,
                "Carpool Willingness (Yes / No / Maybe)",
                frequency_categories(self.carpool_willingness_counts.iter()),
            )
            .with_axes("Response", "Count"),
        );

        requests.push(if self.top_reasons_no_ride_hailing.is_empty() {
            ChartRequest::notice(
                "top_reasons_no_ride_hailing",
                "Top Reasons for Not Using Ola/Uber/Rapido",
                "No reasons recorded for not using Ola/Uber/Rapido frequently.",
            )
        } else {
            ChartRequest::new(
                "top_reasons_no_ride_hailing",
                ChartKind::HorizontalBar,
                "Top Reasons for Not Using Ola/Uber/Rapido",
                frequency_categories(
                    self.top_reasons_no_ride_hailing
                        .iter()
                        .map(|(label, count)| (label.as_str(), *count)),
                ),
            )
            .with_axes("Count", "Reason")
        });

        let carpool_reasons = &self.reasons_against_carpooling;
        requests.push(if carpool_reasons.is_empty() {
            ChartRequest::notice(
                "reasons_against_carpooling",
                "Reasons for Not Preferring Carpooling",
                "No reasons recorded for not preferring carpooling.",
            )
        } else {
            let kind = if carpool_reasons.len() >= 2 {
                ChartKind::Treemap
            } else {
                ChartKind::HorizontalBar
            };
            ChartRequest::new(
                "reasons_against_carpooling",
                kind,
                "Reasons for Not Preferring Carpooling",
                frequency_categories(
                    carpool_reasons.iter().take(settings.carpool_reason_limit),
                ),
            )
            .with_axes("Count", "Reason")
        });

        requests.into_iter().map(ChartRequest::prepare).collect()
    }
}

fn frequency_categories<'a>(entries: impl Iterator<Item = (&'a str, usize)>) -> ChartTable {
    ChartTable::Categories(
        entries
            .map(|(label, count)| (label.to_string(), count as f64))
            .collect(),
    )
}

/// Load the CSV at `path` and build its report.
///
/// Load failure is the only error; no partial report is produced.
pub fn generate_report_from_path(
    path: &Path,
    settings: &ReportSettings,
) -> Result<Report, ReportError> {
    let table = load(path)?;
    Ok(Report::generate(&table, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MISSING_LABEL;

    fn survey_table() -> ResponseTable {
        ResponseTable::from_columns(vec![
            (
                TRAVEL_MODE,
                vec![Some("Own Car"), Some("Ola/Uber"), Some("Bike"), None],
            ),
            (
                CARPOOL_WILLINGNESS,
                vec![Some("Yes"), Some("No"), Some("Maybe"), Some("yes")],
            ),
            (
                CAB_AVAILABILITY_ISSUES,
                vec![Some("No"), Some("Yes"), Some("Sometimes"), None],
            ),
            (
                RIDE_HAILING_REASONS,
                vec![
                    Some("High Cost/Safety Concerns; Inconvenient"),
                    Some("high cost"),
                    None,
                    Some("Availability Issues, HIGH COST"),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_headline_percentages() {
        let report = Report::generate(&survey_table(), &ReportSettings::default());

        assert_eq!(report.total_responses, 4);
        assert!((report.pct_private_vehicle - 50.0).abs() < 1e-9);
        assert!((report.pct_open_carpool - 75.0).abs() < 1e-9);
        assert!((report.pct_cab_issues - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_tables() {
        let report = Report::generate(&survey_table(), &ReportSettings::default());

        assert_eq!(
            report.carpool_willingness_counts.iter().collect::<Vec<_>>(),
            vec![("Yes", 2), ("No", 1), ("Maybe", 1)]
        );
        assert_eq!(report.travel_mode_distribution.get(MISSING_LABEL), Some(1));
        assert_eq!(report.travel_mode_distribution.total(), 4);
    }

    #[test]
    fn test_cab_issue_crosstab_rows_sum_to_100() {
        let report = Report::generate(&survey_table(), &ReportSettings::default());
        let pct = &report.cab_issue_by_mode_pct;

        assert_eq!(pct.rows, vec!["(Missing)", "Bike", "Ola/Uber", "Own Car"]);
        for row in 0..pct.rows.len() {
            assert!((pct.row_sum(row) - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_top_reasons() {
        let report = Report::generate(&survey_table(), &ReportSettings::default());

        assert_eq!(
            report.top_reasons_no_ride_hailing[0],
            ("High Cost".to_string(), 3)
        );
        assert_eq!(report.top_reasons_no_ride_hailing.len(), 4);

        let settings = ReportSettings {
            top_reasons: 2,
            ..ReportSettings::default()
        };
        let report = Report::generate(&survey_table(), &settings);
        assert_eq!(report.top_reasons_no_ride_hailing.len(), 2);
    }

    #[test]
    fn test_absent_optional_column_gives_notice() {
        let settings = ReportSettings::default();
        let report = Report::generate(&survey_table(), &settings);
        assert!(report.reasons_against_carpooling.is_empty());

        let requests = report.chart_requests(&settings);
        let carpool = &requests[4];
        assert_eq!(carpool.kind, ChartKind::Notice);
        assert_eq!(
            carpool.table,
            ChartTable::Message("No reasons recorded for not preferring carpooling.".into())
        );
    }

    #[test]
    fn test_chart_kinds_in_page_order() {
        let mut columns = vec![(
            CARPOOL_REASONS,
            vec![Some("Inflexible schedule, Autonomy"), Some("safety")],
        )];
        columns.push((TRAVEL_MODE, vec![Some("Bike"), Some("Bus")]));
        let table = ResponseTable::from_columns(columns).unwrap();

        let settings = ReportSettings::default();
        let kinds: Vec<ChartKind> = Report::generate(&table, &settings)
            .chart_requests(&settings)
            .iter()
            .map(|r| r.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                ChartKind::Donut,
                ChartKind::StackedBar,
                ChartKind::Bar,
                ChartKind::Notice,
                ChartKind::Treemap,
            ]
        );
    }

    #[test]
    fn test_single_carpool_reason_uses_bar() {
        let table = ResponseTable::from_columns(vec![(
            CARPOOL_REASONS,
            vec![Some("Autonomy"), Some("autonomy")],
        )])
        .unwrap();
        let settings = ReportSettings::default();
        let requests = Report::generate(&table, &settings).chart_requests(&settings);

        assert_eq!(requests[4].kind, ChartKind::HorizontalBar);
        assert!(!requests[4].is_fallback());
    }

    #[test]
    fn test_zero_rows() {
        let settings = ReportSettings::default();
        let report = Report::generate(&ResponseTable::empty(), &settings);

        assert_eq!(report.total_responses, 0);
        assert_eq!(report.pct_private_vehicle, 0.0);
        assert_eq!(report.pct_open_carpool, 0.0);
        assert_eq!(report.pct_cab_issues, 0.0);
        assert!(report.travel_mode_distribution.is_empty());
        assert!(report.carpool_willingness_counts.is_empty());
        assert!(report.cab_issue_by_mode_pct.is_empty());
        assert!(report.top_reasons_no_ride_hailing.is_empty());
        assert!(report.reasons_against_carpooling.is_empty());

        // Empty tables degrade to notices rather than failing
        let requests = report.chart_requests(&settings);
        assert_eq!(requests.len(), 5);
        assert!(requests.iter().all(|r| r.kind == ChartKind::Notice));
        assert!(requests[0].is_fallback());
    }

    #[test]
    fn test_headline_metrics_formatting() {
        let table = ResponseTable::from_columns(vec![(
            TRAVEL_MODE,
            vec![Some("Own Car"), Some("Ola/Uber"), Some("Bike")],
        )])
        .unwrap();
        let report = Report::generate(&table, &ReportSettings::default());
        let metrics = report.headline_metrics();

        assert_eq!(metrics[0].value, "3");
        assert_eq!(metrics[1].label, "Private vehicle %");
        assert_eq!(metrics[1].value, "67%");
        assert_eq!(metrics[2].value, "0%");
    }
}
