//! Statistics module - classification, aggregation and reason tokenizing

mod aggregator;
mod classifier;
mod tokenizer;

pub use aggregator::{
    cross_tab, row_normalize, top_n, value_counts, CrossTab, FrequencyEntry, FrequencyTable,
    PercentageTable,
};
pub use classifier::{
    classify, metric_percentage, BooleanMask, Rule, CAB_ISSUE_VALUES, OPEN_TO_CARPOOL_VALUES,
    PRIVATE_VEHICLE_KEYWORDS,
};
pub use tokenizer::{count_tokens, split_reasons, title_case, tokenize_reasons};
