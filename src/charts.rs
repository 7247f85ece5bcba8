//! Chart-ready projections of the aggregate datasets.
//!
//! Breakdowns always carry the full fixed label set in a fixed order, with 0
//! for any label the backend left out. Labels the backend returns outside
//! that set (for example "Unknown" quality) are dropped.

use crate::models::{AggregateCounts, Quality, Sentiment, YearlyCounts};

/// A single-series chart over a fixed ordered label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownChart {
    pub labels: Vec<&'static str>,
    pub values: Vec<u64>,
}

impl BreakdownChart {
    fn project(labels: impl IntoIterator<Item = &'static str>, counts: &AggregateCounts) -> Self {
        let labels: Vec<&'static str> = labels.into_iter().collect();
        let values = labels.iter().map(|label| counts.count(label)).collect();
        Self { labels, values }
    }

    /// Project sentiment counts onto POSITIVE, NEUTRAL, NEGATIVE.
    pub fn sentiment(counts: &AggregateCounts) -> Self {
        Self::project(Sentiment::ALL.iter().map(Sentiment::label), counts)
    }

    /// Project quality counts onto High, Average, Low Quality.
    pub fn quality(counts: &AggregateCounts) -> Self {
        Self::project(Quality::ALL.iter().map(Quality::label), counts)
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.labels.iter().copied().zip(self.values.iter().copied())
    }
}

/// One stacked series of the yearly trend chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendSeries {
    pub sentiment: Sentiment,
    pub values: Vec<u64>,
}

impl TrendSeries {
    pub fn name(&self) -> &'static str {
        self.sentiment.series_name()
    }
}

/// Stacked-bar chart of sentiment per year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendChart {
    /// Years in the order the backend returned them.
    pub years: Vec<String>,
    /// One series per sentiment, in Positive, Neutral, Negative order.
    pub series: Vec<TrendSeries>,
}

impl TrendChart {
    pub fn from_yearly(yearly: &YearlyCounts) -> Self {
        let years = yearly.years().map(str::to_string).collect();
        let series = Sentiment::ALL
            .iter()
            .map(|sentiment| TrendSeries {
                sentiment: *sentiment,
                values: yearly
                    .0
                    .iter()
                    .map(|(_, counts)| counts.count(sentiment.label()))
                    .collect(),
            })
            .collect();
        Self { years, series }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
