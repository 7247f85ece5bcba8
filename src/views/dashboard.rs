//! Aggregate dashboard: sentiment and quality breakdowns plus the yearly
//! sentiment trend.
//!
//! The two breakdowns are fetched together whenever the year filter changes
//! and share one generation: the pair is Loaded only when both arrive, and
//! Failed as soon as either fails. The yearly trend is fetched once on mount
//! and is tracked on its own.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::View;
use crate::api::{ApiRequest, Endpoint, FetchError, QueryParams};
use crate::charts::{BreakdownChart, TrendChart};
use crate::models::{decode, decode_yearly, AggregateCounts};
use crate::state::{FetchState, Generation, Slot, Ticket};

pub const LOAD_ERROR: &str = "Failed to load dashboard data.";
const YEARLY_ERROR: &str = "Failed to load yearly sentiment.";

/// Years the backend has data for.
pub const KNOWN_YEARS: RangeInclusive<u16> = 2020..=2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown year {0} (expected {start}-{end})", start = KNOWN_YEARS.start(), end = KNOWN_YEARS.end())]
pub struct InvalidYear(pub u16);

/// Restricts the breakdowns to a single year.
///
/// A specific year can only be built through [`YearFilter::year`], so every
/// filter holds a year from [`KNOWN_YEARS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct YearFilter(Option<u16>);

impl YearFilter {
    /// No year restriction.
    pub const ALL: YearFilter = YearFilter(None);

    pub fn year(year: u16) -> Result<Self, InvalidYear> {
        if KNOWN_YEARS.contains(&year) {
            Ok(YearFilter(Some(year)))
        } else {
            Err(InvalidYear(year))
        }
    }

    /// Value for the `year` query parameter, if any.
    pub fn as_param(&self) -> Option<u16> {
        self.0
    }

    /// Every selectable filter, "all years" first.
    pub fn options() -> impl Iterator<Item = YearFilter> {
        std::iter::once(YearFilter::ALL).chain(KNOWN_YEARS.map(|year| YearFilter(Some(year))))
    }
}

impl FromStr for YearFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(YearFilter::ALL);
        }
        let year: u16 = s
            .parse()
            .map_err(|_| format!("year must be a number or \"all\", got {s:?}"))?;
        YearFilter::year(year).map_err(|e| e.to_string())
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("All Years"),
            Some(year) => write!(f, "{}", year),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardSlot {
    Sentiment,
    Quality,
    Yearly,
}

/// Both breakdown charts, available only together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdowns {
    pub sentiment: BreakdownChart,
    pub quality: BreakdownChart,
}

/// Which half of the breakdown pair a completion belongs to.
#[derive(Debug, Clone, Copy)]
enum BreakdownKind {
    Sentiment,
    Quality,
}

impl BreakdownKind {
    fn endpoint(self) -> Endpoint {
        match self {
            BreakdownKind::Sentiment => Endpoint::Sentiment,
            BreakdownKind::Quality => Endpoint::Quality,
        }
    }
}

#[derive(Debug, Default)]
struct PendingPair {
    sentiment: Option<AggregateCounts>,
    quality: Option<AggregateCounts>,
}

#[derive(Debug)]
pub struct DashboardView {
    year: YearFilter,
    breakdowns: Slot<Breakdowns, YearFilter>,
    pending: PendingPair,
    yearly: Slot<TrendChart>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::with_year(YearFilter::ALL)
    }

    pub fn with_year(year: YearFilter) -> Self {
        Self {
            year,
            breakdowns: Slot::new("breakdowns"),
            pending: PendingPair::default(),
            yearly: Slot::new("sentiment_yearly"),
        }
    }

    pub fn year(&self) -> YearFilter {
        self.year
    }

    pub fn set_year(&mut self, year: YearFilter) {
        self.year = year;
    }

    pub fn breakdowns(&self) -> &FetchState<Breakdowns> {
        self.breakdowns.state()
    }

    pub fn trend(&self) -> &FetchState<TrendChart> {
        self.yearly.state()
    }

    pub fn is_loading(&self) -> bool {
        self.breakdowns.is_loading()
    }

    /// `GET sentiment[?year=Y]` and `GET quality[?year=Y]`.
    pub fn breakdown_requests(&self) -> [ApiRequest; 2] {
        let params = QueryParams::new().insert_opt("year", self.year.as_param());
        [
            ApiRequest::new(Endpoint::Sentiment, params.clone()),
            ApiRequest::new(Endpoint::Quality, params),
        ]
    }

    fn apply_breakdown(
        &mut self,
        kind: BreakdownKind,
        generation: Generation,
        result: Result<Value, FetchError>,
    ) {
        if !self.breakdowns.accepts(generation) {
            return;
        }
        let endpoint = kind.endpoint();

        match result.and_then(|body| decode::<AggregateCounts>(endpoint, body)) {
            Ok(counts) => {
                match kind {
                    BreakdownKind::Sentiment => self.pending.sentiment = Some(counts),
                    BreakdownKind::Quality => self.pending.quality = Some(counts),
                }
                match std::mem::take(&mut self.pending) {
                    PendingPair {
                        sentiment: Some(sentiment),
                        quality: Some(quality),
                    } => {
                        let charts = Breakdowns {
                            sentiment: BreakdownChart::sentiment(&sentiment),
                            quality: BreakdownChart::quality(&quality),
                        };
                        self.breakdowns.resolve(generation, Ok(charts));
                    }
                    incomplete => self.pending = incomplete,
                }
            }
            Err(e) => {
                warn!("Error fetching {} breakdown: {}", endpoint, e);
                self.pending = PendingPair::default();
                self.breakdowns
                    .resolve(generation, Err(LOAD_ERROR.to_string()));
            }
        }
    }

    fn apply_yearly(&mut self, generation: Generation, result: Result<Value, FetchError>) {
        if !self.yearly.accepts(generation) {
            return;
        }
        match result.and_then(decode_yearly) {
            Ok(yearly) => {
                self.yearly
                    .resolve(generation, Ok(TrendChart::from_yearly(&yearly)));
            }
            Err(e) => {
                warn!("Error fetching yearly sentiment: {}", e);
                self.yearly.resolve(generation, Err(YEARLY_ERROR.to_string()));
            }
        }
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for DashboardView {
    type Key = DashboardSlot;

    fn poll_requests(&mut self) -> Vec<Ticket<DashboardSlot>> {
        let mut tickets = Vec::new();

        if self.breakdowns.needs(&self.year) {
            let generation = self.breakdowns.begin(self.year);
            self.pending = PendingPair::default();
            let [sentiment, quality] = self.breakdown_requests();
            tickets.push(Ticket {
                slot: DashboardSlot::Sentiment,
                generation,
                request: sentiment,
            });
            tickets.push(Ticket {
                slot: DashboardSlot::Quality,
                generation,
                request: quality,
            });
        }

        // Mount-only and independent of the year filter.
        tickets.extend(super::issue(
            &mut self.yearly,
            DashboardSlot::Yearly,
            ApiRequest::bare(Endpoint::SentimentYearly),
        ));

        tickets
    }

    fn apply(&mut self, ticket: &Ticket<DashboardSlot>, result: Result<Value, FetchError>) {
        match ticket.slot {
            DashboardSlot::Sentiment => {
                self.apply_breakdown(BreakdownKind::Sentiment, ticket.generation, result)
            }
            DashboardSlot::Quality => {
                self.apply_breakdown(BreakdownKind::Quality, ticket.generation, result)
            }
            DashboardSlot::Yearly => self.apply_yearly(ticket.generation, result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn take(tickets: &mut Vec<Ticket<DashboardSlot>>, slot: DashboardSlot) -> Ticket<DashboardSlot> {
        let index = tickets
            .iter()
            .position(|t| t.slot == slot)
            .expect("ticket for slot");
        tickets.remove(index)
    }

    #[test]
    fn test_year_filter_parsing() {
        assert_eq!("all".parse::<YearFilter>(), Ok(YearFilter::ALL));
        assert_eq!("".parse::<YearFilter>(), Ok(YearFilter::ALL));
        assert_eq!("2022".parse::<YearFilter>(), Ok(YearFilter::year(2022).unwrap()));
        assert!("2019".parse::<YearFilter>().is_err());
        assert!("last year".parse::<YearFilter>().is_err());
        assert_eq!(YearFilter::year(2030), Err(InvalidYear(2030)));
    }

    #[test]
    fn test_year_options() {
        let options: Vec<_> = YearFilter::options().collect();
        assert_eq!(options.len(), 6);
        assert_eq!(options[0], YearFilter::ALL);
        assert_eq!(options[5], YearFilter::year(2024).unwrap());
    }

    #[test]
    fn test_year_filter_only_holds_known_years() {
        assert_eq!(YearFilter::year(1999), Err(InvalidYear(1999)));
        assert_eq!(YearFilter::default(), YearFilter::ALL);
        for filter in YearFilter::options() {
            if let Some(year) = filter.as_param() {
                assert!(KNOWN_YEARS.contains(&year));
            }
        }

        let mut view = DashboardView::new();
        view.set_year("2022".parse().unwrap());
        let [sentiment, _] = view.breakdown_requests();
        assert_eq!(sentiment.path_and_query(), "sentiment?year=2022");
    }

    #[test]
    fn test_mount_issues_three_requests() {
        let mut view = DashboardView::new();
        let tickets = view.poll_requests();
        let paths: Vec<_> = tickets.iter().map(|t| t.request.path_and_query()).collect();
        assert_eq!(paths, vec!["sentiment", "quality", "sentiment_yearly"]);
        assert_eq!(tickets[0].generation, tickets[1].generation);
        assert!(view.is_loading());
    }

    #[test]
    fn test_pair_loaded_only_when_both_arrive() {
        let mut view = DashboardView::new();
        let mut tickets = view.poll_requests();
        let sentiment = take(&mut tickets, DashboardSlot::Sentiment);
        let quality = take(&mut tickets, DashboardSlot::Quality);

        view.apply(&quality, Ok(json!({"High Quality": 3, "Low Quality": 1})));
        assert!(view.is_loading());

        view.apply(&sentiment, Ok(json!({"POSITIVE": 10})));
        let charts = view.breakdowns().loaded().expect("loaded");
        assert_eq!(charts.sentiment.values, vec![10, 0, 0]);
        assert_eq!(charts.quality.values, vec![3, 0, 1]);
    }

    #[test]
    fn test_one_failure_fails_the_pair() {
        let mut view = DashboardView::with_year(YearFilter::year(2022).unwrap());
        let mut tickets = view.poll_requests();
        let sentiment = take(&mut tickets, DashboardSlot::Sentiment);
        let quality = take(&mut tickets, DashboardSlot::Quality);
        assert_eq!(sentiment.request.path_and_query(), "sentiment?year=2022");
        assert_eq!(quality.request.path_and_query(), "quality?year=2022");

        view.apply(&sentiment, Ok(json!({"POSITIVE": 1})));
        view.apply(&quality, Err(FetchError::HttpStatus(500)));
        assert_eq!(view.breakdowns().error(), Some(LOAD_ERROR));
    }

    #[test]
    fn test_late_sibling_after_failure_is_ignored() {
        let mut view = DashboardView::new();
        let mut tickets = view.poll_requests();
        let sentiment = take(&mut tickets, DashboardSlot::Sentiment);
        let quality = take(&mut tickets, DashboardSlot::Quality);

        view.apply(&quality, Err(FetchError::Transport("reset".to_string())));
        view.apply(&sentiment, Ok(json!({"POSITIVE": 1})));
        assert_eq!(view.breakdowns().error(), Some(LOAD_ERROR));
    }

    #[test]
    fn test_year_change_refetches_pair_but_not_trend() {
        let mut view = DashboardView::new();
        let mut tickets = view.poll_requests();
        let yearly = take(&mut tickets, DashboardSlot::Yearly);
        view.apply(&yearly, Ok(json!({"2020": {"POSITIVE": 1}})));

        view.set_year(YearFilter::year(2021).unwrap());
        let tickets = view.poll_requests();
        let slots: Vec<_> = tickets.iter().map(|t| t.slot).collect();
        assert_eq!(slots, vec![DashboardSlot::Sentiment, DashboardSlot::Quality]);

        // Trend state changing on its own must not refire the pair.
        assert!(view.poll_requests().is_empty());
    }

    #[test]
    fn test_setting_same_year_does_not_refetch() {
        let mut view = DashboardView::with_year(YearFilter::year(2023).unwrap());
        view.poll_requests();
        view.set_year(YearFilter::year(2023).unwrap());
        assert!(view.poll_requests().is_empty());
    }

    #[test]
    fn test_stale_pair_is_discarded() {
        let mut view = DashboardView::new();
        let mut old = view.poll_requests();
        view.set_year(YearFilter::year(2024).unwrap());
        let mut new = view.poll_requests();

        let old_sentiment = take(&mut old, DashboardSlot::Sentiment);
        let old_quality = take(&mut old, DashboardSlot::Quality);
        let new_sentiment = take(&mut new, DashboardSlot::Sentiment);
        let new_quality = take(&mut new, DashboardSlot::Quality);

        view.apply(&new_sentiment, Ok(json!({"NEGATIVE": 2})));
        // Old quality must not complete the new pair.
        view.apply(&old_quality, Ok(json!({"High Quality": 99})));
        assert!(view.is_loading());

        view.apply(&new_quality, Ok(json!({"Average Quality": 4})));
        view.apply(&old_sentiment, Err(FetchError::HttpStatus(500)));

        let charts = view.breakdowns().loaded().expect("loaded");
        assert_eq!(charts.sentiment.values, vec![0, 0, 2]);
        assert_eq!(charts.quality.values, vec![0, 4, 0]);
    }

    #[test]
    fn test_trend_failure_leaves_breakdowns_alone() {
        let mut view = DashboardView::new();
        let mut tickets = view.poll_requests();
        let yearly = take(&mut tickets, DashboardSlot::Yearly);
        view.apply(&yearly, Err(FetchError::HttpStatus(404)));
        assert_eq!(view.trend().error(), Some(YEARLY_ERROR));
        assert!(view.is_loading());
    }

    #[test]
    fn test_yearly_completion_never_fills_the_pair() {
        let mut view = DashboardView::new();
        let mut tickets = view.poll_requests();
        let sentiment = take(&mut tickets, DashboardSlot::Sentiment);
        let yearly = take(&mut tickets, DashboardSlot::Yearly);

        view.apply(&sentiment, Ok(json!({"POSITIVE": 4})));
        view.apply(&yearly, Ok(json!({"2021": {"NEUTRAL": 2}})));

        assert!(view.is_loading());
        assert!(view.breakdowns().loaded().is_none());
        assert_eq!(view.trend().loaded().map(|t| t.years.len()), Some(1));
    }

    #[test]
    fn test_trend_projection() {
        let mut view = DashboardView::new();
        let mut tickets = view.poll_requests();
        let yearly = take(&mut tickets, DashboardSlot::Yearly);
        view.apply(
            &yearly,
            Ok(json!({
                "2020": {"POSITIVE": 4, "NEGATIVE": 1},
                "2021": {"NEUTRAL": 2}
            })),
        );
        let chart = view.trend().loaded().expect("loaded");
        assert_eq!(chart.years, vec!["2020", "2021"]);
        assert_eq!(chart.series[0].values, vec![4, 0]);
        assert_eq!(chart.series[1].values, vec![0, 2]);
        assert_eq!(chart.series[2].values, vec![1, 0]);
    }
}
