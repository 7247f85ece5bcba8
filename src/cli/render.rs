//! Plain terminal rendering of view state.

use anyhow::Result;
use chrono::NaiveDate;
use console::{style, truncate_str, Term};

use resonance::charts::{BreakdownChart, TrendChart};
use resonance::state::FetchState;
use resonance::views::{CategorizedView, CommentsView, DashboardView, ListDisplay, PaginationController};

const TEXT_WIDTH: usize = 72;
const BAR_WIDTH: usize = 30;

pub fn print(term: &Term, lines: &[String]) -> Result<()> {
    for line in lines {
        term.write_line(line)?;
    }
    Ok(())
}

pub fn paging_help(with_category: bool) -> String {
    let mut help = String::from("[n] next  [p] previous  [1] 25  [2] 50  [3] 100");
    if with_category {
        help.push_str("  [c] category");
    }
    help.push_str("  [q] quit");
    style(help).dim().to_string()
}

fn pager_line(pager: &PaginationController, can_previous: bool, can_next: bool) -> String {
    let arrow = |enabled: bool, label: &str| {
        if enabled {
            style(label).bold().to_string()
        } else {
            style(label).dim().to_string()
        }
    };
    format!(
        "{}  Page {} ({} per page)  {}",
        arrow(can_previous, "< Previous"),
        pager.page(),
        pager.limit(),
        arrow(can_next, "Next >")
    )
}

fn list_status<T>(display: &ListDisplay<'_, T>) -> Option<String> {
    match display {
        ListDisplay::NoSelection => Some(style("Choose a category.").italic().to_string()),
        ListDisplay::Loading => Some(style("Loading...").italic().to_string()),
        ListDisplay::Failed(message) => Some(style(message).red().to_string()),
        ListDisplay::Empty(message) => Some(message.to_string()),
        ListDisplay::Records(_) => None,
    }
}

/// Parsed date when possible, else the raw value, else a dash.
fn published_text(date: Option<NaiveDate>, raw: Option<&str>) -> String {
    match (date, raw) {
        (Some(date), _) => date.to_string(),
        (None, Some(raw)) => raw.to_string(),
        (None, None) => "-".to_string(),
    }
}

pub fn comments_lines(view: &CommentsView) -> Vec<String> {
    let mut lines = vec![
        style("Comments").bold().to_string(),
        pager_line(view.pager(), view.can_go_previous(), view.can_go_next()),
        String::new(),
    ];

    let display = view.display();
    if let Some(status) = list_status(&display) {
        lines.push(status);
        return lines;
    }
    if let ListDisplay::Records(records) = display {
        for record in records {
            let sentiment = record.sentiment.as_deref().unwrap_or("-");
            let published = published_text(record.published_date(), record.published_at.as_deref());
            lines.push(truncate_str(&record.text, TEXT_WIDTH, "...").into_owned());
            lines.push(
                style(format!(
                    "  {} | {} | {}",
                    sentiment,
                    published,
                    record.quality_category.as_deref().unwrap_or("-")
                ))
                .dim()
                .to_string(),
            );
        }
    }
    lines
}

pub fn category_lines(view: &CategorizedView) -> Vec<String> {
    let categories = view.categories();
    if categories.is_empty() {
        return vec![style("No categories available.").italic().to_string()];
    }
    categories.iter().map(|c| format!("  {}", c)).collect()
}

pub fn categorized_lines(view: &CategorizedView) -> Vec<String> {
    let mut lines = vec![style("Categorized Comments").bold().to_string()];

    let selected = view.selected_category().unwrap_or("-- Choose a category --");
    lines.push(format!("Category: {}", style(selected).cyan()));
    if view.selected_category().is_none() {
        lines.extend(category_lines(view));
    } else {
        lines.push(pager_line(
            view.pager(),
            view.can_go_previous(),
            view.can_go_next(),
        ));
    }
    lines.push(String::new());

    let display = view.display();
    if let Some(status) = list_status(&display) {
        lines.push(status);
        return lines;
    }
    if let ListDisplay::Records(comments) = display {
        for comment in comments {
            let published =
                published_text(comment.published_date(), comment.published_at.as_deref());
            lines.push(truncate_str(&comment.text, TEXT_WIDTH, "...").into_owned());
            lines.push(
                style(format!(
                    "  Category: {} | Confidence: {} | Published: {}",
                    comment.predicted_category,
                    comment.confidence_display(),
                    published
                ))
                .dim()
                .to_string(),
            );
        }
    }
    lines
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (value as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
    "#".repeat(width)
}

fn breakdown_lines(title: &str, chart: &BreakdownChart) -> Vec<String> {
    let max = chart.values.iter().copied().max().unwrap_or(0);
    let mut lines = vec![style(title).bold().to_string()];
    for (label, value) in chart.entries() {
        lines.push(format!("  {:<16} {:>7}  {}", label, value, bar(value, max)));
    }
    lines
}

fn trend_lines(chart: &TrendChart) -> Vec<String> {
    let mut header = format!("  {:<6}", "Year");
    for series in &chart.series {
        header.push_str(&format!(" {:>9}", series.name()));
    }
    let mut lines = vec![style(header).dim().to_string()];
    for (i, year) in chart.years.iter().enumerate() {
        let mut row = format!("  {:<6}", year);
        for series in &chart.series {
            row.push_str(&format!(" {:>9}", series.values[i]));
        }
        lines.push(row);
    }
    lines
}

pub fn dashboard_lines(view: &DashboardView) -> Vec<String> {
    let mut lines = vec![
        style("Dashboard").bold().to_string(),
        format!("Filter by Year: {}", style(view.year()).cyan()),
        String::new(),
    ];

    match view.breakdowns() {
        FetchState::Idle | FetchState::Loading => {
            lines.push(style("Loading chart...").italic().to_string());
        }
        FetchState::Failed(message) => lines.push(style(message).red().to_string()),
        FetchState::Loaded(charts) => {
            lines.extend(breakdown_lines("Sentiment Breakdown", &charts.sentiment));
            lines.push(String::new());
            lines.extend(breakdown_lines("Quality Breakdown", &charts.quality));
        }
    }

    lines.push(String::new());
    lines.push(style("Sentiment Trend by Year").bold().to_string());
    match view.trend() {
        FetchState::Loaded(chart) if !chart.is_empty() => lines.extend(trend_lines(chart)),
        FetchState::Failed(message) => lines.push(style(message).red().to_string()),
        _ => lines.push(style("Loading yearly sentiment...").italic().to_string()),
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance::models::AggregateCounts;

    #[test]
    fn test_bar_scales_to_max() {
        assert_eq!(bar(10, 10).len(), BAR_WIDTH);
        assert_eq!(bar(5, 10).len(), BAR_WIDTH / 2);
        assert_eq!(bar(0, 0), "");
    }

    #[test]
    fn test_breakdown_lists_all_labels() {
        let chart = BreakdownChart::sentiment(&AggregateCounts::from([("NEGATIVE", 3)]));
        let lines = breakdown_lines("Sentiment", &chart);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("POSITIVE"));
        assert!(lines[3].contains("NEGATIVE"));
    }

    #[test]
    fn test_published_text_fallbacks() {
        assert_eq!(
            published_text(NaiveDate::from_ymd_opt(2022, 3, 1), Some("2022-03-01T00:00:00Z")),
            "2022-03-01"
        );
        assert_eq!(published_text(None, Some("last tuesday")), "last tuesday");
        assert_eq!(published_text(None, None), "-");
    }

    #[test]
    fn test_empty_categories_message() {
        let lines = category_lines(&CategorizedView::default());
        assert!(lines[0].contains("No categories available."));
    }
}
