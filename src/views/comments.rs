//! Raw comments page: a paginated list of every analysed comment.

use serde_json::Value;
use tracing::warn;

use super::pagination::{PageLimit, PaginationController};
use super::{issue, list_display, ListDisplay, View};
use crate::api::{ApiRequest, Endpoint, FetchError, QueryParams};
use crate::models::{decode, CommentRecord};
use crate::state::{FetchState, Slot, Ticket};

pub const LOAD_ERROR: &str = "Failed to load comments.";
pub const EMPTY_MESSAGE: &str = "No more comments.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentsSlot {
    Comments,
}

#[derive(Debug)]
pub struct CommentsView {
    pager: PaginationController,
    comments: Slot<Vec<CommentRecord>>,
}

impl CommentsView {
    pub fn new(limit: PageLimit) -> Self {
        Self {
            pager: PaginationController::new(limit),
            comments: Slot::new("comments"),
        }
    }

    pub fn pager(&self) -> &PaginationController {
        &self.pager
    }

    pub fn comments(&self) -> &FetchState<Vec<CommentRecord>> {
        self.comments.state()
    }

    pub fn is_loading(&self) -> bool {
        self.comments.is_loading()
    }

    pub fn can_go_previous(&self) -> bool {
        self.pager.can_go_previous(self.is_loading())
    }

    pub fn can_go_next(&self) -> bool {
        self.pager.can_go_next(self.is_loading())
    }

    pub fn go_to_previous_page(&mut self) -> bool {
        let busy = self.is_loading();
        self.pager.go_to_previous_page(busy)
    }

    pub fn go_to_next_page(&mut self) -> bool {
        let busy = self.is_loading();
        self.pager.go_to_next_page(busy)
    }

    pub fn set_limit(&mut self, limit: PageLimit) {
        self.pager.set_limit(limit);
    }

    /// `GET comments?page=<page>&limit=<limit>` for the current page.
    pub fn derived_request(&self) -> ApiRequest {
        ApiRequest::new(Endpoint::Comments, self.pager.append_params(QueryParams::new()))
    }

    pub fn display(&self) -> ListDisplay<'_, CommentRecord> {
        list_display(&self.comments, EMPTY_MESSAGE)
    }
}

impl Default for CommentsView {
    fn default() -> Self {
        Self::new(PageLimit::default())
    }
}

impl View for CommentsView {
    type Key = CommentsSlot;

    fn poll_requests(&mut self) -> Vec<Ticket<CommentsSlot>> {
        let request = self.derived_request();
        issue(&mut self.comments, CommentsSlot::Comments, request)
            .into_iter()
            .collect()
    }

    fn apply(&mut self, ticket: &Ticket<CommentsSlot>, result: Result<Value, FetchError>) {
        if !self.comments.accepts(ticket.generation) {
            return;
        }

        match result.and_then(|body| decode::<Vec<CommentRecord>>(Endpoint::Comments, body)) {
            Ok(records) => {
                self.pager.record_result(records.len());
                self.comments.resolve(ticket.generation, Ok(records));
            }
            Err(e) => {
                warn!("Error fetching comments: {}", e);
                self.comments
                    .resolve(ticket.generation, Err(LOAD_ERROR.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| {
                    json!({
                        "textOriginal": format!("comment {i}"),
                        "publishedAt": "2022-06-01T12:00:00Z",
                        "sentiment": "NEUTRAL",
                        "sentiment_score": 0.5,
                        "QualityCategory": "Average Quality"
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn test_mount_issues_first_page() {
        let mut view = CommentsView::default();
        let tickets = view.poll_requests();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].request.path_and_query(), "comments?page=1&limit=100");
        assert!(view.is_loading());
        assert_eq!(view.display(), ListDisplay::Loading);
    }

    #[test]
    fn test_poll_without_change_issues_nothing() {
        let mut view = CommentsView::default();
        let ticket = view.poll_requests().remove(0);
        view.apply(&ticket, Ok(rows(3)));
        assert!(view.poll_requests().is_empty());
    }

    #[test]
    fn test_next_page_disabled_while_loading() {
        let mut view = CommentsView::default();
        view.poll_requests();
        assert!(!view.can_go_next());
        assert!(!view.go_to_next_page());
        assert_eq!(view.pager().page(), 1);
    }

    #[test]
    fn test_failure_shows_message() {
        let mut view = CommentsView::default();
        let ticket = view.poll_requests().remove(0);
        view.apply(&ticket, Err(FetchError::HttpStatus(503)));
        assert_eq!(view.display(), ListDisplay::Failed(LOAD_ERROR));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_malformed_body_is_failure() {
        let mut view = CommentsView::default();
        let ticket = view.poll_requests().remove(0);
        view.apply(&ticket, Ok(json!({"not": "a list"})));
        assert_eq!(view.display(), ListDisplay::Failed(LOAD_ERROR));
    }

    #[test]
    fn test_empty_page_is_not_an_error() {
        let mut view = CommentsView::default();
        let ticket = view.poll_requests().remove(0);
        view.apply(&ticket, Ok(json!([])));
        assert_eq!(view.display(), ListDisplay::Empty(EMPTY_MESSAGE));
        assert!(!view.pager().has_more());
    }

    #[test]
    fn test_stale_page_does_not_touch_has_more() {
        let mut view = CommentsView::default();
        let first = view.poll_requests().remove(0);
        view.set_limit(PageLimit::Small);
        let second = view.poll_requests().remove(0);

        view.apply(&second, Ok(rows(10)));
        assert!(!view.pager().has_more());

        // Full 100-row page for the superseded request must not flip has_more.
        view.apply(&first, Ok(rows(100)));
        assert!(!view.pager().has_more());
        match view.display() {
            ListDisplay::Records(records) => assert_eq!(records.len(), 10),
            other => panic!("unexpected display: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_sentiment_label_keeps_page() {
        let mut view = CommentsView::default();
        let ticket = view.poll_requests().remove(0);
        let body = json!([
            {"textOriginal": "good", "publishedAt": "2022-01-01T00:00:00Z", "sentiment": "POSITIVE"},
            {"textOriginal": "hmm", "publishedAt": "2022-01-02T00:00:00Z", "sentiment": "MIXED"}
        ]);
        view.apply(&ticket, Ok(body));

        match view.display() {
            ListDisplay::Records(records) => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[1].sentiment.as_deref(), Some("MIXED"));
                assert!(records[1].sentiment_kind().is_none());
            }
            other => panic!("unexpected display: {other:?}"),
        }
    }

    #[test]
    fn test_null_published_at_keeps_page() {
        let mut view = CommentsView::default();
        let ticket = view.poll_requests().remove(0);
        let body = json!([
            {"textOriginal": "dated", "publishedAt": "2022-01-01T00:00:00Z", "sentiment": "NEUTRAL"},
            {"textOriginal": "undated", "publishedAt": null, "sentiment": "NEGATIVE"},
            {"textOriginal": "missing", "sentiment": "NEGATIVE"}
        ]);
        view.apply(&ticket, Ok(body));

        match view.display() {
            ListDisplay::Records(records) => {
                assert_eq!(records.len(), 3);
                assert!(records[0].published_date().is_some());
                assert!(records[1].published_at.is_none());
                assert!(records[2].published_date().is_none());
            }
            other => panic!("unexpected display: {other:?}"),
        }
    }
}
