//! Categorized comments page: comments filtered by predicted category.
//!
//! The category selector is populated once, on mount, from
//! `/categories_list`. Losing that request is not fatal: the selector just
//! stays empty. No comments are requested until a category is chosen.

use serde_json::Value;
use tracing::warn;

use super::pagination::{PageLimit, PaginationController};
use super::{issue, list_display, ListDisplay, View};
use crate::api::{ApiRequest, Endpoint, FetchError, QueryParams};
use crate::models::{decode, decode_categorized, CategorizedComment};
use crate::state::{FetchState, Slot, Ticket};

pub const LOAD_ERROR: &str = "Failed to load categorized comments.";
pub const EMPTY_MESSAGE: &str = "No comments found for this category.";
const CATEGORIES_ERROR: &str = "Failed to load categories.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategorizedSlot {
    CategoryList,
    Comments,
}

#[derive(Debug)]
pub struct CategorizedView {
    categories: Slot<Vec<String>>,
    selected: Option<String>,
    pager: PaginationController,
    comments: Slot<Vec<CategorizedComment>>,
}

impl CategorizedView {
    pub fn new(limit: PageLimit) -> Self {
        Self {
            categories: Slot::new("categories_list"),
            selected: None,
            pager: PaginationController::new(limit),
            comments: Slot::new("categorized"),
        }
    }

    /// Categories for the selector. Empty while loading or after a failure.
    pub fn categories(&self) -> &[String] {
        self.categories
            .state()
            .loaded()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn categories_state(&self) -> &FetchState<Vec<String>> {
        self.categories.state()
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn pager(&self) -> &PaginationController {
        &self.pager
    }

    pub fn comments(&self) -> &FetchState<Vec<CategorizedComment>> {
        self.comments.state()
    }

    pub fn is_loading(&self) -> bool {
        self.comments.is_loading()
    }

    /// Choose a category and return to page 1. An empty name clears the
    /// selection.
    pub fn select_category(&mut self, name: &str) {
        if name.is_empty() {
            self.clear_category();
            return;
        }
        self.selected = Some(name.to_string());
        self.pager.reset_page();
    }

    /// Drop the selection. Any comment fetch in flight is discarded.
    pub fn clear_category(&mut self) {
        self.selected = None;
        self.pager.reset_page();
        self.comments.reset();
    }

    pub fn can_go_previous(&self) -> bool {
        self.selected.is_some() && self.pager.can_go_previous(self.is_loading())
    }

    pub fn can_go_next(&self) -> bool {
        self.selected.is_some() && self.pager.can_go_next(self.is_loading())
    }

    pub fn go_to_previous_page(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        let busy = self.is_loading();
        self.pager.go_to_previous_page(busy)
    }

    pub fn go_to_next_page(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        let busy = self.is_loading();
        self.pager.go_to_next_page(busy)
    }

    pub fn set_limit(&mut self, limit: PageLimit) {
        self.pager.set_limit(limit);
    }

    /// `GET categorized?category=<name>&page=<page>&limit=<limit>`, or
    /// nothing when no category is selected.
    pub fn derived_request(&self) -> Option<ApiRequest> {
        let category = self.selected.as_deref()?;
        let params = self
            .pager
            .append_params(QueryParams::new().insert("category", category));
        Some(ApiRequest::new(Endpoint::Categorized, params))
    }

    pub fn display(&self) -> ListDisplay<'_, CategorizedComment> {
        if self.selected.is_none() {
            return ListDisplay::NoSelection;
        }
        list_display(&self.comments, EMPTY_MESSAGE)
    }

    fn apply_categories(&mut self, ticket: &Ticket<CategorizedSlot>, result: Result<Value, FetchError>) {
        if !self.categories.accepts(ticket.generation) {
            return;
        }
        match result.and_then(|body| decode::<Vec<String>>(Endpoint::CategoriesList, body)) {
            Ok(categories) => {
                self.categories.resolve(ticket.generation, Ok(categories));
            }
            Err(e) => {
                warn!("Error fetching categories list: {}", e);
                self.categories
                    .resolve(ticket.generation, Err(CATEGORIES_ERROR.to_string()));
            }
        }
    }

    fn apply_comments(&mut self, ticket: &Ticket<CategorizedSlot>, result: Result<Value, FetchError>) {
        if !self.comments.accepts(ticket.generation) {
            return;
        }
        // The ticket still belongs to the live request, so its category is
        // the selected one.
        let category = ticket.request.params.get("category").unwrap_or_default();
        match result.and_then(|body| decode_categorized(body, category)) {
            Ok(comments) => {
                self.pager.record_result(comments.len());
                self.comments.resolve(ticket.generation, Ok(comments));
            }
            Err(e) => {
                warn!("Error fetching categorized comments: {}", e);
                self.comments
                    .resolve(ticket.generation, Err(LOAD_ERROR.to_string()));
            }
        }
    }
}

impl Default for CategorizedView {
    fn default() -> Self {
        Self::new(PageLimit::default())
    }
}

impl View for CategorizedView {
    type Key = CategorizedSlot;

    fn poll_requests(&mut self) -> Vec<Ticket<CategorizedSlot>> {
        let mut tickets = Vec::new();
        // Mount-only: the request never changes, so it is issued exactly once.
        tickets.extend(issue(
            &mut self.categories,
            CategorizedSlot::CategoryList,
            ApiRequest::bare(Endpoint::CategoriesList),
        ));
        if let Some(request) = self.derived_request() {
            tickets.extend(issue(&mut self.comments, CategorizedSlot::Comments, request));
        }
        tickets
    }

    fn apply(&mut self, ticket: &Ticket<CategorizedSlot>, result: Result<Value, FetchError>) {
        match ticket.slot {
            CategorizedSlot::CategoryList => self.apply_categories(ticket, result),
            CategorizedSlot::Comments => self.apply_comments(ticket, result),
        }
    }
}
