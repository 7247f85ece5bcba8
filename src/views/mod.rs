//! View controllers: the state machines behind each dashboard page.
//!
//! A view never performs IO. User actions mutate its state; the runtime then
//! asks the view for the requests its current state implies
//! ([`View::poll_requests`]), executes them, and hands each result back
//! through [`View::apply`]. Requests whose derived form has not changed since
//! they were last issued are not refetched.

pub mod categorized;
pub mod comments;
pub mod dashboard;
pub mod pagination;

use std::fmt::Debug;

use serde_json::Value;

use crate::api::{ApiRequest, FetchError};
use crate::state::{FetchState, Slot, Ticket};

pub use categorized::{CategorizedSlot, CategorizedView};
pub use comments::{CommentsSlot, CommentsView};
pub use dashboard::{Breakdowns, DashboardSlot, DashboardView, InvalidYear, YearFilter, KNOWN_YEARS};
pub use pagination::{InvalidLimit, PageLimit, PageRequest, PaginationController};

/// A page whose state is driven by asynchronous fetches.
pub trait View {
    /// Identifies which slot a ticket belongs to.
    type Key: Copy + Eq + Debug + Send + 'static;

    /// Issue tickets for every slot whose derived request changed.
    fn poll_requests(&mut self) -> Vec<Ticket<Self::Key>>;

    /// Write a completed fetch back into the view. Stale tickets are ignored.
    fn apply(&mut self, ticket: &Ticket<Self::Key>, result: Result<Value, FetchError>);
}

/// What a list region should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListDisplay<'a, T> {
    /// No filter chosen yet; nothing has been requested.
    NoSelection,
    Loading,
    Failed(&'a str),
    /// Fetch succeeded with zero records.
    Empty(&'static str),
    Records(&'a [T]),
}

/// Begin `request` on `slot` if it differs from the last one issued there.
pub(crate) fn issue<T, K>(slot: &mut Slot<T>, key: K, request: ApiRequest) -> Option<Ticket<K>> {
    if !slot.needs(&request) {
        return None;
    }
    let generation = slot.begin(request.clone());
    Some(Ticket {
        slot: key,
        generation,
        request,
    })
}

/// Map a list slot's state onto what the list region should show.
pub(crate) fn list_display<'a, T>(
    slot: &'a Slot<Vec<T>>,
    empty_message: &'static str,
) -> ListDisplay<'a, T> {
    match slot.state() {
        FetchState::Idle | FetchState::Loading => ListDisplay::Loading,
        FetchState::Failed(message) => ListDisplay::Failed(message),
        FetchState::Loaded(records) if records.is_empty() => ListDisplay::Empty(empty_message),
        FetchState::Loaded(records) => ListDisplay::Records(records),
    }
}
