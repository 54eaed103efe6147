//! Load guard shared by every page container.
//!
//! A response may arrive after a newer load started or after the page
//! went away. Writes carry the ticket of the load that produced them and
//! are dropped unless that ticket is still current and the page is
//! mounted.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> PageState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            PageState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
struct Inner<T> {
    state: PageState<T>,
    generation: u64,
    mounted: bool,
}

#[derive(Debug)]
pub struct Page<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Default for Page<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Page<T> {
    pub fn new() -> Self {
        Page {
            inner: Mutex::new(Inner {
                state: PageState::Loading,
                generation: 0,
                mounted: true,
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner<T>) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Starts a load, making every earlier ticket stale.
    pub fn begin(&self) -> LoadTicket {
        self.with(|inner| {
            inner.generation += 1;
            if inner.mounted {
                inner.state = PageState::Loading;
            }
            LoadTicket(inner.generation)
        })
    }

    /// Stores `state` if `ticket` is the latest load of a mounted page.
    pub fn apply(&self, ticket: LoadTicket, state: PageState<T>) -> bool {
        self.with(|inner| {
            if !inner.mounted || inner.generation != ticket.0 {
                return false;
            }
            inner.state = state;
            true
        })
    }

    pub fn unmount(&self) {
        self.with(|inner| {
            inner.mounted = false;
            inner.generation += 1;
        })
    }

    pub fn is_mounted(&self) -> bool {
        self.with(|inner| inner.mounted)
    }

    pub fn state(&self) -> PageState<T> {
        self.with(|inner| inner.state.clone())
    }
}
