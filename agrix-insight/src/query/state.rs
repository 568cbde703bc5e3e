//! Query state owned by the engine

use crate::model::RecordKind;
use serde::{Deserialize, Serialize};

/// Structured and free-text filters of a view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Case-insensitive substring; empty means no search
    pub search: String,
    pub barangay: Option<String>,
    /// Calendar month 1-12 of `created_at`
    pub month: Option<u32>,
    /// Calendar year of `created_at`
    pub year: Option<i32>,
}

impl Filters {
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn has_date_filter(&self) -> bool {
        self.month.is_some() || self.year.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.search_term().is_none() && self.barangay.is_none() && !self.has_date_filter()
    }
}

/// Change to one filter dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Search(String),
    Barangay(Option<String>),
    Month(Option<u32>),
    Year(Option<i32>),
}

/// Search text, filters and page of one inventory view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryState {
    pub kind: RecordKind,
    pub filters: Filters,
    /// 1-indexed
    pub current_page: usize,
    pub page_size: usize,
}

impl QueryState {
    pub fn new(kind: RecordKind, page_size: usize) -> Self {
        Self {
            kind,
            filters: Filters::default(),
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Switch kind; clears every filter and returns to page 1
    pub fn set_kind(&mut self, kind: RecordKind) {
        self.kind = kind;
        self.filters = Filters::default();
        self.current_page = 1;
    }

    /// Apply one filter change and return to page 1
    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Search(text) => self.filters.search = text,
            FilterChange::Barangay(barangay) => {
                self.filters.barangay = barangay
                    .map(|b| b.trim().to_string())
                    .filter(|b| !b.is_empty())
            }
            FilterChange::Month(month) => {
                self.filters.month = month.filter(|m| (1..=12).contains(m))
            }
            FilterChange::Year(year) => self.filters.year = year,
        }
        self.current_page = 1;
    }

    /// Page navigation; filters are untouched
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }
}
