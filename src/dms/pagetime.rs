// pagetime.rs
//
// Copyright (C) 2026  Minnesota Department of Transportation
//
//! Page on/off times for each page of a message
use crate::dms::multi::MultiVisitor;

/// Page on/off time pair (deciseconds); `None` means the sign default
type PageTime = (Option<u8>, Option<u8>);

/// Page time aggregator
///
/// Collects the page-on and page-off times of each page of a MULTI
/// string.
#[derive(Clone, Debug)]
pub struct PageTimes {
    /// Times for the current page
    current: PageTime,
    /// Times for every page so far
    pages: Vec<PageTime>,
}

impl Default for PageTimes {
    fn default() -> Self {
        PageTimes {
            current: (None, None),
            pages: vec![(None, None)],
        }
    }
}

impl MultiVisitor for PageTimes {
    fn set_page_times(&mut self, on: Option<u8>, off: Option<u8>) {
        self.current = (on, off);
        if let Some(last) = self.pages.last_mut() {
            *last = self.current;
        }
    }

    fn add_page(&mut self) {
        self.pages.push(self.current);
    }
}

impl PageTimes {
    /// Create a new page time aggregator
    pub fn new() -> Self {
        PageTimes::default()
    }

    /// Get the number of pages seen
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get page-on times, with a default for unspecified pages
    pub fn page_on_times(&self, default: u8) -> Vec<u8> {
        self.pages.iter().map(|p| p.0.unwrap_or(default)).collect()
    }

    /// Get page-off times, with a default for unspecified pages
    pub fn page_off_times(&self, default: u8) -> Vec<u8> {
        self.pages.iter().map(|p| p.1.unwrap_or(default)).collect()
    }
}
