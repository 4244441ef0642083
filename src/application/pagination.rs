//! Offset pagination over ordered collections.
//!
//! Pages are 1-indexed. A page number outside `1..=total_pages` is not an
//! error: it simply yields an empty page whose metadata still reports the
//! real totals, so templates can link back into range.

use serde::Serialize;

/// Requested page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: i64,
    per_page: u32,
}

impl PageRequest {
    /// `per_page` below 1 is raised to 1.
    pub fn new(number: i64, per_page: u32) -> Self {
        Self {
            number,
            per_page: per_page.max(1),
        }
    }

    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Offset of the first item, or `None` when the page number is below 1.
    pub fn offset(&self) -> Option<u64> {
        if self.number < 1 {
            return None;
        }
        u64::try_from(self.number - 1)
            .ok()
            .and_then(|index| index.checked_mul(u64::from(self.per_page)))
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page from an already-sliced result and the full item count.
    pub fn from_parts(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            number: request.number(),
            per_page: request.per_page(),
            total_items,
            total_pages: total_pages(total_items, request.per_page()),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.is_valid_number(self.number - 1)
    }

    pub fn has_next(&self) -> bool {
        self.is_valid_number(self.number.saturating_add(1))
    }

    pub fn previous_number(&self) -> i64 {
        self.number - 1
    }

    pub fn next_number(&self) -> i64 {
        self.number.saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }

    fn is_valid_number(&self, number: i64) -> bool {
        number >= 1 && u64::try_from(number).is_ok_and(|n| n <= self.total_pages)
    }
}

/// `ceil(total_items / per_page)`.
pub fn total_pages(total_items: u64, per_page: u32) -> u64 {
    total_items.div_ceil(u64::from(per_page.max(1)))
}

/// Slice an in-memory ordered sequence into the requested page.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_items = items.len() as u64;

    let slice = match request.offset().and_then(|offset| usize::try_from(offset).ok()) {
        Some(offset) if offset < items.len() => items
            .into_iter()
            .skip(offset)
            .take(request.per_page() as usize)
            .collect(),
        _ => Vec::new(),
    };

    Page::from_parts(slice, request, total_items)
}
