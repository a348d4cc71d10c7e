use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::county::County;
use crate::util::text::parse_area;

pub const NOT_FOUND: &str = "Not Found";

/// One labelled line of the building breakdown, kept verbatim for the report's
/// "Raw Data" section (Main Area, Open Frame Porch, account number, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub label: String,
    pub value: String,
}

impl Element {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Element { label: label.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Baths {
    pub full: u32,
    pub half: u32,
}

// A half bath counts as 0.5: 2 full + 1 half prints "2.5", 2 full + 2 half prints "3".
impl fmt::Display for Baths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.full + self.half / 2;
        if self.half % 2 == 0 { write!(f, "{}", whole) } else { write!(f, "{}.5", whole) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyRecord {
    pub county: County,
    pub address: String,
    pub sqft: String,
    pub value: String,
    pub year_built: String,
    pub porch: u32,
    pub patio: u32,
    pub deck: u32,
    pub garage: u32,
    pub purchase_date: String,
    pub buyer: String,
    pub bedrooms: String,
    pub baths: Baths,
    pub fireplace: String,
    pub stories: u8,
    pub elements: Vec<Element>,
}

/// Area sums derived from the element list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub porch: u32,
    pub patio: u32,
    pub deck: u32,
    pub garage: u32,
    pub stories: u8,
}

/// Sums porch/patio/deck/garage areas by label keyword (case-insensitive; one
/// label may feed several sums) and marks the house two-story when
/// `upper_story` accepts any label.
pub fn tally(elements: &[Element], upper_story: impl Fn(&str) -> bool) -> Tally {
    let mut t = Tally { stories: 1, ..Tally::default() };
    for el in elements {
        if upper_story(&el.label) { t.stories = 2; }
        let label = el.label.to_lowercase();

        let buckets = [("porch", &mut t.porch), ("patio", &mut t.patio), ("deck", &mut t.deck), ("garage", &mut t.garage)];
        let hits: Vec<_> = buckets.into_iter().filter(|(kw, _)| label.contains(kw)).collect();
        if hits.is_empty() { continue; }
        let Some(area) = parse_area(&el.value) else {
            debug!(label = %el.label, value = %el.value, "skipping non-numeric area");
            continue;
        };
        for (_, sum) in hits { *sum = sum.saturating_add(area); }
    }
    t
}

impl PropertyRecord {
    pub fn apply_tally(&mut self, t: Tally) {
        self.porch = t.porch;
        self.patio = t.patio;
        self.deck = t.deck;
        self.garage = t.garage;
        self.stories = t.stories;
    }
}
