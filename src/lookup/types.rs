use serde::Serialize;

use crate::county::{County, RequestPlan};
use crate::record::PropertyRecord;

// Plan envelope
#[derive(Serialize)]
pub struct LookupPlan {
    pub county: County,
    pub query: String,
    pub tax_year: i32,
    pub requests: Vec<RequestPlan>,
    pub text: String,
}

// Result envelope; `text` is the report (or the not-found line) as printed
#[derive(Serialize)]
pub struct LookupResult {
    pub county: County,
    pub query: String,
    pub found: bool,
    pub copied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PropertyRecord>,
    pub text: String,
}
