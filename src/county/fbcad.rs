// Fort Bend: a JSON quick search yields the property id, the property page
// is a stack of titled tables ("Property Roll Value History", ...).
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use scraper::ElementRef;
use serde::Deserialize;
use tracing::Instrument;

use super::{County, RequestPlan};
use crate::fetch;
use crate::html::{cells, direct_text_parts, rows, select_in, string_of, text_of, Page};
use crate::record::{tally, Baths, Element, PropertyRecord, NOT_FOUND};
use crate::settings::Settings;
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::lookup::{Lookup, Phase};
use crate::util::text::{parse_area, strip_cents};

/// Second-floor building rows are labelled "... Story ..." (exact case).
pub fn is_upper_story(label: &str) -> bool {
    label.contains("Story")
}

const SEARCH_PATH: &str = "/Search/SearchResults";
const DETAIL_PATH: &str = "/Property/View/";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "resultsList", default)]
    results_list: Option<Vec<SearchHit>>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "propertyId", default)]
    property_id: Option<RawId>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

/// First property id in a quick-search response; `None` when nothing matched.
pub fn first_property_id(body: &str) -> Result<Option<String>> {
    let resp: SearchResponse = serde_json::from_str(body).context("FBCAD: search response is not the expected JSON")?;
    let id = resp.results_list.unwrap_or_default().into_iter()
        .filter_map(|h| h.property_id)
        .map(|id| match id { RawId::Text(s) => s.trim().to_string(), RawId::Number(n) => n.to_string() })
        .find(|s| !s.is_empty());
    Ok(id)
}

fn search_url(settings: &Settings) -> String {
    format!("{}{}", settings.fbcad_base, SEARCH_PATH)
}

fn detail_url(settings: &Settings, property_id: &str) -> String {
    format!("{}{}{}", settings.fbcad_base, DETAIL_PATH, property_id)
}

pub fn plan(settings: &Settings, address: &str) -> Vec<RequestPlan> {
    vec![
        RequestPlan::new("GET", search_url(settings), &[("keywords", address.trim())], "quick search -> propertyId"),
        RequestPlan::new("GET", detail_url(settings, "{propertyId}"), &[], "property page"),
    ]
}

pub async fn lookup(client: &Client, settings: &Settings, address: &str, log: &LogCtx<Lookup>) -> Result<Option<PropertyRecord>> {
    let url = search_url(settings);
    let body = fetch::get_text(client, &url, &[("keywords", address.trim())])
        .instrument(log.span_kv(&Phase::Search, [("url", url.clone())]))
        .await?;

    let Some(property_id) = first_property_id(&body)? else { return Ok(None) };
    log.info_kv("📄 property id", [("property_id", property_id.clone())]);

    let url = detail_url(settings, &property_id);
    let html = fetch::get_text(client, &url, &[])
        .instrument(log.span_kv(&Phase::FetchDetail, [("url", url.clone())]))
        .await?;

    let _s = log.span(&Phase::Extract).entered();
    extract(&html, &property_id, settings.tax_year).map(Some)
}

/// Scrapes a property page. `year` picks the appraisal row (falling back to the
/// year before when it is missing or still `N/A`).
pub fn extract(html: &str, property_id: &str, year: i32) -> Result<PropertyRecord> {
    let page = Page::parse(html);
    let appraisal = section_table(&page, "Property Roll Value History")?;
    let deed = section_table(&page, "Property Deed History")?;
    let building = section_table(&page, "Property Improvement - Building")?;

    let address = situs_address(&page).context("FBCAD: 'Situs Address:' not found")?;
    let value = appraised_value(appraisal, year);
    let sqft = living_area(&page).context("FBCAD: 'Living Area' not found")?;

    let building_rows = rows(building);
    let detail_cells = building_rows.get(1).map(|r| cells(*r)).unwrap_or_default();
    let main_area = detail_cells.last().context("FBCAD: building table has no detail row")?;

    let mut elements = vec![
        Element::new("FBCAD", property_id),
        Element::new("Main Area", strip_cents(&text_of(*main_area))),
    ];
    for row in building_rows.iter().skip(2) {
        let c = cells(*row);
        if c.len() < 2 { continue; }
        elements.push(Element::new(text_of(c[1]), strip_cents(&text_of(c[c.len() - 1]))));
    }

    let details = detail_cells.get(1).map(|c| building_details(*c)).unwrap_or_default();
    let year_built = match detail_cells.len() {
        n if n >= 2 => text_of(detail_cells[n - 2]),
        _ => NOT_FOUND.to_string(),
    };
    let (purchase_date, buyer) = last_sale(deed);

    let mut rec = PropertyRecord {
        county: County::Fbcad,
        address,
        sqft,
        value,
        year_built,
        porch: 0,
        patio: 0,
        deck: 0,
        garage: 0,
        purchase_date,
        buyer,
        bedrooms: details.bedrooms,
        baths: details.baths,
        fireplace: details.fireplace,
        stories: 1,
        elements,
    };
    rec.apply_tally(tally(&rec.elements, is_upper_story));
    Ok(rec)
}

fn section_table<'a>(page: &'a Page, title: &str) -> Result<ElementRef<'a>> {
    let at = page.find_text(|t| t.contains(title))
        .with_context(|| format!("FBCAD: '{}' section not found", title))?;
    page.next_element_after(at, "table")
        .with_context(|| format!("FBCAD: no table after '{}'", title))
}

fn situs_address(page: &Page) -> Option<String> {
    let th = page.find_by_string("th", |s| s == "Situs Address:")?;
    let td = page.next_element_after(page.anchor_of(th)?, "td")?;
    let parts = direct_text_parts(td);
    let addr = if parts.is_empty() { text_of(td) } else { parts.join(", ") };
    (!addr.is_empty()).then_some(addr)
}

fn value_for_year(table: ElementRef<'_>, year: i32) -> Option<String> {
    let year = year.to_string();
    rows(table).into_iter()
        .map(cells)
        .find(|c| c.iter().any(|td| string_of(*td).as_deref() == Some(year.as_str())))
        .and_then(|c| c.last().map(|td| text_of(*td)))
}

// The current roll reads "N/A" until certified; the prior year stands in.
fn appraised_value(table: ElementRef<'_>, year: i32) -> String {
    [year, year - 1].into_iter()
        .filter_map(|y| value_for_year(table, y))
        .find(|v| v != "N/A" && !v.is_empty())
        .unwrap_or_else(|| NOT_FOUND.to_string())
}

fn living_area(page: &Page) -> Option<String> {
    let at = page.find_text(|t| t.contains("Living Area"))?;
    // value either shares the label's text node ("Living Area: 2,104.00 sqft") or follows it
    let own = page.text_at(at).unwrap_or_default();
    let tail = own.split_once("Living Area").map(|(_, rest)| rest.to_string()).unwrap_or_default();
    let source = if NUMBER.is_match(&tail) { tail } else { page.next_text_after(at)? };
    let m = NUMBER.find(&source)?;
    parse_area(m.as_str()).map(|n| n.to_string())
}

#[derive(Debug, Default)]
struct BuildingDetails {
    bedrooms: String,
    baths: Baths,
    fireplace: String,
}

// "<div>Bedrooms: 3</div><div>Bathrooms: 2.00</div>..." inside the detail row
fn building_details(cell: ElementRef<'_>) -> BuildingDetails {
    let mut d = BuildingDetails { bedrooms: "0".into(), fireplace: "0".into(), ..Default::default() };
    for div in select_in(cell, "div") {
        let line = text_of(div);
        let Some((label, value)) = line.split_once(':') else { continue };
        let value = value.trim();
        match label.trim().to_lowercase().as_str() {
            "bedrooms" => d.bedrooms = value.to_string(),
            "bathrooms" => d.baths.full = whole(value),
            "half bathrooms" => d.baths.half = whole(value),
            "fireplaces" => d.fireplace = value.to_string(),
            _ => {}
        }
    }
    d
}

// "2.00" -> 2
fn whole(s: &str) -> u32 {
    s.parse::<f64>().map(|f| f.trunc() as u32).unwrap_or(0)
}

fn last_sale(deed: ElementRef<'_>) -> (String, String) {
    let row = rows(deed).into_iter().nth(1).map(cells).unwrap_or_default();
    let get = |i: usize| row.get(i).map(|td| text_of(*td)).unwrap_or_else(|| NOT_FOUND.to_string());
    (get(0), get(4))
}
