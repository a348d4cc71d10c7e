// Harris: a form POST returns the whole account page as nested layout tables
// with no ids; every field is found by its label cell and the table around it.
// Sale date and buyer live on a separate "Ownership History" popup.
use anyhow::{bail, Context, Result};
use reqwest::Client;
use scraper::ElementRef;
use tracing::Instrument;
use url::Url;

use super::{County, RequestPlan};
use crate::fetch;
use crate::html::{cells, direct_text_parts, enclosing, enclosing_table, rows, select_in, string_of, text_of, Page};
use crate::record::{tally, Baths, Element, PropertyRecord, NOT_FOUND};
use crate::settings::Settings;
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::lookup::{Lookup, Phase};
use crate::util::text::{parse_area, title_case};

/// Upper-floor area rows carry "UPR" in any case ("Base Area Upr").
pub fn is_upper_story(label: &str) -> bool {
    label.to_lowercase().contains("upr")
}

const QUICK_RECORD_PATH: &str = "/records/QuickRecord.asp";
const QUICK_SEARCH_PATH: &str = "/records/quicksearch.asp";

/// Account page scrape, before the ownership popup has been consulted.
#[derive(Debug)]
pub struct AccountPage {
    pub record: PropertyRecord,
    pub ownership_href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    pub buyer: String,
    pub purchase_date: String,
}

/// "12506 Rip Van Winkle Dr" -> ("12506", "Rip Van Winkle Dr"). The site
/// searches on the two halves separately.
pub fn split_address(address: &str) -> Result<(String, String)> {
    let address = address.trim();
    let end = address.find(|c: char| !c.is_ascii_digit()).unwrap_or(address.len());
    let (number, rest) = address.split_at(end);
    let name = rest.trim();
    if name.is_empty() { bail!("HCAD search needs a street name: {:?}", address); }
    Ok((number.to_string(), name.to_string()))
}

fn quick_record_url(settings: &Settings) -> String {
    format!("{}{}", settings.hcad_base, QUICK_RECORD_PATH)
}

fn referer(settings: &Settings) -> String {
    format!("{}{}", settings.hcad_base, QUICK_SEARCH_PATH)
}

fn ownership_url(settings: &Settings, href: &str) -> Result<String> {
    let base = Url::parse(&settings.hcad_base).with_context(|| format!("CAD_HCAD_BASE_URL is not a URL: {}", settings.hcad_base))?;
    Ok(base.join(href)?.to_string())
}

pub fn plan(settings: &Settings, address: &str) -> Result<Vec<RequestPlan>> {
    let (stnum, stname) = split_address(address)?;
    let year = settings.tax_year.to_string();
    Ok(vec![
        RequestPlan::new("POST", quick_record_url(settings), &[("TaxYear", year.as_str()), ("stnum", stnum.as_str()), ("stname", stname.as_str())], "account page"),
        RequestPlan::new("POST", format!("{}{{Ownership History href}}", settings.hcad_base), &[], "sale date and buyer"),
    ])
}

pub async fn lookup(client: &Client, settings: &Settings, address: &str, log: &LogCtx<Lookup>) -> Result<Option<PropertyRecord>> {
    let (stnum, stname) = split_address(address)?;
    let year = settings.tax_year.to_string();
    let url = quick_record_url(settings);
    let referer = referer(settings);

    let html = fetch::post_form(client, &url, &referer, &[("TaxYear", year.as_str()), ("stnum", stnum.as_str()), ("stname", stname.as_str())])
        .instrument(log.span_kv(&Phase::Search, [("url", url.clone()), ("stnum", stnum.clone()), ("stname", stname.clone())]))
        .await?;

    let found = { let _s = log.span(&Phase::Extract).entered(); extract(&html)? };
    let Some(AccountPage { mut record, ownership_href }) = found else { return Ok(None) };

    // sale info is best-effort: the record is still worth pasting without it
    let fetched = fetch_ownership(client, settings, &referer, ownership_href.as_deref(), log).await;
    if let Err(e) = settle_ownership(&mut record, fetched) {
        log.warn_kv("⚠️ sale info unavailable", [("reason", format!("{:#}", e))]);
    }
    Ok(Some(record))
}

async fn fetch_ownership(client: &Client, settings: &Settings, referer: &str, href: Option<&str>, log: &LogCtx<Lookup>) -> Result<String> {
    let href = href.context("no 'Ownership History' link on account page")?;
    let url = ownership_url(settings, href)?;
    fetch::post_form(client, &url, referer, &[])
        .instrument(log.span_kv(&Phase::Ownership, [("url", url.clone())]))
        .await
}

/// Applies a fetched ownership page to `record`. Any failure leaves buyer and
/// purchase date at their not-found values and is handed back for logging.
pub fn settle_ownership(record: &mut PropertyRecord, fetched: Result<String>) -> Result<()> {
    let body = fetched?;
    let o = extract_ownership(&body).context("ownership page has no 'Effective Date' row")?;
    apply_ownership(record, o);
    Ok(())
}

fn apply_ownership(record: &mut PropertyRecord, o: Ownership) {
    record.buyer = o.buyer;
    record.purchase_date = o.purchase_date;
}

/// Scrapes the account page. `Ok(None)` when the page carries no valuation
/// block, which is what the site returns for an address it does not know.
pub fn extract(html: &str) -> Result<Option<AccountPage>> {
    let page = Page::parse(html);
    let Some(value_cell) = page.find_by_string("td", |s| s.starts_with("Value as of")) else { return Ok(None) };

    let value_cells = enclosing_table(value_cell).and_then(penultimate_row_cells)
        .context("HCAD: valuation table has no value row")?;
    let value = value_cells.last().map(|td| text_of(*td)).unwrap_or_default();

    let year_table = label_table(&page, "th", "Year Built", |s| s == "Year Built")?;
    let year_cells = penultimate_row_cells(year_table).context("HCAD: 'Year Built' table has no data row")?;
    let year_built = year_cells.get(1).map(|td| text_of(*td)).unwrap_or_else(|| NOT_FOUND.to_string());
    let sqft = match year_cells.len() {
        n if n >= 2 => text_of(year_cells[n - 2]),
        _ => NOT_FOUND.to_string(),
    };

    let building_data = label_table(&page, "th", "Building Data", |s| s == "Building Data")?;
    let baths = Baths {
        full: row_value(building_data, "Full").and_then(|v| parse_area(&v)).unwrap_or(0),
        half: row_value(building_data, "Half").and_then(|v| parse_area(&v)).unwrap_or(0),
    };
    let fireplace = row_value(building_data, "Fireplace").unwrap_or_else(|| "0".to_string());

    let mut elements = building_areas(&page)?;
    elements.extend(extra_features(&page));
    if let Some(acct) = page.title().and_then(|t| t.split_whitespace().last().map(str::to_string)) {
        elements.push(Element::new("HCAD", acct));
    }

    let address = property_address(&page).context("HCAD: 'Property Address:' not found")?;
    let ownership_href = page.find_by_string("a", |s| s == "Ownership History")
        .and_then(|a| a.value().attr("href").map(str::to_string));

    let mut record = PropertyRecord {
        county: County::Hcad,
        address,
        sqft,
        value,
        year_built,
        porch: 0,
        patio: 0,
        deck: 0,
        garage: 0,
        purchase_date: NOT_FOUND.to_string(),
        buyer: NOT_FOUND.to_string(),
        bedrooms: String::new(),
        baths,
        fireplace,
        stories: 1,
        elements,
    };
    record.apply_tally(tally(&record.elements, is_upper_story));
    Ok(Some(AccountPage { record, ownership_href }))
}

/// Buyer and sale date from the Ownership History popup: in its second table,
/// the two cells following the "Effective Date" header.
pub fn extract_ownership(html: &str) -> Option<Ownership> {
    let page = Page::parse(html);
    let table = page.select("table").get(1).copied()?;
    let label = select_in(table, "td").into_iter().find(|td| string_of(*td).as_deref() == Some("Effective Date"))?;
    let buyer = page.next_element_after(page.anchor_of(label)?, "td")?;
    let date = page.next_element_after(page.anchor_of(buyer)?, "td")?;
    Some(Ownership { buyer: text_of(buyer), purchase_date: text_of(date) })
}

fn label_table<'a>(page: &'a Page, tag: &str, section: &str, pred: impl Fn(&str) -> bool) -> Result<ElementRef<'a>> {
    let label = page.find_by_string(tag, pred).with_context(|| format!("HCAD: '{}' section not found", section))?;
    enclosing_table(label).with_context(|| format!("HCAD: '{}' label is not inside a table", section))
}

fn penultimate_row_cells(table: ElementRef<'_>) -> Option<Vec<ElementRef<'_>>> {
    let r = rows(table);
    let row = r.len().checked_sub(2).and_then(|i| r.get(i))?;
    Some(cells(*row))
}

// last cell of the row whose label cell mentions `keyword` ("Baths (Full)" -> "2")
fn row_value(table: ElementRef<'_>, keyword: &str) -> Option<String> {
    let label = select_in(table, "td").into_iter()
        .find(|td| string_of(*td).is_some_and(|s| s.contains(keyword)))?;
    let row = enclosing(label, "tr")?;
    cells(row).last().map(|td| text_of(*td))
}

// "Building Areas" table: td cells alternate label, area
fn building_areas(page: &Page) -> Result<Vec<Element>> {
    let table = label_table(page, "th", "Building Areas", |s| s.contains("Building Areas"))?;
    let tds = select_in(table, "td");
    Ok(tds.chunks_exact(2)
        .map(|pair| Element::new(title_case(&text_of(pair[0])), text_of(pair[1])))
        .collect())
}

// Optional "Extra Features" table (detached garages, pools, ...): two header
// rows and a column-title row, then label in cell 1 and area in the
// second-to-last cell.
fn extra_features(page: &Page) -> Vec<Element> {
    let Some(th) = page.find_by_string("th", |s| s == "Extra Features") else { return Vec::new() };
    let Some(table) = enclosing_table(th) else { return Vec::new() };
    rows(table).into_iter().skip(3)
        .map(cells)
        .filter(|c| c.len() >= 3)
        .map(|c| Element::new(title_case(&text_of(c[1])), text_of(c[c.len() - 2])))
        .collect()
}

// "<th>1234 ELM ST<br>HOUSTON TX 77002</th>" -> "1234 ELM ST, HOUSTON TX 77002"
fn property_address(page: &Page) -> Option<String> {
    let label = page.find_by_string("td", |s| s == "Property Address:")?;
    let row = enclosing(label, "tr")?;
    let th = select_in(row, "th").into_iter().next()?;
    let parts = direct_text_parts(th);
    let addr = if parts.is_empty() { text_of(th) } else { parts.join(", ") };
    (!addr.is_empty()).then_some(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = r#"
    <html><head><title>Real Property Account Information 0123450000001</title></head><body>
    <table width="100%"><tr><td>
      <table>
        <tr><td>Owner Name &amp; Mailing Address:</td><th>DOE JOHN<br>1234 ELM ST</th></tr>
        <tr><td>Property Address:</td><th>1234 ELM ST<br>HOUSTON TX 77002</th></tr>
      </table>
      <a href="/records/Print/OwnershipHistory.asp?acct=0123450000001&amp;taxyear=2024">Ownership History</a>
      <table>
        <tr><td>Value as of January 1, 2023</td></tr>
        <tr><td></td><td>Market</td><td>Appraised</td></tr>
        <tr><td>Total</td><td>$320,000</td><td>$312,500</td></tr>
        <tr><td colspan="3">&nbsp;</td></tr>
      </table>
    </td></tr></table>

    <table>
      <tr><th>Building</th><th>Year Built</th><th>Type</th><th>Im Sq Ft</th><th>Gross Sq Ft</th></tr>
      <tr><td>1</td><td>1998</td><td>Residential Single Family</td><td>2,104</td><td>2,690</td></tr>
      <tr><td colspan="5"></td></tr>
    </table>

    <table><tr><td>
      <table>
        <tr><th colspan="2">Building Data</th></tr>
        <tr><td>Foundation Type</td><td>Slab</td></tr>
        <tr><td>Room:  Full Bath</td><td>2</td></tr>
        <tr><td>Room:  Half Bath</td><td>1</td></tr>
        <tr><td>Fireplace: Masonry Firebrick</td><td>1</td></tr>
      </table>
    </td><td>
      <table>
        <tr><th colspan="2">Building Areas</th></tr>
        <tr><td>BASE AREA PRI</td><td>1204</td></tr>
        <tr><td>BASE AREA UPR</td><td>900</td></tr>
        <tr><td>OPEN FRAME PORCH PRI</td><td>48</td></tr>
        <tr><td>MAS/BRK GARAGE PRI</td><td>420</td></tr>
      </table>
    </td></tr></table>

    <table>
      <tr><th colspan="6">Extra Features</th></tr>
      <tr><td colspan="6">&nbsp;</td></tr>
      <tr><td>Line</td><td>Description</td><td>Quality</td><td>Condition</td><td>Units</td><td>Year Built</td></tr>
      <tr><td>1</td><td>FRM DTCHD GARAGE</td><td>Average</td><td>Average</td><td>400</td><td>2001</td></tr>
      <tr><td>2</td><td>CONCRETE PATIO</td><td>Average</td><td>Average</td><td>120</td><td>2001</td></tr>
    </table>
    </body></html>"#;

    const OWNERSHIP: &str = r#"
    <html><body>
      <table><tr><td>Ownership History for 0123450000001</td></tr></table>
      <table>
        <tr><td>Owner Name</td><td>Effective Date</td></tr>
        <tr><td>DOE JOHN &amp; MARY</td><td>06/15/2012</td></tr>
        <tr><td>SMITH JANE</td><td>03/01/2001</td></tr>
      </table>
    </body></html>"#;

    #[test]
    fn splits_number_and_street() {
        assert_eq!(split_address(" 12506 Rip Van Winkle Dr ").unwrap(), ("12506".to_string(), "Rip Van Winkle Dr".to_string()));
        assert_eq!(split_address("1234 W 11th St").unwrap(), ("1234".to_string(), "W 11th St".to_string()));
        assert_eq!(split_address("Main St").unwrap(), (String::new(), "Main St".to_string()));
        assert!(split_address("12506").is_err());
    }

    #[test]
    fn extracts_account_page() {
        let AccountPage { record: rec, ownership_href } = extract(ACCOUNT).unwrap().unwrap();
        assert_eq!(rec.county, County::Hcad);
        assert_eq!(rec.address, "1234 ELM ST, HOUSTON TX 77002");
        assert_eq!(rec.value, "$312,500");
        assert_eq!(rec.year_built, "1998");
        assert_eq!(rec.sqft, "2,104");
        assert_eq!(rec.baths, Baths { full: 2, half: 1 });
        assert_eq!(rec.fireplace, "1");
        assert_eq!(rec.stories, 2);
        assert_eq!((rec.porch, rec.patio, rec.deck, rec.garage), (48, 120, 0, 820));
        assert_eq!(rec.purchase_date, NOT_FOUND);
        assert_eq!(ownership_href.as_deref(), Some("/records/Print/OwnershipHistory.asp?acct=0123450000001&taxyear=2024"));
    }

    #[test]
    fn upper_story_ignores_case() {
        assert!(is_upper_story("Base Area Upr"));
        assert!(is_upper_story("BASE AREA UPR"));
        assert!(!is_upper_story("Base Area Pri"));
    }

    #[test]
    fn elements_keep_page_order_and_account() {
        let page = extract(ACCOUNT).unwrap().unwrap();
        let got: Vec<(&str, &str)> = page.record.elements.iter().map(|e| (e.label.as_str(), e.value.as_str())).collect();
        assert_eq!(got, vec![
            ("Base Area Pri", "1204"),
            ("Base Area Upr", "900"),
            ("Open Frame Porch Pri", "48"),
            ("Mas/Brk Garage Pri", "420"),
            ("Frm Dtchd Garage", "400"),
            ("Concrete Patio", "120"),
            ("HCAD", "0123450000001"),
        ]);
    }

    #[test]
    fn missing_building_data_defaults_to_zero() {
        let html = ACCOUNT
            .replace("<tr><td>Room:  Full Bath</td><td>2</td></tr>", "")
            .replace("<tr><td>Room:  Half Bath</td><td>1</td></tr>", "")
            .replace("<tr><td>Fireplace: Masonry Firebrick</td><td>1</td></tr>", "");
        let rec = extract(&html).unwrap().unwrap().record;
        assert_eq!(rec.baths, Baths::default());
        assert_eq!(rec.fireplace, "0");
    }

    #[test]
    fn no_extra_features_table_is_fine() {
        let start = ACCOUNT.find("<table>\n      <tr><th colspan=\"6\">Extra Features").unwrap();
        let end = ACCOUNT[start..].find("</table>").unwrap() + start + "</table>".len();
        let html = format!("{}{}", &ACCOUNT[..start], &ACCOUNT[end..]);
        let rec = extract(&html).unwrap().unwrap().record;
        assert_eq!((rec.garage, rec.patio), (420, 0));
    }

    #[test]
    fn unknown_address_is_none() {
        let html = "<html><head><title>Real Property</title></head><body><p>No records match your search.</p></body></html>";
        assert!(extract(html).unwrap().is_none());
    }

    #[test]
    fn changed_layout_names_the_missing_section() {
        for section in ["Year Built", "Building Data", "Building Areas"] {
            let html = ACCOUNT.replace(section, "Renamed");
            let err = extract(&html).unwrap_err();
            assert!(err.to_string().contains(section), "{section}: {err}");
        }
    }

    #[test]
    fn ownership_popup() {
        let o = extract_ownership(OWNERSHIP).unwrap();
        assert_eq!(o, Ownership { buyer: "DOE JOHN & MARY".into(), purchase_date: "06/15/2012".into() });
    }

    #[test]
    fn ownership_popup_without_rows() {
        assert!(extract_ownership("<html><body><table><tr><td>x</td></tr></table></body></html>").is_none());
    }

    fn account_record() -> PropertyRecord {
        extract(ACCOUNT).unwrap().unwrap().record
    }

    #[test]
    fn ownership_page_fills_sale_info() {
        let mut rec = account_record();
        settle_ownership(&mut rec, Ok(OWNERSHIP.to_string())).unwrap();
        assert_eq!((rec.buyer.as_str(), rec.purchase_date.as_str()), ("DOE JOHN & MARY", "06/15/2012"));
    }

    #[test]
    fn ownership_failures_keep_the_record() {
        let no_rows = "<html><body><table></table><table><tr><td>Owner Name</td></tr></table></body></html>";
        let cases: Vec<(Result<String>, &str)> = vec![
            (Err(anyhow::anyhow!("no 'Ownership History' link on account page")), "link"),
            (ownership_url(&Settings::default(), "http://[::1"), "IPv6"),
            (Err(anyhow::anyhow!("HTTP status server error (500 Internal Server Error)")), "500"),
            (Ok(no_rows.to_string()), "Effective Date"),
        ];
        for (fetched, reason) in cases {
            let mut rec = account_record();
            let err = settle_ownership(&mut rec, fetched).unwrap_err();
            assert!(format!("{:#}", err).contains(reason), "{reason}: {err:#}");
            assert_eq!((rec.buyer.as_str(), rec.purchase_date.as_str()), (NOT_FOUND, NOT_FOUND));
            assert_eq!(rec.value, "$312,500");
        }
    }

    #[test]
    fn ownership_url_joins_relative_href() {
        let s = Settings::default();
        assert_eq!(ownership_url(&s, "/records/Print/OwnershipHistory.asp?acct=1").unwrap(), "https://public.hcad.org/records/Print/OwnershipHistory.asp?acct=1");
    }

    #[test]
    fn plan_carries_form_fields() {
        let s = Settings { tax_year: 2019, ..Settings::default() };
        let p = plan(&s, "1234 Elm St").unwrap();
        assert_eq!(p[0].method, "POST");
        assert_eq!(p[0].url, "https://public.hcad.org/records/QuickRecord.asp");
        assert_eq!(p[0].params[0], ("TaxYear".to_string(), "2019".to_string()));
        assert_eq!(p[0].params[2], ("stname".to_string(), "Elm St".to_string()));
    }
}
