use std::time::Instant;

use anyhow::Result;
use clap::Args;
use reqwest::Client;
use tracing::Instrument;

use crate::clipboard;
use crate::county::County;
use crate::fetch;
use crate::record::PropertyRecord;
use crate::report;
use crate::settings::Settings;
use crate::telemetry;
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::lookup::{Lookup, Phase as LookupPhase};

pub mod types;

use types::{LookupPlan, LookupResult};

/// cad lookup <county> <address...>
#[derive(Args)]
pub struct LookupCmd {
    #[arg(value_enum)] pub county: County,
    /// Street address, e.g. 4810 Elm Creek Dr
    #[arg(required = true, num_args = 1..)] pub address: Vec<String>,
    /// Print the report without touching the clipboard
    #[arg(long, default_value_t = false)] pub no_clipboard: bool,
    /// Show the requests that would be sent, then exit
    #[arg(long, default_value_t = false)] pub plan: bool,
}

pub async fn run(settings: &Settings, args: LookupCmd) -> Result<()> {
    let log = telemetry::lookup();
    let address = args.address.join(" ").trim().to_string();
    let span = log.root_span_kv([
        ("county", args.county.code().to_string()),
        ("address", address.clone()),
        ("tax_year", settings.tax_year.to_string()),
        ("plan", args.plan.to_string()),
    ]);

    if args.plan {
        let _s = span.enter();
        let _p = log.span(&LookupPhase::Plan).entered();
        let requests = args.county.plan(settings, &address)?;
        let mut text = format!("📝 Lookup plan — county={} tax_year={}", args.county, settings.tax_year);
        for r in &requests { text.push_str(&format!("\n  {}", r)); }
        text.push_str("\n   Drop --plan to execute.");
        let plan = LookupPlan { county: args.county, query: address, tax_year: settings.tax_year, requests, text };
        return log.plan(&plan);
    }

    let started = Instant::now();
    let client = fetch::build_client(settings)?;
    let result = perform(&client, settings, args.county, &address, !args.no_clipboard).instrument(span).await?;
    log.result_timed(&result, started)
}

/// One search against `county`: scrape, render, optionally copy. Shared by
/// `cad lookup` and the interactive menu.
pub async fn perform(client: &Client, settings: &Settings, county: County, address: &str, copy: bool) -> Result<LookupResult> {
    let log = telemetry::lookup();
    let found: Option<PropertyRecord> = county.lookup(client, settings, address, &log).await?;
    Ok(conclude(&log, county, address, found, copy))
}

fn conclude(log: &LogCtx<Lookup>, county: County, address: &str, found: Option<PropertyRecord>, copy: bool) -> LookupResult {
    let Some(rec) = found else {
        log.not_found(address);
        return LookupResult {
            county,
            query: address.to_string(),
            found: false,
            copied: false,
            record: None,
            text: report::not_found_line(address),
        };
    };

    log.found(&rec);
    let text = { let _s = log.span(&LookupPhase::Render).entered(); report::render(&rec) };
    let copied = copy && {
        let _s = log.span(&LookupPhase::Clipboard).entered();
        match clipboard::copy(&text) {
            Ok(()) => { log.info("📋 Copied to clipboard"); true }
            Err(e) => { log.warn_kv("⚠️ clipboard unavailable", [("error", format!("{:#}", e))]); false }
        }
    };

    LookupResult { county, query: address.to_string(), found: true, copied, record: Some(rec), text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Baths, Element};

    fn record() -> PropertyRecord {
        PropertyRecord {
            county: County::Fbcad,
            address: "4810 ELM CREEK DR, SUGAR LAND, TX 77479".into(),
            sqft: "2104".into(),
            value: "$312,500".into(),
            year_built: "1998".into(),
            porch: 48,
            patio: 96,
            deck: 0,
            garage: 420,
            purchase_date: "6/15/2012".into(),
            buyer: "DOE JOHN".into(),
            bedrooms: "4".into(),
            baths: Baths { full: 2, half: 1 },
            fireplace: "1".into(),
            stories: 2,
            elements: vec![Element::new("FBCAD", "R416144")],
        }
    }

    #[test]
    fn no_match_reports_no_results() {
        let res = conclude(&telemetry::lookup(), County::Hcad, " 12 Nowhere Ln ", None, true);
        assert!(!res.found);
        assert!(!res.copied);
        assert!(res.record.is_none());
        assert_eq!(res.text, "No Results for: 12 Nowhere Ln");
    }

    #[test]
    fn match_renders_report_without_copy() {
        let rec = record();
        let expected = report::render(&rec);
        let res = conclude(&telemetry::lookup(), County::Fbcad, "4810 Elm Creek", Some(rec), false);
        assert!(res.found);
        assert!(!res.copied);
        assert_eq!(res.text, expected);
        assert_eq!(res.record.map(|r| r.sqft).as_deref(), Some("2104"));
    }

    #[test]
    fn result_serializes_without_record_when_missing() {
        let res = conclude(&telemetry::lookup(), County::Hcad, "12 Nowhere Ln", None, false);
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["county"], "hcad");
        assert!(v.get("record").is_none());
    }
}
