use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::clipboard;
use crate::county::{fbcad, hcad, County};
use crate::record::PropertyRecord;
use crate::report;
use crate::settings::Settings;
use crate::telemetry;
use crate::telemetry::ops::extract::Phase;

/// cad extract <county> --detail <file>: run the scraper over saved pages
#[derive(Args)]
pub struct ExtractCmd {
    #[arg(value_enum)] pub county: County,
    /// Saved property page (FBCAD property view or HCAD QuickRecord result)
    #[arg(long)] pub detail: PathBuf,
    /// Saved HCAD ownership history page
    #[arg(long)] pub ownership: Option<PathBuf>,
    /// FBCAD property id for the account element (defaults to the file stem)
    #[arg(long)] pub id: Option<String>,
    /// Also copy the report to the clipboard
    #[arg(long, default_value_t = false)] pub copy: bool,
}

#[derive(Serialize)]
pub struct ExtractResult {
    pub county: County,
    pub source: String,
    pub found: bool,
    pub copied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PropertyRecord>,
    pub text: String,
}

pub fn run(settings: &Settings, args: ExtractCmd) -> Result<()> {
    let log = telemetry::extract();
    let source = args.detail.display().to_string();
    let _root = log.root_span_kv([
        ("county", args.county.code().to_string()),
        ("detail", source.clone()),
    ]).entered();
    let started = Instant::now();

    let html = { let _s = log.span(&Phase::Read).entered(); read(&args.detail)? };

    let found = {
        let _s = log.span(&Phase::Extract).entered();
        match args.county {
            County::Fbcad => {
                if args.ownership.is_some() { log.warn("⚠️ --ownership only applies to hcad; ignoring"); }
                let id = match args.id.clone() {
                    Some(id) => id,
                    None => file_stem(&args.detail)?,
                };
                Some(fbcad::extract(&html, &id, settings.tax_year)?)
            }
            County::Hcad => match hcad::extract(&html)? {
                Some(page) => {
                    let mut rec = page.record;
                    if let Some(path) = args.ownership.as_deref() {
                        let body = read(path)?;
                        if let Err(e) = hcad::settle_ownership(&mut rec, Ok(body)) {
                            log.warn_kv("⚠️ sale info unavailable", [("file", path.display().to_string()), ("reason", format!("{:#}", e))]);
                        }
                    }
                    Some(rec)
                }
                None => None,
            },
        }
    };

    let result = match found {
        Some(rec) => {
            log.found(&rec);
            let text = { let _s = log.span(&Phase::Render).entered(); report::render(&rec) };
            let copied = args.copy && match clipboard::copy(&text) {
                Ok(()) => true,
                Err(e) => { log.warn_kv("⚠️ clipboard unavailable", [("error", format!("{:#}", e))]); false }
            };
            ExtractResult { county: args.county, source, found: true, copied, record: Some(rec), text }
        }
        None => {
            log.not_found(&source);
            let text = report::not_found_line(&source);
            ExtractResult { county: args.county, source, found: false, copied: false, record: None, text }
        }
    };
    log.result_timed(&result, started)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a property id from {}; pass --id", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_id_from_file_stem() {
        assert_eq!(file_stem(Path::new("/tmp/pages/R123456.html")).unwrap(), "R123456");
        assert!(file_stem(Path::new("/")).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read(Path::new("/nonexistent/detail.html")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/detail.html"));
    }
}
