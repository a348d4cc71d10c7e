use std::fmt;

use anyhow::Result;
use reqwest::Client;
use serde::Serialize;

use crate::record::PropertyRecord;
use crate::settings::Settings;
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::lookup::Lookup;

pub mod fbcad;
pub mod hcad;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum County {
    /// Fort Bend Central Appraisal District
    Fbcad,
    /// Harris County Appraisal District
    Hcad,
}

impl County {
    pub const ALL: [County; 2] = [County::Fbcad, County::Hcad];

    pub fn code(&self) -> &'static str {
        match self { County::Fbcad => "fbcad", County::Hcad => "hcad" }
    }

    pub fn label(&self) -> &'static str {
        match self { County::Fbcad => "Fort Bend County", County::Hcad => "Harris County" }
    }

    /// Runs the full search + detail scrape. `Ok(None)` when the district has no match.
    pub async fn lookup(&self, client: &Client, settings: &Settings, address: &str, log: &LogCtx<Lookup>) -> Result<Option<PropertyRecord>> {
        match self {
            County::Fbcad => fbcad::lookup(client, settings, address, log).await,
            County::Hcad => hcad::lookup(client, settings, address, log).await,
        }
    }

    /// The requests `lookup` would send, without sending them.
    pub fn plan(&self, settings: &Settings, address: &str) -> Result<Vec<RequestPlan>> {
        match self {
            County::Fbcad => Ok(fbcad::plan(settings, address)),
            County::Hcad => hcad::plan(settings, address),
        }
    }
}

impl fmt::Display for County {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code().to_uppercase())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestPlan {
    pub method: &'static str,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub purpose: &'static str,
}

impl RequestPlan {
    pub fn new(method: &'static str, url: String, params: &[(&str, &str)], purpose: &'static str) -> Self {
        let params = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        RequestPlan { method, url, params, purpose }
    }
}

impl fmt::Display for RequestPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if !self.params.is_empty() {
            let kv: Vec<String> = self.params.iter().map(|(k, v)| format!("{}={:?}", k, v)).collect();
            write!(f, " [{}]", kv.join(" "))?;
        }
        write!(f, "  # {}", self.purpose)
    }
}
