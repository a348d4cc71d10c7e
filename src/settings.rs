use std::env;

use anyhow::{Context, Result};

use crate::util::time::{current_year, parse_tax_year};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:70.0) Gecko/20100101 Firefox/70.0";
pub const DEFAULT_FBCAD_BASE: &str = "https://esearch.fbcad.org";
pub const DEFAULT_HCAD_BASE: &str = "https://public.hcad.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Runtime knobs, read from the environment (`.env` is loaded first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tax_year: i32,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub fbcad_base: String,
    pub hcad_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tax_year: current_year(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fbcad_base: DEFAULT_FBCAD_BASE.to_string(),
            hcad_base: DEFAULT_HCAD_BASE.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut s = Settings::default();
        if let Some(v) = get("CAD_TAX_YEAR") { s.tax_year = parse_tax_year(&v).context("CAD_TAX_YEAR")?; }
        if let Some(v) = get("CAD_USER_AGENT") { s.user_agent = v; }
        if let Some(v) = get("CAD_TIMEOUT_SECS") {
            s.timeout_secs = v.trim().parse().with_context(|| format!("CAD_TIMEOUT_SECS: not a number: {:?}", v))?;
        }
        if let Some(v) = get("CAD_FBCAD_BASE_URL") { s.fbcad_base = trim_base(&v); }
        if let Some(v) = get("CAD_HCAD_BASE_URL") { s.hcad_base = trim_base(&v); }
        Ok(s)
    }
}

fn trim_base(s: &str) -> String {
    s.trim().trim_end_matches('/').to_string()
}
