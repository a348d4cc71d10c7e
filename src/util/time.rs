use anyhow::{bail, Result};
use chrono::{Datelike, Utc};

pub fn current_year() -> i32 {
    Utc::now().year()
}

// 4-digit years up to next year; the districts open the coming roll early.
pub fn parse_tax_year(s: &str) -> Result<i32> {
    let Ok(year) = s.trim().parse::<i32>() else { bail!("Invalid tax year: {:?}", s) };
    if !(1900..=current_year() + 1).contains(&year) {
        bail!("Tax year out of range: {}", year);
    }
    Ok(year)
}
