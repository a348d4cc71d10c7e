use anyhow::{bail, Result};
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use reqwest::Client;
use tracing::Instrument;

use crate::county::County;
use crate::fetch;
use crate::lookup;
use crate::settings::Settings;
use crate::telemetry::{self, config};
use crate::telemetry::ops::menu::Phase;

/// Interactive loop: pick a district, enter an address, read the report.
/// Entering `x` at the address prompt goes back to the district list.
pub async fn run(settings: &Settings) -> Result<()> {
    if config::json_mode() {
        bail!("the menu is interactive; use `cad lookup --json` for machine output");
    }
    let log = telemetry::menu();
    let _root = log.root_span_kv([("tax_year", settings.tax_year.to_string())]);

    let term = Term::stdout();
    let theme = ColorfulTheme::default();
    let client = fetch::build_client(settings)?;

    loop {
        term.clear_screen()?;
        let county = { let _s = log.span(&Phase::Select).entered(); select_county(&term, &theme)? };
        let Some(county) = county else { break };

        println!("\n{} selected. Enter (x) to go back.\n", style(county.label()).bold());
        let query = { let _s = log.span(&Phase::Prompt).entered(); prompt_address(&term, &theme)? };
        if query.eq_ignore_ascii_case("x") {
            continue;
        }

        println!("\nSearching...");
        search(&client, settings, county, &query)
            .instrument(log.span_kv(&Phase::Lookup, [("county", county.code().to_string()), ("address", query.clone())]))
            .await;
        pause(&term)?;
    }
    log.info("👋 bye");
    Ok(())
}

fn select_county(term: &Term, theme: &ColorfulTheme) -> Result<Option<County>> {
    let mut items: Vec<String> = County::ALL.iter().enumerate()
        .map(|(i, c)| format!("({}) {}", i + 1, c))
        .collect();
    items.push("Exit".to_string());

    let picked = Select::with_theme(theme)
        .with_prompt("Select a County")
        .items(&items)
        .default(0)
        .interact_on_opt(term)?;
    Ok(picked.and_then(|i| County::ALL.get(i).copied()))
}

fn prompt_address(term: &Term, theme: &ColorfulTheme) -> Result<String> {
    let input: String = Input::with_theme(theme)
        .with_prompt("Enter Property Address")
        .interact_text_on(term)?;
    Ok(input.trim().to_string())
}

// Failures are shown and the loop carries on.
async fn search(client: &Client, settings: &Settings, county: County, query: &str) {
    match lookup::perform(client, settings, county, query, true).await {
        Ok(res) if res.found => {
            println!("{}", res.text);
            if res.copied { println!("{}", style("Copied to clipboard.").green()); }
        }
        Ok(res) => println!("\n{}\n", res.text),
        Err(e) => println!("\nReceived error: \n\n{:#}\n", e),
    }
}

fn pause(term: &Term) -> Result<()> {
    println!("Press any key to continue . . .");
    term.read_key()?;
    Ok(())
}
