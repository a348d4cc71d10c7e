use std::fmt::Write;

use crate::record::PropertyRecord;

/// Renders the paste-ready worksheet. Blank fields (ROOF REPL, DOGS, PAY,
/// EXTERIOR, FLOOD QUOTE) are filled in by hand afterwards; every line keeps
/// the `: ` separator, blank or not.
pub fn render(rec: &PropertyRecord) -> String {
    let fields: [(&str, String); 15] = [
        ("STORY", rec.stories.to_string()),
        ("YEAR BUILT", rec.year_built.clone()),
        ("ROOF REPL", String::new()),
        ("SQ FOOT", rec.sqft.clone()),
        ("BATHROOMS", rec.baths.to_string()),
        ("GARAGE", rec.garage.to_string()),
        ("FIREPLACE", rec.fireplace.clone()),
        ("OPEN PORCH", rec.porch.to_string()),
        ("PATIO", rec.patio.to_string()),
        ("DOGS", String::new()),
        ("PAY", String::new()),
        ("EXTERIOR", String::new()),
        ("BOUGHT", rec.purchase_date.clone()),
        ("MARKET VAL", rec.value.clone()),
        ("FLOOD QUOTE", String::new()),
    ];

    let mut out = String::new();
    let _ = write!(out, "\n{}\n\n", rec.address);
    for (label, value) in &fields {
        let _ = writeln!(out, "{:<11}: {}", label, value);
    }
    out.push_str("\nRaw Data:\n");
    for el in &rec.elements {
        let _ = writeln!(out, "{}: {}", el.label, el.value);
    }
    out.push('\n');
    out
}

pub fn not_found_line(query: &str) -> String {
    format!("No Results for: {}", query.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::county::County;
    use crate::record::{Baths, Element};

    fn sample() -> PropertyRecord {
        PropertyRecord {
            county: County::Hcad,
            address: "1234 ELM ST, HOUSTON TX 77002".into(),
            sqft: "2104".into(),
            value: "$312,500".into(),
            year_built: "1998".into(),
            porch: 48,
            patio: 0,
            deck: 0,
            garage: 420,
            purchase_date: "06/15/2012".into(),
            buyer: "DOE JOHN".into(),
            bedrooms: String::new(),
            baths: Baths { full: 2, half: 1 },
            fireplace: "1".into(),
            stories: 2,
            elements: vec![Element::new("Base Area Pri", "1204"), Element::new("HCAD", "0123450000001")],
        }
    }

    #[test]
    fn renders_fixed_layout() {
        let expected = concat!(
            "\n",
            "1234 ELM ST, HOUSTON TX 77002\n",
            "\n",
            "STORY      : 2\n",
            "YEAR BUILT : 1998\n",
            "ROOF REPL  : \n",
            "SQ FOOT    : 2104\n",
            "BATHROOMS  : 2.5\n",
            "GARAGE     : 420\n",
            "FIREPLACE  : 1\n",
            "OPEN PORCH : 48\n",
            "PATIO      : 0\n",
            "DOGS       : \n",
            "PAY        : \n",
            "EXTERIOR   : \n",
            "BOUGHT     : 06/15/2012\n",
            "MARKET VAL : $312,500\n",
            "FLOOD QUOTE: \n",
            "\n",
            "Raw Data:\n",
            "Base Area Pri: 1204\n",
            "HCAD: 0123450000001\n",
            "\n",
        );
        assert_eq!(render(&sample()), expected);
    }

    #[test]
    fn empty_elements_leave_empty_raw_section() {
        let mut rec = sample();
        rec.elements.clear();
        assert!(render(&rec).ends_with("Raw Data:\n\n"));
    }

    #[test]
    fn not_found_trims_query() {
        assert_eq!(not_found_line("  12 Nowhere Ln "), "No Results for: 12 Nowhere Ln");
    }
}
