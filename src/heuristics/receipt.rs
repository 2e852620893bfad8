use super::{LineItem, ReceiptFields, parse_date};

/// Main extraction entry point — four independent line-oriented scans.
pub fn extract(text: &str) -> ReceiptFields {
    let lines: Vec<&str> = text.lines().collect();
    ReceiptFields {
        merchant: extract_merchant(&lines),
        date: extract_date(&lines),
        total_amount: extract_total(&lines),
        items: extract_items(&lines),
    }
}

// ---------------------------------------------------------------------------
// Scalar field scans
// ---------------------------------------------------------------------------

/// On each line containing "total", the first parsable token is that
/// line's candidate. Across lines the last candidate wins: later
/// "total" lines are more likely the grand total than early subtotals.
fn extract_total(lines: &[&str]) -> Option<f64> {
    let mut total = None;
    for line in lines {
        if !line.to_lowercase().contains("total") {
            continue;
        }
        if let Some(amount) = line.split_whitespace().find_map(parse_amount_token) {
            total = Some(amount);
        }
    }
    total
}

/// Attempt to read a token as a dollar amount. A leading "$" marker is
/// stripped, thousands-separator commas are removed, and anything that
/// fails to parse as a non-negative decimal is skipped.
fn parse_amount_token(token: &str) -> Option<f64> {
    let token = token.strip_prefix('$').unwrap_or(token);
    token
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// First non-empty line that doesn't look like a header ("date",
/// "receipt", "invoice") is taken verbatim as the merchant name.
fn extract_merchant(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .find(|line| {
            let lower = line.to_lowercase();
            !line.trim().is_empty()
                && !["date", "receipt", "invoice"]
                    .iter()
                    .any(|kw| lower.contains(kw))
        })
        .map(|line| line.trim().to_string())
}

/// A line whose full trimmed text parses as a date sets the date to
/// that text verbatim; the last matching line wins, mirroring the
/// total-amount policy. The unparsed string is kept on purpose.
fn extract_date(lines: &[&str]) -> Option<String> {
    let mut date = None;
    for line in lines {
        let trimmed = line.trim();
        if parse_date(trimmed).is_some() {
            date = Some(trimmed.to_string());
        }
    }
    date
}

/// "item"/"qty" lines open the item section (and are never items
/// themselves); after that, every non-empty line without "total" is
/// appended with a placeholder price of 0.0.
fn extract_items(lines: &[&str]) -> Vec<LineItem> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in lines {
        let lower = line.to_lowercase();
        if lower.contains("item") || lower.contains("qty") {
            in_section = true;
            continue;
        }
        if in_section && !lower.contains("total") && !line.trim().is_empty() {
            items.push(LineItem {
                description: line.trim().to_string(),
                price: 0.0,
            });
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_all_defaults() {
        let fields = extract("");
        assert!(fields.merchant.is_none());
        assert!(fields.date.is_none());
        assert!(fields.total_amount.is_none());
        assert!(fields.items.is_empty());

        let record = fields.into_record(String::new());
        assert_eq!(record.merchant, "Unknown");
        assert_eq!(record.total_amount, 0.0);
        assert!(record.items.is_empty());
        // Defaulted date is today, canonical format.
        assert!(super::super::parse_date(&record.date).is_some());
    }

    #[test]
    fn later_total_line_overwrites_earlier() {
        let text = "Cafe Luna\nSubtotal 10.00\nTotal $12.50";
        assert_eq!(extract(text).total_amount, Some(12.50));

        // "Subtotal" contains "total" too; the later line still wins.
        let text = "Total 99.00\nGrand Total 42.00";
        assert_eq!(extract(text).total_amount, Some(42.00));
    }

    #[test]
    fn total_handles_dollar_marker_and_commas() {
        assert_eq!(extract("TOTAL $1,234.56").total_amount, Some(1234.56));
        assert_eq!(extract("total due 17.80 USD").total_amount, Some(17.80));
    }

    #[test]
    fn unparsable_tokens_are_skipped_on_the_same_line() {
        // "amount:" fails to parse; scanning moves on to 8.25.
        assert_eq!(extract("Total amount: 8.25").total_amount, Some(8.25));
        // Nothing parsable at all leaves the total absent.
        assert_eq!(extract("Total due at register").total_amount, None);
    }

    #[test]
    fn negative_amounts_never_surface() {
        assert_eq!(extract("Total -5.00").total_amount, None);
        let record = extract("Total -5.00").into_record(String::new());
        assert!(record.total_amount >= 0.0);
    }

    #[test]
    fn merchant_is_first_qualifying_line() {
        let text = "Receipt #1001\nCafe Luna\nAnother Shop\nTotal 3.00";
        assert_eq!(extract(text).merchant.as_deref(), Some("Cafe Luna"));
    }

    #[test]
    fn merchant_skips_header_and_blank_lines() {
        let text = "\nInvoice 42\nDate: 2025-05-01\n  Corner Deli  \n";
        assert_eq!(extract(text).merchant.as_deref(), Some("Corner Deli"));
    }

    #[test]
    fn date_detection_keeps_verbatim_text_and_last_wins() {
        let text = "Cafe Luna\n2025-01-02\n03/04/2025\nTotal 5.00";
        assert_eq!(extract(text).date.as_deref(), Some("03/04/2025"));
    }

    #[test]
    fn date_patterns_tried_in_fixed_order() {
        // Valid under both %m/%d/%Y and %d/%m/%Y; either way the line
        // matches and its verbatim text is stored.
        assert_eq!(extract("05/06/2025").date.as_deref(), Some("05/06/2025"));
        // Not a date under any pattern.
        assert_eq!(extract("2025-13-40").date, None);
    }

    #[test]
    fn item_section_collects_lines_after_header() {
        let text = "Cafe Luna\nQty Item\nEspresso\nCroissant\n\nTotal 9.00";
        let items = extract(text).items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Espresso");
        assert_eq!(items[1].description, "Croissant");
        assert!(items.iter().all(|i| i.price == 0.0));
    }

    #[test]
    fn header_and_total_lines_are_not_items() {
        let text = "Items\nQty 2\nCoffee\nSubtotal 4.00\nTotal 4.00";
        let items = extract(text).items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Coffee");
    }

    #[test]
    fn no_item_header_means_no_items() {
        let text = "Cafe Luna\nEspresso\nTotal 3.00";
        assert!(extract(text).items.is_empty());
    }

    #[test]
    fn extraction_never_panics_on_noise() {
        for noise in ["$$$ ,,, \u{0}\u{7f}", "total total total", "\n\n\n", "日本語 ¥500"] {
            let fields = extract(noise);
            let record = fields.into_record(noise.to_string());
            assert!(record.total_amount >= 0.0);
        }
    }

    #[test]
    fn coverage_counts_filled_scalars() {
        let text = "Cafe Luna\n2025-01-02\nTotal $3.00";
        assert_eq!(extract(text).coverage(), (3, 3));
        assert_eq!(extract("").coverage(), (0, 3));
    }
}
