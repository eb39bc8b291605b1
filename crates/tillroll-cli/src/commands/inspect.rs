//! Inspect command - dump the raw fields of a captured response.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use tillroll_core::models::expense::ExpenseField;
use tillroll_core::{AnalyzeExpenseResponse, ExpenseDocument, ReceiptParser};

use super::config::load_config;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Captured expense response (JSON)
    #[arg(required = true)]
    input: PathBuf,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let content = fs::read_to_string(&args.input)?;
    let response = AnalyzeExpenseResponse::from_json_str(&content)?;

    if response.expense_documents.is_empty() {
        println!("No documents found in response.");
        return Ok(());
    }

    for (i, doc) in response.expense_documents.iter().enumerate() {
        println!();
        println!("{}", style(format!("----- Document #{} -----", i + 1)).bold());
        print!("{}", dump_document(doc));
    }

    let parser = ReceiptParser::from_config(&config);
    let result = parser.parse(response.first_document()?);

    println!();
    println!("{} Detected merchant: {}", style("ℹ").blue(), result.merchant);
    println!(
        "{} Receipt time     : {}",
        style("ℹ").blue(),
        result.receipt_time.as_deref().unwrap_or("Unknown")
    );

    Ok(())
}

fn field_label(field: &ExpenseField) -> &str {
    field.label().unwrap_or("?")
}

fn dump_document(doc: &ExpenseDocument) -> String {
    let mut output = String::new();

    output.push_str("\n=== SummaryFields ===\n");
    for field in &doc.summary_fields {
        output.push_str(&format!(
            "{:<24} : {}\n",
            field_label(field),
            field.value().unwrap_or("")
        ));
    }

    output.push_str("\n=== LineItems ===\n");
    for (g, group) in doc.line_item_groups.iter().enumerate() {
        for line in &group.line_items {
            let fields: Vec<String> = line
                .line_item_expense_fields
                .iter()
                .map(|f| format!("{}={}", field_label(f), f.value().unwrap_or("")))
                .collect();
            output.push_str(&format!("  [{}] {}\n", g + 1, fields.join(" | ")));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillroll_core::{LineItem, LineItemGroup};

    #[test]
    fn test_dump_document() {
        let doc = ExpenseDocument::new(
            vec![ExpenseField::new("VENDOR_NAME", "Joe's Deli")],
            vec![LineItemGroup::new(vec![LineItem::new(vec![
                ExpenseField::new("ITEM", "Soup"),
                ExpenseField::new("PRICE", "3.20"),
            ])])],
        );

        let dump = dump_document(&doc);
        assert!(dump.contains("VENDOR_NAME"));
        assert!(dump.contains("Joe's Deli"));
        assert!(dump.contains("[1] ITEM=Soup | PRICE=3.20"));
    }
}
