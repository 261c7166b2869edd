//! Builds the text prompt sent to the generative-AI provider.

use std::fmt::Write;

use crate::insights::{
    InsightRequest,
    summary::{SpendingSummary, format_currency},
};

/// The maximum number of raw transaction lines included in a prompt.
pub const MAX_PROMPT_TRANSACTIONS: usize = 50;

/// Compose the prompt for a period's spending.
///
/// The prompt embeds the precomputed statistics so the model does not have to
/// do arithmetic, followed by at most [MAX_PROMPT_TRANSACTIONS] raw
/// transactions and the formatting instructions.
pub fn build_prompt(request: &InsightRequest, summary: &SpendingSummary) -> String {
    let mut prompt = String::new();

    // Writing to a `String` cannot fail, so the `fmt::Result`s are ignored.
    let _ = writeln!(
        prompt,
        "You are a friendly financial advisor helping a university student understand their spending."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Spending data for {}:", request.period_label());
    let _ = writeln!(
        prompt,
        "- Number of transactions: {}",
        summary.transaction_count
    );
    let _ = writeln!(prompt, "- Total spent: {}", format_currency(summary.total));

    if let Some(budget) = request.budget {
        let remaining = budget - summary.total;
        let _ = writeln!(prompt, "- Budget: {}", format_currency(budget));
        if remaining >= 0.0 {
            let _ = writeln!(prompt, "- Remaining budget: {}", format_currency(remaining));
        } else {
            let _ = writeln!(prompt, "- Over budget by: {}", format_currency(-remaining));
        }
    }

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Spending by category:");
    for ranked in summary.ranked_categories() {
        let _ = writeln!(
            prompt,
            "- {}: {} ({:.1}%)",
            ranked.category,
            format_currency(ranked.amount),
            ranked.percentage
        );
    }

    let shown = request.transactions.len().min(MAX_PROMPT_TRANSACTIONS);
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Transactions (showing {shown} of {}):",
        request.transactions.len()
    );
    for transaction in request.transactions.iter().take(MAX_PROMPT_TRANSACTIONS) {
        let _ = writeln!(
            prompt,
            "- {} - {} - {}: {}",
            transaction.display_date(),
            transaction.category_label(),
            transaction.description_text().unwrap_or("No description"),
            format_currency(transaction.amount)
        );
    }

    let _ = writeln!(prompt);
    prompt.push_str(FORMAT_INSTRUCTIONS);

    prompt
}

const FORMAT_INSTRUCTIONS: &str = "\
Write a short analysis of this spending in markdown using exactly these sections:
## Overview
One or two sentences summarising the period.
## Top Spending Categories
The biggest categories and whether they look reasonable for a student.
## Tips to Save
Three to five specific, actionable tips based on the data above.

Use a supportive, student-friendly tone. Do not invent transactions or amounts \
that are not listed above. Keep the whole answer under 300 words.
";

#[cfg(test)]
mod tests {
    use crate::{
        insights::{
            InsightRequest,
            prompt::{MAX_PROMPT_TRANSACTIONS, build_prompt},
            summary::SpendingSummary,
        },
        transaction::{PeriodMonth, TransactionSnapshot},
    };

    fn request(transactions: Vec<TransactionSnapshot>, budget: Option<f64>) -> InsightRequest {
        InsightRequest {
            transactions,
            month: Some(PeriodMonth::new("3")),
            year: Some(2024),
            budget,
        }
    }

    #[test]
    fn embeds_statistics() {
        let request = request(
            vec![
                TransactionSnapshot::new(12.5, "Food", "2024-03-01").description("Lunch"),
                TransactionSnapshot::new(40.0, "Rent", "2024-03-02"),
            ],
            None,
        );
        let summary = SpendingSummary::from_transactions(&request.transactions);

        let prompt = build_prompt(&request, &summary);

        assert!(prompt.contains("Spending data for March 2024:"), "{prompt}");
        assert!(prompt.contains("- Number of transactions: 2"));
        assert!(prompt.contains("- Total spent: $52.50"));
        assert!(prompt.contains("- Rent: $40.00 (76.2%)"));
        assert!(prompt.contains("- 2024-03-01 - Food - Lunch: $12.50"));
        assert!(prompt.contains("- 2024-03-02 - Rent - No description: $40.00"));
        assert!(prompt.contains("## Tips to Save"));
        assert!(!prompt.contains("Budget"));
    }

    #[test]
    fn ranks_categories_before_listing_them() {
        let request = request(
            vec![
                TransactionSnapshot::new(12.5, "Food", "2024-03-01"),
                TransactionSnapshot::new(40.0, "Rent", "2024-03-02"),
            ],
            None,
        );
        let summary = SpendingSummary::from_transactions(&request.transactions);

        let prompt = build_prompt(&request, &summary);

        let rent = prompt.find("- Rent: $40.00").unwrap();
        let food = prompt.find("- Food: $12.50").unwrap();
        assert!(rent < food);
    }

    #[test]
    fn includes_budget_when_given() {
        let request = request(
            vec![TransactionSnapshot::new(120.0, "Food", "2024-03-01")],
            Some(100.0),
        );
        let summary = SpendingSummary::from_transactions(&request.transactions);

        let prompt = build_prompt(&request, &summary);

        assert!(prompt.contains("- Budget: $100.00"));
        assert!(prompt.contains("- Over budget by: $20.00"));
    }

    #[test]
    fn limits_transaction_lines() {
        let transactions = (0..MAX_PROMPT_TRANSACTIONS + 10)
            .map(|i| {
                TransactionSnapshot::new(1.0, "Snacks", "2024-03-01").description(&format!("item {i}"))
            })
            .collect();
        let request = request(transactions, None);
        let summary = SpendingSummary::from_transactions(&request.transactions);

        let prompt = build_prompt(&request, &summary);

        let transaction_lines = prompt
            .lines()
            .filter(|line| line.starts_with("- 2024-03-01"))
            .count();
        assert_eq!(transaction_lines, MAX_PROMPT_TRANSACTIONS);
        assert!(prompt.contains(&format!(
            "showing {MAX_PROMPT_TRANSACTIONS} of {}",
            MAX_PROMPT_TRANSACTIONS + 10
        )));
        assert!(prompt.contains("- Number of transactions: 60"));
    }
}
