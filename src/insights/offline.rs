//! A deterministic insight generator that fills in a markdown template.

use std::fmt::Write;

use async_trait::async_trait;

use crate::insights::{
    Insight, InsightError, InsightGenerator, InsightRequest, InsightSource,
    summary::{SpendingSummary, TOP_CATEGORY_COUNT, format_currency},
};

const GENERAL_TIPS: [&str; 3] = [
    "Track small daily purchases like coffee and snacks, they add up quickly.",
    "Set a weekly spending limit and check in on it every weekend.",
    "Ask for student discounts and compare prices before bigger purchases.",
];

/// Summarises spending without calling any external service.
///
/// The same input always produces the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineInsightGenerator;

impl OfflineInsightGenerator {
    /// Compose the markdown summary for `request`.
    pub fn compose(&self, request: &InsightRequest, summary: &SpendingSummary) -> String {
        let mut text = String::new();
        let top_categories = summary.top_categories(TOP_CATEGORY_COUNT);

        // Writing to a `String` cannot fail, so the `fmt::Result`s are ignored.
        let _ = writeln!(text, "## Spending Summary for {}", request.period_label());
        let _ = writeln!(text);
        let _ = writeln!(
            text,
            "You made **{}** {} totalling **{}**.",
            summary.transaction_count,
            if summary.transaction_count == 1 {
                "transaction"
            } else {
                "transactions"
            },
            format_currency(summary.total)
        );

        if !top_categories.is_empty() {
            let _ = writeln!(text);
            let _ = writeln!(text, "### Top Spending Categories");
            for (rank, category) in top_categories.iter().enumerate() {
                let _ = writeln!(
                    text,
                    "{}. **{}**: {} ({:.1}%)",
                    rank + 1,
                    category.category,
                    format_currency(category.amount),
                    category.percentage
                );
            }
        }

        if let Some(budget) = request.budget {
            let _ = writeln!(text);
            let _ = writeln!(text, "### Budget");
            let _ = writeln!(text, "{}", budget_sentence(budget, summary.total));
        }

        let _ = writeln!(text);
        let _ = writeln!(text, "### Tips");
        if let Some(biggest) = top_categories.first() {
            let _ = writeln!(
                text,
                "- **{}** makes up {:.1}% of your spending, so it is the best place to look for savings.",
                biggest.category, biggest.percentage
            );
        }
        for tip in GENERAL_TIPS {
            let _ = writeln!(text, "- {tip}");
        }

        text.trim_end().to_owned()
    }
}

fn budget_sentence(budget: f64, total: f64) -> String {
    let remaining = budget - total;

    if budget <= 0.0 {
        return format!(
            "No budget has been set, you spent {} this period.",
            format_currency(total)
        );
    }

    let used = (total / budget * 1000.0).round() / 10.0;
    if remaining >= 0.0 {
        format!(
            "You have used {used:.1}% of your {} budget, leaving {}.",
            format_currency(budget),
            format_currency(remaining)
        )
    } else {
        format!(
            "You are {} over your {} budget ({used:.1}% used).",
            format_currency(-remaining),
            format_currency(budget)
        )
    }
}

#[async_trait]
impl InsightGenerator for OfflineInsightGenerator {
    async fn generate(
        &self,
        request: &InsightRequest,
        summary: &SpendingSummary,
    ) -> Result<Insight, InsightError> {
        Ok(Insight {
            text: self.compose(request, summary),
            source: InsightSource::Offline,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        insights::{
            InsightGenerator, InsightRequest, InsightSource, OfflineInsightGenerator,
            SpendingSummary,
        },
        transaction::{PeriodMonth, TransactionSnapshot},
    };

    fn request(transactions: Vec<TransactionSnapshot>, budget: Option<f64>) -> InsightRequest {
        InsightRequest {
            transactions,
            month: Some(PeriodMonth::new("March")),
            year: Some(2024),
            budget,
        }
    }

    fn compose(request: &InsightRequest) -> String {
        let summary = SpendingSummary::from_transactions(&request.transactions);
        OfflineInsightGenerator.compose(request, &summary)
    }

    #[test]
    fn summarises_food_and_rent_example() {
        let request = request(
            vec![
                TransactionSnapshot::new(12.5, "Food", "2024-03-01"),
                TransactionSnapshot::new(40.0, "Rent", "2024-03-02"),
            ],
            None,
        );

        let text = compose(&request);

        assert!(text.starts_with("## Spending Summary for March 2024"), "{text}");
        assert!(text.contains("You made **2** transactions totalling **$52.50**."));
        assert!(text.contains("1. **Rent**: $40.00 (76.2%)\n2. **Food**: $12.50 (23.8%)"));
        assert!(text.contains("- **Rent** makes up 76.2% of your spending"));
        assert!(!text.contains("### Budget"));
    }

    #[test]
    fn lists_at_most_three_categories() {
        let request = request(
            vec![
                TransactionSnapshot::new(1.0, "A", "2024-03-01"),
                TransactionSnapshot::new(2.0, "B", "2024-03-01"),
                TransactionSnapshot::new(3.0, "C", "2024-03-01"),
                TransactionSnapshot::new(4.0, "D", "2024-03-01"),
            ],
            None,
        );

        let text = compose(&request);

        assert!(text.contains("1. **D**"));
        assert!(text.contains("3. **B**"));
        assert!(!text.contains("4. **"));
        assert!(!text.contains("**A**"));
    }

    #[test]
    fn reports_remaining_budget() {
        let request = request(
            vec![TransactionSnapshot::new(52.5, "Food", "2024-03-01")],
            Some(100.0),
        );

        let text = compose(&request);

        assert!(text.contains("You made **1** transaction totalling"));
        assert!(text.contains("You have used 52.5% of your $100.00 budget, leaving $47.50."));
    }

    #[test]
    fn reports_overspending() {
        let request = request(
            vec![TransactionSnapshot::new(120.0, "Food", "2024-03-01")],
            Some(100.0),
        );

        let text = compose(&request);

        assert!(text.contains("You are $20.00 over your $100.00 budget (120.0% used)."));
    }

    #[test]
    fn is_deterministic() {
        let request = request(
            vec![
                TransactionSnapshot::new(9.99, "Books", "2024-03-01"),
                TransactionSnapshot::new(9.99, "Games", "2024-03-02"),
            ],
            Some(50.0),
        );

        assert_eq!(compose(&request), compose(&request));
    }

    #[tokio::test]
    async fn generate_marks_offline_source() {
        let request = request(vec![TransactionSnapshot::new(5.0, "Coffee", "2024-03-01")], None);
        let summary = SpendingSummary::from_transactions(&request.transactions);

        let insight = OfflineInsightGenerator
            .generate(&request, &summary)
            .await
            .unwrap();

        assert_eq!(insight.source, InsightSource::Offline);
        assert!(!insight.text.is_empty());
    }
}
