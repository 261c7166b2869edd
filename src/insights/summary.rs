//! Spending statistics shared by the prompt, the offline summary and the response metadata.

use std::collections::HashMap;

use serde::Serialize;

use crate::transaction::TransactionSnapshot;

/// How many categories are ranked in summaries and metadata.
pub const TOP_CATEGORY_COUNT: usize = 3;

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// The sum of the amounts of all transactions in the category.
    pub amount: f64,
}

/// A category together with its share of the total spend.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCategory {
    /// The category label.
    pub category: String,
    /// The sum of the amounts of all transactions in the category.
    pub amount: f64,
    /// The category's share of the total spend in percent, rounded to one decimal.
    pub percentage: f64,
}

/// Totals for a sequence of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSummary {
    /// The number of transactions summarised.
    pub transaction_count: usize,
    /// The sum of all transaction amounts.
    pub total: f64,
    /// Per-category totals in the order each category first appears.
    pub category_totals: Vec<CategoryTotal>,
}

impl SpendingSummary {
    /// Compute the total spend and the per-category totals of `transactions`.
    pub fn from_transactions(transactions: &[TransactionSnapshot]) -> Self {
        let mut category_totals: Vec<CategoryTotal> = Vec::new();
        let mut category_index: HashMap<&str, usize> = HashMap::new();
        let mut total = 0.0;

        for transaction in transactions {
            total += transaction.amount;

            let category = transaction.category_label();
            match category_index.get(category) {
                Some(&index) => category_totals[index].amount += transaction.amount,
                None => {
                    category_index.insert(category, category_totals.len());
                    category_totals.push(CategoryTotal {
                        category: category.to_owned(),
                        amount: transaction.amount,
                    });
                }
            }
        }

        Self {
            transaction_count: transactions.len(),
            total,
            category_totals,
        }
    }

    /// Every category sorted by descending total.
    ///
    /// Categories with equal totals keep the order in which they first appeared.
    pub fn ranked_categories(&self) -> Vec<RankedCategory> {
        let mut ranked: Vec<RankedCategory> = self
            .category_totals
            .iter()
            .map(|category_total| RankedCategory {
                category: category_total.category.clone(),
                amount: category_total.amount,
                percentage: self.share_of_total(category_total.amount),
            })
            .collect();

        // `sort_by` is stable, which is what keeps ties in first-seen order.
        ranked.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        ranked
    }

    /// The `count` categories with the highest totals.
    pub fn top_categories(&self, count: usize) -> Vec<RankedCategory> {
        let mut ranked = self.ranked_categories();
        ranked.truncate(count);
        ranked
    }

    /// `amount` as a percentage of the total spend, rounded to one decimal.
    ///
    /// Returns zero when nothing was spent.
    pub fn share_of_total(&self, amount: f64) -> f64 {
        if self.total == 0.0 {
            return 0.0;
        }

        (amount / self.total * 1000.0).round() / 10.0
    }
}

/// Format an amount with two decimals, e.g. "52.50".
pub fn format_amount(amount: f64) -> String {
    // Avoids printing "-0.00" for tiny negative rounding errors.
    let amount = if amount.abs() < 0.005 { 0.0 } else { amount };
    format!("{amount:.2}")
}

/// Format an amount as dollars, e.g. "$52.50" or "-$3.00".
pub fn format_currency(amount: f64) -> String {
    let formatted = format_amount(amount.abs());

    if amount <= -0.005 {
        format!("-${formatted}")
    } else {
        format!("${formatted}")
    }
}

/// A ranked category as sent to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetadata {
    /// The category label.
    pub category: String,
    /// The category total with two decimals.
    pub amount: String,
    /// The share of the total spend with one decimal.
    pub percentage: String,
}

impl From<&RankedCategory> for CategoryMetadata {
    fn from(ranked: &RankedCategory) -> Self {
        Self {
            category: ranked.category.clone(),
            amount: format_amount(ranked.amount),
            percentage: format!("{:.1}", ranked.percentage),
        }
    }
}
