//! Labeled training corpora
//!
//! The embedded default corpus stands in for the cleaned historical export
//! the model was originally trained on; it covers every category with a
//! handful of typical notification bodies so a fresh install always has a
//! working classifier. A larger corpus can be loaded from CSV.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// (body, category) pairs compiled into the binary
pub const DEFAULT_CORPUS: &[(&str, &str)] = &[
    // Essentials
    ("Rs. 1200 debited for electricity bill payment successful", "Essentials"),
    ("INR 850 debited, sent to Airtel for mobile recharge bill", "Essentials"),
    ("Rs. 2100 debited towards water bill payment", "Essentials"),
    ("INR 15000 debited, sent to landlord for monthly rent", "Essentials"),
    ("Rs. 950 debited for gas cylinder booking payment successful", "Essentials"),
    // Food & Dining
    ("Rs. 450 debited, sent to Swiggy for food order", "Food & Dining"),
    ("INR 320 debited, sent to Zomato order delivered", "Food & Dining"),
    ("Rs. 780 debited at Dominos Pizza restaurant", "Food & Dining"),
    ("INR 150 debited, sent to chai point cafe", "Food & Dining"),
    ("Rs. 1100 debited for dinner at Barbeque Nation restaurant", "Food & Dining"),
    // Shopping
    ("INR 2500 debited for shopping, sent to Amazon", "Shopping"),
    ("Rs. 1800 debited, sent to Flipkart order placed", "Shopping"),
    ("INR 3200 debited at Myntra fashion shopping", "Shopping"),
    ("Rs. 670 debited, sent to Meesho for purchase", "Shopping"),
    ("INR 5400 debited at Croma electronics store purchase", "Shopping"),
    // Entertainment & Lifestyle
    ("Rs. 600 debited, sent to BookMyShow for movie tickets", "Entertainment & Lifestyle"),
    ("INR 1500 debited at PVR cinemas payment successful", "Entertainment & Lifestyle"),
    ("Rs. 2200 debited, sent to gym membership fitness", "Entertainment & Lifestyle"),
    ("INR 900 debited for concert event tickets", "Entertainment & Lifestyle"),
    ("Rs. 1300 debited at salon spa payment", "Entertainment & Lifestyle"),
    // Savings & Transfers
    ("INR 10000 credited to your account salary received", "Savings & Transfers"),
    ("Rs. 5000 sent to recurring deposit account transfer", "Savings & Transfers"),
    ("INR 2000 received from Ramesh UPI transfer", "Savings & Transfers"),
    ("Rs. 7500 debited, sent to mutual fund SIP investment", "Savings & Transfers"),
    ("INR 3000 credited refund received to account", "Savings & Transfers"),
    // Travel & Transportation
    ("Rs. 250 debited, sent to Uber for trip payment successful", "Travel & Transportation"),
    ("INR 180 debited, sent to Ola cab ride", "Travel & Transportation"),
    ("Rs. 4500 debited, sent to IRCTC train ticket booking", "Travel & Transportation"),
    ("INR 8200 debited for flight booking MakeMyTrip", "Travel & Transportation"),
    ("Rs. 95 debited for metro card recharge travel", "Travel & Transportation"),
    // Subscriptions & Services
    ("Rs. 199 debited, sent to Netflix monthly subscription", "Subscriptions & Services"),
    ("INR 129 debited for Spotify premium subscription renewal", "Subscriptions & Services"),
    ("Rs. 299 debited, sent to Amazon Prime membership", "Subscriptions & Services"),
    ("INR 599 debited for broadband internet service renewal", "Subscriptions & Services"),
    ("Rs. 99 debited, sent to Hotstar subscription payment successful", "Subscriptions & Services"),
    // Miscellaneous
    ("Rs. 500 debited, sent to Suresh", "Miscellaneous"),
    ("INR 1250 debited from your account", "Miscellaneous"),
    ("Rs. 340 debited payment successful", "Miscellaneous"),
    ("INR 760 debited, amount sent via UPI", "Miscellaneous"),
];

/// Default corpus as owned pairs, ready for `TextModel::fit`
pub fn default_corpus() -> Vec<(String, String)> {
    DEFAULT_CORPUS
        .iter()
        .map(|(body, category)| (body.to_string(), category.to_string()))
        .collect()
}

#[derive(Debug, Deserialize)]
struct CorpusRow {
    #[serde(rename = "Body")]
    body: String,
    #[serde(rename = "Category")]
    category: String,
}

/// Load a labeled corpus from a CSV file with `Body` and `Category` columns
pub fn load_csv_corpus(path: &Path) -> Result<Vec<(String, String)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut corpus = Vec::new();
    for row in reader.deserialize() {
        let row: CorpusRow = row?;
        corpus.push((row.body, row.category));
    }
    if corpus.is_empty() {
        return Err(Error::InvalidData(format!(
            "corpus {} has no rows",
            path.display()
        )));
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn default_corpus_covers_every_category() {
        let categories: BTreeSet<&str> = DEFAULT_CORPUS.iter().map(|(_, c)| *c).collect();
        assert_eq!(
            categories,
            BTreeSet::from([
                "Essentials",
                "Food & Dining",
                "Shopping",
                "Entertainment & Lifestyle",
                "Savings & Transfers",
                "Travel & Transportation",
                "Subscriptions & Services",
                "Miscellaneous",
            ])
        );
    }

    #[test]
    fn csv_corpus_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        std::fs::write(
            &path,
            "Body,Category\nRs. 450 sent to Swiggy,Food & Dining\nAmazon order,Shopping\n",
        )
        .unwrap();

        let corpus = load_csv_corpus(&path).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].1, "Food & Dining");
    }

    #[test]
    fn empty_csv_corpus_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "Body,Category\n").unwrap();
        assert!(load_csv_corpus(&path).is_err());
    }
}
