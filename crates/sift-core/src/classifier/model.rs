//! Bag-of-words text model
//!
//! A TF-IDF weighted nearest-centroid classifier: small, deterministic, and
//! serializable, which is all the category classifier needs. Fitting builds
//! a vocabulary and per-label centroid vectors; prediction scores a
//! document against each centroid by cosine similarity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowercase and strip everything but alphanumerics and whitespace
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// A fitted text-to-label model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextModel {
    /// Token -> vocabulary index
    vocab: HashMap<String, usize>,
    /// Inverse document frequency per vocabulary index
    idf: Vec<f64>,
    /// Label names, sorted; index is the class id
    labels: Vec<String>,
    /// One unit-length centroid per label, dense over the vocabulary
    centroids: Vec<Vec<f64>>,
}

impl TextModel {
    /// Fit a model over (body, label) examples.
    ///
    /// Fails loudly on an empty corpus or a corpus with a single label
    /// class; a model that can only ever emit one label is worse than no
    /// model at all.
    pub fn fit(examples: &[(String, String)]) -> Result<Self> {
        if examples.is_empty() {
            return Err(Error::Classifier("training corpus is empty".to_string()));
        }

        let mut labels: Vec<String> = examples.iter().map(|(_, l)| l.clone()).collect();
        labels.sort();
        labels.dedup();
        if labels.len() < 2 {
            return Err(Error::Classifier(format!(
                "training corpus has a single label class ({})",
                labels.first().map(String::as_str).unwrap_or("?")
            )));
        }

        // Vocabulary and document frequencies
        let docs: Vec<Vec<String>> = examples.iter().map(|(b, _)| tokenize(b)).collect();
        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut df: Vec<usize> = Vec::new();
        for tokens in &docs {
            let mut seen: Vec<&String> = tokens.iter().collect();
            seen.sort();
            seen.dedup();
            for token in seen {
                let next = vocab.len();
                let idx = *vocab.entry(token.clone()).or_insert(next);
                if idx == df.len() {
                    df.push(0);
                }
                df[idx] += 1;
            }
        }

        let n_docs = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        // Per-label centroid of unit-length TF-IDF document vectors
        let mut sums: Vec<Vec<f64>> = vec![vec![0.0; vocab.len()]; labels.len()];
        let mut counts: Vec<usize> = vec![0; labels.len()];
        for (tokens, (_, label)) in docs.iter().zip(examples.iter()) {
            let class = labels
                .binary_search(label)
                .map_err(|_| Error::Classifier(format!("unknown label {}", label)))?;
            let vector = vectorize_tokens(tokens, &vocab, &idf);
            for (i, v) in vector {
                sums[class][i] += v;
            }
            counts[class] += 1;
        }

        let centroids: Vec<Vec<f64>> = sums
            .into_iter()
            .zip(counts.iter())
            .map(|(mut sum, &count)| {
                if count > 0 {
                    for v in sum.iter_mut() {
                        *v /= count as f64;
                    }
                }
                l2_normalize(&mut sum);
                sum
            })
            .collect();

        Ok(Self {
            vocab,
            idf,
            labels,
            centroids,
        })
    }

    /// Predict a label for the given text.
    ///
    /// A document with no known tokens has no signal to score against and
    /// is reported as an error so the caller can apply its fallback.
    pub fn predict(&self, text: &str) -> Result<&str> {
        let tokens = tokenize(text);
        let vector = vectorize_tokens(&tokens, &self.vocab, &self.idf);
        if vector.is_empty() {
            return Err(Error::Classifier(
                "no known tokens in input text".to_string(),
            ));
        }

        let mut norm = 0.0;
        for (_, v) in &vector {
            norm += v * v;
        }
        let norm = norm.sqrt();

        let mut best: Option<(usize, f64)> = None;
        for (class, centroid) in self.centroids.iter().enumerate() {
            let mut dot = 0.0;
            for (i, v) in &vector {
                dot += centroid[*i] * v;
            }
            let score = if norm > 0.0 { dot / norm } else { 0.0 };
            // Ties resolve to the lexicographically first label
            let better = match best {
                Some((_, s)) => score > s,
                None => true,
            };
            if better {
                best = Some((class, score));
            }
        }

        let (class, _) = best.ok_or_else(|| Error::Classifier("no classes fitted".to_string()))?;
        Ok(&self.labels[class])
    }

    /// Labels known to the model
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Vocabulary size (for status display)
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}

/// Sparse TF-IDF vector as (vocab index, weight) pairs; unknown tokens are
/// dropped
fn vectorize_tokens(
    tokens: &[String],
    vocab: &HashMap<String, usize>,
    idf: &[f64],
) -> Vec<(usize, f64)> {
    let mut tf: HashMap<usize, f64> = HashMap::new();
    for token in tokens {
        if let Some(&idx) = vocab.get(token) {
            *tf.entry(idx).or_insert(0.0) += 1.0;
        }
    }
    let mut vector: Vec<(usize, f64)> = tf.into_iter().map(|(i, c)| (i, c * idf[i])).collect();
    vector.sort_by_key(|(i, _)| *i);
    vector
}

fn l2_normalize(vector: &mut [f64]) {
    let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
