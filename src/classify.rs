// 🪣 Classifier - bucket rows by rule set
// Every row lands in exactly one bucket, in table order

use crate::normalize::normalize;
use crate::rules::RuleSet;
use log::debug;

/// Where a row was placed: the n-th rule of the set, or the catch-all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Section(usize),
    Other,
}

/// Row positions per bucket. `sections[i]` belongs to rule `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketMap {
    sections: Vec<Vec<usize>>,
    other: Vec<usize>,
}

impl BucketMap {
    pub fn rows(&self, bucket: Bucket) -> &[usize] {
        match bucket {
            Bucket::Section(i) => self.sections.get(i).map(Vec::as_slice).unwrap_or(&[]),
            Bucket::Other => &self.other,
        }
    }

    pub fn other(&self) -> &[usize] {
        &self.other
    }

    /// Buckets in rule-set order, catch-all last (empty ones included)
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[usize])> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, rows)| (Bucket::Section(i), rows.as_slice()))
            .chain(std::iter::once((Bucket::Other, self.other.as_slice())))
    }

    /// Total rows placed
    pub fn total(&self) -> usize {
        self.sections.iter().map(Vec::len).sum::<usize>() + self.other.len()
    }

    /// Bucket of each row, indexed by row position
    pub fn assignments(&self) -> Vec<Bucket> {
        let mut out = vec![Bucket::Other; self.total()];
        for (bucket, rows) in self.iter() {
            for &row in rows {
                if let Some(slot) = out.get_mut(row) {
                    *slot = bucket;
                }
            }
        }
        out
    }
}

/// Bucket of a single display label
pub fn classify_label(label: &str, rules: &RuleSet) -> Bucket {
    match rules.match_normalized(&normalize(label)) {
        Some(m) => Bucket::Section(m.rule_index),
        None => Bucket::Other,
    }
}

/// Assign every label to a bucket. First rule, first keyword wins.
pub fn classify<S: AsRef<str>>(labels: &[S], rules: &RuleSet) -> BucketMap {
    let mut buckets = BucketMap {
        sections: vec![Vec::new(); rules.len()],
        other: Vec::new(),
    };

    for (row, label) in labels.iter().enumerate() {
        match classify_label(label.as_ref(), rules) {
            Bucket::Section(i) => buckets.sections[i].push(row),
            Bucket::Other => {
                debug!("'{}' matched no rule, placed in '{}'", label.as_ref(), rules.other_label());
                buckets.other.push(row);
            }
        }
    }

    buckets
}
