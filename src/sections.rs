// 🗂️ Section Builder
// Buckets -> ordered (section, rows) pairs in rule-set order, catch-all last

use crate::classify::{classify, Bucket};
use crate::rules::RuleSet;
use crate::table::{StatementTable, TableView};

#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub name: &'a str,
    pub bucket: Bucket,
    pub rows: TableView<'a>,
}

/// Non-empty sections of one statement, in render order
#[derive(Debug, Clone)]
pub struct OrderedSections<'a> {
    sections: Vec<Section<'a>>,
}

impl<'a> OrderedSections<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &Section<'a>> {
        self.sections.iter()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.sections.iter().map(|s| s.name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Section<'a>> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Line items across all sections
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

impl<'s, 'a> IntoIterator for &'s OrderedSections<'a> {
    type Item = &'s Section<'a>;
    type IntoIter = std::slice::Iter<'s, Section<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

/// Classify the table once and lay the buckets out in rule-set order.
/// Empty buckets are skipped; the catch-all comes last under the set's other label.
pub fn build_sections<'a>(table: &'a StatementTable, rules: &'a RuleSet) -> OrderedSections<'a> {
    let labels: Vec<&str> = table.labels().collect();
    let buckets = classify(&labels, rules);

    let sections = buckets
        .iter()
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(bucket, rows)| Section {
            name: match bucket {
                Bucket::Section(i) => rules.rules()[i].section.as_str(),
                Bucket::Other => rules.other_label(),
            },
            bucket,
            rows: table.view(rows.to_vec()),
        })
        .collect();

    OrderedSections { sections }
}
