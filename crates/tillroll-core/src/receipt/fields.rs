//! Read-only views over an expense document.

use crate::models::expense::{ExpenseDocument, ExpenseField, LineItem};

/// Derived views of a single expense document.
///
/// Building a view never fails: an empty document gives an empty summary
/// text, no summary matches and no candidate lines.
#[derive(Debug, Clone)]
pub struct DocumentView<'a> {
    document: &'a ExpenseDocument,
    summary_text: String,
}

impl<'a> DocumentView<'a> {
    pub fn new(document: &'a ExpenseDocument) -> Self {
        let summary_text = document
            .summary_fields
            .iter()
            .filter_map(ExpenseField::value)
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            document,
            summary_text,
        }
    }

    /// Every summary value joined by a single space, in document order.
    ///
    /// Only meant for substring search.
    pub fn summary_text(&self) -> &str {
        &self.summary_text
    }

    /// The first summary field labeled `label`.
    pub fn summary_field(&self, label: &str) -> Option<&'a ExpenseField> {
        self.document.summary_fields.iter().find(|f| f.is(label))
    }

    /// Value of the first summary field labeled `label`.
    pub fn summary_by_type(&self, label: &str) -> Option<&'a str> {
        self.summary_field(label).and_then(ExpenseField::value)
    }

    /// Value of the first label in `labels` that has a summary field.
    pub fn first_summary_of<S: AsRef<str>>(&self, labels: &[S]) -> Option<&'a str> {
        labels
            .iter()
            .find_map(|label| self.summary_by_type(label.as_ref()))
    }

    /// All line items of all groups, in order.
    pub fn candidate_lines(&self) -> impl Iterator<Item = &'a LineItem> + 'a {
        self.document
            .line_item_groups
            .iter()
            .flat_map(|g| g.line_items.iter())
    }
}
