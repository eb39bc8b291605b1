//! Expense document models in the AnalyzeExpense response shape.
//!
//! Everything here is untrusted OCR output: every member is optional or
//! defaults to empty, so a sparse capture still deserializes. Detections of
//! the wrong JSON type read as absent. The only checks that fail are on the
//! container shape, in [`ExpenseDocument::from_json_value`] and
//! [`AnalyzeExpenseResponse::from_json_str`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DocumentError, Result};

/// A full AnalyzeExpense style response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalyzeExpenseResponse {
    /// One entry per detected receipt or invoice.
    #[serde(default)]
    pub expense_documents: Vec<ExpenseDocument>,
}

/// Fields detected on a single receipt image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseDocument {
    /// Document-level labeled values (vendor name, dates, totals).
    #[serde(default)]
    pub summary_fields: Vec<ExpenseField>,

    /// Detected rows of purchased goods.
    #[serde(default)]
    pub line_item_groups: Vec<LineItemGroup>,
}

/// A group of line items, usually one table on the receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItemGroup {
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// A single detected row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(default)]
    pub line_item_expense_fields: Vec<ExpenseField>,
}

/// A `{type, value}` pair as detected by the OCR service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseField {
    /// Normalized detection class, e.g. `VENDOR_NAME` or `PRICE`.
    #[serde(
        rename = "Type",
        default,
        deserialize_with = "lenient_detection",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<Detection>,

    /// The label text printed on the receipt, if any.
    #[serde(
        default,
        deserialize_with = "lenient_detection",
        skip_serializing_if = "Option::is_none"
    )]
    pub label_detection: Option<Detection>,

    /// The detected value text.
    #[serde(
        default,
        deserialize_with = "lenient_detection",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_detection: Option<Detection>,
}

/// Detected text with the service's confidence score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Detection {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_confidence",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<f32>,
}

fn lenient_detection<'de, D>(deserializer: D) -> std::result::Result<Option<Detection>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

fn lenient_confidence<'de, D>(deserializer: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_f64().map(|v| v as f32)),
        _ => Ok(None),
    }
}

impl Detection {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            confidence: None,
        }
    }
}

impl ExpenseField {
    /// Create a field with a type label and a detected value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: Some(Detection::new(label)),
            label_detection: None,
            value_detection: Some(Detection::new(value)),
        }
    }

    /// The detection class, if the service assigned one.
    pub fn label(&self) -> Option<&str> {
        self.kind.as_ref().and_then(|d| d.text.as_deref())
    }

    /// The detected value text.
    pub fn value(&self) -> Option<&str> {
        self.value_detection.as_ref().and_then(|d| d.text.as_deref())
    }

    /// Whether this field's label matches `label`, ignoring ASCII case.
    pub fn is(&self, label: &str) -> bool {
        self.label().is_some_and(|l| l.eq_ignore_ascii_case(label))
    }
}

impl LineItem {
    pub fn new(fields: Vec<ExpenseField>) -> Self {
        Self {
            line_item_expense_fields: fields,
        }
    }

    /// Value of the first field whose label is any of `labels`.
    ///
    /// Fields are scanned in detection order, so with `["PRICE", "TOTAL"]`
    /// a row listing its total before its price yields the total.
    pub fn first_value<S: AsRef<str>>(&self, labels: &[S]) -> Option<&str> {
        self.line_item_expense_fields
            .iter()
            .find(|f| labels.iter().any(|l| f.is(l.as_ref())))
            .and_then(ExpenseField::value)
    }
}

impl LineItemGroup {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self { line_items }
    }
}

impl ExpenseDocument {
    pub fn new(summary_fields: Vec<ExpenseField>, line_item_groups: Vec<LineItemGroup>) -> Self {
        Self {
            summary_fields,
            line_item_groups,
        }
    }

    /// Decode a single expense document, validating its outer shape first.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        Self::validate_shape(value, "$")?;
        Ok(serde_json::from_value(value.clone())?)
    }

    fn validate_shape(value: &Value, path: &str) -> std::result::Result<(), DocumentError> {
        let obj = value
            .as_object()
            .ok_or_else(|| DocumentError::shape(path, "an expense document object"))?;

        let summary = obj.get("SummaryFields");
        let groups = obj.get("LineItemGroups");

        if summary.is_none() && groups.is_none() {
            return Err(DocumentError::shape(
                path,
                "SummaryFields or LineItemGroups",
            ));
        }

        if let Some(summary) = summary {
            let path = format!("{path}.SummaryFields");
            for (i, field) in array_at(summary, &path)?.iter().enumerate() {
                object_at(field, &format!("{path}[{i}]"), "an expense field object")?;
            }
        }

        if let Some(groups) = groups {
            let path = format!("{path}.LineItemGroups");
            for (i, group) in array_at(groups, &path)?.iter().enumerate() {
                let path = format!("{path}[{i}]");
                let group = object_at(group, &path, "a line item group object")?;
                let Some(items) = group.get("LineItems") else {
                    continue;
                };

                let path = format!("{path}.LineItems");
                for (j, item) in array_at(items, &path)?.iter().enumerate() {
                    let path = format!("{path}[{j}]");
                    let item = object_at(item, &path, "a line item object")?;
                    let Some(fields) = item.get("LineItemExpenseFields") else {
                        continue;
                    };

                    let path = format!("{path}.LineItemExpenseFields");
                    for (k, field) in array_at(fields, &path)?.iter().enumerate() {
                        object_at(field, &format!("{path}[{k}]"), "an expense field object")?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn array_at<'v>(value: &'v Value, path: &str) -> std::result::Result<&'v Vec<Value>, DocumentError> {
    value
        .as_array()
        .ok_or_else(|| DocumentError::shape(path, "an array"))
}

fn object_at<'v>(
    value: &'v Value,
    path: &str,
    expected: &'static str,
) -> std::result::Result<&'v serde_json::Map<String, Value>, DocumentError> {
    value
        .as_object()
        .ok_or_else(|| DocumentError::shape(path, expected))
}

impl AnalyzeExpenseResponse {
    /// Parse a captured response, validating its outer shape.
    ///
    /// A bare expense document (an object with `SummaryFields` or
    /// `LineItemGroups` at the top level) is accepted as a one-document
    /// response.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| DocumentError::shape("$", "a response object"))?;

        let docs = match obj.get("ExpenseDocuments") {
            Some(Value::Array(docs)) => docs,
            Some(_) => {
                return Err(DocumentError::shape("$.ExpenseDocuments", "an array").into());
            }
            None if obj.contains_key("SummaryFields") || obj.contains_key("LineItemGroups") => {
                let doc = ExpenseDocument::from_json_value(value)?;
                return Ok(Self {
                    expense_documents: vec![doc],
                });
            }
            None => {
                return Err(DocumentError::shape("$", "ExpenseDocuments").into());
            }
        };

        let mut expense_documents = Vec::with_capacity(docs.len());
        for (i, doc) in docs.iter().enumerate() {
            ExpenseDocument::validate_shape(doc, &format!("$.ExpenseDocuments[{i}]"))?;
            expense_documents.push(serde_json::from_value(doc.clone())?);
        }

        Ok(Self { expense_documents })
    }

    /// The first expense document, which is the one a receipt is built from.
    pub fn first_document(&self) -> std::result::Result<&ExpenseDocument, DocumentError> {
        self.expense_documents.first().ok_or(DocumentError::NoDocuments)
    }
}
