use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A memo as seen by the application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    /// Store-assigned identifier, never changes after insert
    pub id: String,
    pub title: String,
    /// Memo body (markdown)
    pub content: String,
    /// Free-form classification, no fixed set of values
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-controlled fields used to create or replace a memo
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoFormData {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl MemoFormData {
    pub fn new(title: &str, content: &str, category: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            tags: vec![],
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A row of the `memos` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `null` tags column reads the same as a missing one
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Columns sent on insert and update. Ids and timestamps are left to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoWrite {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Aggregate counts over the whole table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemoStats {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
}

impl MemoStats {
    /// Count memos per category
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut stats = MemoStats::default();
        for category in categories {
            stats.total += 1;
            *stats.by_category.entry(category).or_insert(0) += 1;
        }
        stats
    }
}

impl From<MemoRow> for Memo {
    fn from(row: MemoRow) -> Self {
        Memo {
            id: row.id,
            title: row.title,
            content: row.content,
            category: row.category,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&MemoFormData> for MemoWrite {
    fn from(form: &MemoFormData) -> Self {
        MemoWrite {
            title: form.title.clone(),
            content: form.content.clone(),
            category: form.category.clone(),
            tags: form.tags.clone(),
        }
    }
}

impl From<&Memo> for MemoFormData {
    fn from(memo: &Memo) -> Self {
        MemoFormData {
            title: memo.title.clone(),
            content: memo.content.clone(),
            category: memo.category.clone(),
            tags: memo.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_row_with_null_or_missing_tags() {
        let row: MemoRow = serde_json::from_str(
            r#"{
                "id": "a1",
                "title": "t",
                "content": "",
                "category": "misc",
                "tags": null,
                "created_at": "2024-05-01T10:20:30+00:00",
                "updated_at": "2024-05-01T10:20:30+00:00"
            }"#,
        )
        .unwrap();
        assert!(row.tags.is_empty());

        let row: MemoRow = serde_json::from_str(
            r#"{
                "id": "a2",
                "title": "t",
                "content": "",
                "category": "misc",
                "created_at": "2024-05-01T10:20:30+00:00",
                "updated_at": "2024-05-01T10:20:30+00:00"
            }"#,
        )
        .unwrap();
        assert!(row.tags.is_empty());
    }

    #[test]
    fn test_row_converts_to_camel_case_memo() {
        let row: MemoRow = serde_json::from_str(
            r#"{
                "id": "a1",
                "title": "Groceries",
                "content": "- milk",
                "category": "personal",
                "tags": ["home"],
                "created_at": "2024-05-01T10:20:30.123456+00:00",
                "updated_at": "2024-05-02T08:00:00+00:00"
            }"#,
        )
        .unwrap();

        let memo = Memo::from(row);
        let json = serde_json::to_value(&memo).unwrap();

        assert_eq!(json["id"], "a1");
        assert_eq!(json["tags"][0], "home");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_stats_from_categories() {
        let stats = MemoStats::from_categories(
            ["work", "personal", "work"].into_iter().map(String::from),
        );

        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category.get("work"), Some(&2));
        assert_eq!(stats.by_category.get("personal"), Some(&1));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["byCategory"]["work"], 2);
    }

    #[test]
    fn test_write_view_excludes_store_fields() {
        let form = MemoFormData::new("t", "c", "idea").with_tags(["a", "b"]);
        let json = serde_json::to_value(MemoWrite::from(&form)).unwrap();

        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["tags"], serde_json::json!(["a", "b"]));
    }
}
