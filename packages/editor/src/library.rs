//! Ordered collection of documents
//!
//! Documents are stored by opaque id on the backend but listed in the
//! sequential `order` they were created in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: String,
    pub order: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DocumentEntry {
    pub fn new(id: impl Into<String>, order: u64) -> Self {
        Self {
            id: id.into(),
            order,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(&self) -> String {
        format!("{}/{}", DocumentList::URL, self.id)
    }
}

/// Documents sorted by `order`; deserializing re-sorts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DocumentEntry>", into = "Vec<DocumentEntry>")]
pub struct DocumentList {
    entries: Vec<DocumentEntry>,
}

impl From<Vec<DocumentEntry>> for DocumentList {
    fn from(mut entries: Vec<DocumentEntry>) -> Self {
        entries.sort_by_key(|e| e.order);
        Self { entries }
    }
}

impl From<DocumentList> for Vec<DocumentEntry> {
    fn from(list: DocumentList) -> Self {
        list.entries
    }
}

impl DocumentList {
    pub const URL: &'static str = "/documents";

    pub fn new() -> Self {
        Self::default()
    }

    /// Order number for the next document: 1 for an empty list
    pub fn next_order(&self) -> u64 {
        self.entries.last().map(|e| e.order + 1).unwrap_or(1)
    }

    /// Insert keeping entries sorted by `order`. Equal orders keep insertion order.
    pub fn push(&mut self, entry: DocumentEntry) {
        let index = self.entries.partition_point(|e| e.order <= entry.order);
        self.entries.insert(index, entry);
    }

    pub fn get(&self, id: &str) -> Option<&DocumentEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<DocumentEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_order() {
        let mut list = DocumentList::new();
        assert_eq!(list.next_order(), 1);

        list.push(DocumentEntry::new("a", list.next_order()));
        list.push(DocumentEntry::new("b", list.next_order()));
        assert_eq!(list.next_order(), 3);
    }

    #[test]
    fn test_entries_sorted_by_order() {
        let mut list = DocumentList::new();
        list.push(DocumentEntry::new("late", 7));
        list.push(DocumentEntry::new("early", 2));
        list.push(DocumentEntry::new("middle", 4));

        let ids: Vec<&str> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "middle", "late"]);
        assert_eq!(list.next_order(), 8);
    }

    #[test]
    fn test_deserialized_list_is_sorted() {
        let list: DocumentList = serde_json::from_str(
            r#"[{ "id": "c", "order": 3 }, { "id": "a", "order": 1 }, { "id": "b", "order": 2 }]"#,
        )
        .unwrap();

        let ids: Vec<&str> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(list.next_order(), 4);
        assert_eq!(serde_json::to_value(&list).unwrap()[0]["id"], "a");
    }

    #[test]
    fn test_remove_and_url() {
        let mut list = DocumentList::new();
        list.push(DocumentEntry::new("doc-1", 1).with_title("Notes"));

        assert_eq!(list.get("doc-1").unwrap().url(), "/documents/doc-1");
        assert_eq!(list.remove("doc-1").unwrap().title.as_deref(), Some("Notes"));
        assert!(list.remove("doc-1").is_none());
        assert!(list.is_empty());
    }
}
