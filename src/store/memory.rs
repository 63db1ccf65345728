// src/store/memory.rs

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{ExamStore, ResourceStore, StoreError, SubscriptionStore, UNKNOWN_EXAM_NAME};
use crate::{
    models::{
        exam_record::{EditOutcome, ExamRecord, ExamUpsert},
        resource::{NameCount, NewResource, Resource},
        subscription::Subscription,
    },
    ranking::ranker::is_upcoming,
};

/// In-process store with the same semantics as the SQL one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_exam_id: i64,
    next_resource_id: i64,
    exams: Vec<ExamRecord>,
    edits: HashSet<(String, NaiveDate)>,
    subscriptions: Vec<Subscription>,
    resources: Vec<Resource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an exam as-is apart from its id, which is assigned.
    /// Returns the assigned id.
    pub async fn seed_exam(&self, mut exam: ExamRecord) -> i64 {
        let mut inner = self.inner.write().await;
        inner.next_exam_id += 1;
        exam.id = inner.next_exam_id;
        inner.exams.push(exam);
        inner.next_exam_id
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn count_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<NameCount> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }

    let mut counts: Vec<NameCount> = counts
        .into_iter()
        .map(|(name, count)| NameCount {
            name: name.to_string(),
            count,
        })
        .collect();
    // BTreeMap order already breaks ties by name.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn list_exams(&self) -> Result<Vec<ExamRecord>, StoreError> {
        Ok(self.inner.read().await.exams.clone())
    }

    async fn list_timeline_candidates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExamRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .exams
            .iter()
            .filter(|exam| is_upcoming(&exam.exam_date, now))
            .cloned()
            .collect())
    }

    async fn find_exam(&self, id: i64) -> Result<Option<ExamRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.exams.iter().find(|exam| exam.id == id).cloned())
    }

    async fn search_exams(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ExamRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .exams
            .iter()
            .filter(|exam| contains_ignore_case(&exam.exam_name, query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn apply_edit(
        &self,
        user_id: &str,
        day: NaiveDate,
        upsert: ExamUpsert,
    ) -> Result<EditOutcome, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.edits.insert((user_id.to_string(), day)) {
            return Ok(EditOutcome::DailyLimitReached);
        }

        let edited_at = upsert.edit.updated_at;
        let existing = inner
            .exams
            .iter()
            .position(|exam| exam.exam_name == upsert.exam_name);
        if let Some(index) = existing {
            let exam = &mut inner.exams[index];
            exam.exam_date = upsert.exam_date;
            exam.exam_details = upsert.exam_details;
            exam.source = upsert.source;
            exam.last_updated_by = Some(upsert.edit.user_id.clone());
            exam.last_updated_at = Some(edited_at);
            exam.update_count += 1;
            exam.edit_history.push(upsert.edit);
            return Ok(EditOutcome::Applied { exam_id: exam.id });
        }

        inner.next_exam_id += 1;
        let exam_id = inner.next_exam_id;
        inner.exams.push(ExamRecord {
            id: exam_id,
            exam_name: upsert.exam_name,
            exam_date: upsert.exam_date,
            exam_details: upsert.exam_details,
            source: upsert.source,
            last_updated_by: Some(upsert.edit.user_id.clone()),
            last_updated_at: Some(edited_at),
            update_count: 1,
            edit_history: vec![upsert.edit],
            created_at: Some(edited_at),
        });
        Ok(EditOutcome::Applied { exam_id })
    }

    async fn has_edited_on(&self, user_id: &str, day: NaiveDate) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.edits.contains(&(user_id.to_string(), day)))
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find_subscription(
        &self,
        user_id: &str,
        exam_id: i64,
    ) -> Result<Option<Subscription>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.exam_id == exam_id)
            .cloned())
    }

    async fn upsert_subscription(&self, subscription: Subscription) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .subscriptions
            .iter()
            .position(|s| s.user_id == subscription.user_id && s.exam_id == subscription.exam_id);
        match existing {
            Some(index) => inner.subscriptions[index] = subscription,
            None => inner.subscriptions.push(subscription),
        }
        Ok(())
    }

    async fn subscriptions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Subscription>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn subscriptions_for_exam(&self, exam_id: i64) -> Result<Vec<Subscription>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .subscriptions
            .iter()
            .filter(|s| s.exam_id == exam_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError> {
        let mut resources = self.inner.read().await.resources.clone();
        resources.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(resources)
    }

    async fn insert_resource(&self, resource: NewResource) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_resource_id += 1;
        let id = inner.next_resource_id;
        inner.resources.push(Resource {
            id,
            user_id: resource.user_id,
            user_name: resource.user_name,
            exam_name: resource.exam_name,
            exam_title: resource.exam_title,
            exam_category: resource.exam_category,
            file_name: resource.file_name,
            file_url: resource.file_url,
            upload_date: resource.upload_date,
        });
        Ok(id)
    }

    async fn search_resources(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Resource>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .resources
            .iter()
            .filter(|r| {
                contains_ignore_case(&r.exam_title, query)
                    || r.exam_name
                        .as_deref()
                        .is_some_and(|name| contains_ignore_case(name, query))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_by_category(&self) -> Result<Vec<NameCount>, StoreError> {
        let inner = self.inner.read().await;
        Ok(count_names(
            inner.resources.iter().map(|r| r.exam_category.as_str()),
        ))
    }

    async fn count_by_exam_name(&self) -> Result<Vec<NameCount>, StoreError> {
        let inner = self.inner.read().await;
        Ok(count_names(inner.resources.iter().map(|r| {
            r.exam_name.as_deref().unwrap_or(UNKNOWN_EXAM_NAME)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exam_record::{EditHistoryEntry, ExamChanges};
    use crate::ranking::RawExamDate;
    use chrono::TimeZone;

    fn upsert(name: &str, user: &str, at: DateTime<Utc>) -> ExamUpsert {
        let exam_date = RawExamDate::Text("June".to_string());
        ExamUpsert {
            exam_name: name.to_string(),
            exam_date: exam_date.clone(),
            exam_details: "details".to_string(),
            source: "https://example.org".to_string(),
            edit: EditHistoryEntry {
                user_id: user.to_string(),
                username: user.to_string(),
                updated_at: at,
                changes: ExamChanges {
                    exam_date,
                    exam_details: "details".to_string(),
                    source: "https://example.org".to_string(),
                },
            },
        }
    }

    #[tokio::test]
    async fn edit_upserts_by_name_and_limits_per_day() {
        let store = MemoryStore::new();
        let day1 = Utc.with_ymd_and_hms(2024, 7, 15, 9, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 7, 16, 9, 0, 0).unwrap();

        let first = store
            .apply_edit("alice", day1.date_naive(), upsert("SSC CGL", "alice", day1))
            .await
            .unwrap();
        let EditOutcome::Applied { exam_id } = first else {
            panic!("first edit should apply");
        };

        let again = store
            .apply_edit("alice", day1.date_naive(), upsert("SSC CGL", "alice", day1))
            .await
            .unwrap();
        assert_eq!(again, EditOutcome::DailyLimitReached);

        let bob = store
            .apply_edit("bob", day1.date_naive(), upsert("SSC CGL", "bob", day1))
            .await
            .unwrap();
        assert_eq!(bob, EditOutcome::Applied { exam_id });

        store
            .apply_edit("alice", day2.date_naive(), upsert("SSC CGL", "alice", day2))
            .await
            .unwrap();

        let exam = store.find_exam(exam_id).await.unwrap().unwrap();
        assert_eq!(exam.update_count, 3);
        assert_eq!(exam.edit_history.len(), 3);
        assert_eq!(exam.last_updated_by.as_deref(), Some("alice"));
        assert_eq!(exam.created_at, Some(day1));
        assert_eq!(store.list_exams().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn name_counts_sort_by_count_then_name() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (category, exam_name) in [
            ("Banking", Some("IBPS PO")),
            ("SSC", None),
            ("Banking", Some("SBI PO")),
            ("Railways", None),
        ] {
            store
                .insert_resource(NewResource {
                    user_id: "u".to_string(),
                    user_name: "u".to_string(),
                    exam_name: exam_name.map(str::to_string),
                    exam_title: "Notes".to_string(),
                    exam_category: category.to_string(),
                    file_name: "notes.pdf".to_string(),
                    file_url: "https://files.example.org/notes.pdf".to_string(),
                    upload_date: at,
                })
                .await
                .unwrap();
        }

        let categories = store.count_by_category().await.unwrap();
        let names: Vec<(&str, i64)> = categories
            .iter()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        assert_eq!(names, [("Banking", 2), ("Railways", 1), ("SSC", 1)]);

        let exam_names = store.count_by_exam_name().await.unwrap();
        assert_eq!(
            exam_names[0],
            NameCount {
                name: "Unknown".to_string(),
                count: 2
            }
        );
    }
}
