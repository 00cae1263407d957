use crate::tags::Tag;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

pub const ACTIVITY_LOG_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub label: String,
    pub detail: Option<String>,
    pub tag: Option<Tag>,
    pub icon: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub label: String,
    pub detail: Option<String>,
    pub tag: Option<Tag>,
    pub icon: Option<String>,
}

impl NewActivity {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, activity: NewActivity) -> &ActivityEntry {
        self.record_at(activity, Utc::now())
    }

    pub fn record_at(&mut self, activity: NewActivity, timestamp: DateTime<Utc>) -> &ActivityEntry {
        let entry = ActivityEntry {
            id: format!("activity-{}", Uuid::new_v4()),
            label: activity.label,
            detail: activity.detail,
            tag: activity.tag,
            icon: activity.icon,
            timestamp,
        };
        self.entries.push_front(entry);
        self.entries.truncate(ACTIVITY_LOG_CAPACITY);
        &self.entries[0]
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// `days` buckets ending at `today`, oldest first, counting entries per UTC day.
    pub fn daily_counts(&self, today: NaiveDate, days: usize) -> Vec<DayBucket> {
        (0..days)
            .rev()
            .map(|offset| {
                let date = today - Duration::days(offset as i64);
                DayBucket {
                    date,
                    count: self.entries_on(date).count(),
                }
            })
            .collect()
    }

    pub fn entries_on(&self, date: NaiveDate) -> impl Iterator<Item = &ActivityEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.timestamp.date_naive() == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_prepends_with_unique_ids() {
        let mut log = ActivityLog::new();
        log.record(NewActivity::new("first"));
        log.record(NewActivity::new("second").tag(Tag::Music).icon("⭐"));

        let labels: Vec<&str> = log.entries().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["second", "first"]);
        let ids: Vec<&str> = log.entries().map(|e| e.id.as_str()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(log.latest().unwrap().tag, Some(Tag::Music));
    }

    #[test]
    fn log_is_capped_at_twenty() {
        let mut log = ActivityLog::new();
        for i in 0..ACTIVITY_LOG_CAPACITY {
            log.record(NewActivity::new(format!("action {}", i)));
        }
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(log.entries().last().unwrap().label, "action 0");

        log.record(NewActivity::new("action 20"));
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(log.latest().unwrap().label, "action 20");
        assert_eq!(log.entries().last().unwrap().label, "action 1");

        for i in 0..100 {
            log.record(NewActivity::new(format!("more {}", i)));
        }
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
    }

    #[test]
    fn daily_counts_bucket_by_utc_day() {
        let mut log = ActivityLog::new();
        let today = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let yesterday = today - Duration::days(1);
        log.record_at(NewActivity::new("Joined Spanish sprint"), today);
        log.record_at(NewActivity::new("Shared a clip"), yesterday);
        log.record_at(NewActivity::new("Saved a clip"), today);

        let buckets = log.daily_counts(today.date_naive(), 7);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[6].date, today.date_naive());
        assert_eq!(buckets[6].count, 2);
        assert_eq!(buckets[5].count, 1);
        assert!(buckets[..5].iter().all(|b| b.count == 0));

        let labels: Vec<&str> = log
            .entries_on(yesterday.date_naive())
            .map(|e| e.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Shared a clip"]);
    }
}
