//! Per-identity aggregation of BACnet readings.
//!
//! Non-trigger readings (units, status flags, ...) are buffered in a pending
//! group keyed by [`Identity`]. When the trigger reading for that identity
//! arrives, the buffered `(measurement, value)` pairs are appended to its tags
//! and the group is removed in the same step.
//!
//! Groups whose trigger never arrives stay buffered until [`Aggregator::clear`]
//! is called. There is no time-based eviction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::AggregatorConfig;
use crate::reading::{Identity, Reading, Tag};
use crate::value::FieldValue;

/// A buffered non-trigger reading: its measurement name and value.
pub type PendingEntry = Tag;

/// A trigger reading with its identity's buffered attributes appended to its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub measurement: String,
    pub value: FieldValue,
    pub tags: Vec<Tag>,
    /// Nanoseconds since the Unix epoch, taken from the trigger reading.
    pub timestamp: i64,
}

/// Counters describing what the aggregator has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorStats {
    pub ingested: u64,
    pub buffered: u64,
    pub merged: u64,
    pub discarded_groups: u64,
}

/// Single-owner aggregation state.
#[derive(Debug)]
pub struct Aggregator {
    trigger: String,
    pending: HashMap<Identity, Vec<PendingEntry>>,
    stats: AggregatorStats,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(AggregatorConfig::default())
    }
}

impl Aggregator {
    #[must_use]
    pub fn new(cfg: AggregatorConfig) -> Self {
        Self {
            trigger: cfg.trigger,
            pending: HashMap::new(),
            stats: AggregatorStats::default(),
        }
    }

    /// The measurement name that flushes a pending group.
    #[must_use]
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Feed one reading. Returns a merged record only for trigger readings.
    pub fn ingest(&mut self, reading: Reading) -> Option<MergedRecord> {
        self.stats.ingested += 1;
        let identity = reading.identity();
        let (measurement, value, mut tags, timestamp) = reading.into_parts();

        if measurement != self.trigger {
            trace!(%identity, %measurement, "buffering reading");
            self.pending
                .entry(identity)
                .or_default()
                .push(Tag { key: measurement, value });
            self.stats.buffered += 1;
            return None;
        }

        let group = self.pending.remove(&identity).unwrap_or_default();
        debug!(%identity, merged_tags = group.len(), "flushing pending group");
        tags.extend(group);
        self.stats.merged += 1;

        Some(MergedRecord {
            measurement,
            value,
            tags,
            timestamp,
        })
    }

    /// Number of identities with buffered readings.
    #[must_use]
    pub fn pending_groups(&self) -> usize {
        self.pending.len()
    }

    /// Buffered entries for one identity, in arrival order.
    #[must_use]
    pub fn pending_entries(&self, identity: &Identity) -> Option<&[PendingEntry]> {
        self.pending.get(identity).map(Vec::as_slice)
    }

    /// Drop every pending group without emitting it. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.stats.discarded_groups += dropped as u64;
        dropped
    }

    #[must_use]
    pub const fn stats(&self) -> AggregatorStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{DEVICE_IDENTIFIER, OBJECT_INSTANCE_NUMBER};

    fn ids(object: i64, device: i64) -> Vec<Tag> {
        vec![Tag::new(OBJECT_INSTANCE_NUMBER, object), Tag::new(DEVICE_IDENTIFIER, device)]
    }

    fn reading(name: &str, value: impl Into<FieldValue>, tags: Vec<Tag>) -> Reading {
        Reading::with_timestamp(name, value, tags, 1000)
    }

    #[test]
    fn test_non_trigger_is_buffered() {
        let mut agg = Aggregator::default();
        assert!(agg.ingest(reading("units", "degF", ids(1, 10))).is_none());
        assert_eq!(agg.pending_groups(), 1);

        let identity = Identity::from_tags(&ids(1, 10));
        assert_eq!(agg.pending_entries(&identity).unwrap(), &[Tag::new("units", "degF")]);
    }

    #[test]
    fn test_group_merged_in_arrival_order() {
        let mut agg = Aggregator::default();
        agg.ingest(reading("units", "degF", ids(1, 10)));
        agg.ingest(reading("statusFlags", vec![false, false, false, false], ids(1, 10)));
        agg.ingest(reading("outOfService", false, ids(1, 10)));

        let record = agg.ingest(reading("presentValue", 72.3, ids(1, 10))).unwrap();
        assert_eq!(record.measurement, "presentValue");
        assert_eq!(record.value, FieldValue::from(72.3));
        assert_eq!(record.timestamp, 1000);

        let keys: Vec<&str> = record.tags.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(
            keys,
            ["objectInstanceNumber", "deviceIdentifier", "units", "statusFlags", "outOfService"]
        );
        assert_eq!(agg.pending_groups(), 0);
    }

    #[test]
    fn test_identities_are_isolated() {
        let mut agg = Aggregator::default();
        agg.ingest(reading("units", "degF", ids(1, 10)));
        agg.ingest(reading("units", "percent", ids(2, 10)));
        agg.ingest(reading("units", "psi", ids(1, 11)));

        let record = agg.ingest(reading("presentValue", 50, ids(2, 10))).unwrap();
        assert_eq!(&record.tags[2..], &[Tag::new("units", "percent")]);
        assert_eq!(agg.pending_groups(), 2);
    }

    #[test]
    fn test_group_reset_after_trigger() {
        let mut agg = Aggregator::default();
        agg.ingest(reading("units", "degF", ids(1, 10)));
        agg.ingest(reading("presentValue", 1.0, ids(1, 10))).unwrap();

        agg.ingest(reading("description", "zone temp", ids(1, 10)));
        let record = agg.ingest(reading("presentValue", 2.0, ids(1, 10))).unwrap();
        assert_eq!(&record.tags[2..], &[Tag::new("description", "zone temp")]);
    }

    #[test]
    fn test_trigger_without_group_keeps_own_tags() {
        let mut agg = Aggregator::default();
        let tags = vec![Tag::new(OBJECT_INSTANCE_NUMBER, 4), Tag::new("objectName", "AHU-1")];
        let record = agg.ingest(reading("presentValue", true, tags.clone())).unwrap();
        assert_eq!(record.tags, tags);
        assert_eq!(agg.pending_groups(), 0);
    }

    #[test]
    fn test_missing_identity_tags_share_bucket() {
        let mut agg = Aggregator::default();
        agg.ingest(reading("units", "degF", Vec::new()));
        agg.ingest(reading("reliability", "noFaultDetected", vec![Tag::new("site", "north")]));

        let bucket = Identity::from_tags(&[]);
        assert_eq!(bucket.as_str(), "None_None");
        assert_eq!(agg.pending_entries(&bucket).unwrap().len(), 2);

        let record = agg.ingest(reading("presentValue", 3, Vec::new())).unwrap();
        assert_eq!(
            record.tags,
            vec![Tag::new("units", "degF"), Tag::new("reliability", "noFaultDetected")]
        );
    }

    #[test]
    fn test_late_attribute_starts_new_group() {
        let mut agg = Aggregator::default();
        agg.ingest(reading("presentValue", 1, ids(5, 50))).unwrap();
        assert!(agg.ingest(reading("units", "degC", ids(5, 50))).is_none());
        assert_eq!(agg.pending_groups(), 1);
    }

    #[test]
    fn test_custom_trigger_and_stats() {
        let mut agg = Aggregator::new(AggregatorConfig {
            trigger: "relinquishDefault".to_string(),
        });
        assert!(agg.ingest(reading("presentValue", 1, ids(1, 1))).is_none());
        assert!(agg.ingest(reading("relinquishDefault", 0, ids(1, 1))).is_some());
        agg.ingest(reading("units", "degF", ids(2, 1)));
        assert_eq!(agg.clear(), 1);

        let stats = agg.stats();
        assert_eq!(stats.ingested, 3);
        assert_eq!(stats.buffered, 2);
        assert_eq!(stats.merged, 1);
        assert_eq!(stats.discarded_groups, 1);
        assert_eq!(agg.pending_groups(), 0);
    }
}
