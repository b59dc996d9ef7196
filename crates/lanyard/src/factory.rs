//! # Chain Factory
//!
//! Lays records out in a centred row and spawns one chain per record.

use glam::Vec3;
use physics::PhysicsEngine;

use crate::chain::JointChain;
use crate::config::{ChainConfig, LayoutConfig};
use crate::error::ChainError;
use crate::record::CardRecord;

/// A record and the row position its chain hangs from.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub record: CardRecord,
    pub position: Vec3,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Index in the input list.
    pub index: usize,
    pub key: String,
    pub reason: String,
}

pub struct SpawnedChain {
    pub record: CardRecord,
    pub position: Vec3,
    pub chain: JointChain,
}

#[derive(Default)]
pub struct SpawnReport {
    pub spawned: Vec<SpawnedChain>,
    pub skipped: Vec<SkippedRecord>,
    pub failed: Vec<(CardRecord, ChainError)>,
}

#[derive(Clone, Debug, Default)]
pub struct ChainFactory {
    layout: LayoutConfig,
    chain: ChainConfig,
}

impl ChainFactory {
    #[must_use]
    pub fn new(layout: LayoutConfig, chain: ChainConfig) -> Self {
        Self { layout, chain }
    }

    /// Places the valid records `spacing` apart, centred on `x = 0`.
    ///
    /// Invalid records are left out before indices are assigned, so the row
    /// stays centred.
    #[must_use]
    pub fn layout(&self, records: &[CardRecord], spacing: f32) -> Vec<Placement> {
        self.layout_reporting(records, spacing).0
    }

    fn layout_reporting(&self, records: &[CardRecord], spacing: f32) -> (Vec<Placement>, Vec<SkippedRecord>) {
        let mut skipped = Vec::new();
        let valid: Vec<&CardRecord> = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| match record.validate() {
                Ok(()) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping record {index} ({}): {e}", record.key());
                    skipped.push(SkippedRecord {
                        index,
                        key: record.key().to_owned(),
                        reason: e.to_string(),
                    });
                    None
                }
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let total_width = valid.len().saturating_sub(1) as f32 * spacing;
        let start_x = -total_width / 2.0;
        let placements = valid
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                #[allow(clippy::cast_precision_loss)]
                let x = start_x + i as f32 * spacing;
                Placement {
                    record: record.clone(),
                    position: Vec3::new(x, self.layout.row_y, self.layout.row_z),
                }
            })
            .collect();
        (placements, skipped)
    }

    /// Spawns a chain per valid record. A chain that fails to allocate is
    /// reported and its siblings are still spawned.
    pub fn spawn(&self, engine: &mut dyn PhysicsEngine, records: &[CardRecord]) -> SpawnReport {
        let (placements, skipped) = self.layout_reporting(records, self.layout.spacing);
        let mut report = SpawnReport {
            skipped,
            ..SpawnReport::default()
        };
        for Placement { record, position } in placements {
            match JointChain::create(engine, position + self.chain.group_offset, &self.chain) {
                Ok(chain) => report.spawned.push(SpawnedChain { record, position, chain }),
                Err(e) => {
                    tracing::warn!("Chain for record {} failed: {e}", record.key());
                    report.failed.push((record, e));
                }
            }
        }
        tracing::info!(
            "Spawned {} chains ({} skipped, {} failed)",
            report.spawned.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str) -> CardRecord {
        CardRecord {
            identifier: String::new(),
            title: format!("Deed {hash}"),
            locality: String::new(),
            size_value: Some(100.0),
            created_at: None,
            updated_at: None,
            content_hash: hash.to_owned(),
            status: None,
        }
    }

    #[test]
    fn three_records_spaced_three_apart_are_centred() {
        let factory = ChainFactory::default();
        let records = [record("a"), record("b"), record("c")];
        let xs: Vec<f32> = factory.layout(&records, 3.0).iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![-3.0, 0.0, 3.0]);
    }

    #[test]
    fn single_record_sits_at_the_origin() {
        let factory = ChainFactory::default();
        let placements = factory.layout(&[record("solo")], 3.0);
        assert_eq!(placements[0].position, Vec3::new(0.0, 1.2, 0.0));
    }

    #[test]
    fn empty_list_lays_out_nothing() {
        assert!(ChainFactory::default().layout(&[], 3.0).is_empty());
    }

    #[test]
    fn invalid_records_are_skipped_before_indexing() {
        let factory = ChainFactory::default();
        let records = [record("a"), record(""), record("c")];
        let placements = factory.layout(&records, 2.0);
        let keys: Vec<&str> = placements.iter().map(|p| p.record.key()).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(placements[0].position.x, -1.0);
        assert_eq!(placements[1].position.x, 1.0);
    }
}
