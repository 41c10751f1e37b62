//! Event capture: world signals in, stored events out.

use bl_core::{
    BlockAction, BlockEvent, BlockPos, ClickAction, ContainerEvent, DestroyedBlock,
    InventorySource, SessionRegistry, attribute_explosion, classify_click, is_detonator_entity,
};
use bl_db::Database;
use bl_provider::{Provider, latest_placer};

/// Record depth scanned when attributing a detonation to a placer.
///
/// Much deeper than a display lookup: the placement that armed the charge can
/// sit well behind later traffic at the same coordinate.
const ATTRIBUTION_LOOKUP_DEPTH: u32 = 256;

/// Records world events into whichever backend holds authority.
///
/// Block mutations pass through a single gate: when a probed [`Provider`] is
/// present it records them on its own, and the local store stays untouched.
/// Otherwise every mutation lands in the local store. Container transfers are
/// always local; the provider does not track them.
///
/// Capture never propagates faults to the caller. A signal that cannot be
/// recorded is logged and dropped, so gameplay is never interrupted by its
/// own audit trail.
pub struct CaptureService {
    db: Database,
    provider: Option<Provider>,
    sessions: SessionRegistry,
}

impl CaptureService {
    #[must_use]
    pub fn new(db: Database, provider: Option<Provider>) -> Self {
        Self {
            db,
            provider,
            sessions: SessionRegistry::new(),
        }
    }

    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    #[must_use]
    pub const fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }

    /// Records a participant placing a block.
    pub fn on_block_placed(
        &self,
        pos: BlockPos,
        block: impl Into<String>,
        actor: impl Into<String>,
    ) {
        self.record_block(BlockEvent {
            pos,
            action: BlockAction::Placed,
            block: block.into(),
            actor: actor.into(),
        });
    }

    /// Records a participant breaking a block.
    pub fn on_block_broken(
        &self,
        pos: BlockPos,
        block: impl Into<String>,
        actor: impl Into<String>,
    ) {
        self.record_block(BlockEvent {
            pos,
            action: BlockAction::Broken,
            block: block.into(),
            actor: actor.into(),
        });
    }

    /// Records every block destroyed by one explosion.
    ///
    /// The recorded actor is a synthetic marker derived from the exploding
    /// entity. When the entity is a primed charge and the provider can name
    /// who placed it, the detonator is reported through the log stream; the
    /// stored rows keep the marker either way.
    pub fn on_explosion(&self, world: &str, entity: Option<&str>, destroyed: &[DestroyedBlock]) {
        let is_detonator = entity.is_some_and(is_detonator_entity);
        for destroyed_block in destroyed {
            let pos = BlockPos::new(world, destroyed_block.x, destroyed_block.y, destroyed_block.z);
            let placer = if is_detonator {
                self.prior_placer(&pos)
            } else {
                None
            };
            let attribution = attribute_explosion(entity, placer.as_deref());
            if let Some(detonated_by) = &attribution.detonated_by {
                tracing::info!(
                    pos = %pos,
                    detonated_by = %detonated_by,
                    "explosion charge attributed"
                );
            }
            self.record_block(BlockEvent {
                pos,
                action: BlockAction::ChangedByExplosion,
                block: destroyed_block.block.clone(),
                actor: attribution.actor,
            });
        }
    }

    /// Opens a container session for a participant.
    ///
    /// Virtual inventories have no coordinate and are not tracked.
    pub fn on_inventory_opened(&mut self, participant: &str, source: &InventorySource) {
        match self.sessions.open(participant, source) {
            Some(anchor) => {
                tracing::debug!(participant, anchor = %anchor, "container session opened");
            }
            None => tracing::debug!(participant, "virtual inventory opened, not tracked"),
        }
    }

    /// Closes a participant's container session, if one is open.
    pub fn on_inventory_closed(&mut self, participant: &str) {
        if let Some(anchor) = self.sessions.close(participant) {
            tracing::debug!(participant, anchor = %anchor, "container session closed");
        }
    }

    /// Records the transfers produced by one click inside an open session.
    ///
    /// Clicks from participants without an open session are dropped; there is
    /// no coordinate to charge them to.
    pub fn on_container_click(&self, participant: &str, click: &ClickAction) {
        let Some(anchor) = self.sessions.anchor(participant) else {
            tracing::debug!(participant, "container click outside any session, dropped");
            return;
        };
        let pos = anchor.clone();
        for transfer in classify_click(click) {
            self.record_container(ContainerEvent {
                pos: pos.clone(),
                action: transfer.action,
                qualifier: transfer.qualifier,
                item: transfer.item,
                amount: transfer.amount,
                actor: participant.to_string(),
            });
        }
    }

    /// Latest participant placement at a coordinate, per the provider.
    fn prior_placer(&self, pos: &BlockPos) -> Option<String> {
        let provider = self.provider.as_ref()?;
        match provider.lookup(pos, ATTRIBUTION_LOOKUP_DEPTH) {
            Ok(records) => latest_placer(&records).map(str::to_string),
            Err(err) => {
                tracing::warn!(error = %err, pos = %pos, "placer lookup failed");
                None
            }
        }
    }

    /// The one gate all block mutations go through.
    fn record_block(&self, event: BlockEvent) {
        if self.provider.is_some() {
            tracing::debug!(
                pos = %event.pos,
                action = event.action.as_str(),
                "provider holds authority, skipping local write"
            );
            return;
        }
        match self.db.insert_block(&event) {
            Ok(id) => {
                tracing::debug!(id, pos = %event.pos, action = event.action.as_str(), "block mutation recorded");
            }
            Err(err) => {
                tracing::error!(error = %err, pos = %event.pos, "failed to record block mutation");
            }
        }
    }

    fn record_container(&self, event: ContainerEvent) {
        match self.db.insert_container(&event) {
            Ok(id) => tracing::debug!(id, pos = %event.pos, "container transfer recorded"),
            Err(err) => {
                tracing::error!(error = %err, pos = %event.pos, "failed to record container transfer");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bl_core::{ItemStack, Pane};
    use bl_db::DEFAULT_HISTORY_LIMIT;
    use bl_provider::{Capabilities, MIN_API_VERSION, ProviderApi, ProviderError, RawRecord};

    struct StubApi {
        records: Vec<RawRecord>,
    }

    impl ProviderApi for StubApi {
        fn capabilities(&self) -> Result<Capabilities, ProviderError> {
            Ok(Capabilities {
                enabled: true,
                api_version: MIN_API_VERSION,
            })
        }

        fn block_history(
            &self,
            _pos: &BlockPos,
            limit: u32,
        ) -> Result<Vec<RawRecord>, ProviderError> {
            let limit = usize::try_from(limit).unwrap();
            Ok(self.records.iter().take(limit).cloned().collect())
        }
    }

    fn local_service() -> CaptureService {
        CaptureService::new(Database::open_in_memory().expect("open in-memory db"), None)
    }

    fn provider_service(records: Vec<RawRecord>) -> CaptureService {
        let provider = Provider::probe(Box::new(StubApi { records })).expect("probe stub");
        CaptureService::new(
            Database::open_in_memory().expect("open in-memory db"),
            Some(provider),
        )
    }

    fn pos() -> BlockPos {
        BlockPos::new("world", 10, 64, 10)
    }

    fn chest() -> InventorySource {
        InventorySource::Block(pos())
    }

    fn pickup(item: &str, amount: u32) -> ClickAction {
        ClickAction::Pickup {
            pane: Pane::Container,
            stack: Some(ItemStack::new(item, amount)),
        }
    }

    fn placement_record(actor: &str) -> RawRecord {
        RawRecord {
            time: 1_700_000_000,
            actor: actor.to_string(),
            block: "tnt".to_string(),
            action_id: 1,
        }
    }

    #[test]
    fn place_and_break_are_recorded_locally() {
        let service = local_service();
        service.on_block_placed(pos(), "stone", "Alice");
        service.on_block_broken(pos(), "stone", "Bob");

        let rows = service
            .database()
            .block_history(&pos(), DEFAULT_HISTORY_LIMIT)
            .expect("history");
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].player.as_str(), rows[0].action.as_str()), ("Bob", "Broke"));
        assert_eq!((rows[1].player.as_str(), rows[1].action.as_str()), ("Alice", "Placed"));
    }

    #[test]
    fn provider_presence_suppresses_local_block_writes() {
        let service = provider_service(Vec::new());
        service.on_block_placed(pos(), "stone", "Alice");
        service.on_block_broken(pos(), "stone", "Bob");
        service.on_explosion(
            "world",
            Some("creeper"),
            &[DestroyedBlock {
                x: 5,
                y: 5,
                z: 5,
                block: "dirt".to_string(),
            }],
        );

        let summary = service.database().summary().expect("summary");
        assert_eq!(summary.block_count, 0);
    }

    #[test]
    fn container_transfers_stay_local_with_provider_present() {
        let mut service = provider_service(Vec::new());
        service.on_inventory_opened("Bob", &chest());
        service.on_container_click("Bob", &pickup("iron_ingot", 5));

        let rows = service
            .database()
            .container_history(&pos(), DEFAULT_HISTORY_LIMIT)
            .expect("history");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].action, "Took");
        assert_eq!(rows[0].amount, 5);
    }

    #[test]
    fn explosion_records_marker_actor_per_block() {
        let service = local_service();
        let destroyed = vec![
            DestroyedBlock {
                x: 5,
                y: 5,
                z: 5,
                block: "stone".to_string(),
            },
            DestroyedBlock {
                x: 5,
                y: 5,
                z: 6,
                block: "dirt".to_string(),
            },
        ];
        service.on_explosion("world", Some("Creeper"), &destroyed);

        let rows = service
            .database()
            .block_history(&BlockPos::new("world", 5, 5, 5), DEFAULT_HISTORY_LIMIT)
            .expect("history");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player, "#creeper");
        assert_eq!(rows[0].action, "Blown up");

        let rows = service
            .database()
            .block_history(&BlockPos::new("world", 5, 5, 6), DEFAULT_HISTORY_LIMIT)
            .expect("history");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].block, "dirt");
    }

    #[test]
    fn explosion_without_entity_uses_generic_marker() {
        let service = local_service();
        service.on_explosion(
            "world",
            None,
            &[DestroyedBlock {
                x: 0,
                y: 0,
                z: 0,
                block: "sand".to_string(),
            }],
        );

        let rows = service
            .database()
            .block_history(&BlockPos::new("world", 0, 0, 0), DEFAULT_HISTORY_LIMIT)
            .expect("history");
        assert_eq!(rows[0].player, "#explosion");
    }

    #[test]
    fn click_without_session_is_dropped() {
        let service = local_service();
        service.on_container_click("Bob", &pickup("iron_ingot", 5));

        let summary = service.database().summary().expect("summary");
        assert_eq!(summary.container_count, 0);
    }

    #[test]
    fn closed_session_stops_recording() {
        let mut service = local_service();
        service.on_inventory_opened("Bob", &chest());
        service.on_inventory_closed("Bob");
        service.on_container_click("Bob", &pickup("iron_ingot", 5));

        let summary = service.database().summary().expect("summary");
        assert_eq!(summary.container_count, 0);
    }

    #[test]
    fn double_block_clicks_anchor_to_canonical_corner() {
        let mut service = local_service();
        let source = InventorySource::DoubleBlock(
            BlockPos::new("world", 1, 64, 9),
            BlockPos::new("world", 0, 64, 9),
        );
        service.on_inventory_opened("Bob", &source);
        service.on_container_click("Bob", &pickup("gold_ingot", 2));

        let rows = service
            .database()
            .container_history(&BlockPos::new("world", 0, 64, 9), DEFAULT_HISTORY_LIMIT)
            .expect("history");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn virtual_inventory_clicks_are_not_recorded() {
        let mut service = local_service();
        service.on_inventory_opened("Bob", &InventorySource::Virtual);
        service.on_container_click("Bob", &pickup("iron_ingot", 5));

        let summary = service.database().summary().expect("summary");
        assert_eq!(summary.container_count, 0);
    }

    #[test]
    fn unrecordable_event_is_dropped_without_panicking() {
        let service = local_service();
        service.on_block_placed(pos(), "stone", "");

        let summary = service.database().summary().expect("summary");
        assert_eq!(summary.block_count, 0);
    }

    #[test]
    fn prior_placer_reads_through_provider() {
        let service = provider_service(vec![placement_record("Alice")]);
        assert_eq!(service.prior_placer(&pos()), Some("Alice".to_string()));

        let service = local_service();
        assert_eq!(service.prior_placer(&pos()), None);
    }

    #[test]
    fn prior_placer_scans_past_the_display_limit() {
        // The placement sits deeper than a display query would reach.
        let buried_depth = i64::from(DEFAULT_HISTORY_LIMIT) + 2;
        let mut records: Vec<RawRecord> = (0..buried_depth)
            .map(|i| RawRecord {
                time: 1_700_000_100 - i,
                actor: "Alice".to_string(),
                block: "stone".to_string(),
                action_id: 0,
            })
            .collect();
        records.push(placement_record("Dave"));

        let service = provider_service(records);
        assert_eq!(service.prior_placer(&pos()), Some("Dave".to_string()));
    }
}
