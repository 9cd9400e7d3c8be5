use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::error::{CarrierError, CarrierResult};
use crate::host::{Picking, RecordStore};
use crate::models::TrackingUpdate;

/// Picking store backed by a JSON array on disk
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> CarrierResult<Vec<Picking>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CarrierError::Host(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            CarrierError::Host(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn save(&self, pickings: &[Picking]) -> CarrierResult<()> {
        let raw = serde_json::to_string_pretty(pickings)
            .map_err(|e| CarrierError::Host(e.to_string()))?;
        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            CarrierError::Host(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait::async_trait]
impl RecordStore for JsonFileStore {
    async fn pending_pickings(&self) -> CarrierResult<Vec<Picking>> {
        let _guard = self.lock.lock().await;
        let pickings = self.load().await?;

        Ok(pickings
            .into_iter()
            .filter(|p| p.tracking_ref().is_some())
            .filter(|p| !p.delivery_state.is_some_and(|s| s.is_final()))
            .collect())
    }

    async fn write_tracking(&self, picking_id: u64, update: &TrackingUpdate) -> CarrierResult<()> {
        let _guard = self.lock.lock().await;
        let mut pickings = self.load().await?;

        let picking = pickings
            .iter_mut()
            .find(|p| p.id == picking_id)
            .ok_or_else(|| CarrierError::Host(format!("Picking {} not found", picking_id)))?;
        picking.tracking_state = Some(update.tracking_state.clone());
        picking.tracking_state_history = Some(update.tracking_state_history.clone());
        picking.delivery_state = Some(update.delivery_state);

        self.save(&pickings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master_data::DeliveryState;

    fn picking(id: u64, tracking: Option<&str>, state: Option<DeliveryState>) -> Picking {
        Picking {
            id,
            name: format!("WH/OUT/{:05}", id),
            carrier_tracking_ref: tracking.map(str::to_string),
            delivery_state: state,
            ..Picking::default()
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));

        assert!(store.pending_pickings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_filter_and_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipments.json");
        let pickings = vec![
            picking(1, Some("AAA"), None),
            picking(2, None, None),
            picking(3, Some("CCC"), Some(DeliveryState::CustomerDelivered)),
            picking(4, Some("DDD"), Some(DeliveryState::InTransit)),
        ];
        std::fs::write(&path, serde_json::to_string(&pickings).unwrap()).unwrap();
        let store = JsonFileStore::new(&path);

        let pending: Vec<u64> = store
            .pending_pickings()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(pending, vec![1, 4]);

        let update = TrackingUpdate {
            tracking_state: "2024-03-05 10:15:00 - [30] Delivered".to_string(),
            tracking_state_history: "2024-03-05 10:15:00 - [30] Delivered".to_string(),
            delivery_state: DeliveryState::CustomerDelivered,
        };
        store.write_tracking(1, &update).await.unwrap();

        let pending: Vec<u64> = store
            .pending_pickings()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(pending, vec![4]);

        assert!(matches!(
            store.write_tracking(99, &update).await,
            Err(CarrierError::Host(_))
        ));
    }
}
