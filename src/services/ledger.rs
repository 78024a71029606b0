use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::{error::AppError, models::trip::Trip, services::storage::TripRepository};

/// In-memory trip collection owned by the application.
///
/// Readers get an immutable snapshot. Mutations build a new list, persist it
/// in full and only then swap it in, so a failed save changes nothing.
#[derive(Clone)]
pub struct TripLedger {
    repo: Arc<dyn TripRepository>,
    trips: Arc<RwLock<Arc<Vec<Trip>>>>,
}

impl TripLedger {
    pub async fn open(repo: Arc<dyn TripRepository>) -> Result<Self, AppError> {
        let trips = repo.load().await?;
        info!("loaded {} trips", trips.len());
        Ok(Self {
            repo,
            trips: Arc::new(RwLock::new(Arc::new(trips))),
        })
    }

    pub async fn snapshot(&self) -> Arc<Vec<Trip>> {
        self.trips.read().await.clone()
    }

    pub async fn append(&self, trip: Trip) -> Result<(), AppError> {
        let mut current = self.trips.write().await;
        if current.iter().any(|existing| existing.id == trip.id) {
            return Err(AppError::BadRequest(format!(
                "trip {} already exists",
                trip.id
            )));
        }
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(trip);
        self.repo.save(&next).await?;
        info!(
            trip_id = %next[next.len() - 1].id,
            total = next.len(),
            "trip recorded"
        );
        *current = Arc::new(next);
        Ok(())
    }

    /// Returns `false` when no trip has that id.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut current = self.trips.write().await;
        if !current.iter().any(|trip| trip.id == id) {
            return Ok(false);
        }
        let next: Vec<Trip> = current
            .iter()
            .filter(|trip| trip.id != id)
            .cloned()
            .collect();
        self.repo.save(&next).await?;
        info!(trip_id = %id, total = next.len(), "trip deleted");
        *current = Arc::new(next);
        Ok(true)
    }
}
