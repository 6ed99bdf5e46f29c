use async_trait::async_trait;

use crate::error::LocationError;
use crate::model::Coordinates;

/// Source of the device position sent along with feed queries.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// A position supplied up front (CLI flags, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Behaves like a device where the user declined location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

pub(crate) async fn resolve_best_effort<L: LocationProvider + ?Sized>(
    provider: &L,
) -> Option<Coordinates> {
    match provider.current_position().await {
        Ok(at) => Some(at),
        Err(e) => {
            tracing::warn!(error = %e, "querying posts without location");
            None
        }
    }
}

#[async_trait]
impl<T: LocationProvider + ?Sized> LocationProvider for Box<T> {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        (**self).current_position().await
    }
}

#[async_trait]
impl<T: LocationProvider + ?Sized> LocationProvider for std::sync::Arc<T> {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        (**self).current_position().await
    }
}
