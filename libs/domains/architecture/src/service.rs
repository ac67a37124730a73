use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ArchitectureError, ArchitectureResult};
use crate::metrics::ArchitectureMetrics;
use crate::repository::ArchitectureRepository;
use crate::snapshot::{
    ArchitectureList, ListParams, SaveRequest, SavedArchitecture, UpdateArchitecture,
};

/// Service for saving and loading architectures through a gateway
///
/// The service never touches a [`crate::Designer`]: it takes owned save
/// requests and hands back saved architectures, so a failed call leaves the
/// designer exactly as it was.
#[derive(Clone)]
pub struct ArchitectureService<R: ArchitectureRepository> {
    repository: Arc<R>,
}

impl<R: ArchitectureRepository> ArchitectureService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List saved architectures
    pub async fn list(&self, params: ListParams) -> ArchitectureResult<ArchitectureList> {
        if params.limit == 0 {
            return Err(ArchitectureError::Validation(
                "limit must be at least 1".to_string(),
            ));
        }
        self.repository.list(params).await
    }

    /// Fetch a saved architecture for loading into a designer
    pub async fn load(&self, id: Uuid) -> ArchitectureResult<SavedArchitecture> {
        self.repository
            .get(id)
            .await?
            .ok_or(ArchitectureError::NotFound(id))
    }

    /// Create or update a saved architecture
    ///
    /// Requests without an id create a new architecture; otherwise every
    /// snapshot field of the existing one is replaced.
    pub async fn save(&self, request: SaveRequest) -> ArchitectureResult<SavedArchitecture> {
        let SaveRequest { id, payload } = request;

        if payload.name.trim().is_empty() {
            return Err(ArchitectureError::Validation(
                "Architecture name is required".to_string(),
            ));
        }
        payload.validate()?;

        let saved = match id {
            Some(id) => {
                self.repository
                    .update(id, UpdateArchitecture::from(payload))
                    .await?
            }
            None => self.repository.create(payload).await?,
        };

        if let Some(total) = saved
            .estimated_monthly_cost
            .as_deref()
            .and_then(|cost| cost.parse::<f64>().ok())
        {
            ArchitectureMetrics::set_estimated_monthly_cost(total);
        }

        info!(
            architecture_id = %saved.id,
            name = %saved.name,
            nodes = saved.nodes.len(),
            created = id.is_none(),
            "Saved architecture"
        );
        Ok(saved)
    }

    /// Publish or unpublish a saved architecture
    pub async fn set_public(&self, id: Uuid, is_public: bool) -> ArchitectureResult<SavedArchitecture> {
        let update = UpdateArchitecture {
            is_public: Some(is_public),
            ..Default::default()
        };
        self.repository.update(id, update).await
    }

    pub async fn delete(&self, id: Uuid) -> ArchitectureResult<()> {
        if self.repository.delete(id).await? {
            info!(architecture_id = %id, "Deleted architecture");
            Ok(())
        } else {
            Err(ArchitectureError::NotFound(id))
        }
    }

    /// Copy a saved architecture as a private "<name> (Copy)"
    pub async fn duplicate(&self, id: Uuid) -> ArchitectureResult<SavedArchitecture> {
        let copy = self.repository.duplicate(id).await?;
        info!(source_id = %id, architecture_id = %copy.id, "Duplicated architecture");
        Ok(copy)
    }
}
