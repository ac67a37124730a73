use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ArchitectureResult;
use crate::snapshot::{
    ArchitectureList, CreateArchitecture, ListParams, SavedArchitecture, UpdateArchitecture,
};

/// Persistence gateway for saved architectures
///
/// Implementations talk to a remote store; the designer never depends on one
/// directly and only exchanges owned snapshots with it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchitectureRepository: Send + Sync {
    /// List saved architectures, newest first
    async fn list(&self, params: ListParams) -> ArchitectureResult<ArchitectureList>;

    /// Get a saved architecture by ID
    async fn get(&self, id: Uuid) -> ArchitectureResult<Option<SavedArchitecture>>;

    /// Create a saved architecture
    async fn create(&self, input: CreateArchitecture) -> ArchitectureResult<SavedArchitecture>;

    /// Apply a partial update
    async fn update(
        &self,
        id: Uuid,
        input: UpdateArchitecture,
    ) -> ArchitectureResult<SavedArchitecture>;

    /// Delete a saved architecture; false when it did not exist
    async fn delete(&self, id: Uuid) -> ArchitectureResult<bool>;

    /// Copy a saved architecture as a private "<name> (Copy)"
    async fn duplicate(&self, id: Uuid) -> ArchitectureResult<SavedArchitecture>;
}
