/// Membership lifecycle service
///
/// Every operation mutates the caller's [`MemberDirectory`] snapshot and then
/// overwrites the whole `Members` table with it.
///
/// # Lifecycle
///
/// ```text
/// register ──► Pending ──approve──► Active ◄──reactivate── Suspended
///                 │                    └──────suspend──────────▲
///                 └──reject (delete)──► removed
/// ```
///
/// The first Dev registered into an empty directory starts Active and
/// approved by `System`; that member is the parent Dev. Every later account
/// starts Pending. Later Devs can only be approved by the parent Dev; other
/// roles accept any approver.
///
/// # Failure Semantics
///
/// When the write fails the mutation has already been applied to the
/// snapshot. The caller keeps the snapshot and may retry with
/// [`MembershipService::persist`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use clubtask_shared::models::member::{MemberRole, MemberStatus};
/// use clubtask_shared::services::membership::MembershipService;
/// use clubtask_shared::store::{cache::SnapshotCache, members::MemberSheet, memory::MemorySheetStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sheet = MemberSheet::new(Arc::new(MemorySheetStore::new()), Arc::new(SnapshotCache::default()));
/// let service = MembershipService::new(sheet);
///
/// let mut directory = service.load().await?;
/// let outcome = service.register(&mut directory, "Ada", "pw", MemberRole::Dev).await?;
/// assert_eq!(outcome.status, MemberStatus::Active);
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};
use crate::auth::password::hash_password;
use crate::models::member::{Member, MemberDirectory, MemberRole, MemberStatus, SYSTEM_APPROVER};
use crate::store::members::MemberSheet;

/// Result of a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub name: String,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub message: String,
}

/// Membership lifecycle operations over the `Members` table
#[derive(Clone)]
pub struct MembershipService {
    sheet: MemberSheet,
}

impl MembershipService {
    pub fn new(sheet: MemberSheet) -> Self {
        Self { sheet }
    }

    /// Loads the directory
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Persistence` if the table cannot be read
    pub async fn load(&self) -> ServiceResult<MemberDirectory> {
        Ok(self.sheet.load().await?)
    }

    /// Loads the directory, falling back to an empty one if the read fails
    ///
    /// For read-only views. Never write back a snapshot obtained this way.
    pub async fn load_or_empty(&self) -> MemberDirectory {
        match self.sheet.load().await {
            Ok(directory) => directory,
            Err(e) => {
                warn!(error = %e, "Failed to load members, showing an empty directory");
                MemberDirectory::new()
            }
        }
    }

    /// Overwrites the table with `directory`
    pub async fn persist(&self, directory: &MemberDirectory) -> ServiceResult<()> {
        self.sheet.save(directory).await?;
        Ok(())
    }

    /// Registers a new member
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty name or password, an unknown role, or a
    ///   name that already exists ("User already exists.")
    /// - `Persistence` if the write fails
    pub async fn register(
        &self,
        directory: &mut MemberDirectory,
        name: &str,
        password: &str,
        role: MemberRole,
    ) -> ServiceResult<Registration> {
        if name.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "Please fill all fields.".to_string(),
            ));
        }
        if !role.is_known() {
            return Err(ServiceError::Validation(format!("Unknown role: {}", role)));
        }
        if directory.contains(name) {
            return Err(ServiceError::Validation("User already exists.".to_string()));
        }

        let bootstrap = role.is_dev() && directory.is_empty();
        let (status, approved_by) = if bootstrap {
            (MemberStatus::Active, SYSTEM_APPROVER)
        } else {
            (MemberStatus::Pending, "")
        };

        directory.push(Member::new(
            name,
            role.clone(),
            hash_password(password),
            status.clone(),
            approved_by,
        ));
        self.persist(directory).await?;

        let message = match (&role, bootstrap) {
            (MemberRole::Dev, true) => "Dev registration successful! You can now log in.",
            (MemberRole::Dev, false) => {
                "Dev registration submitted! Awaiting approval by the parent Dev."
            }
            _ => "Registration successful! Your account is pending approval by a Dev.",
        };

        info!(member = %name, role = %role, status = %status, "Member registered");

        Ok(Registration {
            name: name.to_string(),
            role,
            status,
            message: message.to_string(),
        })
    }

    /// Approves `name`, recording `approver`
    ///
    /// Works from any prior status. A Dev target may only be approved by the
    /// parent Dev.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not in the directory
    /// - `Authorization` if a Dev target is approved by anyone but the parent Dev
    /// - `Persistence` if the write fails
    pub async fn approve(
        &self,
        directory: &mut MemberDirectory,
        name: &str,
        approver: &str,
    ) -> ServiceResult<String> {
        let target_is_dev = member(directory, name)?.role.is_dev();

        if target_is_dev {
            let parent = directory.bootstrap_dev().map(|m| m.name.as_str());
            if parent != Some(approver) {
                return Err(ServiceError::Authorization(
                    "Only the parent Dev can approve new Devs.".to_string(),
                ));
            }
        }

        let target = member_mut(directory, name)?;
        target.status = MemberStatus::Active;
        target.approved_by = approver.to_string();
        self.persist(directory).await?;

        info!(member = %name, approver = %approver, "Member approved");
        Ok(format!("User {} approved successfully!", name))
    }

    /// Sets `name` to Suspended
    pub async fn suspend(&self, directory: &mut MemberDirectory, name: &str) -> ServiceResult<String> {
        member_mut(directory, name)?.status = MemberStatus::Suspended;
        self.persist(directory).await?;

        info!(member = %name, "Member suspended");
        Ok(format!("User {} suspended successfully!", name))
    }

    /// Sets `name` to Active
    pub async fn reactivate(&self, directory: &mut MemberDirectory, name: &str) -> ServiceResult<String> {
        member_mut(directory, name)?.status = MemberStatus::Active;
        self.persist(directory).await?;

        info!(member = %name, "Member reactivated");
        Ok(format!("User {} reactivated successfully!", name))
    }

    /// Removes `name` from the directory (also used to reject a registration)
    pub async fn delete(&self, directory: &mut MemberDirectory, name: &str) -> ServiceResult<String> {
        directory
            .remove(name)
            .ok_or_else(|| not_found(name))?;
        self.persist(directory).await?;

        info!(member = %name, "Member deleted");
        Ok(format!("User {} deleted successfully!", name))
    }

    /// Changes the role of `name`
    pub async fn change_role(
        &self,
        directory: &mut MemberDirectory,
        name: &str,
        role: MemberRole,
    ) -> ServiceResult<String> {
        if !role.is_known() {
            return Err(ServiceError::Validation(format!("Unknown role: {}", role)));
        }

        member_mut(directory, name)?.role = role.clone();
        self.persist(directory).await?;

        info!(member = %name, role = %role, "Member role changed");
        Ok(format!("User {}'s role updated to {}!", name, role))
    }

    /// Sets every member to Active
    pub async fn reset_all_statuses(&self, directory: &mut MemberDirectory) -> ServiceResult<String> {
        for member in directory.iter_mut() {
            member.status = MemberStatus::Active;
        }
        self.persist(directory).await?;

        warn!(members = directory.len(), "All member statuses reset to Active");
        Ok("All member statuses reset to Active!".to_string())
    }
}

fn not_found(name: &str) -> ServiceError {
    ServiceError::NotFound(format!("User {} not found", name))
}

fn member<'a>(directory: &'a MemberDirectory, name: &str) -> ServiceResult<&'a Member> {
    directory.get(name).ok_or_else(|| not_found(name))
}

fn member_mut<'a>(directory: &'a mut MemberDirectory, name: &str) -> ServiceResult<&'a mut Member> {
    directory.get_mut(name).ok_or_else(|| not_found(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::cache::SnapshotCache;
    use crate::store::memory::MemorySheetStore;
    use crate::store::{Sheet, SheetStore, StoreError};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Store whose writes always fail
    struct ReadOnlyStore;

    #[async_trait]
    impl SheetStore for ReadOnlyStore {
        fn backend_name(&self) -> &str {
            "read-only"
        }

        async fn read_all(&self, _table: &str, default_columns: &[&str]) -> Result<Sheet, StoreError> {
            Ok(Sheet::with_columns(default_columns))
        }

        async fn overwrite_all(&self, _table: &str, _sheet: &Sheet) -> Result<(), StoreError> {
            Err(StoreError::Backend("quota exceeded".to_string()))
        }
    }

    fn service() -> (MembershipService, Arc<MemorySheetStore>) {
        let store = Arc::new(MemorySheetStore::new());
        let sheet = MemberSheet::new(store.clone(), Arc::new(SnapshotCache::default()));
        (MembershipService::new(sheet), store)
    }

    async fn with_parent_dev(service: &MembershipService) -> MemberDirectory {
        let mut directory = service.load().await.unwrap();
        service
            .register(&mut directory, "Ada", "pw", MemberRole::Dev)
            .await
            .unwrap();
        directory
    }

    #[tokio::test]
    async fn test_first_dev_is_bootstrapped() {
        let (service, _) = service();
        let mut directory = service.load().await.unwrap();

        let outcome = service
            .register(&mut directory, "Ada", "pw", MemberRole::Dev)
            .await
            .unwrap();

        assert_eq!(outcome.status, MemberStatus::Active);
        assert_eq!(outcome.message, "Dev registration successful! You can now log in.");
        assert_eq!(directory.get("Ada").unwrap().approved_by, SYSTEM_APPROVER);
        assert_eq!(directory.get("Ada").unwrap().password, hash_password("pw"));
    }

    #[tokio::test]
    async fn test_second_dev_is_pending() {
        let (service, _) = service();
        let mut directory = with_parent_dev(&service).await;

        let outcome = service
            .register(&mut directory, "Bo", "pw", MemberRole::Dev)
            .await
            .unwrap();

        assert_eq!(outcome.status, MemberStatus::Pending);
        assert_eq!(directory.get("Bo").unwrap().approved_by, "");
    }

    #[tokio::test]
    async fn test_non_dev_in_empty_directory_is_pending() {
        let (service, _) = service();
        let mut directory = service.load().await.unwrap();

        let outcome = service
            .register(&mut directory, "Bo", "pw", MemberRole::CoreHead)
            .await
            .unwrap();

        assert_eq!(outcome.status, MemberStatus::Pending);
        assert!(directory.bootstrap_dev().is_none());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, _) = service();
        let mut directory = with_parent_dev(&service).await;

        let duplicate = service
            .register(&mut directory, "Ada", "pw", MemberRole::CoreHead)
            .await;
        assert!(matches!(duplicate, Err(ServiceError::Validation(m)) if m == "User already exists."));

        let empty = service
            .register(&mut directory, "  ", "pw", MemberRole::CoreHead)
            .await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));

        let other = service
            .register(&mut directory, "Cy", "pw", MemberRole::Other("Boss".into()))
            .await;
        assert!(matches!(other, Err(ServiceError::Validation(_))));

        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_only_parent_dev_approves_devs() {
        let (service, _) = service();
        let mut directory = with_parent_dev(&service).await;
        service.register(&mut directory, "Bo", "pw", MemberRole::Dev).await.unwrap();
        service.register(&mut directory, "Cy", "pw", MemberRole::Dev).await.unwrap();

        let denied = service.approve(&mut directory, "Cy", "Bo").await;
        assert!(matches!(denied, Err(ServiceError::Authorization(_))));
        assert_eq!(directory.get("Cy").unwrap().status, MemberStatus::Pending);

        service.approve(&mut directory, "Cy", "Ada").await.unwrap();
        assert_eq!(directory.get("Cy").unwrap().status, MemberStatus::Active);
        assert_eq!(directory.get("Cy").unwrap().approved_by, "Ada");
    }

    #[tokio::test]
    async fn test_non_dev_approval_accepts_any_approver() {
        let (service, _) = service();
        let mut directory = with_parent_dev(&service).await;
        service
            .register(&mut directory, "Bo", "pw", MemberRole::JuniorHead)
            .await
            .unwrap();

        service.approve(&mut directory, "Bo", "Someone").await.unwrap();
        assert_eq!(directory.get("Bo").unwrap().approved_by, "Someone");
    }

    #[tokio::test]
    async fn test_status_transitions_and_delete() {
        let (service, _) = service();
        let mut directory = with_parent_dev(&service).await;
        service
            .register(&mut directory, "Bo", "pw", MemberRole::CoreHead)
            .await
            .unwrap();

        service.suspend(&mut directory, "Bo").await.unwrap();
        assert_eq!(directory.get("Bo").unwrap().status, MemberStatus::Suspended);

        service.reactivate(&mut directory, "Bo").await.unwrap();
        assert_eq!(directory.get("Bo").unwrap().status, MemberStatus::Active);

        let message = service
            .change_role(&mut directory, "Bo", MemberRole::DomainHead)
            .await
            .unwrap();
        assert_eq!(message, "User Bo's role updated to Domain Head!");

        service.delete(&mut directory, "Bo").await.unwrap();
        assert!(!directory.contains("Bo"));

        let persisted = service.load().await.unwrap();
        assert!(!persisted.contains("Bo"));
        assert!(persisted.contains("Ada"));
    }

    #[tokio::test]
    async fn test_unknown_member_is_not_found() {
        let (service, _) = service();
        let mut directory = with_parent_dev(&service).await;

        assert!(matches!(
            service.suspend(&mut directory, "Nobody").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.approve(&mut directory, "Nobody", "Ada").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&mut directory, "Nobody").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reset_all_statuses() {
        let (service, _) = service();
        let mut directory = with_parent_dev(&service).await;
        service.register(&mut directory, "Bo", "pw", MemberRole::CoreHead).await.unwrap();
        service.register(&mut directory, "Cy", "pw", MemberRole::CoreHead).await.unwrap();
        service.suspend(&mut directory, "Cy").await.unwrap();

        service.reset_all_statuses(&mut directory).await.unwrap();

        let persisted = service.load().await.unwrap();
        assert_eq!(persisted.status_counts().active, 3);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_mutated_snapshot() {
        let sheet = MemberSheet::new(Arc::new(ReadOnlyStore), Arc::new(SnapshotCache::default()));
        let service = MembershipService::new(sheet);
        let mut directory = service.load().await.unwrap();

        let result = service
            .register(&mut directory, "Ada", "pw", MemberRole::Dev)
            .await;

        assert!(matches!(result, Err(ServiceError::Persistence(_))));
        assert!(directory.contains("Ada"));
        assert!(service.persist(&directory).await.is_err());
    }
}
