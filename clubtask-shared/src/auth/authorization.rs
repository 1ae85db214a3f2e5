/// Authorization checks for request handlers
///
/// The role that counts is the one in the current member directory, not the
/// one in the token: a member whose role was changed, suspended or deleted
/// is judged by the sheet as it is now.
///
/// # Permission Model
///
/// 1. **Membership**: the caller must still exist in the directory and, unless
///    a Dev, be Active
/// 2. **Dev-only**: member management and admin operations
/// 3. **Assigners**: Core, Domain and Associate Heads may create tasks
/// 4. **Subordinates**: an assignee must be in the assigner's subordinate set
/// 5. **Assignees**: only the assignee may update a task's status
///
/// # Example
///
/// ```
/// use clubtask_shared::auth::authorization::{require_dev, AuthzError};
/// use clubtask_shared::auth::middleware::AuthContext;
/// use clubtask_shared::models::member::{Member, MemberDirectory, MemberRole, MemberStatus};
///
/// let mut directory = MemberDirectory::new();
/// directory.push(Member::new("Bo", MemberRole::CoreHead, "x", MemberStatus::Active, "Ada"));
///
/// // The token claims Dev, but the directory says Core Head
/// let auth = AuthContext { member: "Bo".to_string(), role: MemberRole::Dev };
/// assert!(matches!(require_dev(&auth, &directory), Err(AuthzError::DevOnly)));
/// ```

use super::hierarchy::{can_assign_tasks, can_assign_to};
use super::middleware::AuthContext;
use crate::models::member::{Member, MemberDirectory, MemberRole, MemberStatus};
use crate::models::task::Task;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is no longer in the directory
    #[error("Member {0} no longer exists")]
    UnknownMember(String),

    /// Caller is no longer Active (Devs are exempt)
    #[error("Account for {0} is {1}")]
    Inactive(String, MemberStatus),

    /// Caller is not a Dev
    #[error("Only Devs can perform this action")]
    DevOnly,

    /// Caller's role cannot assign tasks
    #[error("Role {0} cannot assign tasks")]
    CannotAssign(MemberRole),

    /// Assignee is outside the caller's subordinate set
    #[error("{0} is not one of your subordinates")]
    NotSubordinate(String),

    /// Caller is not the task's assignee
    #[error("Only the assignee can update this task")]
    NotAssignee,
}

/// Looks up the caller in the directory
///
/// Applies the same status gate as login: a non-Dev caller must still be
/// Active.
///
/// # Errors
///
/// Returns `AuthzError::UnknownMember` if the caller was removed, or
/// `AuthzError::Inactive` if the caller was suspended or otherwise deactivated
pub fn require_member<'a>(
    auth: &AuthContext,
    directory: &'a MemberDirectory,
) -> Result<&'a Member, AuthzError> {
    let member = directory
        .get(&auth.member)
        .ok_or_else(|| AuthzError::UnknownMember(auth.member.clone()))?;

    if !member.role.is_dev() && !member.status.is_active() {
        return Err(AuthzError::Inactive(member.name.clone(), member.status.clone()));
    }

    Ok(member)
}

/// Requires the caller to currently hold the Dev role
pub fn require_dev<'a>(
    auth: &AuthContext,
    directory: &'a MemberDirectory,
) -> Result<&'a Member, AuthzError> {
    let member = require_member(auth, directory)?;

    if !member.role.is_dev() {
        return Err(AuthzError::DevOnly);
    }

    Ok(member)
}

/// Requires the caller to hold a role that assigns tasks
pub fn require_assigner<'a>(
    auth: &AuthContext,
    directory: &'a MemberDirectory,
) -> Result<&'a Member, AuthzError> {
    let member = require_member(auth, directory)?;

    if !can_assign_tasks(&member.role) {
        return Err(AuthzError::CannotAssign(member.role.clone()));
    }

    Ok(member)
}

/// Requires `assignee` to be one of the caller's subordinates
pub fn require_subordinate(
    auth: &AuthContext,
    assignee: &str,
    directory: &MemberDirectory,
) -> Result<(), AuthzError> {
    if !can_assign_to(&auth.member, assignee, directory) {
        return Err(AuthzError::NotSubordinate(assignee.to_string()));
    }

    Ok(())
}

/// Requires the caller to be the task's assignee
pub fn require_assignee(auth: &AuthContext, task: &Task) -> Result<(), AuthzError> {
    if task.assigned_to != auth.member {
        return Err(AuthzError::NotAssignee);
    }

    Ok(())
}
