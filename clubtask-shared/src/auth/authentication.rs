/// Authentication service
///
/// Validates a (name, password) pair against a [`MemberDirectory`] snapshot
/// and the account status rules.
///
/// # Order of Checks
///
/// 1. An empty directory fails with "No users found"
/// 2. An unknown name fails with "User not found"
/// 3. A non-Dev member who is not Active fails with a status-specific
///    reason. Devs skip this step, so a Pending or Suspended Dev can still
///    log in.
/// 4. The password is checked. Without a `Password` column only
///    [`DEFAULT_PASSWORD`] is accepted; otherwise see
///    [`super::password::verify_password`].
///
/// # Example
///
/// ```
/// use clubtask_shared::auth::authentication::{authenticate, AuthFailure};
/// use clubtask_shared::auth::password::hash_password;
/// use clubtask_shared::models::member::{Member, MemberDirectory, MemberRole, MemberStatus};
///
/// let mut directory = MemberDirectory::new();
/// directory.push(Member::new("Ada", MemberRole::Dev, hash_password("pw"), MemberStatus::Active, "System"));
///
/// let member = authenticate("Ada", "pw", &directory).unwrap();
/// assert_eq!(member.role, MemberRole::Dev);
///
/// assert_eq!(authenticate("Ada", "nope", &directory).unwrap_err(), AuthFailure::InvalidCredentials);
/// ```

use serde::Serialize;

use super::password::{constant_time_compare, verify_password, DEFAULT_PASSWORD};
use crate::models::member::{MemberDirectory, MemberRole, MemberStatus};

/// Reason an authentication attempt was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("No users found")]
    NoUsers,

    #[error("User not found")]
    NotFound,

    #[error("Account pending approval")]
    Pending,

    #[error("Account suspended")]
    Suspended,

    #[error("Account inactive")]
    Inactive,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Identity of a successfully authenticated member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedMember {
    pub name: String,
    pub role: MemberRole,
}

/// Authenticates `name` with `password`
///
/// # Errors
///
/// Returns the [`AuthFailure`] describing the first failed check
pub fn authenticate(
    name: &str,
    password: &str,
    directory: &MemberDirectory,
) -> Result<AuthenticatedMember, AuthFailure> {
    if directory.is_empty() {
        return Err(AuthFailure::NoUsers);
    }

    let member = directory.get(name).ok_or(AuthFailure::NotFound)?;

    if !member.role.is_dev() {
        match member.status {
            MemberStatus::Active => {}
            MemberStatus::Pending => return Err(AuthFailure::Pending),
            MemberStatus::Suspended => return Err(AuthFailure::Suspended),
            MemberStatus::Other(_) => return Err(AuthFailure::Inactive),
        }
    }

    let accepted = if directory.has_password_column() {
        verify_password(password, &member.password)
    } else {
        constant_time_compare(password, DEFAULT_PASSWORD)
    };

    if !accepted {
        return Err(AuthFailure::InvalidCredentials);
    }

    Ok(AuthenticatedMember {
        name: member.name.clone(),
        role: member.role.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::models::member::{Member, MEMBER_COLUMNS};
    use crate::store::Sheet;

    fn directory_with(role: MemberRole, password: &str, status: MemberStatus) -> MemberDirectory {
        let mut directory = MemberDirectory::new();
        directory.push(Member::new("Ada", role, password, status, "System"));
        directory
    }

    #[test]
    fn test_empty_directory() {
        assert_eq!(
            authenticate("Ada", "pw", &MemberDirectory::new()),
            Err(AuthFailure::NoUsers)
        );
    }

    #[test]
    fn test_unknown_user() {
        let directory = directory_with(MemberRole::Dev, "pw", MemberStatus::Active);
        assert_eq!(authenticate("Bo", "pw", &directory), Err(AuthFailure::NotFound));
    }

    #[test]
    fn test_hashed_password() {
        let directory = directory_with(MemberRole::CoreHead, &hash_password("pw"), MemberStatus::Active);

        let member = authenticate("Ada", "pw", &directory).unwrap();
        assert_eq!(member.name, "Ada");
        assert_eq!(member.role, MemberRole::CoreHead);

        assert_eq!(
            authenticate("Ada", "wrong", &directory),
            Err(AuthFailure::InvalidCredentials)
        );
        // The digest itself is not a valid password
        assert_eq!(
            authenticate("Ada", &hash_password("pw"), &directory),
            Err(AuthFailure::InvalidCredentials)
        );
    }

    #[test]
    fn test_plaintext_password() {
        let directory = directory_with(MemberRole::CoreHead, "legacy", MemberStatus::Active);

        assert!(authenticate("Ada", "legacy", &directory).is_ok());
        assert_eq!(
            authenticate("Ada", "Legacy", &directory),
            Err(AuthFailure::InvalidCredentials)
        );
    }

    #[test]
    fn test_no_password_column_accepts_only_default() {
        let grid = vec![
            vec!["Name".to_string(), "Role".to_string(), "Status".to_string()],
            vec!["Ada".to_string(), "Core Head".to_string(), "Active".to_string()],
        ];
        let directory = MemberDirectory::from_sheet(&Sheet::from_grid(grid, MEMBER_COLUMNS));

        assert!(authenticate("Ada", DEFAULT_PASSWORD, &directory).is_ok());
        assert_eq!(
            authenticate("Ada", "", &directory),
            Err(AuthFailure::InvalidCredentials)
        );
        assert_eq!(
            authenticate("Ada", "anything", &directory),
            Err(AuthFailure::InvalidCredentials)
        );
    }

    #[test]
    fn test_status_gate_for_non_devs() {
        let pending = directory_with(MemberRole::JuniorHead, "pw", MemberStatus::Pending);
        assert_eq!(authenticate("Ada", "pw", &pending), Err(AuthFailure::Pending));

        let suspended = directory_with(MemberRole::JuniorHead, "pw", MemberStatus::Suspended);
        assert_eq!(authenticate("Ada", "pw", &suspended), Err(AuthFailure::Suspended));

        let other = directory_with(
            MemberRole::JuniorHead,
            "pw",
            MemberStatus::Other("Archived".to_string()),
        );
        assert_eq!(authenticate("Ada", "pw", &other), Err(AuthFailure::Inactive));
    }

    #[test]
    fn test_status_gate_runs_before_password_check() {
        let pending = directory_with(MemberRole::JuniorHead, "pw", MemberStatus::Pending);
        assert_eq!(authenticate("Ada", "wrong", &pending), Err(AuthFailure::Pending));
    }

    #[test]
    fn test_devs_bypass_status_gate() {
        let pending_dev = directory_with(MemberRole::Dev, "pw", MemberStatus::Pending);
        assert!(authenticate("Ada", "pw", &pending_dev).is_ok());

        let suspended_dev = directory_with(MemberRole::Dev, "pw", MemberStatus::Suspended);
        assert!(authenticate("Ada", "pw", &suspended_dev).is_ok());
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(AuthFailure::NoUsers.to_string(), "No users found");
        assert_eq!(AuthFailure::Pending.to_string(), "Account pending approval");
        assert_eq!(AuthFailure::InvalidCredentials.to_string(), "Invalid credentials");
    }
}
