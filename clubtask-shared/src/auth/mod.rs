/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: SHA-256 hex password codec with legacy plaintext support
/// - [`authentication`]: Name/password checks against the member directory
/// - [`hierarchy`]: Who may assign tasks to whom
/// - [`jwt`]: Session token generation and validation
/// - [`middleware`]: Bearer token middleware for Axum
/// - [`authorization`]: Per-handler permission checks
///
/// # Example
///
/// ```
/// use clubtask_shared::auth::authentication::authenticate;
/// use clubtask_shared::auth::jwt::{create_token, Claims, TokenType};
/// use clubtask_shared::auth::password::hash_password;
/// use clubtask_shared::models::member::{Member, MemberDirectory, MemberRole, MemberStatus};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut directory = MemberDirectory::new();
/// directory.push(Member::new("Ada", MemberRole::Dev, hash_password("pw"), MemberStatus::Active, "System"));
///
/// let member = authenticate("Ada", "pw", &directory)?;
/// let token = create_token(&Claims::new(member.name, member.role, TokenType::Access), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authentication;
pub mod authorization;
pub mod hierarchy;
pub mod jwt;
pub mod middleware;
pub mod password;
