/// Domain models for ClubTask
///
/// Both record types live in the sheet store as whole tables. The models here
/// are in-memory snapshots of those tables, valid for the duration of one
/// request: load, query or mutate, then write the whole snapshot back.
///
/// # Models
///
/// - `member`: Member records, roles, statuses, and the [`member::MemberDirectory`] snapshot
/// - `task`: Task records and the [`task::TaskBoard`] snapshot
///
/// # Example
///
/// ```
/// use clubtask_shared::models::member::{MemberDirectory, MemberRole};
/// use clubtask_shared::models::task::TaskBoard;
///
/// let directory = MemberDirectory::new();
/// assert!(directory.is_empty());
/// assert!(directory.bootstrap_dev().is_none());
///
/// let board = TaskBoard::new();
/// assert!(board.tasks_for("Ada", &Default::default()).is_empty());
/// assert!(MemberRole::Dev.is_dev());
/// ```

pub mod member;
pub mod task;
