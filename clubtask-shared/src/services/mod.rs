/// Business operations over the member directory and the task board
///
/// - [`membership`]: Registration, approval, suspension and role changes
/// - [`tasks`]: Task creation, status updates, and id generation
/// - [`error`]: Shared [`error::ServiceError`] type

pub mod error;
pub mod membership;
pub mod tasks;
