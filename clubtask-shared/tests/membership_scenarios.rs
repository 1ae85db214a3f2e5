//! End-to-end membership and task flows against the in-memory store

use std::sync::Arc;

use chrono::NaiveDate;
use clubtask_shared::auth::authentication::{authenticate, AuthFailure};
use clubtask_shared::auth::hierarchy::subordinates_of;
use clubtask_shared::models::member::{MemberRole, MemberStatus, SYSTEM_APPROVER};
use clubtask_shared::models::task::{NewTask, TaskPriority, TaskQuery, TaskStatus};
use clubtask_shared::services::membership::MembershipService;
use clubtask_shared::services::tasks::TaskService;
use clubtask_shared::store::cache::SnapshotCache;
use clubtask_shared::store::members::{MemberSheet, MEMBERS_TABLE};
use clubtask_shared::store::memory::MemorySheetStore;
use clubtask_shared::store::tasks::TaskSheet;

struct Harness {
    store: Arc<MemorySheetStore>,
    members: MembershipService,
    tasks: TaskService,
}

fn harness() -> Harness {
    let store = Arc::new(MemorySheetStore::new());
    let cache = Arc::new(SnapshotCache::default());

    Harness {
        members: MembershipService::new(MemberSheet::new(store.clone(), cache.clone())),
        tasks: TaskService::new(TaskSheet::new(store.clone(), cache)),
        store,
    }
}

#[tokio::test]
async fn test_dev_registers_core_head_and_approves() {
    let h = harness();

    let mut directory = h.members.load().await.unwrap();
    h.members
        .register(&mut directory, "A", "dev-pass", MemberRole::Dev)
        .await
        .unwrap();

    let mut directory = h.members.load().await.unwrap();
    let outcome = h
        .members
        .register(&mut directory, "B", "head-pass", MemberRole::CoreHead)
        .await
        .unwrap();
    assert_eq!(outcome.status, MemberStatus::Pending);

    // B cannot log in before approval
    let directory = h.members.load().await.unwrap();
    assert_eq!(
        authenticate("B", "head-pass", &directory),
        Err(AuthFailure::Pending)
    );

    let mut directory = h.members.load().await.unwrap();
    h.members.approve(&mut directory, "B", "A").await.unwrap();

    let directory = h.members.load().await.unwrap();
    let a = directory.get("A").unwrap();
    assert_eq!(a.status, MemberStatus::Active);
    assert_eq!(a.approved_by, SYSTEM_APPROVER);

    let b = directory.get("B").unwrap();
    assert_eq!(b.status, MemberStatus::Active);
    assert_eq!(b.approved_by, "A");

    let member = authenticate("B", "head-pass", &directory).unwrap();
    assert_eq!(member.role, MemberRole::CoreHead);

    assert_eq!(subordinates_of("A", &directory), vec!["A", "B"]);
    assert_eq!(subordinates_of("B", &directory), vec!["B"]);
}

#[tokio::test]
async fn test_core_head_creates_task_on_empty_board() {
    let h = harness();

    let mut board = h.tasks.load().await.unwrap();
    assert!(board.is_empty());

    let task = h
        .tasks
        .create(
            &mut board,
            NewTask {
                name: "Book the hall".to_string(),
                assigned_to: "B".to_string(),
                deadline: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
                priority: TaskPriority::Medium,
                description: "Call facilities".to_string(),
            },
            MemberRole::CoreHead,
        )
        .await
        .unwrap();

    assert_eq!(task.id.to_string().len(), 6);
    assert_eq!(task.status, TaskStatus::Pending);

    let board = h.tasks.load().await.unwrap();
    let mine = board.tasks_for("B", &TaskQuery::default());
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, task.id);

    let summary = board.summary_for("B");
    assert_eq!(summary.total, 1);
    assert_eq!(summary.pending, 1);
}

#[tokio::test]
async fn test_legacy_sheet_without_password_column() {
    let h = harness();
    let grid = vec![
        vec!["Name", "Role", "Status", "ApprovedBy", "CreatedAt"],
        vec!["A", "Dev", "Active", "System", "2024-01-01 00:00:00"],
        vec!["B", "Core Head", "Active", "A", "2024-01-02 00:00:00"],
    ];
    h.store
        .seed(
            MEMBERS_TABLE,
            grid.into_iter()
                .map(|row| row.into_iter().map(String::from).collect())
                .collect(),
        )
        .await;

    let directory = h.members.load().await.unwrap();
    assert!(!directory.has_password_column());
    assert!(authenticate("B", "password123", &directory).is_ok());
    assert_eq!(
        authenticate("B", "anything-else", &directory),
        Err(AuthFailure::InvalidCredentials)
    );

    // The next write adds the column
    let mut directory = directory;
    h.members.suspend(&mut directory, "B").await.unwrap();
    let header = &h.store.grid(MEMBERS_TABLE).await.unwrap()[0];
    assert!(header.iter().any(|column| column == "Password"));
}
