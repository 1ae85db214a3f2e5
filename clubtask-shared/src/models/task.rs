/// Task model and board snapshot
///
/// A task is one row of the `Tasks` table. The [`TaskBoard`] is an in-memory
/// snapshot of the whole table.
///
/// # Schema
///
/// | Column | Meaning |
/// |---|---|
/// | `TaskID` | 6-digit id in `100000..=999999` |
/// | `TaskName` | Short title |
/// | `AssignedTo` | Assignee name (not checked against the directory) |
/// | `Role` | Assigner's role at assignment time |
/// | `Status` | `Pending`, `In Progress`, `Completed` |
/// | `Deadline` | `%Y-%m-%d` |
/// | `Priority` | `Low`, `Medium`, `High` |
/// | `Description` | Free text |
///
/// Rows that do not parse (bad id, status, priority, or date) stay on the
/// board as raw rows. They are written back unchanged, never show up in
/// queries, and their ids still count as taken.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::member::MemberRole;
use crate::store::{Row, Sheet};

/// Canonical `Tasks` columns, in write order
pub const TASK_COLUMNS: &[&str] = &[
    "TaskID",
    "TaskName",
    "AssignedTo",
    "Role",
    "Status",
    "Deadline",
    "Priority",
    "Description",
];

/// Smallest task id
pub const TASK_ID_MIN: u32 = 100_000;

/// Largest task id
pub const TASK_ID_MAX: u32 = 999_999;

/// Format of the `Deadline` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Six-digit task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

/// Task progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Cell text for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Parses cell text
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Pending" => Some(TaskStatus::Pending),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Cell text for this priority
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    /// Parses cell text
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Low" => Some(TaskPriority::Low),
            "Medium" => Some(TaskPriority::Medium),
            "High" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub assigned_to: String,

    /// Role of the assigner when the task was created
    #[serde(rename = "assigner_role")]
    pub role: MemberRole,

    pub status: TaskStatus,
    pub deadline: NaiveDate,
    pub priority: TaskPriority,
    pub description: String,

    /// Cells of unrecognised columns, carried through on write
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

impl Task {
    fn from_row(row: &Row) -> Option<Self> {
        let id: TaskId = row.get("TaskID")?.parse().ok()?;
        let status = TaskStatus::parse(row.get("Status")?)?;
        let priority = TaskPriority::parse(row.get("Priority")?)?;
        let deadline = NaiveDate::parse_from_str(row.get("Deadline")?.trim(), DATE_FORMAT).ok()?;

        let extra = row
            .iter()
            .filter(|(column, _)| !TASK_COLUMNS.contains(column))
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        Some(Self {
            id,
            name: row.get("TaskName").unwrap_or_default().to_string(),
            assigned_to: row.get("AssignedTo").unwrap_or_default().to_string(),
            role: MemberRole::parse(row.get("Role").unwrap_or_default()),
            status,
            deadline,
            priority,
            description: row.get("Description").unwrap_or_default().to_string(),
            extra,
        })
    }

    fn cell(&self, column: &str) -> String {
        match column {
            "TaskID" => self.id.to_string(),
            "TaskName" => self.name.clone(),
            "AssignedTo" => self.assigned_to.clone(),
            "Role" => self.role.to_string(),
            "Status" => self.status.to_string(),
            "Deadline" => self.deadline.format(DATE_FORMAT).to_string(),
            "Priority" => self.priority.to_string(),
            "Description" => self.description.clone(),
            other => self
                .extra
                .iter()
                .find(|(name, _)| name == other)
                .map(|(_, value)| value.clone())
                .unwrap_or_default(),
        }
    }
}

/// Input for a new task
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub assigned_to: String,
    pub deadline: NaiveDate,
    pub priority: TaskPriority,
    pub description: String,
}

/// Typed task filter; `None` fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskQuery {
    /// Returns true if `task` passes every set filter
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
    }
}

/// Per-assignee task counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BoardEntry {
    Parsed(Task),
    Unparsed(Row),
}

/// Snapshot of the `Tasks` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBoard {
    entries: Vec<BoardEntry>,
    columns: Vec<String>,
}

impl TaskBoard {
    /// Creates an empty board with the canonical columns
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            columns: TASK_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Builds a board from a loaded sheet
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut columns: Vec<String> = sheet.columns().to_vec();
        for column in TASK_COLUMNS {
            if !sheet.has_column(column) {
                columns.push(column.to_string());
            }
        }

        let entries = sheet
            .rows()
            .iter()
            .map(|row| match Task::from_row(row) {
                Some(task) => BoardEntry::Parsed(task),
                None => BoardEntry::Unparsed(row.clone()),
            })
            .collect();

        Self { entries, columns }
    }

    /// Converts the board back to a sheet for a full overwrite
    pub fn to_sheet(&self) -> Sheet {
        let mut sheet = Sheet::new(self.columns.clone());

        for entry in &self.entries {
            let row = match entry {
                BoardEntry::Parsed(task) => self
                    .columns
                    .iter()
                    .map(|column| (column.clone(), task.cell(column)))
                    .collect(),
                BoardEntry::Unparsed(row) => row.clone(),
            };
            sheet.push_row(row);
        }

        sheet
    }

    /// Parsed tasks in table order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.entries.iter().filter_map(|entry| match entry {
            BoardEntry::Parsed(task) => Some(task),
            BoardEntry::Unparsed(_) => None,
        })
    }

    /// Number of parsed tasks
    pub fn len(&self) -> usize {
        self.tasks().count()
    }

    /// Returns true if the board has no rows at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rows that could not be parsed
    pub fn unparsed_count(&self) -> usize {
        self.entries.len() - self.len()
    }

    /// Every numeric `TaskID` on the board, parsed or not
    pub fn existing_ids(&self) -> HashSet<u32> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                BoardEntry::Parsed(task) => Some(task.id.0),
                BoardEntry::Unparsed(row) => row
                    .get("TaskID")
                    .and_then(|id| id.parse::<TaskId>().ok())
                    .map(|id| id.0),
            })
            .collect()
    }

    /// Looks up a task by id
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks().find(|task| task.id == id)
    }

    /// Looks up a task by id for mutation
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.entries.iter_mut().find_map(|entry| match entry {
            BoardEntry::Parsed(task) if task.id == id => Some(task),
            _ => None,
        })
    }

    /// Appends a task
    pub fn push(&mut self, task: Task) {
        self.entries.push(BoardEntry::Parsed(task));
    }

    /// Removes every row and resets the header to the canonical columns
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Tasks assigned to `assignee` that match `query`
    pub fn tasks_for(&self, assignee: &str, query: &TaskQuery) -> Vec<&Task> {
        self.tasks()
            .filter(|task| task.assigned_to == assignee && query.matches(task))
            .collect()
    }

    /// Tasks created by holders of `role`, grouped by assignee
    ///
    /// Groups appear in order of each assignee's first task.
    pub fn assigned_by_role(&self, role: &MemberRole) -> Vec<(String, Vec<&Task>)> {
        let mut groups: Vec<(String, Vec<&Task>)> = Vec::new();

        for task in self.tasks().filter(|task| &task.role == role) {
            match groups.iter_mut().find(|(name, _)| *name == task.assigned_to) {
                Some((_, tasks)) => tasks.push(task),
                None => groups.push((task.assigned_to.clone(), vec![task])),
            }
        }

        groups
    }

    /// Task counts for `assignee`
    pub fn summary_for(&self, assignee: &str) -> TaskSummary {
        self.tasks()
            .filter(|task| task.assigned_to == assignee)
            .fold(TaskSummary::default(), |mut summary, task| {
                summary.total += 1;
                match task.status {
                    TaskStatus::Completed => summary.completed += 1,
                    TaskStatus::InProgress => summary.in_progress += 1,
                    TaskStatus::Pending => summary.pending += 1,
                }
                summary
            })
    }
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[&str]]) -> TaskBoard {
        let mut grid: Vec<Vec<String>> = vec![TASK_COLUMNS.iter().map(|c| c.to_string()).collect()];
        grid.extend(rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()));
        TaskBoard::from_sheet(&Sheet::from_grid(grid, TASK_COLUMNS))
    }

    #[test]
    fn test_parses_valid_rows() {
        let board = board(&[&[
            "123456", "Posters", "Bo", "Core Head", "In Progress", "2024-05-01", "High", "Print them",
        ]]);

        let task = board.get(TaskId(123456)).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.role, MemberRole::CoreHead);
        assert_eq!(task.deadline, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_unparsed_rows_are_preserved() {
        let board = board(&[
            &["abc", "Broken", "Bo", "Core Head", "Pending", "2024-05-01", "High", "x"],
            &["222222", "Bad status", "Bo", "Core Head", "Blocked", "2024-05-01", "High", "x"],
            &["333333", "Fine", "Bo", "Core Head", "Pending", "2024-05-01", "Low", "x"],
        ]);

        assert_eq!(board.len(), 1);
        assert_eq!(board.unparsed_count(), 2);
        assert!(board.existing_ids().contains(&222222));
        assert!(board.existing_ids().contains(&333333));

        let sheet = board.to_sheet();
        assert_eq!(sheet.rows()[0].get("TaskID"), Some("abc"));
        assert_eq!(sheet.rows()[1].get("Status"), Some("Blocked"));
    }

    #[test]
    fn test_tasks_for_applies_query() {
        let board = board(&[
            &["111111", "A", "Bo", "Core Head", "Pending", "2024-05-01", "High", "x"],
            &["222222", "B", "Bo", "Core Head", "Completed", "2024-05-01", "Low", "x"],
            &["333333", "C", "Cy", "Core Head", "Pending", "2024-05-01", "High", "x"],
        ]);

        assert_eq!(board.tasks_for("Bo", &TaskQuery::default()).len(), 2);

        let high = TaskQuery {
            status: None,
            priority: Some(TaskPriority::High),
        };
        let tasks = board.tasks_for("Bo", &high);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "A");
    }

    #[test]
    fn test_assigned_by_role_groups_by_assignee() {
        let board = board(&[
            &["111111", "A", "Bo", "Core Head", "Pending", "2024-05-01", "High", "x"],
            &["222222", "B", "Cy", "Core Head", "Pending", "2024-05-01", "High", "x"],
            &["333333", "C", "Bo", "Core Head", "Completed", "2024-05-01", "Low", "x"],
            &["444444", "D", "Bo", "Domain Head", "Pending", "2024-05-01", "Low", "x"],
        ]);

        let groups = board.assigned_by_role(&MemberRole::CoreHead);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Bo");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "Cy");
    }

    #[test]
    fn test_summary_for_counts_statuses() {
        let board = board(&[
            &["111111", "A", "Bo", "Core Head", "Pending", "2024-05-01", "High", "x"],
            &["222222", "B", "Bo", "Core Head", "In Progress", "2024-05-01", "High", "x"],
            &["333333", "C", "Bo", "Core Head", "Completed", "2024-05-01", "Low", "x"],
        ]);

        assert_eq!(
            board.summary_for("Bo"),
            TaskSummary {
                total: 3,
                completed: 1,
                in_progress: 1,
                pending: 1
            }
        );
        assert_eq!(board.summary_for("Nobody"), TaskSummary::default());
    }

    #[test]
    fn test_clear_resets_board() {
        let mut board = board(&[&["111111", "A", "Bo", "Core Head", "Pending", "2024-05-01", "High", "x"]]);
        board.clear();

        assert!(board.is_empty());
        let sheet = board.to_sheet();
        assert!(sheet.is_empty());
        assert_eq!(sheet.columns(), TASK_COLUMNS);
    }

    #[test]
    fn test_task_status_serde() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"In Progress\"");
        let status: TaskStatus = serde_json::from_str("\"Completed\"").unwrap();
        assert_eq!(status, TaskStatus::Completed);
    }
}
