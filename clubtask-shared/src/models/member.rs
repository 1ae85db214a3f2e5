/// Member model and directory snapshot
///
/// A member is one row of the `Members` table. The [`MemberDirectory`] is an
/// in-memory snapshot of the whole table, loaded once per request and written
/// back as a whole.
///
/// # Schema
///
/// | Column | Meaning |
/// |---|---|
/// | `Name` | Unique key |
/// | `Role` | `Dev`, `Core Head`, `Domain Head`, `Associate Head`, `Junior Head` |
/// | `Password` | SHA-256 hex digest, or legacy plaintext |
/// | `Status` | `Active`, `Pending`, `Suspended` |
/// | `ApprovedBy` | Approver name, `System`, or empty |
/// | `CreatedAt` | `%Y-%m-%d %H:%M:%S` local time |
/// | `Domain` | Optional, used by the role hierarchy |
/// | `ReportsTo` | Optional, used by the role hierarchy |
///
/// Unrecognised columns are carried through untouched.
///
/// # Loading
///
/// Older sheets may lack columns. When a sheet has rows but no `Status`
/// column, every member is treated as `Active`; a missing `ApprovedBy` reads as
/// `System`; a missing `CreatedAt` reads as the load time. Whether the sheet
/// physically had a `Password`, `Domain`, or `ReportsTo` column is remembered,
/// since authentication and the hierarchy behave differently without them.
///
/// # Example
///
/// ```
/// use clubtask_shared::models::member::{Member, MemberDirectory, MemberRole, MemberStatus};
///
/// let mut directory = MemberDirectory::new();
/// directory.push(Member::new("Ada", MemberRole::Dev, "hash", MemberStatus::Active, "System"));
///
/// assert_eq!(directory.bootstrap_dev().map(|m| m.name.as_str()), Some("Ada"));
/// assert_eq!(directory.active_names(), vec!["Ada".to_string()]);
/// ```

use std::fmt;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::store::{Row, Sheet};

/// Canonical `Members` columns, in write order
pub const MEMBER_COLUMNS: &[&str] = &["Name", "Role", "Password", "Status", "ApprovedBy", "CreatedAt"];

/// Optional column naming a Domain Head's domain
pub const DOMAIN_COLUMN: &str = "Domain";

/// Optional column naming an Associate Head a Junior Head reports to
pub const REPORTS_TO_COLUMN: &str = "ReportsTo";

/// `ApprovedBy` value for accounts that needed no approval
pub const SYSTEM_APPROVER: &str = "System";

/// Format of the `CreatedAt` column
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Club role
///
/// The five known roles form a fixed order: Dev > Core Head > Domain Head >
/// Associate Head > Junior Head. Any other cell text is kept verbatim as
/// [`MemberRole::Other`]; such members have no subordinates and are never Devs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MemberRole {
    /// Administrator: manages members, sees everyone
    Dev,

    /// Assigns to Domain Heads and other Core Heads
    CoreHead,

    /// Assigns to Associate Heads in the same domain
    DomainHead,

    /// Assigns to Junior Heads reporting to them
    AssociateHead,

    /// Updates their own tasks only
    JuniorHead,

    /// Unrecognised role text
    Other(String),
}

impl MemberRole {
    /// Known roles, highest first
    pub const HIERARCHY: [MemberRole; 5] = [
        MemberRole::Dev,
        MemberRole::CoreHead,
        MemberRole::DomainHead,
        MemberRole::AssociateHead,
        MemberRole::JuniorHead,
    ];

    /// Parses cell text; unknown text becomes [`MemberRole::Other`]
    pub fn parse(value: &str) -> Self {
        match value {
            "Dev" => MemberRole::Dev,
            "Core Head" => MemberRole::CoreHead,
            "Domain Head" => MemberRole::DomainHead,
            "Associate Head" => MemberRole::AssociateHead,
            "Junior Head" => MemberRole::JuniorHead,
            other => MemberRole::Other(other.to_string()),
        }
    }

    /// Cell text for this role
    pub fn as_str(&self) -> &str {
        match self {
            MemberRole::Dev => "Dev",
            MemberRole::CoreHead => "Core Head",
            MemberRole::DomainHead => "Domain Head",
            MemberRole::AssociateHead => "Associate Head",
            MemberRole::JuniorHead => "Junior Head",
            MemberRole::Other(value) => value,
        }
    }

    /// Returns true for the Dev role
    pub fn is_dev(&self) -> bool {
        matches!(self, MemberRole::Dev)
    }

    /// Returns true for one of the five known roles
    pub fn is_known(&self) -> bool {
        !matches!(self, MemberRole::Other(_))
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MemberRole {
    fn from(value: String) -> Self {
        MemberRole::parse(&value)
    }
}

impl From<MemberRole> for String {
    fn from(role: MemberRole) -> Self {
        role.as_str().to_string()
    }
}

/// Account status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MemberStatus {
    /// May log in
    Active,

    /// Awaiting approval by a Dev
    Pending,

    /// Temporarily blocked
    Suspended,

    /// Unrecognised status text (treated as inactive)
    Other(String),
}

impl MemberStatus {
    /// Parses cell text; unknown text becomes [`MemberStatus::Other`]
    pub fn parse(value: &str) -> Self {
        match value {
            "Active" => MemberStatus::Active,
            "Pending" => MemberStatus::Pending,
            "Suspended" => MemberStatus::Suspended,
            other => MemberStatus::Other(other.to_string()),
        }
    }

    /// Cell text for this status
    pub fn as_str(&self) -> &str {
        match self {
            MemberStatus::Active => "Active",
            MemberStatus::Pending => "Pending",
            MemberStatus::Suspended => "Suspended",
            MemberStatus::Other(value) => value,
        }
    }

    /// Returns true for `Active`
    pub fn is_active(&self) -> bool {
        matches!(self, MemberStatus::Active)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MemberStatus {
    fn from(value: String) -> Self {
        MemberStatus::parse(&value)
    }
}

impl From<MemberStatus> for String {
    fn from(status: MemberStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One member row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Unique name
    pub name: String,

    /// Club role
    pub role: MemberRole,

    /// Stored credential (hash or legacy plaintext), never serialized
    #[serde(skip_serializing)]
    pub password: String,

    /// Account status
    pub status: MemberStatus,

    /// Who approved the account
    pub approved_by: String,

    /// Creation timestamp text
    pub created_at: String,

    /// Domain (empty when untracked)
    pub domain: String,

    /// Associate Head this member reports to (empty when untracked)
    pub reports_to: String,

    /// Cells of unrecognised columns, carried through on write
    #[serde(skip)]
    pub extra: Vec<(String, String)>,
}

impl Member {
    /// Creates a member stamped with the current local time
    pub fn new(
        name: impl Into<String>,
        role: MemberRole,
        password: impl Into<String>,
        status: MemberStatus,
        approved_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            password: password.into(),
            status,
            approved_by: approved_by.into(),
            created_at: now_timestamp(),
            domain: String::new(),
            reports_to: String::new(),
            extra: Vec::new(),
        }
    }

    fn from_row(row: &Row, loaded_at: &str) -> Self {
        let cell = |column: &str| row.get(column).map(str::to_string);

        let extra = row
            .iter()
            .filter(|(column, _)| !is_known_column(column))
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        Self {
            name: cell("Name").unwrap_or_default(),
            role: MemberRole::parse(row.get("Role").unwrap_or_default()),
            password: cell("Password").unwrap_or_default(),
            status: MemberStatus::parse(row.get("Status").unwrap_or("Active")),
            approved_by: cell("ApprovedBy").unwrap_or_else(|| SYSTEM_APPROVER.to_string()),
            created_at: cell("CreatedAt").unwrap_or_else(|| loaded_at.to_string()),
            domain: cell(DOMAIN_COLUMN).unwrap_or_default(),
            reports_to: cell(REPORTS_TO_COLUMN).unwrap_or_default(),
            extra,
        }
    }

    fn cell(&self, column: &str) -> &str {
        match column {
            "Name" => &self.name,
            "Role" => self.role.as_str(),
            "Password" => &self.password,
            "Status" => self.status.as_str(),
            "ApprovedBy" => &self.approved_by,
            "CreatedAt" => &self.created_at,
            DOMAIN_COLUMN => &self.domain,
            REPORTS_TO_COLUMN => &self.reports_to,
            other => self
                .extra
                .iter()
                .find(|(name, _)| name == other)
                .map(|(_, value)| value.as_str())
                .unwrap_or_default(),
        }
    }
}

/// Typed member filter; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemberQuery {
    /// Only members with this status
    pub status: Option<MemberStatus>,

    /// Only members with this role
    pub role: Option<MemberRole>,
}

impl MemberQuery {
    /// Returns true if `member` passes every set filter
    pub fn matches(&self, member: &Member) -> bool {
        self.status.as_ref().map_or(true, |s| &member.status == s)
            && self.role.as_ref().map_or(true, |r| &member.role == r)
    }
}

/// Member counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub suspended: usize,
}

/// Snapshot of the `Members` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDirectory {
    members: Vec<Member>,
    columns: Vec<String>,
    has_password_column: bool,
    has_domain_column: bool,
    has_reports_to_column: bool,
}

impl MemberDirectory {
    /// Creates an empty directory with the canonical columns
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            columns: MEMBER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            has_password_column: true,
            has_domain_column: false,
            has_reports_to_column: false,
        }
    }

    /// Builds a directory from a loaded sheet, backfilling with the current time
    pub fn from_sheet(sheet: &Sheet) -> Self {
        Self::from_sheet_at(sheet, &now_timestamp())
    }

    /// Builds a directory from a loaded sheet
    ///
    /// `loaded_at` fills `CreatedAt` for sheets without that column.
    pub fn from_sheet_at(sheet: &Sheet, loaded_at: &str) -> Self {
        let mut columns: Vec<String> = sheet.columns().to_vec();
        for column in MEMBER_COLUMNS {
            if !sheet.has_column(column) {
                columns.push(column.to_string());
            }
        }

        Self {
            members: sheet
                .rows()
                .iter()
                .map(|row| Member::from_row(row, loaded_at))
                .collect(),
            columns,
            has_password_column: sheet.has_column("Password"),
            has_domain_column: sheet.has_column(DOMAIN_COLUMN),
            has_reports_to_column: sheet.has_column(REPORTS_TO_COLUMN),
        }
    }

    /// Converts the directory back to a sheet for a full overwrite
    ///
    /// Canonical columns are always written; `Domain`, `ReportsTo` and
    /// unrecognised columns are written when the loaded sheet had them.
    pub fn to_sheet(&self) -> Sheet {
        let mut sheet = Sheet::new(self.columns.clone());

        for member in &self.members {
            let row = self
                .columns
                .iter()
                .map(|column| (column.clone(), member.cell(column).to_string()))
                .collect();
            sheet.push_row(row);
        }

        sheet
    }

    /// Returns true if the directory has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Members in table order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns true if the loaded sheet had a `Password` column
    pub fn has_password_column(&self) -> bool {
        self.has_password_column
    }

    /// Returns true if the loaded sheet had a `Domain` column
    pub fn tracks_domain(&self) -> bool {
        self.has_domain_column
    }

    /// Returns true if the loaded sheet had a `ReportsTo` column
    pub fn tracks_reports_to(&self) -> bool {
        self.has_reports_to_column
    }

    /// Looks up a member by exact name
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Looks up a member by exact name for mutation
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.name == name)
    }

    /// Returns true if a member with `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Appends a member (no uniqueness check)
    ///
    /// Once a member is written through [`MemberDirectory::to_sheet`] the
    /// table has a `Password` column.
    pub fn push(&mut self, member: Member) {
        if !self.columns.iter().any(|c| c == "Password") {
            self.columns.push("Password".to_string());
        }
        self.has_password_column = true;
        self.members.push(member);
    }

    /// Removes a member by name, returning it
    pub fn remove(&mut self, name: &str) -> Option<Member> {
        let index = self.members.iter().position(|m| m.name == name)?;
        Some(self.members.remove(index))
    }

    /// Iterates over members for bulk mutation
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Member> {
        self.members.iter_mut()
    }

    /// The parent Dev: the first Dev approved by `System`
    pub fn bootstrap_dev(&self) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.role.is_dev() && m.approved_by == SYSTEM_APPROVER)
    }

    /// Returns true if any member holds the Dev role
    pub fn has_dev(&self) -> bool {
        self.members.iter().any(|m| m.role.is_dev())
    }

    /// Members matching `query`, in table order
    pub fn query(&self, query: &MemberQuery) -> Vec<&Member> {
        self.members.iter().filter(|m| query.matches(m)).collect()
    }

    /// Members awaiting approval
    pub fn pending(&self) -> Vec<&Member> {
        self.query(&MemberQuery {
            status: Some(MemberStatus::Pending),
            role: None,
        })
    }

    /// Counts members by status
    pub fn status_counts(&self) -> MemberStats {
        self.members.iter().fold(
            MemberStats {
                total: self.members.len(),
                ..Default::default()
            },
            |mut stats, member| {
                match member.status {
                    MemberStatus::Active => stats.active += 1,
                    MemberStatus::Pending => stats.pending += 1,
                    MemberStatus::Suspended => stats.suspended += 1,
                    MemberStatus::Other(_) => {}
                }
                stats
            },
        )
    }

    /// Names of Active members, in table order
    pub fn active_names(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|m| m.status.is_active())
            .map(|m| m.name.clone())
            .collect()
    }

    /// Names of Dev members, in table order
    pub fn dev_names(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|m| m.role.is_dev())
            .map(|m| m.name.clone())
            .collect()
    }

    /// Names offered at login: Active members plus every Dev, sorted, no duplicates
    pub fn login_candidates(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .active_names()
            .into_iter()
            .chain(self.dev_names())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Default for MemberDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn is_known_column(column: &str) -> bool {
    MEMBER_COLUMNS.contains(&column) || column == DOMAIN_COLUMN || column == REPORTS_TO_COLUMN
}

/// Current local time in [`DATETIME_FORMAT`]
pub fn now_timestamp() -> String {
    Local::now().format(DATETIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Sheet {
        let grid = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Sheet::from_grid(grid, MEMBER_COLUMNS)
    }

    #[test]
    fn test_role_parse_and_display() {
        for role in MemberRole::HIERARCHY {
            assert_eq!(MemberRole::parse(role.as_str()), role);
        }

        let other = MemberRole::parse("Treasurer");
        assert_eq!(other, MemberRole::Other("Treasurer".to_string()));
        assert_eq!(other.to_string(), "Treasurer");
        assert!(!other.is_dev());
        assert!(!other.is_known());
    }

    #[test]
    fn test_role_serde_uses_cell_text() {
        let json = serde_json::to_string(&MemberRole::CoreHead).unwrap();
        assert_eq!(json, "\"Core Head\"");

        let role: MemberRole = serde_json::from_str("\"Junior Head\"").unwrap();
        assert_eq!(role, MemberRole::JuniorHead);
    }

    #[test]
    fn test_from_sheet_backfills_missing_columns() {
        let directory = MemberDirectory::from_sheet_at(
            &sheet(&[&["Name", "Role", "Password"], &["Ada", "Dev", "secret"]]),
            "2024-01-01 09:00:00",
        );

        let ada = directory.get("Ada").unwrap();
        assert_eq!(ada.status, MemberStatus::Active);
        assert_eq!(ada.approved_by, SYSTEM_APPROVER);
        assert_eq!(ada.created_at, "2024-01-01 09:00:00");
        assert!(directory.has_password_column());
        assert!(!directory.tracks_domain());
    }

    #[test]
    fn test_from_sheet_records_missing_password_column() {
        let directory = MemberDirectory::from_sheet(&sheet(&[
            &["Name", "Role", "Status"],
            &["Ada", "Dev", "Active"],
        ]));

        assert!(!directory.has_password_column());
        assert_eq!(directory.get("Ada").unwrap().password, "");
    }

    #[test]
    fn test_missing_table_has_password_column() {
        let directory = MemberDirectory::from_sheet(&Sheet::with_columns(MEMBER_COLUMNS));
        assert!(directory.is_empty());
        assert!(directory.has_password_column());
    }

    #[test]
    fn test_to_sheet_preserves_extra_columns() {
        let directory = MemberDirectory::from_sheet(&sheet(&[
            &["Name", "Role", "Password", "Status", "ApprovedBy", "CreatedAt", "Domain", "Phone"],
            &["Ada", "Domain Head", "x", "Active", "System", "2024-01-01 09:00:00", "Tech", "555"],
        ]));

        let grid = directory.to_sheet().to_grid();
        assert_eq!(grid[0][6], "Domain");
        assert_eq!(grid[0][7], "Phone");
        assert_eq!(grid[1][6], "Tech");
        assert_eq!(grid[1][7], "555");
    }

    #[test]
    fn test_to_sheet_writes_canonical_columns() {
        let directory = MemberDirectory::from_sheet_at(
            &sheet(&[&["Name", "Role"], &["Ada", "Dev"]]),
            "2024-01-01 09:00:00",
        );

        let rewritten = directory.to_sheet();
        for column in MEMBER_COLUMNS {
            assert!(rewritten.has_column(column));
        }
        assert_eq!(rewritten.rows()[0].get("Status"), Some("Active"));
    }

    #[test]
    fn test_unknown_status_round_trips() {
        let directory = MemberDirectory::from_sheet(&sheet(&[
            &["Name", "Role", "Password", "Status"],
            &["Ada", "Dev", "x", "Archived"],
        ]));

        let ada = directory.get("Ada").unwrap();
        assert_eq!(ada.status, MemberStatus::Other("Archived".to_string()));
        assert_eq!(directory.to_sheet().rows()[0].get("Status"), Some("Archived"));
    }

    #[test]
    fn test_bootstrap_dev_is_first_system_dev() {
        let mut directory = MemberDirectory::new();
        directory.push(Member::new("Bob", MemberRole::Dev, "x", MemberStatus::Active, "Ada"));
        directory.push(Member::new("Ada", MemberRole::Dev, "x", MemberStatus::Active, SYSTEM_APPROVER));
        directory.push(Member::new("Cy", MemberRole::Dev, "x", MemberStatus::Active, SYSTEM_APPROVER));

        assert_eq!(directory.bootstrap_dev().unwrap().name, "Ada");
    }

    #[test]
    fn test_query_and_counts() {
        let mut directory = MemberDirectory::new();
        directory.push(Member::new("Ada", MemberRole::Dev, "x", MemberStatus::Active, "System"));
        directory.push(Member::new("Bo", MemberRole::CoreHead, "x", MemberStatus::Pending, ""));
        directory.push(Member::new("Cy", MemberRole::CoreHead, "x", MemberStatus::Suspended, "Ada"));

        let core = directory.query(&MemberQuery {
            status: None,
            role: Some(MemberRole::CoreHead),
        });
        assert_eq!(core.len(), 2);

        assert_eq!(directory.pending().len(), 1);
        assert_eq!(
            directory.status_counts(),
            MemberStats {
                total: 3,
                active: 1,
                pending: 1,
                suspended: 1
            }
        );
    }

    #[test]
    fn test_login_candidates_include_inactive_devs() {
        let mut directory = MemberDirectory::new();
        directory.push(Member::new("Zed", MemberRole::JuniorHead, "x", MemberStatus::Active, "Ada"));
        directory.push(Member::new("Ada", MemberRole::Dev, "x", MemberStatus::Active, "System"));
        directory.push(Member::new("Bo", MemberRole::Dev, "x", MemberStatus::Pending, ""));
        directory.push(Member::new("Cy", MemberRole::CoreHead, "x", MemberStatus::Pending, ""));

        assert_eq!(directory.login_candidates(), vec!["Ada", "Bo", "Zed"]);
    }

    #[test]
    fn test_remove_member() {
        let mut directory = MemberDirectory::new();
        directory.push(Member::new("Ada", MemberRole::Dev, "x", MemberStatus::Active, "System"));

        assert!(directory.remove("Ada").is_some());
        assert!(directory.remove("Ada").is_none());
        assert!(directory.is_empty());
    }
}
