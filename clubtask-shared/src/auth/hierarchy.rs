/// Role hierarchy resolver
///
/// Decides whom a member may assign tasks to. Only Active members are ever
/// returned.
///
/// # Rules
///
/// | Requester | Subordinates |
/// |---|---|
/// | Dev | every Active member |
/// | Core Head | Active Core Heads and Domain Heads (including the requester) |
/// | Domain Head | Active Associate Heads in the same `Domain`, or all of them when the sheet has no `Domain` column |
/// | Associate Head | Active Junior Heads whose `ReportsTo` is the requester, or all of them when the sheet has no `ReportsTo` column |
/// | Junior Head, other | nobody |
///
/// # Example
///
/// ```
/// use clubtask_shared::auth::hierarchy::subordinates_of;
/// use clubtask_shared::models::member::{Member, MemberDirectory, MemberRole, MemberStatus};
///
/// let mut directory = MemberDirectory::new();
/// directory.push(Member::new("Ada", MemberRole::CoreHead, "x", MemberStatus::Active, "System"));
/// directory.push(Member::new("Bo", MemberRole::DomainHead, "x", MemberStatus::Active, "Ada"));
/// directory.push(Member::new("Cy", MemberRole::DomainHead, "x", MemberStatus::Pending, ""));
///
/// assert_eq!(subordinates_of("Ada", &directory), vec!["Ada", "Bo"]);
/// ```

use crate::models::member::{Member, MemberDirectory, MemberRole};

/// Names the member `name` may assign tasks to, in directory order
///
/// Unknown names and empty directories yield an empty list.
pub fn subordinates_of(name: &str, directory: &MemberDirectory) -> Vec<String> {
    let Some(requester) = directory.get(name) else {
        return Vec::new();
    };

    let eligible = |member: &Member| -> bool {
        match &requester.role {
            MemberRole::Dev => true,
            MemberRole::CoreHead => {
                matches!(member.role, MemberRole::CoreHead | MemberRole::DomainHead)
            }
            MemberRole::DomainHead => {
                member.role == MemberRole::AssociateHead
                    && (!directory.tracks_domain() || member.domain == requester.domain)
            }
            MemberRole::AssociateHead => {
                member.role == MemberRole::JuniorHead
                    && (!directory.tracks_reports_to() || member.reports_to == requester.name)
            }
            MemberRole::JuniorHead | MemberRole::Other(_) => false,
        }
    };

    directory
        .members()
        .iter()
        .filter(|member| member.status.is_active() && eligible(*member))
        .map(|member| member.name.clone())
        .collect()
}

/// Returns true for the roles offered the task assignment form
pub fn can_assign_tasks(role: &MemberRole) -> bool {
    matches!(
        role,
        MemberRole::CoreHead | MemberRole::DomainHead | MemberRole::AssociateHead
    )
}

/// Returns true if `assignee` is among `assigner`'s subordinates
pub fn can_assign_to(assigner: &str, assignee: &str, directory: &MemberDirectory) -> bool {
    subordinates_of(assigner, directory)
        .iter()
        .any(|name| name == assignee)
}
