//! Organization hierarchy derived from the cached snapshot.
//!
//! Two independent views are provided. `subordinates` follows per-employee
//! manager references (`managerID` and friends) to list or tree-ify
//! everyone under a manager. `team` reads the TEAM/PART group structure the
//! backend maintains separately from those references.
//!
//! Everything here borrows from the snapshot; nothing is copied.

pub mod subordinates;
pub mod team;

pub use subordinates::{
    build_org_tree, get_employee_by_id, get_employees_by_group, get_subordinates, OrgNode,
    ReportingIndex,
};
pub use team::{
    build_org_chart_tree, build_team_org_chart, format_org_chart_as_text, get_employee_part,
    is_direct_report, OrgChartNode, OrgChartNodeType, PartInfo, TeamMember, TeamStructure,
};
