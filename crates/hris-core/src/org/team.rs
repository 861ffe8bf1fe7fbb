use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CompanyGroup, Employee};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember<'a> {
    pub employee: &'a Employee,
    /// Listed on the TEAM itself rather than reached through a PART.
    pub is_direct: bool,
    pub part_name: Option<&'a str>,
    pub is_part_leader: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInfo<'a> {
    pub group: &'a CompanyGroup,
    pub leader: Option<&'a Employee>,
    pub members: Vec<&'a Employee>,
}

impl PartInfo<'_> {
    pub fn name(&self) -> &str {
        &self.group.group_name
    }

    fn has_member(&self, employee_id: &str) -> bool {
        self.members
            .iter()
            .any(|e| e.employee_id == employee_id || e.id.as_deref() == Some(employee_id))
    }
}

/// A team leader's TEAM, its PARTs and the people under both.
///
/// `direct_reports` are the people listed on the TEAM (part leaders
/// included); `indirect_reports` are PART members not listed on the TEAM.
/// `all_members` is their union without duplicates, the leader excluded.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStructure<'a> {
    pub team: Option<&'a CompanyGroup>,
    pub team_leader: Option<&'a Employee>,
    pub parts: Vec<PartInfo<'a>>,
    pub direct_reports: Vec<TeamMember<'a>>,
    pub indirect_reports: Vec<TeamMember<'a>>,
    pub all_members: Vec<&'a Employee>,
}

/// Derive the TEAM/PART structure led by `leader_id`.
///
/// Someone who leads no TEAM gets an empty structure with `team: None`.
/// Membership entries that reference unknown employees are skipped.
pub fn build_team_org_chart<'a>(
    groups: &'a [CompanyGroup],
    employees: &'a [Employee],
    leader_id: &str,
) -> TeamStructure<'a> {
    let mut result = TeamStructure::default();

    let Some(team) = groups
        .iter()
        .find(|g| g.is_team() && g.is_led_by(leader_id))
    else {
        debug!(leader_id = leader_id, "No TEAM led by employee");
        return result;
    };

    let by_id: HashMap<&str, &'a Employee> = employees
        .iter()
        .map(|e| (e.employee_id.as_str(), e))
        .collect();

    result.team = Some(team);
    result.team_leader = by_id.get(leader_id).copied();

    let mut direct_ids: HashSet<&str> = HashSet::new();
    let team_members: Vec<&'a Employee> = team
        .member_refs()
        .filter_map(|id| by_id.get(id).copied())
        .filter(|e| e.employee_id != leader_id)
        .filter(|e| direct_ids.insert(e.employee_id.as_str()))
        .collect();

    result.parts = groups
        .iter()
        .filter(|g| g.is_part() && g.is_child_of(team))
        .map(|part| PartInfo {
            group: part,
            leader: part.leader_id.as_deref().and_then(|id| by_id.get(id).copied()),
            members: part
                .member_refs()
                .filter_map(|id| by_id.get(id).copied())
                .collect(),
        })
        .collect();

    for employee in team_members {
        let led_part = result
            .parts
            .iter()
            .find(|p| p.group.is_led_by(&employee.employee_id));
        result.direct_reports.push(TeamMember {
            employee,
            is_direct: true,
            part_name: led_part.map(|p| p.group.group_name.as_str()),
            is_part_leader: led_part.is_some(),
        });
        result.all_members.push(employee);
    }

    let mut seen = direct_ids.clone();
    for part in &result.parts {
        for &employee in &part.members {
            let id = employee.employee_id.as_str();
            if id == leader_id || direct_ids.contains(id) || !seen.insert(id) {
                continue;
            }
            result.indirect_reports.push(TeamMember {
                employee,
                is_direct: false,
                part_name: Some(part.group.group_name.as_str()),
                is_part_leader: false,
            });
            result.all_members.push(employee);
        }
    }

    debug!(
        team = %team.group_name,
        parts = result.parts.len(),
        direct = result.direct_reports.len(),
        indirect = result.indirect_reports.len(),
        "Built team structure"
    );

    result
}

/// The PART whose member list contains `employee_id` (matched against the
/// business key or the internal id).
pub fn get_employee_part<'s, 'a>(
    employee_id: &str,
    structure: &'s TeamStructure<'a>,
) -> Option<&'s PartInfo<'a>> {
    structure.parts.iter().find(|p| p.has_member(employee_id))
}

pub fn is_direct_report(employee_id: &str, structure: &TeamStructure<'_>) -> bool {
    structure
        .direct_reports
        .iter()
        .any(|m| m.employee.employee_id == employee_id)
}

/// Plain-text rendering of a team structure: header, statistics, then every
/// PART with its members. The PART leader is marked with `*`.
pub fn format_org_chart_as_text(structure: &TeamStructure<'_>) -> String {
    OrgChartText(structure).to_string()
}

struct OrgChartText<'s, 'a>(&'s TeamStructure<'a>);

impl fmt::Display for OrgChartText<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let structure = self.0;
        let Some(team) = structure.team else {
            return f.write_str("No team found");
        };

        writeln!(f, "ORGANIZATION CHART")?;
        writeln!(f, "=======================================")?;
        writeln!(f)?;
        writeln!(f, "TEAM: {}", team.group_name)?;
        if let Some(leader) = structure.team_leader {
            writeln!(f, "Team Leader: {} ({})", leader.name, leader.employee_code)?;
        }

        writeln!(f)?;
        writeln!(f, "TEAM STATISTICS:")?;
        writeln!(f, "   - Parts: {}", structure.parts.len())?;
        writeln!(f, "   - Direct Reports: {}", structure.direct_reports.len())?;
        writeln!(f, "   - Indirect Reports: {}", structure.indirect_reports.len())?;
        writeln!(f, "   - Total Members: {}", structure.all_members.len())?;

        for (index, part) in structure.parts.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "PART {}: {}", index + 1, part.group.group_name)?;
            writeln!(f, "   Code: {}", part.group.group_code)?;
            if let Some(leader) = part.leader {
                writeln!(f, "   Leader: {} ({})", leader.name, leader.employee_code)?;
            }
            writeln!(f, "   Members ({}):", part.members.len())?;
            for member in &part.members {
                let marker = if part.group.is_led_by(&member.employee_id) { '*' } else { '-' };
                writeln!(f, "      ├─ {} {} - {}", marker, member.name, member.employee_code)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrgChartNodeType {
    Leader,
    PartLeader,
    Member,
}

/// Generic tree node for chart visualizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgChartNode {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub node_type: OrgChartNodeType,
    #[serde(rename = "partName", default, skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<OrgChartNode>>,
}

/// Export a team structure as leader -> part leaders -> members.
///
/// PARTs without a resolvable leader are left out, as are structures without
/// a team or team leader.
pub fn build_org_chart_tree(structure: &TeamStructure<'_>) -> Option<OrgChartNode> {
    let team = structure.team?;
    let leader = structure.team_leader?;

    let children = structure
        .parts
        .iter()
        .filter_map(|part| {
            let part_leader = part.leader?;
            let part_name = part.group.group_name.clone();
            let members = part
                .members
                .iter()
                .filter(|m| m.employee_id != part_leader.employee_id)
                .map(|m| OrgChartNode {
                    id: m.employee_id.clone(),
                    name: m.name.clone(),
                    title: part_name.clone(),
                    node_type: OrgChartNodeType::Member,
                    part_name: Some(part_name.clone()),
                    children: None,
                })
                .collect();

            Some(OrgChartNode {
                id: part_leader.employee_id.clone(),
                name: part_leader.name.clone(),
                title: format!("{} Leader", part_name),
                node_type: OrgChartNodeType::PartLeader,
                part_name: Some(part_name),
                children: Some(members),
            })
        })
        .collect();

    Some(OrgChartNode {
        id: leader.employee_id.clone(),
        name: leader.name.clone(),
        title: format!("Team Leader - {}", team.group_name),
        node_type: OrgChartNodeType::Leader,
        part_name: None,
        children: Some(children),
    })
}
