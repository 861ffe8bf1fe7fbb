use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::models::Employee;

/// Direct reports of every manager, keyed by the manager's employee id.
/// Reports keep the order of the employee list.
pub struct ReportingIndex<'a> {
    reports: HashMap<&'a str, Vec<&'a Employee>>,
}

impl<'a> ReportingIndex<'a> {
    pub fn new(employees: &'a [Employee]) -> Self {
        let mut reports: HashMap<&'a str, Vec<&'a Employee>> = HashMap::new();
        for employee in employees {
            if let Some(manager_id) = employee.manager_id() {
                reports.entry(manager_id).or_default().push(employee);
            }
        }
        Self { reports }
    }

    pub fn direct_reports(&self, manager_id: &str) -> &[&'a Employee] {
        self.reports.get(manager_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Everyone reporting to `manager_id`, directly or (with `include_indirect`)
/// through other reports, in depth-first order.
///
/// Each employee appears at most once and the manager never appears in their
/// own list, so cyclic or duplicated reporting links still terminate.
pub fn get_subordinates<'a>(
    manager_id: &str,
    employees: &'a [Employee],
    include_indirect: bool,
) -> Vec<&'a Employee> {
    let index = ReportingIndex::new(employees);
    let mut processed: HashSet<&str> = HashSet::new();
    processed.insert(manager_id);

    let mut subordinates = Vec::new();
    let mut stack = vec![index.direct_reports(manager_id).iter()];

    while let Some(reports) = stack.last_mut() {
        let Some(&employee) = reports.next() else {
            stack.pop();
            continue;
        };
        if !processed.insert(employee.employee_id.as_str()) {
            continue;
        }
        subordinates.push(employee);
        if include_indirect {
            stack.push(index.direct_reports(&employee.employee_id).iter());
        }
    }

    subordinates
}

/// An employee and the subtrees of their direct reports.
#[derive(Debug)]
pub struct OrgNode<'a> {
    pub employee: &'a Employee,
    pub level: usize,
    pub subordinates: Vec<OrgNode<'a>>,
}

impl OrgNode<'_> {
    /// Number of nodes in this tree, the root included.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.subordinates.iter());
        }
        count
    }

    /// Indented text rendering, one employee per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push_str(&"  ".repeat(node.level));
            out.push_str(if node.level == 0 { "" } else { "└─ " });
            out.push_str(&node.employee.display_name());
            if let Some(position) = node.employee.position().filter(|p| !p.is_empty()) {
                out.push_str(" - ");
                out.push_str(position);
            }
            out.push('\n');
            stack.extend(node.subordinates.iter().rev());
        }
        out
    }
}

impl Drop for OrgNode<'_> {
    fn drop(&mut self) {
        // Detach children before each node drops so depth never reaches the stack.
        let mut stack = std::mem::take(&mut self.subordinates);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.subordinates);
        }
    }
}

struct Slot<'a> {
    employee: &'a Employee,
    level: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Reporting tree rooted at `manager_id`, or `None` if no such employee.
///
/// Unlike `get_subordinates`, an employee reachable through several managers
/// appears under each of them. An employee is never expanded below itself:
/// a reporting cycle is cut where it closes and logged.
pub fn build_org_tree<'a>(manager_id: &str, employees: &'a [Employee]) -> Option<OrgNode<'a>> {
    let root = get_employee_by_id(manager_id, employees)?;
    let index = ReportingIndex::new(employees);

    let mut slots = vec![Slot {
        employee: root,
        level: 0,
        parent: None,
        children: Vec::new(),
    }];
    let mut stack = vec![0];

    while let Some(idx) = stack.pop() {
        let level = slots[idx].level;
        let reports = index.direct_reports(&slots[idx].employee.employee_id);
        for &report in reports {
            if is_on_path(&slots, idx, &report.employee_id) {
                warn!(
                    employee_id = %report.employee_id,
                    manager_id = %slots[idx].employee.employee_id,
                    "Reporting cycle detected, not expanding"
                );
                continue;
            }
            let child = slots.len();
            slots.push(Slot {
                employee: report,
                level: level + 1,
                parent: Some(idx),
                children: Vec::new(),
            });
            slots[idx].children.push(child);
            stack.push(child);
        }
    }

    // Children always come after their parent, so assemble back to front.
    let mut built: Vec<Option<OrgNode<'a>>> = Vec::with_capacity(slots.len());
    built.resize_with(slots.len(), || None);
    for idx in (0..slots.len()).rev() {
        let subordinates = slots[idx]
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[idx] = Some(OrgNode {
            employee: slots[idx].employee,
            level: slots[idx].level,
            subordinates,
        });
    }
    built.into_iter().next().flatten()
}

/// Whether `employee_id` is the employee at `idx` or one of its ancestors.
fn is_on_path(slots: &[Slot<'_>], idx: usize, employee_id: &str) -> bool {
    let mut current = Some(idx);
    while let Some(i) = current {
        if slots[i].employee.employee_id == employee_id {
            return true;
        }
        current = slots[i].parent;
    }
    false
}

pub fn get_employee_by_id<'a>(employee_id: &str, employees: &'a [Employee]) -> Option<&'a Employee> {
    employees.iter().find(|e| e.employee_id == employee_id)
}

/// Employees filed under `group_id` through `companyGroupID`, `departmentID`
/// or `divisionID`.
pub fn get_employees_by_group<'a>(group_id: &str, employees: &'a [Employee]) -> Vec<&'a Employee> {
    employees
        .iter()
        .filter(|e| e.belongs_to_group(group_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn employees(value: serde_json::Value) -> Vec<Employee> {
        serde_json::from_value(value).expect("valid employee list")
    }

    fn ids(list: &[&Employee]) -> Vec<String> {
        list.iter().map(|e| e.employee_id.clone()).collect()
    }

    #[test]
    fn test_direct_and_indirect_subordinates() {
        let list = employees(json!([
            {"employeeID": "M"},
            {"employeeID": "A", "managerID": "M"},
            {"employeeID": "B", "managerID": "A"},
            {"employeeID": "X"}
        ]));

        assert_eq!(ids(&get_subordinates("M", &list, true)), vec!["A", "B"]);
        assert_eq!(ids(&get_subordinates("M", &list, false)), vec!["A"]);
        assert!(get_subordinates("X", &list, true).is_empty());
        assert!(get_subordinates("nobody", &list, true).is_empty());
    }

    #[test]
    fn test_subordinates_use_every_manager_field() {
        let list = employees(json!([
            {"employeeID": "A", "managerID": "M"},
            {"employeeID": "B", "supervisorID": "M"},
            {"employeeID": "C", "reportToID": "M"},
            {"employeeID": "D", "employeeProfile": {"managerID": "M"}},
            {"employeeID": "E", "managerID": "Z", "supervisorID": "M"}
        ]));

        assert_eq!(
            ids(&get_subordinates("M", &list, false)),
            vec!["A", "B", "C", "D"]
        );
    }

    #[test]
    fn test_subordinates_depth_first_order() {
        let list = employees(json!([
            {"employeeID": "A", "managerID": "M"},
            {"employeeID": "B", "managerID": "M"},
            {"employeeID": "A1", "managerID": "A"},
            {"employeeID": "B1", "managerID": "B"},
            {"employeeID": "A2", "managerID": "A1"}
        ]));

        assert_eq!(
            ids(&get_subordinates("M", &list, true)),
            vec!["A", "A1", "A2", "B", "B1"]
        );
    }

    #[test]
    fn test_subordinates_terminate_on_cycles() {
        let list = employees(json!([
            {"employeeID": "X", "managerID": "Y"},
            {"employeeID": "Y", "managerID": "X"}
        ]));

        assert_eq!(ids(&get_subordinates("X", &list, true)), vec!["Y"]);
        assert_eq!(ids(&get_subordinates("Y", &list, true)), vec!["X"]);
    }

    #[test]
    fn test_subordinates_deduplicate_repeated_records() {
        let list = employees(json!([
            {"employeeID": "A", "managerID": "M"},
            {"employeeID": "A", "managerID": "M"},
            {"employeeID": "S", "managerID": "S"},
            {"employeeID": "B", "managerID": "A"}
        ]));

        assert_eq!(ids(&get_subordinates("M", &list, true)), vec!["A", "B"]);
        assert!(get_subordinates("S", &list, true).is_empty());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let chain: Vec<Employee> = (0..5_000)
            .map(|i| Employee {
                employee_id: format!("E{i}"),
                extra: [("managerID".to_string(), json!(format!("E{}", i as i64 - 1)))]
                    .into_iter()
                    .collect(),
                ..Default::default()
            })
            .collect();

        assert_eq!(get_subordinates("E0", &chain, true).len(), 4_999);
        let tree = build_org_tree("E0", &chain).unwrap();
        assert_eq!(tree.size(), 5_000);
        drop(tree);
    }

    #[test]
    fn test_dropping_very_deep_tree() {
        let employee = Employee::default();
        let mut node = OrgNode {
            employee: &employee,
            level: 0,
            subordinates: Vec::new(),
        };
        for level in 1..200_000 {
            node = OrgNode {
                employee: &employee,
                level,
                subordinates: vec![node],
            };
        }
        assert_eq!(node.size(), 200_000);
        drop(node);
    }

    #[test]
    fn test_build_org_tree_levels() {
        let list = employees(json!([
            {"employeeID": "M", "name": "Manager", "employeeCode": "C0"},
            {"employeeID": "A", "name": "Anh", "managerID": "M", "employeeProfile": {"position": "Lead"}},
            {"employeeID": "B", "name": "Bao", "managerID": "A"},
            {"employeeID": "C", "name": "Cuong", "managerID": "M"}
        ]));

        let tree = build_org_tree("M", &list).unwrap();
        assert_eq!(tree.level, 0);
        assert_eq!(tree.subordinates.len(), 2);
        assert_eq!(tree.subordinates[0].employee.employee_id, "A");
        assert_eq!(tree.subordinates[0].level, 1);
        assert_eq!(tree.subordinates[0].subordinates[0].employee.employee_id, "B");
        assert_eq!(tree.subordinates[0].subordinates[0].level, 2);
        assert_eq!(tree.subordinates[1].employee.employee_id, "C");
        assert_eq!(tree.size(), 4);

        assert_eq!(
            tree.render(),
            "Manager (C0)\n  └─ Anh - Lead\n    └─ Bao\n  └─ Cuong\n"
        );
    }

    #[test]
    fn test_build_org_tree_unknown_manager() {
        let list = employees(json!([{"employeeID": "A"}]));
        assert!(build_org_tree("nobody", &list).is_none());
    }

    #[test]
    fn test_build_org_tree_cuts_cycles() {
        let list = employees(json!([
            {"employeeID": "X", "managerID": "Y"},
            {"employeeID": "Y", "managerID": "X"}
        ]));

        let tree = build_org_tree("X", &list).unwrap();
        assert_eq!(tree.subordinates.len(), 1);
        assert_eq!(tree.subordinates[0].employee.employee_id, "Y");
        assert!(tree.subordinates[0].subordinates.is_empty());
    }

    #[test]
    fn test_build_org_tree_keeps_duplicates_across_branches() {
        let list = employees(json!([
            {"employeeID": "M"},
            {"employeeID": "A", "managerID": "M"},
            {"employeeID": "B", "managerID": "M"},
            {"employeeID": "D", "managerID": "A"},
            {"employeeID": "D", "managerID": "B"}
        ]));

        let tree = build_org_tree("M", &list).unwrap();
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.subordinates[0].subordinates[0].employee.employee_id, "D");
        assert_eq!(tree.subordinates[1].subordinates[0].employee.employee_id, "D");
    }

    #[test]
    fn test_directory_lookups() {
        let list = employees(json!([
            {"employeeID": "A", "companyGroupID": "G1"},
            {"employeeID": "B", "divisionID": "G1"},
            {"employeeID": "C", "departmentID": "G2"}
        ]));

        assert_eq!(get_employee_by_id("B", &list).map(|e| e.employee_id.as_str()), Some("B"));
        assert!(get_employee_by_id("Z", &list).is_none());
        assert_eq!(ids(&get_employees_by_group("G1", &list)), vec!["A", "B"]);
        assert!(get_employees_by_group("G9", &list).is_empty());
    }
}
