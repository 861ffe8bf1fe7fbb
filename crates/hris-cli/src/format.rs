//! Plain-text rendering of API results.

use hris_core::models::{EmployeeWorkSummary, Holiday, LeaveBalance, LeaveInfo, User};

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Hours with at most one decimal, e.g. "7.5" or "8".
pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

pub fn format_user(user: &User) -> String {
    let mut text = format!("{} ({})\n", user.full_name, user.username);
    text.push_str(&format!("Employee ID: {}\n", user.employee_id));
    if !user.email.is_empty() {
        text.push_str(&format!("Email: {}\n", user.email));
    }
    text
}

pub fn format_holidays(year: i32, holidays: &[Holiday]) -> String {
    if holidays.is_empty() {
        return format!("No holidays for {}\n", year);
    }
    let mut sorted: Vec<&Holiday> = holidays.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let mut text = format!("Holidays {}\n", year);
    for holiday in sorted {
        let date: String = holiday.date.chars().take(10).collect();
        text.push_str(&format!("  {}  {}\n", date, holiday.description));
    }
    text
}

fn balance_row(label: &str, balance: &LeaveBalance) -> String {
    format!(
        "  {:<22}{:>8}{:>8}{:>8}\n",
        label,
        format_hours(balance.grant),
        format_hours(balance.used),
        format_hours(balance.remain)
    )
}

pub fn format_leave(name: &str, year: i32, info: &LeaveInfo) -> String {
    let mut text = format!("{} - leave {}\n", name, year);
    text.push_str(&format!("  {:<22}{:>8}{:>8}{:>8}\n", "", "Grant", "Used", "Remain"));
    text.push_str(&balance_row("Annual", &info.annual_leave.balance()));
    text.push_str(&balance_row("Refresh", &info.refresh_leave));
    text.push_str(&balance_row("Official", &info.official_leave));
    text.push_str(&balance_row("Sick", &info.sick_leave));
    text.push_str(&balance_row("Others", &info.others));
    text
}

/// One line per team member: name and remaining annual leave.
pub fn format_team_leave(year: i32, rows: &[(String, Result<LeaveInfo, String>)]) -> String {
    let mut text = format!("Team leave {} (annual remaining)\n", year);
    for (name, result) in rows {
        let line = match result {
            Ok(info) => format!(
                "  {:<30}{:>8}\n",
                truncate_string(name, 30),
                format_hours(info.annual_leave.remain)
            ),
            Err(e) => format!("  {:<30}  unavailable: {}\n", truncate_string(name, 30), e),
        };
        text.push_str(&line);
    }
    text
}

pub fn format_work_summaries(summaries: &[EmployeeWorkSummary]) -> String {
    let mut text = format!("  {:<30}{:>8}{:>6}{:>8}\n", "Employee", "Hours", "Days", "Blocks");
    for summary in summaries {
        text.push_str(&format!(
            "  {:<30}{:>8}{:>6}{:>8}\n",
            truncate_string(&summary.employee_name, 30),
            format_hours(summary.total_hours),
            summary.work_days,
            summary.work_blocks.len()
        ));
    }
    let total: f64 = summaries.iter().map(|s| s.total_hours).sum();
    text.push_str(&format!("  {:<30}{:>8}\n", "Total", format_hours(total)));
    text
}
