//! Command handlers. Each prints its result to stdout.

use std::path::Path;

use anyhow::{bail, Result};
use chrono::{Datelike, Local, NaiveDate};
use hris_core::cache::FetchOutcome;
use hris_core::export::export_to_json;
use hris_core::models::{summarize_work_blocks, CachedInitialData, Employee, WorkReportRequest};
use hris_core::org::{
    build_org_chart_tree, build_org_tree, build_team_org_chart, format_org_chart_as_text,
    get_employee_by_id, get_subordinates,
};
use tracing::{debug, warn};

use crate::app::App;
use crate::cli::{Command, USAGE};
use crate::format::{
    format_holidays, format_leave, format_team_leave, format_user, format_work_summaries,
};

/// Maximum number of leave requests in flight at once.
const MAX_CONCURRENT: usize = 5;

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    if let Some(route) = command.route() {
        app.authorize(route)?;
    }

    match command {
        Command::Help => println!("{}", USAGE),
        Command::Login { username, remember } => {
            app.login(username, remember).await?;
            if let Some(user) = app.session.user() {
                println!("Signed in as {} ({})", user.full_name, user.employee_id);
            }
        }
        Command::Logout => {
            app.logout()?;
            println!("Signed out");
        }
        Command::WhoAmI => match app.session.user() {
            Some(user) => print!("{}", format_user(user)),
            None => println!("Not signed in"),
        },
        Command::Sync { language } => sync(app, language.as_deref()).await?,
        Command::Subordinates {
            employee_id,
            direct_only,
        } => subordinates(app, employee_id.as_deref(), direct_only).await?,
        Command::OrgChart { employee_id, json } => {
            org_chart(app, employee_id.as_deref(), json.as_deref()).await?
        }
        Command::WorkReport { from, to, team } => work_report(app, from, to, team).await?,
        Command::Leave { year, team } => leave(app, year.unwrap_or_else(current_year), team).await?,
        Command::Holidays { year } => {
            let year = year.unwrap_or_else(current_year);
            let holidays = app.api.get_holidays(year).await?;
            print!("{}", format_holidays(year, &holidays));
        }
        Command::ClearCache => {
            app.clear_cache()?;
            println!("Cached organization data removed");
        }
        Command::Export { path } => {
            let data = app.snapshot().await?;
            export_to_json(data.as_ref(), &path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn current_year() -> i32 {
    Local::now().year()
}

async fn sync(app: &mut App, language: Option<&str>) -> Result<()> {
    match app.sync(language).await? {
        FetchOutcome::CacheHit => println!("Organization data is up to date"),
        FetchOutcome::Refreshed { employees } => {
            println!("Downloaded organization data ({} employees)", employees)
        }
        FetchOutcome::NoData => println!("The server sent no organization data"),
    }
    Ok(())
}

async fn subordinates(app: &mut App, employee_id: Option<&str>, direct_only: bool) -> Result<()> {
    let id = app.employee_id(employee_id)?;
    let data = app.snapshot().await?;
    let employees = data.employees();

    if direct_only {
        let direct = get_subordinates(&id, employees, false);
        for employee in &direct {
            match employee.position().filter(|p| !p.is_empty()) {
                Some(position) => println!("{} - {}", employee.display_name(), position),
                None => println!("{}", employee.display_name()),
            }
        }
        println!("{} direct reports", direct.len());
        return Ok(());
    }

    let Some(tree) = build_org_tree(&id, employees) else {
        bail!("Unknown employee '{}'", id);
    };
    print!("{}", tree.render());
    println!("{} subordinates", tree.size() - 1);
    Ok(())
}

async fn org_chart(app: &mut App, employee_id: Option<&str>, json: Option<&Path>) -> Result<()> {
    let id = app.employee_id(employee_id)?;
    let data = app.snapshot().await?;
    let structure = build_team_org_chart(data.groups(), data.employees(), &id);

    print!("{}", format_org_chart_as_text(&structure));
    if structure.team.is_none() {
        println!();
    }

    if let Some(path) = json {
        let Some(tree) = build_org_chart_tree(&structure) else {
            bail!("No team led by '{}', nothing to export", id);
        };
        export_to_json(&tree, path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// `leader_id` followed by everyone in the team they lead. Someone who leads
/// no TEAM gets their reporting line instead.
fn team_of<'a>(data: &'a CachedInitialData, leader_id: &str) -> Vec<&'a Employee> {
    let employees = data.employees();
    let mut members: Vec<&Employee> = get_employee_by_id(leader_id, employees).into_iter().collect();

    let structure = build_team_org_chart(data.groups(), employees, leader_id);
    if structure.team.is_some() {
        members.extend(structure.all_members);
    } else {
        debug!(leader_id = leader_id, "No TEAM, falling back to reporting line");
        members.extend(get_subordinates(leader_id, employees, true));
    }
    members
}

async fn work_report(app: &mut App, from: NaiveDate, to: NaiveDate, team: bool) -> Result<()> {
    let id = app.employee_id(None)?;
    let data = app.snapshot().await?;

    let employee_ids: Vec<String> = if team {
        team_of(&data, &id)
            .into_iter()
            .map(|e| e.employee_id.clone())
            .collect()
    } else {
        vec![id]
    };
    if employee_ids.is_empty() {
        bail!("Nobody to report on");
    }

    let request = WorkReportRequest::for_range(from, to, employee_ids);
    let response = app.api.get_work_blocks(&request).await?;
    let summaries = summarize_work_blocks(&response, data.employees());

    println!("Work report {} to {}", from, to);
    print!("{}", format_work_summaries(&summaries));
    Ok(())
}

async fn leave(app: &mut App, year: i32, team: bool) -> Result<()> {
    let id = app.employee_id(None)?;

    if !team {
        let info = app.api.get_leave_info_by_year(year, &id).await?;
        let name = app
            .session
            .user()
            .map(|u| u.full_name.clone())
            .unwrap_or_else(|| id.clone());
        print!("{}", format_leave(&name, year, &info));
        return Ok(());
    }

    let data = app.snapshot().await?;
    let members: Vec<(String, String)> = team_of(&data, &id)
        .into_iter()
        .map(|e| (e.employee_id.clone(), e.name.clone()))
        .collect();

    let mut rows = Vec::with_capacity(members.len());
    for chunk in members.chunks(MAX_CONCURRENT) {
        let futures: Vec<_> = chunk
            .iter()
            .map(|(employee_id, name)| {
                let api = app.api.clone();
                async move {
                    let result = api.get_leave_info_by_year(year, employee_id).await;
                    (name.clone(), result)
                }
            })
            .collect();

        let results = futures::future::join_all(futures).await;
        for (name, result) in results {
            let result = result.map_err(|e| {
                warn!(employee = %name, error = %e, "Failed to fetch leave info");
                format!("{:#}", e)
            });
            rows.push((name, result));
        }
    }

    print!("{}", format_team_leave(year, &rows));
    Ok(())
}
