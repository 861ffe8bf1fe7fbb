//! Command-line parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use hris_core::models::work_report::DATE_FORMAT;
use hris_core::routes::Route;

pub const USAGE: &str = "\
Usage: hris <command> [arguments]

Commands:
  login [username] [--remember]          Sign in (prompts for the password)
  logout                                 Forget the session
  whoami                                 Show the signed-in user
  sync [language]                        Refresh the cached organization data
  subordinates [employeeID] [--direct]   Reporting tree under an employee
  org-chart [employeeID] [--json PATH]   TEAM/PART chart led by an employee
  work-report <from> <to> [--team]       Hours per employee (dates YYYY-MM-DD)
  leave [year] [--team]                  Leave balances
  holidays [year]                        Company holidays
  clear-cache                            Drop the cached organization data
  export <PATH>                          Write the cached data as JSON

Employee ids default to the signed-in user. Set RUST_LOG=debug for verbose logs.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: Option<String>, remember: bool },
    Logout,
    WhoAmI,
    Sync { language: Option<String> },
    Subordinates { employee_id: Option<String>, direct_only: bool },
    OrgChart { employee_id: Option<String>, json: Option<PathBuf> },
    WorkReport { from: NaiveDate, to: NaiveDate, team: bool },
    Leave { year: Option<i32>, team: bool },
    Holidays { year: Option<i32> },
    ClearCache,
    Export { path: PathBuf },
    Help,
}

impl Command {
    /// Parse the arguments following the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        let mut args = Args::new(rest);

        let command = match name.as_str() {
            "login" => Command::Login {
                remember: args.flag("--remember"),
                username: args.positional(),
            },
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "sync" => Command::Sync {
                language: args.positional(),
            },
            "subordinates" => Command::Subordinates {
                direct_only: args.flag("--direct"),
                employee_id: args.positional(),
            },
            "org-chart" => Command::OrgChart {
                json: args.option("--json")?.map(PathBuf::from),
                employee_id: args.positional(),
            },
            "work-report" => {
                let team = args.flag("--team");
                let from = parse_date(args.positional(), "from")?;
                let to = parse_date(args.positional(), "to")?;
                if to < from {
                    bail!("<to> ({}) is before <from> ({})", to, from);
                }
                Command::WorkReport { from, to, team }
            }
            "leave" => Command::Leave {
                team: args.flag("--team"),
                year: args.positional().map(|y| parse_year(&y)).transpose()?,
            },
            "holidays" => Command::Holidays {
                year: args.positional().map(|y| parse_year(&y)).transpose()?,
            },
            "clear-cache" => Command::ClearCache,
            "export" => Command::Export {
                path: args
                    .positional()
                    .map(PathBuf::from)
                    .ok_or_else(|| anyhow!("export needs a <PATH>"))?,
            },
            "help" | "--help" | "-h" => Command::Help,
            other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
        };

        args.finish()?;
        Ok(command)
    }

    /// Screen the command corresponds to, or `None` for commands that work
    /// regardless of the session.
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login { .. } => Some(Route::Login),
            Command::WhoAmI | Command::Leave { .. } | Command::Holidays { .. } => Some(Route::Home),
            Command::Sync { .. } => Some(Route::InitialData),
            Command::Subordinates { .. } => Some(Route::Subordinates),
            Command::OrgChart { .. } => Some(Route::OrgChart),
            Command::WorkReport { .. } => Some(Route::WorkReports),
            Command::Export { .. } => Some(Route::Debug),
            Command::Logout | Command::ClearCache | Command::Help => None,
        }
    }
}

/// Remaining arguments; flags and options are pulled out first, then
/// positionals in order.
struct Args {
    items: Vec<String>,
}

impl Args {
    fn new(items: &[String]) -> Self {
        Self {
            items: items.to_vec(),
        }
    }

    fn flag(&mut self, name: &str) -> bool {
        match self.items.iter().position(|a| a == name) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    fn option(&mut self, name: &str) -> Result<Option<String>> {
        let Some(index) = self.items.iter().position(|a| a == name) else {
            return Ok(None);
        };
        if index + 1 >= self.items.len() {
            bail!("{} needs a value", name);
        }
        let value = self.items.remove(index + 1);
        self.items.remove(index);
        Ok(Some(value))
    }

    fn positional(&mut self) -> Option<String> {
        let index = self.items.iter().position(|a| !a.starts_with("--"))?;
        Some(self.items.remove(index))
    }

    fn finish(self) -> Result<()> {
        if let Some(extra) = self.items.first() {
            bail!("Unexpected argument '{}'", extra);
        }
        Ok(())
    }
}

fn parse_date(value: Option<String>, name: &str) -> Result<NaiveDate> {
    let value = value.ok_or_else(|| anyhow!("work-report needs <{}> (YYYY-MM-DD)", name))?;
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .with_context(|| format!("Invalid <{}> date '{}', expected YYYY-MM-DD", name, value))
}

fn parse_year(value: &str) -> Result<i32> {
    match value.parse::<i32>() {
        Ok(year) if (1900..=9999).contains(&year) => Ok(year),
        _ => bail!("Invalid year '{}'", value),
    }
}
