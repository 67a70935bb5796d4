//! Console rendering of the dashboard.

use super::{Notice, Presenter, messages};
use crate::core::dashboard::{
    DashboardView, EmployeeView, LocationView, ManagerView, RosterRow, SessionView,
};
use crate::models::company::LogEntry;
use crate::models::site::Site;
use crate::models::user::AttendanceStatus;
use crate::utils::colors::{
    CYAN, GREY, RESET, colorize_fence, colorize_optional, colorize_status,
};
use crate::utils::formatting::format_local;
use crate::utils::table::Table;
use crate::utils::{format_distance, format_elapsed};

/// Presenter used by the CLI. One-shot commands only print notices; in live
/// mode (`track`) every refresh also prints a one-line status.
pub struct ConsolePresenter {
    live: bool,
    last_line: Option<String>,
}

impl ConsolePresenter {
    pub fn new(live: bool) -> Self {
        Self {
            live,
            last_line: None,
        }
    }
}

impl Presenter for ConsolePresenter {
    fn render_dashboard(&mut self, view: &DashboardView) {
        if !self.live {
            return;
        }
        let line = status_line(view);
        // repeated refreshes within the same second print once
        if self.last_line.as_deref() != Some(line.as_str()) {
            println!("{line}");
            self.last_line = Some(line);
        }
    }

    fn notify(&mut self, notice: &Notice) {
        messages::notice(notice);
    }
}

fn position_text(location: &LocationView) -> String {
    match &location.position {
        Some(p) => format!("{} ({})", p.point(), location.mode.as_str()),
        None => "unknown".to_string(),
    }
}

pub fn status_line(view: &DashboardView) -> String {
    let clock = format!("{GREY}[{}]{RESET}", format_local(view.now));
    let pos = position_text(&view.location);

    match &view.session {
        SessionView::SignedOut { pending_login, .. } => match pending_login {
            Some(u) => format!("{clock} signed out, login of {u} waiting for a fix | {pos}"),
            None => format!("{clock} signed out | {pos}"),
        },
        SessionView::Manager(m) => {
            let present = m
                .roster
                .iter()
                .filter(|r| r.status == AttendanceStatus::CheckedIn)
                .count();
            format!(
                "{clock} {} @ {} | {present}/{} checked in | {pos}",
                m.username,
                m.company_id,
                m.roster.len()
            )
        }
        SessionView::Employee(e) => {
            let fence = e
                .fence
                .map(|f| colorize_fence(&format_distance(f.distance_m), f.within_fence))
                .unwrap_or_else(|| "-".to_string());
            let elapsed = e.elapsed.map(format_elapsed).unwrap_or_default();
            format!(
                "{clock} {} {} {elapsed} | fence {fence} | {pos}",
                e.username,
                colorize_status(e.status)
            )
        }
    }
}

/// Full dashboard, printed by `rattend status`.
pub fn print_dashboard(view: &DashboardView) {
    messages::header("DASHBOARD");
    println!("{CYAN}Time:{RESET}      {}", format_local(view.now));
    print_location(&view.location);
    println!();

    match &view.session {
        SessionView::SignedOut {
            pending_login,
            pending_verifications,
        } => {
            println!("Not signed in.");
            if !pending_verifications.is_empty() {
                println!(
                    "Waiting for verification: {}",
                    pending_verifications.join(", ")
                );
            }
            if let Some(u) = pending_login {
                println!("Login of {u} is waiting for a position fix.");
            }
        }
        SessionView::Manager(m) => print_manager(m),
        SessionView::Employee(e) => print_employee(e),
    }
}

fn print_location(location: &LocationView) {
    println!("{CYAN}Position:{RESET}  {}", position_text(location));
    if let Some(code) = location.last_error {
        println!("{CYAN}Last error:{RESET} {code}");
    }
    if location.manual_required {
        println!("Location permission denied: set a manual position to continue.");
    }
}

fn print_manager(m: &ManagerView) {
    println!(
        "Manager {} of {} ({})",
        m.username, m.company_name, m.company_id
    );

    println!();
    messages::header("SITES");
    print_sites(&m.sites);

    println!();
    messages::header("ROSTER");
    print_roster(&m.roster);

    println!();
    messages::header("RECENT ACTIVITY");
    print_logs(&m.logs);
}

fn print_employee(e: &EmployeeView) {
    println!(
        "Employee {} of {}",
        e.username,
        e.company_name.as_deref().unwrap_or("(unknown company)")
    );
    match &e.site {
        Some(site) => println!("Site:      {} ({}) at {}", site.name, site.id, site.point()),
        None => println!("Site:      {}", colorize_optional(None)),
    }
    println!("Status:    {}", colorize_status(e.status));
    if let (Some(since), Some(elapsed)) = (e.since, e.elapsed) {
        println!(
            "Since:     {} ({})",
            format_local(since),
            format_elapsed(elapsed)
        );
    }
    if let Some(f) = e.fence {
        println!(
            "Distance:  {}",
            colorize_fence(&format_distance(f.distance_m), f.within_fence)
        );
    }
    println!("History:   {} points", e.history_len);
}

pub fn print_roster(roster: &[RosterRow]) {
    let mut table = Table::new(["Username", "Contact", "Site", "Status", "Since", "Verified"]);
    for row in roster {
        table.add_row(vec![
            row.username.clone(),
            row.contact.clone(),
            colorize_optional(row.site_name.as_deref()),
            colorize_status(row.status),
            row.since.map(format_local).unwrap_or_else(|| "-".into()),
            if row.verified { "yes" } else { "no" }.to_string(),
        ]);
    }
    print_table(&table, "No employees yet.");
}

pub fn print_sites(sites: &[Site]) {
    let mut table = Table::new(["Id", "Name", "Latitude", "Longitude"]);
    for s in sites {
        table.add_row(vec![
            s.id.clone(),
            s.name.clone(),
            format!("{:.6}", s.lat),
            format!("{:.6}", s.lng),
        ]);
    }
    print_table(&table, "No sites yet.");
}

pub fn print_logs(logs: &[LogEntry]) {
    let mut table = Table::new(["Time", "User", "Action"]);
    for l in logs {
        table.add_row(vec![format_local(l.time), l.username.clone(), l.action.clone()]);
    }
    print_table(&table, "No activity yet.");
}

pub fn print_table(table: &Table, empty: &str) {
    if table.is_empty() {
        println!("{GREY}{empty}{RESET}");
    } else {
        print!("{}", table.render());
    }
}
