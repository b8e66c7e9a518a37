//! Terminal output formatting.

use chrono::{NaiveDate, Utc};
use colored::{ColoredString, Colorize};
use cosmos_core::analytics::{DashboardStats, ProjectTally};
use cosmos_core::board::{Board, BoardColumn, DropOutcome, IgnoreReason};
use cosmos_core::gateway::{Notice, NoticeLevel};
use cosmos_core::task::{Task, TaskStatus};
use cosmos_core::team::TeamMember;
use unicode_width::UnicodeWidthStr;

/// Print a notice the way the dashboard shows its toasts.
pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => println!("{} {}", "✓".green().bold(), notice.message),
        NoticeLevel::Error => eprintln!("{} {}", "✗".red().bold(), notice.message),
    }
}

/// Print the dashboard header figures.
pub fn print_stats(stats: &DashboardStats) {
    let counts = &stats.counts;
    println!("{}", "Dashboard".bold());
    println!();
    println!("  {:<18} {}", "Total tasks", counts.total.to_string().bold());
    println!("  {:<18} {}", "To Do", counts.todo.to_string().blue());
    println!("  {:<18} {}", "In Progress", counts.inprogress.to_string().yellow());
    println!("  {:<18} {}", "Done", counts.done.to_string().green());
    println!();
    println!("  {:<18} {}%", "On-time rate", stats.on_time_rate);
    println!("  {:<18} {} days", "Avg. cycle time", stats.average_cycle_days);
    println!("  {:<18} {}", "Done this week", stats.weekly_throughput);
}

/// Print the project overview.
pub fn print_projects(tallies: &[ProjectTally]) {
    if tallies.is_empty() {
        println!("{}", "No projects match.".dimmed());
        return;
    }

    println!(
        "{:<30} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "Project", "Todo", "Doing", "Done", "Total", "%"
    );
    println!("{}", "─".repeat(66));

    for tally in tallies {
        let percent = tally.completion_percent();
        let percent_colored = match percent {
            100 => format!("{}%", percent).green(),
            0 => format!("{}%", percent).dimmed(),
            _ => format!("{}%", percent).normal(),
        };
        println!(
            "{} {:>6} {:>6} {:>6} {:>6} {:>6}",
            pad_right(&truncate_visual(&tally.name, 30), 30),
            tally.todo,
            tally.inprogress,
            tally.done,
            tally.total,
            percent_colored
        );
    }
}

/// Print tasks as a table.
pub fn print_tasks_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", "No tasks found.".dimmed());
        return;
    }

    println!(
        "{:<10} {:<30} {:<12} {:<20} {:<10}",
        "ID", "Title", "Status", "Project", "Deadline"
    );
    println!("{}", "─".repeat(86));

    for task in tasks {
        println!(
            "{:<10} {} {} {} {}",
            short_id(&task.id),
            pad_right(&truncate_visual(&task.title, 30), 30),
            pad_colored(status_colored(task.status), task.status.as_str(), 12),
            pad_right(&truncate_visual(&task.project_label(), 20), 20),
            task.deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    println!();
    println!("{} task(s) total", tasks.len());
}

/// Print the team roster.
pub fn print_team(team: &[TeamMember]) {
    if team.is_empty() {
        println!("{}", "No team members yet.".dimmed());
        return;
    }

    println!("{}", "Team".bold());
    println!();
    for member in team {
        println!(
            "  {} {} {} {}",
            "●".cyan(),
            pad_right(&member.name, 24),
            member.role.dimmed(),
            short_id(&member.id).dimmed()
        );
    }
}

/// Describe the result of a board drop.
pub fn print_drop_outcome(outcome: &DropOutcome) {
    match outcome {
        DropOutcome::Moved { task } => println!(
            "{} Moved {} to {}",
            "✓".green().bold(),
            task.title.cyan(),
            task.status.title()
        ),
        DropOutcome::Ignored { reason } => {
            let why = match reason {
                IgnoreReason::NoTarget => "not a board column",
                IgnoreReason::ReadOnly => "this role cannot move cards",
                IgnoreReason::UnknownTask => "task is not on this board",
                IgnoreReason::SameColumn => "task is already in that column",
            };
            println!("{} Nothing to do: {}", "·".dimmed(), why);
        }
        DropOutcome::Reverted { notice } => print_notice(notice),
    }
}

fn status_colored(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Todo => status.as_str().normal(),
        TaskStatus::InProgress => status.as_str().yellow(),
        TaskStatus::Done => status.as_str().green(),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Pad a colored string using the width of its plain text.
fn pad_colored(colored: ColoredString, plain: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(plain);
    format!("{}{}", colored, " ".repeat(width.saturating_sub(visual)))
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}

fn column_header_plain(col: &BoardColumn, max_width: usize) -> String {
    let full = format!("{} {}", col.title.to_uppercase(), col.tasks.len());
    truncate_visual(&full, max_width)
}

fn column_header_colored(col: &BoardColumn, max_width: usize) -> ColoredString {
    let label = column_header_plain(col, max_width);
    match col.status {
        TaskStatus::Todo => label.blue().bold(),
        TaskStatus::InProgress => label.yellow().bold(),
        TaskStatus::Done => label.green().bold(),
    }
}

/// Marker for overdue open tasks.
fn deadline_indicator(task: &Task, today: NaiveDate) -> ColoredString {
    match task.deadline {
        Some(deadline) if !task.is_done() && deadline < today => "!!".red().bold(),
        Some(_) => "· ".dimmed(),
        None => "  ".normal(),
    }
}

/// Card text; cards on the all-projects board lead with their project.
fn card_label(task: &Task, global: bool) -> String {
    if global {
        format!("{} · {}", task.project_label(), task.title)
    } else {
        task.title.clone()
    }
}

fn format_card(task: &Task, width: usize, today: NaiveDate, global: bool) -> String {
    let title_w = if width > 4 { width - 3 } else { 1 };
    let title = pad_right(&truncate_visual(&card_label(task, global), title_w), title_w);
    match task.status {
        TaskStatus::Done => format!("{} {}", "✓ ".green(), title.green().dimmed()),
        TaskStatus::InProgress => format!("{} {}", deadline_indicator(task, today), title.yellow()),
        TaskStatus::Todo => format!("{} {}", deadline_indicator(task, today), title),
    }
}

/// Print the Kanban board.
pub fn print_board(board: &Board, can_drag: bool) {
    if board.total_tasks() == 0 {
        println!(
            "{}",
            "No tasks on this board. Create one with 'cosmos task new'.".dimmed()
        );
        return;
    }

    let width = term_width();
    if width < 60 {
        print_board_compact(board);
    } else {
        print_board_wide(board, width);
    }

    if !can_drag {
        println!("{}", " read-only: this role cannot move cards".dimmed());
    }
}

/// Columns side by side.
fn print_board_wide(board: &Board, term_w: usize) {
    let today = Utc::now().date_naive();
    let num_cols = board.columns.len();
    let available = term_w.saturating_sub(num_cols + 1);
    let col_width = (available / num_cols.max(1)).clamp(12, 35);

    let rule = |left: &str, mid: &str, right: &str| {
        let inner = vec!["─".repeat(col_width); num_cols].join(mid);
        println!("{}", format!("{}{}{}", left, inner, right).dimmed());
    };

    rule("┌", "┬", "┐");
    print!("{}", "│".dimmed());
    for (i, col) in board.columns.iter().enumerate() {
        let plain = column_header_plain(col, col_width);
        let padding = col_width.saturating_sub(UnicodeWidthStr::width(plain.as_str()));
        let left_pad = padding / 2;
        print!(
            "{}{}{}",
            " ".repeat(left_pad),
            column_header_colored(col, col_width),
            " ".repeat(padding - left_pad)
        );
        if i < num_cols - 1 {
            print!("{}", "│".dimmed());
        }
    }
    println!("{}", "│".dimmed());
    rule("├", "┼", "┤");

    let max_tasks = board.columns.iter().map(|c| c.tasks.len()).max().unwrap_or(0);
    for row in 0..max_tasks {
        print!("{}", "│".dimmed());
        for (ci, col) in board.columns.iter().enumerate() {
            match col.tasks.get(row) {
                Some(task) => print!("{}", format_card(task, col_width, today, board.is_global())),
                None => print!("{}", " ".repeat(col_width)),
            }
            if ci < num_cols - 1 {
                print!("{}", "│".dimmed());
            }
        }
        println!("{}", "│".dimmed());
    }
    rule("└", "┴", "┘");

    let total = board.total_tasks();
    let done = board.column(TaskStatus::Done).map(|c| c.tasks.len()).unwrap_or(0);
    println!(
        " {} {} tasks {} {} done ({}%)",
        "■".cyan(),
        total.to_string().bold(),
        "·".dimmed(),
        done.to_string().green(),
        (done * 100) / total
    );
}

/// Vertical layout for narrow terminals.
fn print_board_compact(board: &Board) {
    let today = Utc::now().date_naive();
    let heading = if board.is_global() { " ALL PROJECTS " } else { " KANBAN BOARD " };
    println!("{}", heading.on_blue().white().bold());
    println!();

    for col in board.columns.iter().filter(|c| !c.tasks.is_empty()) {
        println!(" {} {}", "▸".dimmed(), column_header_colored(col, 30));
        for task in &col.tasks {
            let label = card_label(task, board.is_global());
            let title: ColoredString = match col.status {
                TaskStatus::InProgress => label.as_str().yellow(),
                TaskStatus::Done => label.as_str().green().dimmed(),
                TaskStatus::Todo => label.as_str().normal(),
            };
            println!(
                "   {} {} {}",
                deadline_indicator(task, today),
                title,
                short_id(&task.id).dimmed()
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_visual_respects_width() {
        assert_eq!(truncate_visual("short", 10), "short");
        assert_eq!(truncate_visual("a long project name", 8), "a long..");
        assert_eq!(truncate_visual("abc", 2), "..");
    }

    #[test]
    fn test_pad_right_uses_display_width() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(UnicodeWidthStr::width(pad_right("日本", 6).as_str()), 6);
    }

    #[test]
    fn test_card_label_names_project_on_global_board() {
        let task = Task {
            id: "t-1".to_string(),
            title: "Push alerts".to_string(),
            description: None,
            project_id: "p-2".to_string(),
            project_name: Some("Mobile App".to_string()),
            status: TaskStatus::Todo,
            assignee: None,
            deadline: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        };
        assert_eq!(card_label(&task, false), "Push alerts");
        assert_eq!(card_label(&task, true), "Mobile App · Push alerts");
    }

    #[test]
    fn test_short_id_handles_short_ids() {
        assert_eq!(short_id("3f9a2c1e-77aa"), "3f9a2c1e");
        assert_eq!(short_id("t1"), "t1");
    }
}
