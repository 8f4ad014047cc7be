//! Plain-text neighbor table

use chrono::{DateTime, Local};
use linkscope_core::NeighborRecord;
use std::fmt::Write;
use std::time::{Duration, SystemTime};

const HEADER: [&str; 8] = [
    "", "NEIGHBOR", "PORT", "PLATFORM", "MGMT IP", "CAPABILITIES", "PROTO", "LAST SEEN",
];

/// Render `neighbors` as an aligned table, ages measured from `now`
///
/// New neighbors are flagged with `*`, stale ones with `!`.
pub fn format_table(neighbors: &[NeighborRecord], now: SystemTime) -> String {
    if neighbors.is_empty() {
        return "No neighbors discovered yet\n".to_string();
    }

    let rows: Vec<[String; 8]> = neighbors.iter().map(|n| row(n, now)).collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADER.map(str::to_string), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn row(neighbor: &NeighborRecord, now: SystemTime) -> [String; 8] {
    let flag = if neighbor.is_stale {
        "!"
    } else if neighbor.is_new {
        "*"
    } else {
        ""
    };

    [
        flag.to_string(),
        neighbor.display_name().to_string(),
        neighbor.port_id.clone(),
        neighbor.platform.clone(),
        neighbor
            .management_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string()),
        neighbor.capabilities_string(),
        neighbor.protocol().to_string(),
        format!(
            "{} ({})",
            clock_time(neighbor.last_seen),
            format_age(now.duration_since(neighbor.last_seen).unwrap_or(Duration::ZERO))
        ),
    ]
}

fn push_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths.iter()) {
        let _ = write!(line, "{:<width$}  ", cell, width = *width);
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Local wall-clock time of day
pub fn clock_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%H:%M:%S").to_string()
}

/// Coarse age: seconds under a minute, then minutes, then hours
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        _ => format!("{}h ago", secs / 3600),
    }
}
