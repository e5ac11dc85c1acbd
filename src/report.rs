use std::fmt::Write as _;

use crate::{distribution::AgeDistribution, store::StoredUser};

const BANNER_WIDTH: usize = 60;
const REPORT_COLUMN_WIDTH: usize = 20;

pub fn render_distribution(distribution: &AgeDistribution) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let mut output = String::new();
    let _ = writeln!(output, "{banner}");
    let _ = writeln!(output, "AGE DISTRIBUTION REPORT");
    let _ = writeln!(output, "{banner}");
    let _ = writeln!(output, "Total Users: {}\n", distribution.total_users);
    let _ = writeln!(
        output,
        "{:<w$}{:<w$}Count",
        "Age-Group",
        "% Distribution",
        w = REPORT_COLUMN_WIDTH
    );
    let _ = writeln!(output, "{}", "-".repeat(BANNER_WIDTH));
    for row in distribution.render_rows() {
        let _ = writeln!(
            output,
            "{:<w$}{:<w$}{}",
            row[0],
            row[1],
            row[2],
            w = REPORT_COLUMN_WIDTH
        );
    }
    let _ = writeln!(output, "{banner}");
    output
}

pub fn render_users(users: &[StoredUser]) -> String {
    let headers = ["id", "name", "age", "address", "additional_info"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = users
        .iter()
        .map(|user| {
            vec![
                user.id.to_string(),
                user.name.clone(),
                user.age.to_string(),
                user.address.clone().unwrap_or_default(),
                user.additional_info.clone().unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, &width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}
