use std::fmt::Write;

use crate::models::{DataType, QueryLogEntry, QueryOutcome, QueryResult, Role, StudentRecord};

const HEADERS: [&str; 7] = ["Name", "Grade", "Class", "Region", "Submitted", "Quiz score", "Date"];

fn cells(record: &StudentRecord) -> [String; 7] {
    [
        record.name.clone(),
        record.grade.clone(),
        record.class.clone(),
        record.region.clone(),
        if record.submitted { "yes" } else { "no" }.to_string(),
        record
            .quiz_score
            .map(|score| format!("{score:.1}"))
            .unwrap_or_else(|| "-".to_string()),
        record.date.to_string(),
    ]
}

pub fn render_table(records: &[StudentRecord]) -> String {
    let rows: Vec<[String; 7]> = records.iter().map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in rows.iter() {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(title, &width)| format!("{title:<width$}"))
        .collect();
    let _ = writeln!(output, "{}", header.join(" | ").trim_end());

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let _ = writeln!(output, "{}", rule.join("-+-"));

    for row in rows.iter() {
        let line: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(output, "{}", line.join(" | ").trim_end());
    }

    output
}

pub fn render_result(result: &QueryResult, role: &Role) -> String {
    let mut output = String::new();

    if result.rows.is_empty() {
        if !result.scope_conflicts.is_empty() {
            let dimensions: Vec<String> =
                result.scope_conflicts.iter().map(|d| d.to_string()).collect();
            let _ = writeln!(
                output,
                "Access denied: the requested {} is outside the scope of role {}.",
                dimensions.join(" and "),
                role.name
            );
            return output;
        }

        let message = match (result.data_type, result.submitted) {
            (_, Some(false)) => "Everyone in scope has submitted.",
            (_, Some(true)) => "No one in scope has submitted yet.",
            (Some(DataType::SubmissionStatus), None) => "No matching students.",
            (Some(DataType::Performance), _) => "No performance data matches this question.",
            _ => "No matching records.",
        };
        let _ = writeln!(output, "{message}");
        return output;
    }

    output.push_str(&render_table(&result.rows));
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{} row{} ({})",
        result.rows.len(),
        if result.rows.len() == 1 { "" } else { "s" },
        result
            .data_type
            .map(|d| d.to_string())
            .unwrap_or_else(|| "all data".to_string())
    );

    output
}

pub fn render_log(entries: &[QueryLogEntry]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Query Log");

    if entries.is_empty() {
        let _ = writeln!(output, "No questions asked in this session.");
        return output;
    }

    for entry in entries.iter() {
        let outcome = match &entry.outcome {
            QueryOutcome::Rows(count) => format!("{count} rows"),
            QueryOutcome::Failed(kind) => format!("failed: {kind}"),
        };
        let _ = writeln!(
            output,
            "- [{}] {} asked \"{}\" -> {}",
            entry.asked_at.format("%H:%M:%S"),
            entry.role,
            entry.question,
            outcome
        );
    }

    output
}

pub fn render_roles(roles: &[Role]) -> String {
    let mut output = String::new();
    for role in roles.iter() {
        let _ = writeln!(
            output,
            "- {}: grade {}, class {}, region {}",
            role.name,
            role.grade.as_deref().unwrap_or("any"),
            role.class.as_deref().unwrap_or("any"),
            role.region.as_deref().unwrap_or("any")
        );
    }
    output
}
