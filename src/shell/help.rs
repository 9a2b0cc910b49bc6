//! Help text formatting: docstring dedent and column layout.

use crate::constants::DEFAULT_HELP_WIDTH;

/// Normalize a command's documentation for display.
///
/// The first line is stripped on its own, the common indentation of the
/// remaining lines is removed, and leading/trailing blank lines are dropped.
pub fn trim_docstring(doc: &str) -> String {
    if doc.is_empty() {
        return String::new();
    }

    let expanded = doc.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    // The first line doesn't count towards the indentation
    let indent = rest
        .iter()
        .filter_map(|line| {
            let stripped = line.trim_start();
            (!stripped.is_empty()).then(|| line.len() - stripped.len())
        })
        .min();

    let mut trimmed = vec![first.trim().to_string()];
    if let Some(indent) = indent {
        for line in rest {
            trimmed.push(line.get(indent..).unwrap_or("").trim_end().to_string());
        }
    }

    while trimmed.last().is_some_and(|line| line.is_empty()) {
        trimmed.pop();
    }
    while trimmed.first().is_some_and(|line| line.is_empty()) {
        trimmed.remove(0);
    }

    trimmed.join("\n")
}

/// Lay out `names` in as few rows as fit within `width` columns.
///
/// Columns are separated by two spaces and filled top to bottom.
pub fn columnize(names: &[String], width: usize) -> String {
    match names.len() {
        0 => return "<empty>\n".to_string(),
        1 => return format!("{}\n", names[0]),
        _ => {}
    }

    let size = names.len();
    let mut layout = None;
    for nrows in 1..size {
        let ncols = size.div_ceil(nrows);
        let mut widths = Vec::with_capacity(ncols);
        let mut total: isize = -2;
        for col in 0..ncols {
            let col_width = (0..nrows)
                .map(|row| row + nrows * col)
                .take_while(|&i| i < size)
                .map(|i| names[i].chars().count())
                .max()
                .unwrap_or(0);
            widths.push(col_width);
            total += col_width as isize + 2;
            if total > width as isize {
                break;
            }
        }
        if total <= width as isize {
            layout = Some((nrows, widths));
            break;
        }
    }
    let (nrows, widths) = layout.unwrap_or_else(|| (size, vec![0]));

    let mut out = String::new();
    for row in 0..nrows {
        let mut texts: Vec<&str> = (0..widths.len())
            .map(|col| names.get(row + nrows * col).map_or("", String::as_str))
            .collect();
        while texts.last().is_some_and(|text| text.is_empty()) {
            texts.pop();
        }
        let line = texts
            .iter()
            .enumerate()
            .map(|(col, text)| format!("{:<width$}", text, width = widths[col]))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Current terminal width, or a fixed fallback when stdout is not a terminal.
pub fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(DEFAULT_HELP_WIDTH)
}
