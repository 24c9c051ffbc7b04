//! Plain-text table rendering for terminal output.

use invoice_core::models::RenderedInvoice;

const HEADERS: [&str; 5] = ["Date", "Student", "Rate", "Hours", "Earned"];

/// Render the invoice as an aligned plain-text table, one block per week.
pub fn render_table(invoice: &RenderedInvoice) -> String {
    if invoice.weeks.is_empty() {
        return format!("No lessons for this month. Total: {}\n", invoice.grand_total);
    }

    let widths = column_widths(invoice);
    let mut out = String::new();

    for (i, week) in invoice.weeks.iter().enumerate() {
        out.push_str(&format!("Week {}\n", i + 1));

        for (col, header) in HEADERS.iter().enumerate() {
            out.push_str(&pad(header, widths[col]));
            if col + 1 < HEADERS.len() {
                out.push_str("  ");
            }
        }
        out.push('\n');

        for lesson in &week.lessons {
            let cells = [
                lesson.date.as_str(),
                lesson.student.as_str(),
                lesson.rate.as_str(),
                lesson.hours.as_str(),
                lesson.earned.as_str(),
            ];
            for (col, cell) in cells.iter().enumerate() {
                out.push_str(&pad(cell, widths[col]));
                if col + 1 < cells.len() {
                    out.push_str("  ");
                }
            }
            out.push('\n');
        }

        out.push_str(&format!("Total due for week {}: {}\n\n", i + 1, week.total));
    }

    out.push_str(&format!("Monthly total: {}\n", invoice.grand_total));
    out
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Widest cell per column, headers included.
fn column_widths(invoice: &RenderedInvoice) -> [usize; 5] {
    let mut widths = [0usize; 5];
    for (col, header) in HEADERS.iter().enumerate() {
        widths[col] = display_width(header);
    }
    for week in &invoice.weeks {
        for lesson in &week.lessons {
            let cells = [
                lesson.date.as_str(),
                lesson.student.as_str(),
                lesson.rate.as_str(),
                lesson.hours.as_str(),
                lesson.earned.as_str(),
            ];
            for (col, cell) in cells.iter().enumerate() {
                widths[col] = widths[col].max(display_width(cell));
            }
        }
    }
    widths
}

/// Character count, not byte length; currency markers are multi-byte.
fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, width: usize) -> String {
    let mut out = s.to_string();
    for _ in display_width(s)..width {
        out.push(' ');
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
