//! HTML invoice document builder.
//!
//! Produces a single self-contained HTML document: payee letterhead, one
//! table per week with a `TOTAL DUE FOR WEEK n` row, and a monthly grand
//! total. Every amount arrives pre-formatted; this module only lays it out.

use chrono::NaiveDate;

use invoice_core::models::RenderedInvoice;
use invoice_core::settings::UserProfile;

/// Letterhead and document-level fields for one invoice.
#[derive(Debug, Clone)]
pub struct InvoiceContext {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub town: String,
    pub postcode: String,
    pub account_no: String,
    pub sort_code: String,
    /// `YYYYMM`.
    pub invoice_no: String,
    /// e.g. "08 Aug 2026".
    pub invoice_date: String,
    /// e.g. "March 2024".
    pub period: String,
    /// Pre-formatted monthly total, e.g. "£240.00".
    pub monthly_total: String,
}

impl InvoiceContext {
    /// Assemble the context from the payee profile and the billing month.
    pub fn new(
        profile: &UserProfile,
        month: u32,
        year: i32,
        issued_on: NaiveDate,
        monthly_total: &str,
    ) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            address: profile.address.clone(),
            town: profile.town.clone(),
            postcode: profile.postcode.clone(),
            account_no: profile.account_no.clone(),
            sort_code: profile.sort_code.clone(),
            invoice_no: format!("{}{:02}", year, month),
            invoice_date: issued_on.format("%d %b %Y").to_string(),
            period: period_name(month, year),
            monthly_total: monthly_total.to_string(),
        }
    }
}

/// "March 2024" for `(3, 2024)`; falls back to `M/YYYY` for an invalid month.
pub fn period_name(month: u32, year: i32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%B %Y").to_string(),
        None => format!("{}/{}", month, year),
    }
}

/// Render the full HTML invoice document.
pub fn render_document(invoice: &RenderedInvoice, ctx: &InvoiceContext) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Invoice {} — {}</title>\n",
        escape(&ctx.invoice_no),
        escape(&ctx.period)
    ));
    out.push_str(STYLE);
    out.push_str("</head>\n<body>\n");

    // Letterhead.
    out.push_str("<div class=\"letterhead\">\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&ctx.full_name)));
    out.push_str(&format!(
        "<p>{}<br>{}<br>{}</p>\n",
        escape(&ctx.address),
        escape(&ctx.town),
        escape(&ctx.postcode)
    ));
    out.push_str(&format!("<p>{}</p>\n", escape(&ctx.email)));
    out.push_str(&format!(
        "<p>Invoice no. {} &middot; {}</p>\n",
        escape(&ctx.invoice_no),
        escape(&ctx.invoice_date)
    ));
    out.push_str("</div>\n");

    out.push_str(&format!("<h2>Lessons — {}</h2>\n", escape(&ctx.period)));

    // One table per week.
    for (i, week) in invoice.weeks.iter().enumerate() {
        out.push_str("<table>\n");
        out.push_str(
            "<tr><th>Date</th><th>Student</th><th>Rate</th><th>Hours</th><th>Earned</th></tr>\n",
        );
        for lesson in &week.lessons {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"bold\">{}</td></tr>\n",
                escape(&lesson.date),
                escape(&lesson.student),
                escape(&lesson.rate),
                escape(&lesson.hours),
                escape(&lesson.earned)
            ));
        }
        out.push_str(&format!(
            "<tr><td colspan=\"4\" class=\"week-total\"><strong>TOTAL DUE FOR WEEK {}</strong></td><td class=\"total\"><strong>{}</strong></td></tr>\n",
            i + 1,
            escape(&week.total)
        ));
        out.push_str("</table>\n");
    }

    // Grand total and payment details.
    out.push_str(&format!(
        "<p class=\"grand-total\">Total for {}: <strong>{}</strong></p>\n",
        escape(&ctx.period),
        escape(&ctx.monthly_total)
    ));
    out.push_str(&format!(
        "<p class=\"payment\">Account no. {} &middot; Sort code {}</p>\n",
        escape(&ctx.account_no),
        escape(&ctx.sort_code)
    ));

    out.push_str("</body>\n</html>\n");
    out
}

const STYLE: &str = "<style>\n\
body { font-family: Arial, sans-serif; font-size: 10pt; margin: 2em; }\n\
table { border-collapse: collapse; width: 100%; margin-bottom: 1.5em; }\n\
th, td { border: 1px solid #444; padding: 4px 8px; text-align: left; }\n\
.bold { font-weight: bold; }\n\
.week-total { text-align: right; }\n\
.grand-total { font-size: 12pt; text-align: right; }\n\
.payment { color: #444; }\n\
</style>\n";

/// Minimal HTML escaping for user-supplied text.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
