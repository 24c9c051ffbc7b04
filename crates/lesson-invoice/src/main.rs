mod bootstrap;

use anyhow::Result;
use clap::Parser;

use invoice_core::settings::{Settings, UserProfile};
use invoice_data::pipeline::{build_invoice, sync_events};
use invoice_data::store::LessonStore;
use invoice_render::{html, text};

fn main() -> Result<()> {
    let settings = Settings::parse();

    if settings.clear {
        UserProfile::clear()?;
        println!("Saved profile removed.");
        return Ok(());
    }

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(settings.effective_log_level(), settings.log_file.as_ref())?;

    tracing::info!("lesson-invoice v{} starting", env!("CARGO_PKG_VERSION"));

    let profile = UserProfile::load();
    let config = profile.billing_config();
    config.validate()?;
    if config.hourly_rate == 0.0 {
        tracing::warn!(
            "Hourly rate is 0; fill in the profile at {}",
            UserProfile::config_path().display()
        );
    }

    let (month, year) = settings.billing_month();
    let db_path = settings.db.clone().unwrap_or_else(bootstrap::default_db_path);
    let mut store = LessonStore::open(&db_path)?;

    if !settings.skip_sync {
        let report = sync_events(&settings.events, &config, &mut store)?;
        if report.skipped > 0 {
            eprintln!(
                "{} event(s) excluded during sync: {}",
                report.skipped,
                report.skipped_ids.join(", ")
            );
        }
    }

    let run = build_invoice(month, year, &config, &store)?;

    match settings.view.as_str() {
        "text" => print!("{}", text::render_table(&run.rendered)),
        _ => {
            let issued_on = chrono::Local::now().date_naive();
            let ctx = html::InvoiceContext::new(
                &profile,
                month,
                year,
                issued_on,
                &run.rendered.grand_total,
            );
            let document = html::render_document(&run.rendered, &ctx);

            let output = settings
                .output
                .clone()
                .unwrap_or_else(|| bootstrap::default_invoice_path(year, month));
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output, document)?;
            println!("Invoice written to {}", output.display());
        }
    }

    Ok(())
}
