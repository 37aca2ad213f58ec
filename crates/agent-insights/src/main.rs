mod bootstrap;

use anyhow::Result;
use insights_core::settings::Settings;
use insights_data::export::export_to_path;
use insights_data::filter::Filters;
use insights_data::reader::Upload;
use insights_runtime::session::DashboardSession;
use insights_ui::app::App;
use insights_ui::summary::render_summary;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Agent Insights v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view, settings.theme);

    let (sessions_path, users_path) = bootstrap::resolve_inputs(&settings)?;
    let sessions = Upload::from_path(&sessions_path)?;
    let users = Upload::from_path(&users_path)?;

    let mut session = DashboardSession::default();
    let context = session.upload(&sessions, &users)?;
    let metadata = &context.data.metadata;
    tracing::info!(
        "Prepared {} merged rows from {} sessions and {} user rows in {:.2}s",
        metadata.merged_rows,
        metadata.cleaning.rows_kept,
        metadata.user_rows,
        metadata.prepare_time_seconds
    );

    let filters = Filters::from_selection(
        &context.data.records,
        &settings.agents,
        &settings.queues,
        settings.date_bounds()?,
    )?;

    let mut report = context.report(&filters);
    if settings.smooth {
        report = report.smoothed();
    }

    if let Some(path) = &settings.export {
        let written = export_to_path(path, filters.apply(&context.data.records))?;
        tracing::info!("Exported {} rows to {}", written, path.display());
    }

    match settings.view.as_str() {
        "summary" => {
            print!(
                "{}",
                render_summary(&report, &context.sessions_file, &context.users_file)
            );
        }
        "json" => {
            let output = serde_json::json!({
                "metadata": metadata,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            let app = App::new(
                &settings.theme,
                report,
                context.sessions_file.clone(),
                context.users_file.clone(),
            );
            app.run()?;
        }
    }

    Ok(())
}
