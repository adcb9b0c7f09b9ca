mod bootstrap;

use stats_core::error::Result;
use stats_core::models::AllowList;
use stats_core::settings::Settings;
use stats_data::analysis::{run_analyze, run_collect, run_insights};

fn main() {
    let settings = Settings::load_with_last_used();

    if let Err(e) = bootstrap::ensure_directories() {
        eprintln!("Failed to prepare config directory: {}", e);
    }
    if let Err(e) = bootstrap::setup_logging(&settings.log_level) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    tracing::info!("chat-stats v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Stage: {}, data dir: {}, {} participant(s) retained",
        settings.stage,
        settings.data_dir.display(),
        settings.participants.len()
    );

    if let Err(e) = run(&settings) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(settings: &Settings) -> Result<()> {
    match settings.stage.as_str() {
        "collect" => collect(settings),
        "analyze" => analyze(settings),
        "insights" => insights(settings),
        // clap's value parser restricts everything else to "full".
        _ => {
            collect(settings)?;
            analyze(settings)?;
            insights(settings)
        }
    }
}

fn collect(settings: &Settings) -> Result<()> {
    let allow_list = AllowList::new(settings.participants.iter().cloned());
    if allow_list.is_empty() {
        tracing::warn!("Participant allow-list is empty; no messages will be retained");
    }

    let summary = run_collect(&settings.data_dir, &allow_list, &settings.messages_file)?;
    tracing::info!(
        "Collected {} messages in {:.2}s",
        summary.messages_collected,
        summary.elapsed_seconds
    );
    Ok(())
}

fn analyze(settings: &Settings) -> Result<()> {
    let summary = run_analyze(&settings.messages_file, &settings.report_file)?;
    tracing::info!(
        "Aggregated {} messages ({} words) across {} participants in {:.2}s",
        summary.total_message_count,
        summary.total_word_count,
        summary.participants,
        summary.elapsed_seconds
    );
    Ok(())
}

fn insights(settings: &Settings) -> Result<()> {
    let summary = run_insights(
        &settings.messages_file,
        &settings.insights_file,
        &settings.track_words,
    )?;
    tracing::info!(
        "Derived insights from {} text messages across {} participants in {:.2}s",
        summary.text_messages,
        summary.participants,
        summary.elapsed_seconds
    );
    Ok(())
}
