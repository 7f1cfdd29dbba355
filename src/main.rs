use clap::Parser;
use merit_rank::core::export::save_exports;
use merit_rank::domain::model::SelectionCatalog;
use merit_rank::utils::error::ErrorSeverity;
use merit_rank::utils::{logger, validation::Validate};
use merit_rank::{CliArgs, LocalStorage, MeritList, RankingEngine, RankingError, RestBackend};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting merit-rank");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let policy = config.ranking_policy()?;
    let formats = config.export_formats()?;
    let backend = Arc::new(RestBackend::from_config(
        &config.backend,
        config.endpoint_paths(),
    )?);
    let engine = RankingEngine::from_backend(backend).with_policy(policy);

    if args.list_options {
        match engine.catalog().await {
            Ok(catalog) => print_catalog(&catalog),
            Err(e) => exit_with(e),
        }
        return Ok(());
    }

    match engine.run(&args.selection()).await {
        Ok(run) => {
            print_merit_list(&run.merit_list);

            if !formats.is_empty() {
                let storage =
                    LocalStorage::new(config.output_path().unwrap_or("./output").to_string());
                match save_exports(&storage, &run.merit_list, &formats).await {
                    Ok(files) => {
                        for file in files {
                            println!("📁 Saved {}/{}", storage.base_path(), file);
                        }
                    }
                    Err(e) => tracing::error!("❌ Export failed: {}", e),
                }
            }

            // Let the report-card update go out before the process exits.
            if let Err(e) = run.persist.await {
                tracing::warn!("Position update task did not finish: {}", e);
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: RankingError) -> ! {
    tracing::error!(
        "❌ Ranking failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4, // nothing to rank
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_merit_list(list: &MeritList) {
    let columns = list.subject_columns();

    println!("🏆 Merit list: {}", list.scope);
    println!();

    let mut header = format!("{:<6} {:<28}", "Pos", "Student");
    for column in &columns {
        header.push_str(&format!(" {:>12}", truncate(column, 12)));
    }
    header.push_str(&format!(" {:>10}", "Total"));
    println!("{}", header);
    println!("{}", "-".repeat(header.chars().count()));

    for row in &list.rows {
        let mut line = format!(
            "{:<6} {:<28}",
            row.position_suffix,
            truncate(&row.score.name, 28)
        );
        for column in &columns {
            let cell = row
                .score
                .subject_scores
                .get(column)
                .map(|marks| marks.to_string())
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {:>12}", cell));
        }
        line.push_str(&format!(" {:>10}", row.score.grand_total));
        println!("{}", line);
    }

    println!();
    println!("{} students ranked", list.rows.len());
}

fn print_catalog(catalog: &SelectionCatalog) {
    println!("📋 Classes:");
    for class in &catalog.classes {
        println!("  {:>6}  {}", class.id, class.name);
    }
    println!();
    println!("📚 Subjects:");
    for subject in &catalog.subjects {
        println!("  {:>6}  {}", subject.id, subject.name);
    }
    println!();
    println!("🗓️ Terms:");
    for period in &catalog.periods {
        println!("  term {} of {}", period.term, period.academic_year);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
