//! Command handlers

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};

use placa_app::{
    build_recognizer, day_range, detect_plate_image, export_records_csv, period_report,
    recognize_image, Config, DetectOptions,
};
use placa_store::DetectionStore;
use placa_types::{Error, OutputFormat, PlateDetectionRecord, Result};

use crate::cli::{Cli, Commands};
use crate::output::{output_history, output_record, output_report};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::Detect {
            image,
            source,
            quality,
            no_store,
        } => cmd_detect(
            &config,
            image.clone(),
            source.clone(),
            *quality,
            !no_store,
            output_format,
        ),

        Commands::Batch {
            folder,
            output,
            jobs,
            source,
            no_store,
        } => {
            // Use CLI jobs if specified, otherwise default 4. 0 = auto CPU count.
            let job_count = match jobs {
                Some(0) => num_cpus::get(),
                Some(n) => *n,
                None => 4,
            };
            cmd_batch(
                &config,
                folder.clone(),
                output.clone(),
                job_count,
                source.clone(),
                !no_store,
                output_format,
                cli.verbose,
            )
        }

        Commands::Report { from, to, csv } => {
            cmd_report(&config, *from, *to, csv.clone(), output_format)
        }

        Commands::History { limit } => cmd_history(&config, *limit, output_format),

        Commands::Config {
            show,
            set_plate_engine,
            set_ocr_engine,
            set_threshold,
            set_timeout_ms,
            set_preprocess,
            set_output,
            reset,
        } => cmd_config(
            config,
            *show,
            set_plate_engine.clone(),
            set_ocr_engine.clone(),
            *set_threshold,
            *set_timeout_ms,
            *set_preprocess,
            *set_output,
            *reset,
        ),
    }
}

fn cmd_detect(
    config: &Config,
    image: PathBuf,
    source: Option<String>,
    quality: Option<f64>,
    store_result: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let mut options = DetectOptions::new().with_store(store_result);
    if let Some(source) = source {
        options = options.with_source(source);
    }
    if let Some(quality) = quality {
        options = options.with_image_quality(quality);
    }

    let record = detect_plate_image(&image, config, &options)
        .map_err(|e| Error::Detection(e.to_string()))?;

    output_record(output_format, &record)
}

#[allow(clippy::too_many_arguments)]
fn cmd_batch(
    config: &Config,
    folder: PathBuf,
    output: Option<PathBuf>,
    jobs: usize,
    source: Option<String>,
    store_results: bool,
    output_format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let images = placa_app::scanner::scan_directory(&folder)?;
    if images.is_empty() {
        eprintln!("No images found in {}", folder.display());
        return Ok(());
    }

    eprintln!(
        "Processing {} images with {} workers...",
        images.len(),
        jobs
    );

    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut options = DetectOptions::new().with_store(false);
    if let Some(source) = source {
        options = options.with_source(source);
    }

    let images = Arc::new(images);
    let next_index = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();

    let mut workers = Vec::new();
    for _ in 0..jobs.max(1) {
        let images = Arc::clone(&images);
        let next_index = Arc::clone(&next_index);
        let tx = tx.clone();
        let config = config.clone();
        let options = options.clone();

        workers.push(thread::spawn(move || {
            // Engines are stateless command invocations; each worker keeps
            // its own recognizer.
            let recognizer = build_recognizer(&config);
            loop {
                let index = next_index.fetch_add(1, Ordering::SeqCst);
                if index >= images.len() {
                    break;
                }
                let path = &images[index];
                let result = recognize_image(path, &recognizer, &options);
                if tx.send((path.clone(), result)).is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    // Single writer folds results into the history
    let mut store = if store_results {
        Some(DetectionStore::open(config.store_dir()?)?)
    } else {
        None
    };

    let mut records: Vec<PlateDetectionRecord> = Vec::new();
    let mut failed = 0usize;

    for (path, result) in rx {
        progress.inc(1);
        match result {
            Ok(record) => {
                progress.set_message(record.plate.clone().unwrap_or_default());
                if let Some(ref mut store) = store {
                    store.append(record.clone())?;
                }
                records.push(record);
            }
            Err(e) => {
                failed += 1;
                if verbose {
                    eprintln!("{}: {}", path.display(), e);
                }
            }
        }
    }

    for worker in workers {
        let _ = worker.join();
    }
    progress.finish_and_clear();

    let validated = records.iter().filter(|r| r.is_validated()).count();
    let errored = records.iter().filter(|r| r.is_errored()).count();
    eprintln!(
        "Done: {} processed, {} validated, {} errored, {} unreadable",
        records.len(),
        validated,
        errored,
        failed
    );

    if let Some(output) = output {
        let content = serde_json::to_string_pretty(&records)?;
        std::fs::write(&output, content)?;
        eprintln!("Results written to {}", output.display());
    }

    if output_format == OutputFormat::Json {
        let refs: Vec<&PlateDetectionRecord> = records.iter().collect();
        output_history(output_format, &refs)?;
    }

    Ok(())
}

fn cmd_report(
    config: &Config,
    from: NaiveDate,
    to: Option<NaiveDate>,
    csv: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let range = day_range(from, to.unwrap_or(from))?;
    let report = period_report(config, &range)?;

    output_report(output_format, &report)?;

    if let Some(csv_path) = csv {
        let records = placa_app::records_in_range(config, &range)?;
        export_records_csv(&records, &csv_path)?;
        eprintln!("Records exported to {}", csv_path.display());
    }

    Ok(())
}

fn cmd_history(config: &Config, limit: usize, output_format: OutputFormat) -> Result<()> {
    let store = DetectionStore::open(config.store_dir()?)?;
    let all = store.all_records();
    let records: Vec<_> = all.into_iter().take(limit).collect();

    if records.is_empty() {
        eprintln!("Detection history is empty");
        return Ok(());
    }

    output_history(output_format, &records)
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    mut config: Config,
    show: bool,
    set_plate_engine: Option<String>,
    set_ocr_engine: Option<String>,
    set_threshold: Option<f64>,
    set_timeout_ms: Option<u64>,
    set_preprocess: Option<bool>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut changed = false;

    if let Some(command) = set_plate_engine {
        config.plate_engine_command = if command.is_empty() {
            None
        } else {
            Some(command)
        };
        changed = true;
    }
    if let Some(command) = set_ocr_engine {
        config.ocr_engine_command = if command.is_empty() {
            None
        } else {
            Some(command)
        };
        changed = true;
    }
    if let Some(threshold) = set_threshold {
        config.confidence_threshold = threshold.clamp(0.0, 1.0);
        changed = true;
    }
    if let Some(timeout_ms) = set_timeout_ms {
        config.engine_timeout_ms = timeout_ms;
        changed = true;
    }
    if let Some(preprocess) = set_preprocess {
        config.preprocess_fallback = preprocess;
        changed = true;
    }
    if let Some(output) = set_output {
        config.output_format = output;
        changed = true;
    }

    if changed {
        config.save()?;
        println!("Configuration saved");
    }

    if show || !changed {
        print!("{}", config);
    }

    Ok(())
}
