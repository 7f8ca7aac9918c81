//! Output formatting module

use placa_types::{
    DetectionDto, OcrPeriodReport, OutputFormat, PlateDetectionRecord, Result,
};

/// Print one detection record
pub fn output_record(output_format: OutputFormat, record: &PlateDetectionRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        let dto = DetectionDto::from(record);
        let content = serde_json::to_string_pretty(&dto)?;
        println!("{}", content);
    } else {
        println!("\nDetection Result");
        println!("================");
        println!("Status:          {}", record.status.label());

        if let Some(ref plate) = record.plate {
            println!("Plate:           {}", plate);
            println!(
                "Corrected:       {}",
                if record.was_corrected { "yes" } else { "no" }
            );
        }
        if let Some(conf) = record.confidence {
            println!("Confidence:      {:.0}%", conf * 100.0);
        }
        if let Some(ref kind) = record.error_kind {
            println!("Error:           {}", kind.label());
        }
        if let Some(ref engine) = record.engine {
            println!("Engine:          {}", engine);
        }
        if let Some(ref raw) = record.raw_text {
            println!("Raw text:        {}", raw);
        }
        if let Some(ref source) = record.source_id {
            println!("Source:          {}", source);
        }
        println!("Detected at:     {}", record.detected_at.to_rfc3339());
        println!("Processing:      {} ms", record.processing_time_ms);
    }

    Ok(())
}

/// Print a period report
pub fn output_report(output_format: OutputFormat, report: &OcrPeriodReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(report)?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nOCR Period Report");
    println!("=================");
    println!("Detected:        {}", report.total_detected);
    println!("Validated:       {}", report.total_validated);
    println!("Errored:         {}", report.total_errored);
    println!("Accuracy:        {:.1}%", report.accuracy_percent);
    if let Some(conf) = report.avg_confidence {
        println!("Avg confidence:  {:.0}%", conf * 100.0);
    }
    if let Some(ms) = report.avg_processing_time_ms {
        println!("Avg processing:  {:.0} ms", ms);
    }

    if !report.error_breakdown.is_empty() {
        println!("\nError breakdown");
        println!("---------------");
        println!("{:<22} {:>6} {:>8}  {}", "Kind", "Count", "AvgConf", "Example");
        for entry in &report.error_breakdown {
            println!(
                "{:<22} {:>6} {:>8}  {}",
                entry.kind.label(),
                entry.count,
                entry
                    .avg_confidence
                    .map(|c| format!("{:.0}%", c * 100.0))
                    .unwrap_or_else(|| "-".to_string()),
                entry.example_text.as_deref().unwrap_or("-"),
            );
        }
    }

    if !report.hourly_buckets.is_empty() {
        println!("\nHourly buckets");
        println!("--------------");
        println!("{:<7} {:>6} {:>9} {:>8}", "Hour", "Count", "Accuracy", "AvgConf");
        for bucket in &report.hourly_buckets {
            println!(
                "{:<7} {:>6} {:>8.1}% {:>8}",
                bucket.hour,
                bucket.count,
                bucket.accuracy_percent,
                bucket
                    .avg_confidence
                    .map(|c| format!("{:.0}%", c * 100.0))
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }

    Ok(())
}

/// Print a compact history listing
pub fn output_history(
    output_format: OutputFormat,
    records: &[&PlateDetectionRecord],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let dtos: Vec<DetectionDto> = records.iter().map(|r| DetectionDto::from(*r)).collect();
        let content = serde_json::to_string_pretty(&dtos)?;
        println!("{}", content);
        return Ok(());
    }

    println!(
        "{:<20} {:<9} {:<15} {:>8} {:<8}",
        "Detected at", "Plate", "Status", "Conf", "Source"
    );
    println!("{}", "-".repeat(66));
    for record in records {
        println!(
            "{:<20} {:<9} {:<15} {:>8} {:<8}",
            record.detected_at.format("%Y-%m-%d %H:%M:%S"),
            record.plate.as_deref().unwrap_or("-"),
            record.status.label(),
            record
                .confidence
                .map(|c| format!("{:.0}%", c * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            record.source_id.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
