// Command line front end for the passport recognition pipeline

use clap::Parser;
use log::{error, info};
use passport_ocr::{PassportValidator, PipelineConfig, ScanReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "passport-ocr", version, about = "Reads and validates passport biographic pages")]
struct Args {
    /// Passport images to process
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tesseract language(s), e.g. "eng" or "eng+fra"
    #[arg(long)]
    lang: Option<String>,

    /// Directory containing the Tesseract traineddata files
    #[arg(long)]
    tessdata: Option<String>,

    /// Treat an invalid record as a failure
    #[arg(long)]
    strict: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

// Function to print a detailed validation report
fn print_detailed_report(image: &Path, report: &ScanReport) {
    let record = &report.record;
    println!("\n===============================================");
    println!("      PASSPORT RECOGNITION DETAILED REPORT");
    println!("===============================================\n");
    println!("Image: {}", image.display());

    println!("\nPASSPORT INFORMATION:");
    println!("  Document Type: {}", record.document_type);
    println!("  Issuing Country: {}", record.issuing_country);
    println!("  Document Number: {}", record.document_number);
    println!("  Surname: {}", record.surname);
    println!("  Given Names: {}", record.given_names);
    println!("  Nationality: {}", record.nationality);
    println!("  Date of Birth: {}", record.date_of_birth);
    println!("  Gender: {}", record.gender);
    println!("  Place of Birth: {}", record.birth_place);
    println!("  Place of Issue: {}", record.place_of_issue);
    println!("  Date of Issue: {}", record.issue_date);
    println!("  Date of Expiry: {}", record.expiry_date);
    println!("  Personal Number: {}", record.personal_number);

    println!("\nMRZ CHECKS ({} segmentation, confidence {:.1}):", report.strategy, report.confidence);
    println!("  Document Number: {}", passed(report.checks.document_number));
    if report.checks.document_number_corrected {
        println!("    (corrected from OCR confusions)");
    }
    println!("  Date of Birth: {}", passed(report.checks.date_of_birth));
    println!("  Date of Expiry: {}", passed(report.checks.expiry_date));
    println!("  Personal Number: {}", passed(report.checks.personal_number));
    println!("  Composite: {}", passed(report.checks.composite));
    if report.name_recovered {
        println!("  Names recovered from a damaged name field");
    }

    if !report.outcome.errors.is_empty() {
        println!("\nERRORS:");
        for message in &report.outcome.errors {
            println!("  - {}", message);
        }
    }
    if !report.outcome.warnings.is_empty() {
        println!("\nWARNINGS:");
        for message in &report.outcome.warnings {
            println!("  - {}", message);
        }
    }

    println!(
        "\nPassport validation result: {}",
        if report.outcome.valid { "VALID" } else { "INVALID" }
    );
}

fn passed(ok: bool) -> &'static str {
    if ok {
        "PASSED"
    } else {
        "FAILED"
    }
}

fn load_config(args: &Args) -> Result<PipelineConfig, passport_ocr::utils::PassportError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(lang) = &args.lang {
        config.ocr.language = lang.clone();
    }
    if let Some(tessdata) = &args.tessdata {
        config.ocr.datapath = Some(tessdata.clone());
    }
    if args.strict {
        config.strict = true;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(2);
        }
    };
    let validator = match PassportValidator::new(&config) {
        Ok(validator) => validator,
        Err(err) => {
            error!("{}", err);
            return ExitCode::from(2);
        }
    };

    let mut failures = 0;
    for image in &args.images {
        match validator.process(image) {
            Ok(report) => {
                if args.json {
                    match serde_json::to_string_pretty(&report) {
                        Ok(json) => println!("{}", json),
                        Err(err) => {
                            error!("Failed to serialize report for {}: {}", image.display(), err);
                            failures += 1;
                        }
                    }
                } else {
                    print_detailed_report(image, &report);
                }
            }
            Err(err) => {
                match err.confidence() {
                    Some(confidence) => error!(
                        "Error processing {} (OCR confidence {:.1}): {}",
                        image.display(),
                        confidence,
                        err
                    ),
                    None => error!("Error processing {}: {}", image.display(), err),
                }
                failures += 1;
            }
        }
    }

    info!("Processed {} image(s), {} failed", args.images.len(), failures);
    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
