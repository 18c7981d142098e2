use std::{fs, process};

use clap::Parser;
use register_check_cli::{App, Command};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Verify(args) => verify(args),
        Command::Generate(args) => generate(args),
    }
}

fn generate(args: &register_check_cli::GenerateArgs) {
    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output directory: {e}");
        process::exit(1);
    });

    let histories = register_check_testgen::generator::generate_mult_histories(
        args.n_hist,
        args.n_process,
        args.n_write,
        args.n_read,
    );

    for history in &histories {
        let path = args.output_dir.join(format!("{}.json", history.get_id()));
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            eprintln!("Failed to create {}: {e}", path.display());
            process::exit(1);
        });
        serde_json::to_writer_pretty(file, history).unwrap_or_else(|e| {
            eprintln!("Failed to write {}: {e}", path.display());
            process::exit(1);
        });
    }

    println!(
        "Generated {} histories to {}",
        histories.len(),
        args.output_dir.display()
    );
}

fn verify(args: &register_check_cli::VerifyArgs) {
    let mut any_failed = false;

    let mut entries: Vec<_> = fs::read_dir(&args.input_dir)
        .unwrap_or_else(|e| {
            eprintln!("Failed to read input directory: {e}");
            process::exit(1);
        })
        .filter_map(Result::ok)
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "json" || ext == "hist")
        })
        .collect();

    entries.sort_by_key(fs::DirEntry::path);

    if entries.is_empty() {
        eprintln!("No .json/.hist files found in {}", args.input_dir.display());
        process::exit(1);
    }

    for entry in entries {
        let path = entry.path();
        let filename = path.file_name().unwrap_or_default().to_string_lossy().into_owned();

        let outcome = if path.extension().is_some_and(|ext| ext == "json") {
            verify_json(&path, args.concurrency)
        } else {
            verify_hist(&path, args.concurrency)
        };

        match outcome {
            Ok(None) => println!("{filename}: PASS"),
            Ok(Some(details)) => {
                println!("{filename}: FAIL ({details})");
                any_failed = true;
            }
            Err(e) => {
                println!("{filename}: FAIL ({e})");
                any_failed = true;
            }
        }
    }

    if any_failed {
        process::exit(1);
    }
}

/// Verify a `*.json` file, returning `Ok(None)` when valid or
/// `Ok(Some(details))` naming the violation.
fn verify_json(path: &std::path::Path, concurrency: usize) -> Result<Option<String>, String> {
    let file = fs::File::open(path).map_err(|e| e.to_string())?;
    let history: register_check_testgen::generator::History =
        serde_json::from_reader(file).map_err(|e| e.to_string())?;
    let verdict = register_check_core::check(
        history.get_data(),
        concurrency,
        register_check_testgen::generator::GENESIS,
    )
    .map_err(|e| e.to_string())?;
    Ok(verdict.details())
}

/// Verify a `*.hist` text-DSL file; same contract as [`verify_json`].
fn verify_hist(path: &std::path::Path, concurrency: usize) -> Result<Option<String>, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let events = register_check_parser::parse_history(&text).map_err(|e| e.to_string())?;
    let verdict = register_check_core::check(&events, concurrency, ("w0".to_string(), "v0".to_string()))
        .map_err(|e| e.to_string())?;
    Ok(verdict.details())
}
