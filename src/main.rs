use anyhow::Context;
use clap::Parser;
use filegather::ui::ask_for_request;
use filegather::{
    Cli, Config, FileGather, FileGatherError, OutputFormatter, SearchRequest, UserFriendlyError,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return code;
        }
    };

    setup_logging(cli.verbosity_level(), cli.quiet);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let gather = match FileGather::from_cli(&cli) {
        Ok(gather) => gather,
        Err(e) => {
            print_startup_error(&cli, &e);
            return e.exit_code();
        }
    };

    let request = match resolve_request(&cli, gather.config()) {
        Ok(request) => request,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<FileGatherError>() {
                gather.handle_error(err);
                return err.exit_code();
            }
            gather.output_formatter().error(&format!("{:#}", e));
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&gather, &request);
    }

    match gather.run(&request) {
        Ok(report) => {
            gather.output_formatter().print_extraction_report(&report);

            if report.has_failures() {
                2
            } else {
                0
            }
        }
        Err(e) => {
            gather.handle_error(&e);
            e.exit_code()
        }
    }
}

/// Takes the request from flags and config, or asks for it.
fn resolve_request(cli: &Cli, config: &Config) -> anyhow::Result<SearchRequest> {
    if !cli.needs_prompt(config) {
        return Ok(cli.search_request(config)?);
    }

    let answers =
        ask_for_request(&cli.prompt_defaults(config)).context("Interactive input failed")?;
    Ok(answers.into_request()?)
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "filegather.toml".to_string());

    match FileGather::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  filegather <folder> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(gather: &FileGather, request: &SearchRequest) -> i32 {
    let formatter = gather.output_formatter();

    formatter.info("DRY RUN MODE - No files will be moved");

    match gather.plan(request) {
        Ok(plan) => {
            formatter.print_match_count(plan.len(), &request.extension);
            formatter.print_plan(&plan);
            if !plan.is_empty() {
                formatter.success("Dry run completed");
                formatter.info("Run without --dry-run to move the files");
            }
            0
        }
        Err(e) => {
            gather.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_startup_error(cli: &Cli, error: &FileGatherError) {
    let formatter = OutputFormatter::new(cli.output_mode(), 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr; `RUST_LOG` wins over the verbosity flags.
fn setup_logging(verbosity: u8, quiet: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("filegather={}", level).into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
