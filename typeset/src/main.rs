use std::{
    env, fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use typeset_core::{config, process, ProcessorConfig};

fn main() -> ExitCode {
    env_logger::init();

    // typeset [CONFIG.toml|CONFIG.json] [INPUT]
    let args: Vec<String> = env::args().skip(1).collect();
    let (config_arg, input_arg) = split_args(&args);

    let cfg = match load_config(config_arg) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let html = match read_input(input_arg) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Failed to read input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = cfg
        .apply_to(process(html))
        .and_then(|processor| processor.apply());
    match result {
        Ok(out) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(out.as_bytes()).and_then(|_| stdout.flush()) {
                eprintln!("Failed to write output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn is_config_path(arg: &str) -> bool {
    let lower = arg.to_ascii_lowercase();
    lower.ends_with(".toml") || lower.ends_with(".json")
}

fn split_args(args: &[String]) -> (Option<&str>, Option<&str>) {
    let config = args.iter().find(|a| is_config_path(a)).map(String::as_str);
    let input = args
        .iter()
        .find(|a| !is_config_path(a))
        .map(String::as_str);
    (config, input)
}

/// Explicit path, then `TYPESET_CONFIG`, then the per-user default; built-in
/// defaults when none of them exists.
fn load_config(explicit: Option<&str>) -> typeset_core::Result<ProcessorConfig> {
    if let Some(path) = explicit {
        return ProcessorConfig::load(Path::new(path));
    }
    if let Ok(path) = env::var("TYPESET_CONFIG") {
        return ProcessorConfig::load(Path::new(&path));
    }
    let default_path: Option<PathBuf> = config::default_config_path();
    if let Some(path) = default_path.filter(|p| p.exists()) {
        match ProcessorConfig::load(&path) {
            Ok(cfg) => return Ok(cfg),
            Err(e) => log::warn!("ignoring {}: {}", path.display(), e),
        }
    }
    Ok(ProcessorConfig::standard())
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some("-") | None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => fs::read_to_string(path),
    }
}
