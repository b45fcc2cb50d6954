mod args;

use args::{Args, Mode};
use screen_finder::{
    CaptureSource, CancelToken, Finder, FinderConfig, Match, Pattern, Region, VirtualScreen,
    VisionError, VisionResult, WaitOutcome,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let Some(args) = Args::parse() else {
        return ExitCode::SUCCESS;
    };

    let default_level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> VisionResult<ExitCode> {
    let source: Arc<dyn CaptureSource> = match &args.screen {
        Some(path) => Arc::new(VirtualScreen::from_file(path)?),
        None => live_source()?,
    };
    let finder = Finder::with_config(source, FinderConfig::from_env());
    log::debug!("Using {:?}", finder);

    match &args.mode {
        Mode::Find { pattern } => find(&finder, args, pattern),
        Mode::Wait { pattern } => wait(&finder, args, pattern),
        Mode::Capture { out } => capture(&finder, args, out),
    }
}

#[cfg(feature = "xcap")]
fn live_source() -> VisionResult<Arc<dyn CaptureSource>> {
    Ok(Arc::new(screen_finder::ScreenCapture::new()))
}

#[cfg(not(feature = "xcap"))]
fn live_source() -> VisionResult<Arc<dyn CaptureSource>> {
    Err(VisionError::capture_unavailable(
        "live capture needs the `xcap` feature; pass --screen=FILE instead",
    ))
}

/// Loads the pattern and picks the region to search: `--region` wins over
/// the file name hint.
fn load_target(finder: &Finder, args: &Args, path: &Path) -> VisionResult<(Pattern, Region)> {
    let threshold = args
        .threshold
        .unwrap_or(finder.config().default_threshold);
    let pattern = finder.load_pattern(path, threshold)?;
    let region = match args.region {
        Some(region) => region,
        None => finder.search_region_for(&pattern)?,
    };
    Ok((pattern, region))
}

fn find(finder: &Finder, args: &Args, pattern_path: &Path) -> VisionResult<ExitCode> {
    let (pattern, region) = load_target(finder, args, pattern_path)?;
    let frame = finder.capture(region)?;
    let matches = finder.find(frame, &pattern);

    print_matches(&matches, args.json);
    Ok(if matches.is_empty() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn wait(finder: &Finder, args: &Args, pattern_path: &Path) -> VisionResult<ExitCode> {
    let (pattern, region) = load_target(finder, args, pattern_path)?;
    let wait_config = &finder.config().wait_config;
    let timeout = args.timeout.unwrap_or(wait_config.timeout);
    let interval = args.interval.unwrap_or(wait_config.poll_interval);

    println!(
        "⏳ Waiting up to {:.1}s for '{}' in {}...",
        timeout.as_secs_f64(),
        pattern.name(),
        region
    );

    let rt = tokio::runtime::Runtime::new().map_err(|e| VisionError::TaskFailed {
        reason: format!("failed to start runtime: {}", e),
    })?;
    let cancel = CancelToken::new();
    let outcome =
        rt.block_on(finder.wait_for_async(region, &pattern, timeout, interval, &cancel))?;

    if args.json {
        let body = serde_json::json!({
            "state": format!("{:?}", outcome.state()),
            "match": outcome.clone().found(),
        });
        println!("{}", body);
    }

    Ok(match outcome {
        WaitOutcome::Found(m) => {
            if !args.json {
                println!("✅ Found {}", m);
            }
            ExitCode::SUCCESS
        }
        WaitOutcome::TimedOut { elapsed, attempts } => {
            if !args.json {
                println!(
                    "⏰ '{}' not found after {:.1}s ({} attempts)",
                    pattern.name(),
                    elapsed.as_secs_f64(),
                    attempts
                );
            }
            ExitCode::from(1)
        }
        WaitOutcome::Cancelled { .. } => ExitCode::from(1),
    })
}

fn capture(finder: &Finder, args: &Args, out: &Path) -> VisionResult<ExitCode> {
    let region = match args.region {
        Some(region) => region,
        None => finder.bounds()?,
    };
    let start = std::time::Instant::now();
    let frame = finder.capture(region)?;
    frame.image().save(out).map_err(|e| VisionError::Io {
        path: out.to_path_buf(),
        reason: e.to_string(),
    })?;

    println!(
        "✅ Captured {} ({}ms) saved to {}",
        region,
        start.elapsed().as_millis(),
        out.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn print_matches(matches: &[Match], json: bool) {
    if json {
        match serde_json::to_string_pretty(matches) {
            Ok(body) => println!("{}", body),
            Err(e) => eprintln!("❌ Failed to serialize matches: {}", e),
        }
        return;
    }

    if matches.is_empty() {
        println!("❌ No matches");
        return;
    }
    println!("🎯 {} match(es):", matches.len());
    for (i, m) in matches.iter().enumerate() {
        println!("  {}. {}", i + 1, m);
    }
}
