use screen_finder::Region;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// What to do, with the file each mode cannot run without
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Find { pattern: PathBuf },
    Wait { pattern: PathBuf },
    Capture { out: PathBuf },
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub screen: Option<PathBuf>,
    pub region: Option<Region>,
    pub threshold: Option<f32>,
    pub timeout: Option<Duration>,
    pub interval: Option<Duration>,
    pub json: bool,
    pub debug_mode: bool,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().collect();
        Self::parse_from(args.iter().skip(1).map(String::as_str))
    }

    fn parse_from<'a>(args: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        #[derive(PartialEq)]
        enum Requested {
            Find,
            Wait,
            Capture,
        }

        let mut requested = None;
        let mut pattern = None;
        let mut screen = None;
        let mut region = None;
        let mut threshold = None;
        let mut timeout = None;
        let mut interval = None;
        let mut out = None;
        let mut json = false;
        let mut debug_mode = false;

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("Screen Finder v{}", env!("CARGO_PKG_VERSION"));
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--json" {
                json = true;
            } else if arg == "--find" {
                requested = Some(Requested::Find);
            } else if arg == "--wait" {
                requested = Some(Requested::Wait);
            } else if arg == "--capture" {
                requested = Some(Requested::Capture);
            } else if let Some(val) = arg.strip_prefix("--pattern=") {
                pattern = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--screen=") {
                screen = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--out=") {
                out = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--region=") {
                match Region::parse(val) {
                    Ok(r) => region = Some(r),
                    Err(e) => {
                        eprintln!("❌ Invalid region '{}': {}", val, e);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                match val.parse::<f32>() {
                    Ok(t) if (0.0..=1.0).contains(&t) => threshold = Some(t),
                    _ => {
                        eprintln!("❌ Invalid threshold value: {} (expected 0.0-1.0)", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<f64>().map(Duration::try_from_secs_f64) {
                    Ok(Ok(secs)) => timeout = Some(secs),
                    _ => {
                        eprintln!("❌ Invalid timeout value: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--interval=") {
                match val.parse::<u64>() {
                    Ok(ms) => interval = Some(Duration::from_millis(ms)),
                    Err(_) => {
                        eprintln!("❌ Invalid interval value: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        let Some(requested) = requested else {
            eprintln!("❌ One of --find, --wait or --capture is required");
            print_help();
            return None;
        };
        if requested == Requested::Find && screen.is_none() {
            eprintln!("❌ --find needs --screen=FILE (a screenshot to search)");
            return None;
        }
        let mode = match (requested, pattern, out) {
            (Requested::Find, Some(pattern), _) => Mode::Find { pattern },
            (Requested::Wait, Some(pattern), _) => Mode::Wait { pattern },
            (Requested::Capture, _, Some(out)) => Mode::Capture { out },
            (Requested::Capture, _, None) => {
                eprintln!("❌ --capture needs --out=FILE");
                return None;
            }
            (_, None, _) => {
                eprintln!("❌ --pattern=FILE is required");
                return None;
            }
        };

        Some(Args {
            mode,
            screen,
            region,
            threshold,
            timeout,
            interval,
            json,
            debug_mode,
        })
    }
}

fn print_help() {
    println!("🔍 Screen Finder - locate images on screen");
    println!();
    println!("USAGE:");
    println!("    screen-finder <MODE> [OPTIONS]");
    println!();
    println!("MODES:");
    println!("    --find              Find all occurrences of a pattern in a screenshot");
    println!("    --wait              Wait until a pattern appears on screen");
    println!("    --capture           Save a screen region as PNG");
    println!();
    println!("OPTIONS:");
    println!("    --pattern=FILE      Pattern image to look for");
    println!("    --screen=FILE       Use a screenshot file instead of the live desktop");
    println!("    --region=x,y,w,h    Limit the search or capture to a region");
    println!("    --threshold=T       Minimum similarity 0.0-1.0 (default: 0.8)");
    println!("    --timeout=SECS      Wait timeout in seconds (default: 3)");
    println!("    --interval=MS       Poll interval in milliseconds (default: 50)");
    println!("    --out=FILE          Output file for --capture");
    println!("    --json              Print matches as JSON");
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    screen-finder --find --pattern=ok.png --screen=shot.png --json");
    println!("    screen-finder --wait --pattern=ok.png --timeout=10");
    println!("    screen-finder --capture --region=0,0,800,600 --out=region.png");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_find() {
        let args = Args::parse_from([
            "--find",
            "--pattern=ok.png",
            "--screen=shot.png",
            "--region=10,20,300,200",
            "--threshold=0.9",
            "--json",
        ])
        .unwrap();
        assert_eq!(
            args.mode,
            Mode::Find {
                pattern: PathBuf::from("ok.png")
            }
        );
        assert_eq!(args.region, Some(Region::new(10, 20, 300, 200).unwrap()));
        assert_eq!(args.threshold, Some(0.9));
        assert!(args.json);
        assert!(!args.debug_mode);
    }

    #[test]
    fn test_parse_wait_timing() {
        let args =
            Args::parse_from(["--wait", "--pattern=ok.png", "--timeout=1.5", "--interval=20"])
                .unwrap();
        assert_eq!(args.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(args.interval, Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_capture_carries_output_path() {
        let args = Args::parse_from(["--capture", "--out=region.png", "--region=0,0,8,8"]).unwrap();
        assert_eq!(
            args.mode,
            Mode::Capture {
                out: PathBuf::from("region.png")
            }
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Args::parse_from(["--find", "--pattern=ok.png"]).is_none());
        assert!(Args::parse_from(["--wait"]).is_none());
        assert!(Args::parse_from(["--capture"]).is_none());
        assert!(Args::parse_from(["--wait", "--pattern=a.png", "--threshold=2"]).is_none());
        assert!(Args::parse_from(["--wait", "--pattern=a.png", "--region=1,2,3"]).is_none());
        assert!(Args::parse_from(["--wait", "--pattern=a.png", "--timeout=-1"]).is_none());
        assert!(Args::parse_from(["--wait", "--pattern=a.png", "--timeout=1e300"]).is_none());
        assert!(Args::parse_from(["--wait", "--pattern=a.png", "--timeout=inf"]).is_none());
        assert!(Args::parse_from(["--bogus"]).is_none());
        assert!(Args::parse_from(Vec::<&str>::new()).is_none());
    }
}
