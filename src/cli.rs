use clap::Parser;
use std::path::PathBuf;

// Probe backend info (compile-time)
#[cfg(feature = "ffmpeg")]
const PROBE_BACKEND: &str = "playa-ffmpeg 8.0 (static)";
#[cfg(not(feature = "ffmpeg"))]
const PROBE_BACKEND: &str = "none (build with --features ffmpeg)";

const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Probe:  ", PROBE_BACKEND, "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Lay out video clips on a timeline and inspect the result
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Video files for the sequential track (in play order)
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Put the positional files on this group track instead
    #[arg(short = 'g', long = "group", value_name = "GROUP")]
    pub group: Option<String>,

    /// Files for the side-by-side grid track (group "1"), can be repeated
    #[arg(long = "grid", value_name = "FILE")]
    pub grid: Vec<PathBuf>,

    /// Report the clip under this timeline position (seconds)
    #[arg(long = "at", value_name = "SECONDS")]
    pub at: Option<f64>,

    /// Print the timeline snapshot as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Enable debug logging to file (default: vseq.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let args = Args::try_parse_from([
            "vseq", "a.mp4", "b.mp4", "--grid", "l.mp4", "--grid", "r.mp4", "--at", "3.5", "--json", "-vv",
        ])
        .unwrap();
        assert_eq!(args.files, vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
        assert_eq!(args.grid.len(), 2);
        assert_eq!(args.at, Some(3.5));
        assert!(args.json);
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_log_flag_optional_value() {
        let args = Args::try_parse_from(["vseq", "-l"]).unwrap();
        assert_eq!(args.log_file, Some(None));
        let args = Args::try_parse_from(["vseq", "--log", "out.log"]).unwrap();
        assert_eq!(args.log_file, Some(Some(PathBuf::from("out.log"))));
    }

    #[test]
    fn test_bad_seconds_rejected() {
        assert!(Args::try_parse_from(["vseq", "--at", "soon"]).is_err());
    }
}
