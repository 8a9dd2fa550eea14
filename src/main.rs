use vseq::cli::Args;
use vseq::media::ffmpeg::FfmpegProbe;
use vseq::media::MediaFile;
use vseq::paths::{self, PathConfig};
use vseq::{shell, GroupId, TimelineManager};

use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// Group id used for `--grid` files
const GRID_GROUP: &str = "1";

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    let dirs_result = paths::ensure_dirs(&path_config);

    shell::init_logger(&args, &path_config)?;
    if let Err(e) = dirs_result {
        warn!("Failed to create application directories: {}", e);
    }
    debug!("Command-line args: {:?}", args);

    let config = shell::load_config(&path_config)?;
    let mut timeline = TimelineManager::new(&config, Arc::new(FfmpegProbe));

    let files = video_files(&args.files);
    let grid = video_files(&args.grid);

    let mut skipped = timeline.add_clips(&files, args.group.clone().map(GroupId::from)).skipped;
    if !grid.is_empty() {
        skipped.extend(timeline.add_clips(&grid, Some(GroupId::from(GRID_GROUP))).skipped);
    }
    for s in &skipped {
        eprintln!("skipped {}: {}", s.file, s.reason);
    }

    if let Some(at) = args.at {
        timeline.seek(at);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&timeline.snapshot())?);
    } else {
        print_layout(&timeline);
    }

    info!("Done: {} clips, {:.3}s", timeline.len(), timeline.total_duration());
    Ok(())
}

/// Keep files with a known video extension, warning about the rest.
fn video_files(paths: &[PathBuf]) -> Vec<MediaFile> {
    paths
        .iter()
        .map(MediaFile::from_path)
        .filter(|f| {
            let ok = f.is_video();
            if !ok {
                warn!("Not a video file, skipping: {}", f.path.display());
            }
            ok
        })
        .collect()
}

fn print_layout(timeline: &TimelineManager) {
    for key in timeline.tracks() {
        println!("{:?}", key);
        for clip in timeline.track(&key) {
            println!(
                "  [{:>9.3} .. {:>9.3})  x{:<4} {}",
                clip.start_offset(),
                clip.end_offset(),
                clip.effects().speed(),
                clip.name
            );
        }
    }
    println!("total: {:.3}s", timeline.total_duration());

    let head = timeline.playhead();
    match head.clip {
        Some(clip) => println!(
            "at {:.3}s: {} (source {:.3}s)",
            head.time,
            clip.name,
            head.source_time.unwrap_or_default()
        ),
        None => println!("at {:.3}s: no clip", head.time),
    }
}
