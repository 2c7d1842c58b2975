// Presentation layer
//
// Consumes the session's outputs and prints them; nothing here feeds back
// into the state machine.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::metadata::AnalysisResult;
use crate::playback::format_range;
use crate::session::{EditorStatus, VideoAsset};

/// Spinner shown while a pipeline stage is in flight.
pub fn stage_progress(status: EditorStatus) -> ProgressBar {
    let message = match status {
        EditorStatus::Uploading => "Ingesting stream assets - resolving video metadata...",
        EditorStatus::Analyzing => "Running semantic analysis - detecting languages and silence...",
        EditorStatus::Editing => "Synthesizing Darija script - rewriting for maximum impact...",
        _ => "Processing...",
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Render the editing workspace for a completed session.
pub fn render_workspace(video: &VideoAsset, metadata: &AnalysisResult) {
    let languages = if metadata.detected_languages.is_empty() {
        "none detected".to_string()
    } else {
        metadata
            .detected_languages
            .iter()
            .map(|l| l.to_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("\nEditing Overview");
    println!("{}", "-".repeat(72));
    println!("Languages:  {}", languages);
    println!("Format:     {}", metadata.original_format.label());
    println!("Dead space: -{} segments", metadata.silence_segment_count());
    println!(
        "Source:     {:.2}s, aspect {:.3}",
        video.duration, video.aspect_ratio
    );
    println!("Preview:    {}", video.preview_url().display());

    println!("\nRewritten Darija Script");
    println!("{}", "-".repeat(72));
    println!("{}", metadata.rewritten_script);

    if !metadata.pacing_summary.is_empty() {
        println!("\nPacing: {}", metadata.pacing_summary);
    }

    println!("\nSubtitle Breakdown");
    println!("{:<4} {:<18} {}", "#", "Range", "Text");
    println!("{}", "-".repeat(72));
    for (index, entry) in metadata.subtitles.iter().enumerate() {
        println!(
            "{:<4} {:<18} {}",
            index + 1,
            format_range(entry.start, entry.end),
            entry.text
        );
    }
}

/// Render the error panel with its single recovery hint.
pub fn render_error(message: &str) {
    println!("\nEditor Error");
    println!("{}", "-".repeat(72));
    println!("{}", message);
    println!("\nRun the command again to retry with a fresh session.");
}

/// The export stays a simulated completion; no render pipeline exists.
pub fn render_export_notice() {
    println!("\nExporting final video (silent + subtitled)... simulated, no file is written.");
}
