mod annotations;
mod config;
mod dataset;
mod error;
mod fusion;
mod image_utils;
mod object_detection;

use clap::{Parser, Subcommand};
use config::{Config, DEFAULT_CONFIG_PATH};
use dataset::coco_to_yolo::convert_coco_to_yolo;
use dataset::pairing::find_common_filenames;
use fusion::fuse_pair;
use image_utils::drawing::{DETECTION_COLOR, draw_detections, draw_fusion_report};
use image_utils::image_io::{read_image_as_rgb8, save_rgb8};
use object_detection::object_detection_utils::{load_model, run_detection};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "EO/IR object detection fusion toolkit")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "EOIR_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the detector on one image and save an annotated copy.
    Detect {
        #[arg(long)]
        image: PathBuf,
    },
    /// Detect on an EO/IR pair and highlight EO detections confirmed by the IR image.
    Fuse {
        #[arg(long)]
        eo: PathBuf,
        #[arg(long)]
        ir: PathBuf,
        /// Overrides `fusion.iou_threshold`.
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Convert the COCO annotations of the dataset into a YOLO dataset.
    Convert,
    /// Look for a filename present in both the RGB and the thermal folder.
    FindPair {
        /// Print every common filename instead of just one.
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("Loading configuration from {}", args.config.display());
    let config = Config::load(&args.config)?;

    match args.command {
        Command::Detect { image } => detect(&config, &image)?,
        Command::Fuse { eo, ir, threshold } => {
            let threshold = threshold.unwrap_or(config.fusion.iou_threshold);
            config::validate_unit_interval("--threshold", threshold)?;
            fuse(&config, &eo, &ir, threshold)?
        }
        Command::Convert => {
            let summary = convert_coco_to_yolo(&config.dataset)?;
            log::info!(
                "{} images, {} annotations, {} images copied, {} missing",
                summary.images,
                summary.annotations,
                summary.images_copied,
                summary.images_missing
            );
        }
        Command::FindPair { all } => find_pair(&config, all)?,
    }
    log::info!("Script finished.");
    Ok(())
}

fn detect(config: &Config, image_path: &Path) -> Result<(), Box<dyn Error>> {
    let mut model = load_model(&config.detector)?;
    let detections = run_detection(
        &mut model,
        image_path,
        config.detector.confidence,
        config.detector.nms_iou_threshold,
    )?;
    for det in detections.iter() {
        log::info!("{} ({:.2})", det.annotation, det.confidence);
    }
    let mut image = read_image_as_rgb8(image_path)?;
    draw_detections(&mut image, &detections, |_| DETECTION_COLOR);
    let output_path = output_path(&config.fusion.output_dir, image_path, "detections");
    save_rgb8(&image, &output_path)?;
    log::info!("Annotated image written to {}", output_path.display());
    Ok(())
}

fn fuse(config: &Config, eo: &Path, ir: &Path, threshold: f32) -> Result<(), Box<dyn Error>> {
    let mut model = load_model(&config.detector)?;
    let report = fuse_pair(&mut model, &config.detector, eo, ir, threshold)?;

    let mut image = read_image_as_rgb8(eo)?;
    draw_fusion_report(&mut image, &report);
    let image_path = output_path(&config.fusion.output_dir, eo, "fused");
    save_rgb8(&image, &image_path)?;
    let report_path = image_path.with_extension("json");
    report.write_json(&report_path)?;
    log::info!(
        "Fused image written to {}, report to {}",
        image_path.display(),
        report_path.display()
    );
    Ok(())
}

fn find_pair(config: &Config, all: bool) -> Result<(), Box<dyn Error>> {
    log::info!("Searching for a matching pair...");
    let common = find_common_filenames(&config.dataset.rgb_dir(), &config.dataset.thermal_dir())?;
    if common.is_empty() {
        log::warn!("Could not find any files with the same name in both folders.");
        return Ok(());
    }
    if all {
        for name in common.iter() {
            println!("{}", name);
        }
    } else {
        println!("{}", common[0]);
    }
    log::info!(
        "{} common filename(s) between '{}' and '{}'",
        common.len(),
        config.dataset.rgb_folder,
        config.dataset.thermal_folder
    );
    Ok(())
}

/// `<output_dir>/<image stem>_<suffix>.png`
fn output_path(output_dir: &Path, image_path: &Path, suffix: &str) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    output_dir.join(format!("{}_{}.png", stem, suffix))
}
