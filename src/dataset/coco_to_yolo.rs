//! COCO to YOLO dataset conversion.
//!
//! Every label is computed and validated in memory before anything is written, so a missing or
//! malformed annotation file leaves no partial dataset behind.

use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::config::DatasetConfig;
use crate::dataset::coco::{CocoAnnotation, CocoDataset, CocoImage, read_coco_json};
use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Which half of the dataset an image goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subset {
    Train,
    Val,
}

impl Subset {
    /// Filenames containing `train` go to the training set, everything else to validation.
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.contains("train") {
            Subset::Train
        } else {
            Subset::Val
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub images: usize,
    pub label_files: usize,
    pub annotations: usize,
    pub images_copied: usize,
    pub images_missing: usize,
}

/// One image's worth of output, ready to be written.
struct PlannedImage<'a> {
    image: &'a CocoImage,
    subset: Subset,
    label_name: String,
    labels: String,
    annotation_count: usize,
}

/// Formats one YOLO label line from a COCO `[x_min, y_min, width, height]` box.
///
/// The box is clipped to the image first, so all four values lie in `[0, 1]`.
pub fn yolo_label_line(
    class_index: usize,
    coco_bbox: &[f64],
    image_width: u32,
    image_height: u32,
) -> Result<String> {
    let &[x_min, y_min, width, height] = coco_bbox else {
        return Err(Error::MalformedBox(format!(
            "expected [x, y, width, height], got {} values.",
            coco_bbox.len()
        )));
    };
    let bbox = BoundingBox::new(
        x_min as f32,
        y_min as f32,
        (x_min + width) as f32,
        (y_min + height) as f32,
        class_index.to_string(),
    )?;
    let image_width = image_width as f32;
    let image_height = image_height as f32;
    let left = bbox.left().clamp(0.0, image_width);
    let top = bbox.top().clamp(0.0, image_height);
    let right = bbox.right().clamp(0.0, image_width);
    let bottom = bbox.bottom().clamp(0.0, image_height);

    let x_center_norm = (left + right) / 2.0 / image_width;
    let y_center_norm = (top + bottom) / 2.0 / image_height;
    let width_norm = (right - left) / image_width;
    let height_norm = (bottom - top) / image_height;
    Ok(format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        class_index, x_center_norm, y_center_norm, width_norm, height_norm
    ))
}

/// Converts the configured COCO annotation file into a YOLO dataset.
///
/// Output layout is `<output_dir>/<train|val>/{images,labels}` plus a `data.yaml` descriptor.
/// Images are copied and the copy verified. Source images are only removed when
/// `move_images` is set.
pub fn convert_coco_to_yolo(config: &DatasetConfig) -> Result<ConversionSummary> {
    let data = read_coco_json(&config.annotation_file)?;
    log::info!(
        "Found categories: {:?}",
        data.categories.iter().map(|cat| cat.name.as_str()).collect::<Vec<_>>()
    );
    let planned = plan_labels(&data)?;

    log::info!("Processing annotations and creating YOLO label files...");
    let mut summary = ConversionSummary {
        images: planned.len(),
        ..ConversionSummary::default()
    };
    fs::create_dir_all(&config.output_dir)?;
    let progress = ProgressBar::new(planned.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    for plan in planned.iter() {
        let subset_dir = config.output_dir.join(plan.subset.as_str());
        let images_dir = subset_dir.join("images");
        let labels_dir = subset_dir.join("labels");
        fs::create_dir_all(&images_dir)?;
        fs::create_dir_all(&labels_dir)?;

        let original_image_path = config.root.join(&plan.image.file_name);
        match original_image_path.file_name() {
            Some(base_name) if original_image_path.is_file() => {
                let new_image_path = images_dir.join(base_name);
                copy_and_verify(&original_image_path, &new_image_path)?;
                if config.move_images {
                    fs::remove_file(&original_image_path)?;
                }
                summary.images_copied += 1;
            }
            _ => {
                log::warn!("source image not found: {}", original_image_path.display());
                summary.images_missing += 1;
            }
        }

        fs::write(labels_dir.join(&plan.label_name), &plan.labels)?;
        summary.label_files += 1;
        summary.annotations += plan.annotation_count;
        progress.inc(1);
    }
    progress.finish_and_clear();

    write_dataset_yaml(&config.output_dir, &data)?;
    log::info!("Dataset conversion complete!");
    log::info!(
        "YOLO-formatted dataset is ready at: {}",
        config.output_dir.display()
    );
    Ok(summary)
}

fn plan_labels(data: &CocoDataset) -> Result<Vec<PlannedImage<'_>>> {
    // Category ids are arbitrary in COCO, YOLO wants 0-based contiguous indices.
    let category_map: HashMap<u64, usize> = data
        .categories
        .iter()
        .enumerate()
        .map(|(index, cat)| (cat.id, index))
        .collect();
    let annotations_by_image: HashMap<u64, Vec<&CocoAnnotation>> = data
        .annotations
        .iter()
        .into_group_map_by(|ann| ann.image_id);

    let mut planned = Vec::with_capacity(data.images.len());
    for image in data.images.iter() {
        if image.width == 0 || image.height == 0 {
            return Err(Error::MalformedImage {
                file_name: image.file_name.clone(),
                reason: format!("image size is {}x{}", image.width, image.height),
            });
        }
        let label_name = Path::new(&image.file_name)
            .file_stem()
            .map(|stem| format!("{}.txt", stem.to_string_lossy()))
            .ok_or_else(|| Error::MalformedImage {
                file_name: image.file_name.clone(),
                reason: "file name has no stem".to_string(),
            })?;
        let annotations = annotations_by_image
            .get(&image.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut labels = String::new();
        for ann in annotations {
            let class_index =
                *category_map
                    .get(&ann.category_id)
                    .ok_or(Error::UnknownCategory {
                        annotation_id: ann.id,
                        category_id: ann.category_id,
                    })?;
            let line = yolo_label_line(class_index, &ann.bbox, image.width, image.height)?;
            labels.push_str(&line);
            labels.push('\n');
        }
        planned.push(PlannedImage {
            image,
            subset: Subset::from_file_name(&image.file_name),
            label_name,
            labels,
            annotation_count: annotations.len(),
        });
    }
    Ok(planned)
}

/// Copies a file and checks the copy has the same size as the source.
pub fn copy_and_verify(source_path: &Path, destination: &Path) -> Result<u64> {
    fs::copy(source_path, destination)?;
    let expected = fs::metadata(source_path)?.len();
    let actual = fs::metadata(destination)?.len();
    if expected != actual {
        return Err(Error::CopyVerification {
            source_path: source_path.to_path_buf(),
            destination: destination.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(actual)
}

/// Writes the dataset descriptor consumed by the YOLO trainer.
fn write_dataset_yaml(output_dir: &Path, data: &CocoDataset) -> Result<PathBuf> {
    let header = [
        format!("path: '{}'", yaml_quote(&output_dir.to_string_lossy())),
        "train: train/images".to_string(),
        "val: val/images".to_string(),
        format!("nc: {}", data.categories.len()),
        "names:".to_string(),
    ];
    let names = data
        .categories
        .iter()
        .enumerate()
        .map(|(index, cat)| format!("  {}: '{}'", index, yaml_quote(&cat.name)));
    let mut yaml = header.into_iter().chain(names).join("\n");
    yaml.push('\n');
    let path = output_dir.join("data.yaml");
    fs::write(&path, yaml)?;
    Ok(path)
}

/// Escapes a value for a single quoted YAML scalar.
fn yaml_quote(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const COCO_JSON: &str = r#"{
        "images": [
            {"id": 1, "file_name": "images_train/frame-1.jpg", "width": 100, "height": 50},
            {"id": 2, "file_name": "images_val/frame-2.jpg", "width": 200, "height": 100},
            {"id": 3, "file_name": "images_train/frame-3.jpg", "width": 100, "height": 100}
        ],
        "annotations": [
            {"id": 10, "image_id": 1, "category_id": 3, "bbox": [10, 5, 20, 10]},
            {"id": 11, "image_id": 1, "category_id": 1, "bbox": [0, 0, 100, 50]},
            {"id": 12, "image_id": 2, "category_id": 1, "bbox": [190, 90, 20, 20]}
        ],
        "categories": [
            {"id": 1, "name": "person"},
            {"id": 3, "name": "car"}
        ]
    }"#;

    struct Fixture {
        _dir: tempfile::TempDir,
        config: DatasetConfig,
    }

    fn fixture(coco_json: &str, with_images: &[&str]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("FLIR_ADAS_v2");
        fs::create_dir_all(root.join("images_train")).unwrap();
        fs::create_dir_all(root.join("images_val")).unwrap();
        for name in with_images {
            fs::write(root.join(name), format!("bytes of {}", name)).unwrap();
        }
        let annotation_file = root.join("coco.json");
        fs::write(&annotation_file, coco_json).unwrap();
        let config = DatasetConfig {
            root,
            annotation_file,
            output_dir: dir.path().join("FLIR_YOLO_Dataset"),
            ..DatasetConfig::default()
        };
        Fixture { _dir: dir, config }
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn subset_from_file_name() {
        assert_eq!(Subset::from_file_name("images_thermal_train/data/a.jpg"), Subset::Train);
        assert_eq!(Subset::from_file_name("video-4FRnNpmSmwktFJKjg.jpg"), Subset::Val);
        assert_eq!(Subset::Train.as_str(), "train");
    }

    #[test]
    fn label_line_is_normalized() {
        let line = yolo_label_line(1, &[10.0, 5.0, 20.0, 10.0], 100, 50).unwrap();
        assert_eq!(line, "1 0.200000 0.200000 0.200000 0.200000");
    }

    #[test]
    fn label_line_clips_to_image() {
        let line = yolo_label_line(0, &[190.0, 90.0, 20.0, 20.0], 200, 100).unwrap();
        assert_eq!(line, "0 0.975000 0.950000 0.050000 0.100000");
    }

    #[test]
    fn label_line_rejects_malformed_boxes() {
        assert!(matches!(
            yolo_label_line(0, &[1.0, 2.0, 3.0], 10, 10),
            Err(Error::MalformedBox(_))
        ));
        assert!(matches!(
            yolo_label_line(0, &[1.0, 2.0, -3.0, 4.0], 10, 10),
            Err(Error::MalformedBox(_))
        ));
        assert!(matches!(
            yolo_label_line(0, &[f64::NAN, 2.0, 3.0, 4.0], 10, 10),
            Err(Error::MalformedBox(_))
        ));
    }

    #[test]
    fn converts_dataset() {
        let fx = fixture(COCO_JSON, &["images_train/frame-1.jpg", "images_val/frame-2.jpg"]);
        let summary = convert_coco_to_yolo(&fx.config).unwrap();
        assert_eq!(
            summary,
            ConversionSummary {
                images: 3,
                label_files: 3,
                annotations: 3,
                images_copied: 2,
                images_missing: 1,
            }
        );

        let out = &fx.config.output_dir;
        assert_eq!(
            read(out.join("train/labels/frame-1.txt")),
            "1 0.200000 0.200000 0.200000 0.200000\n0 0.500000 0.500000 1.000000 1.000000\n"
        );
        assert_eq!(
            read(out.join("val/labels/frame-2.txt")),
            "0 0.975000 0.950000 0.050000 0.100000\n"
        );
        // Images without annotations still get a label file.
        assert_eq!(read(out.join("train/labels/frame-3.txt")), "");
        assert_eq!(
            read(out.join("train/images/frame-1.jpg")),
            "bytes of images_train/frame-1.jpg"
        );
        assert!(!out.join("train/images/frame-3.jpg").exists());

        // Sources are kept unless moving is requested.
        assert!(fx.config.root.join("images_train/frame-1.jpg").is_file());

        let yaml = read(out.join("data.yaml"));
        assert!(yaml.starts_with("path: '"));
        assert!(yaml.ends_with("  1: 'car'\n"));
        assert!(yaml.contains("train: train/images\n"));
        assert!(yaml.contains("nc: 2\n"));
        assert!(yaml.contains("  0: 'person'\n  1: 'car'\n"));
    }

    #[test]
    fn move_images_removes_verified_sources() {
        let mut fx = fixture(COCO_JSON, &["images_train/frame-1.jpg"]);
        fx.config.move_images = true;
        convert_coco_to_yolo(&fx.config).unwrap();
        assert!(!fx.config.root.join("images_train/frame-1.jpg").exists());
        assert!(fx.config.output_dir.join("train/images/frame-1.jpg").is_file());
    }

    #[test]
    fn missing_annotation_file_writes_nothing() {
        let fx = fixture(COCO_JSON, &[]);
        fs::remove_file(&fx.config.annotation_file).unwrap();
        assert!(matches!(
            convert_coco_to_yolo(&fx.config),
            Err(Error::AnnotationFileMissing { .. })
        ));
        assert!(!fx.config.output_dir.exists());
    }

    #[test]
    fn malformed_annotation_writes_nothing() {
        let json = COCO_JSON.replace("[190, 90, 20, 20]", "[190, 90, 20]");
        let fx = fixture(&json, &["images_train/frame-1.jpg"]);
        assert!(matches!(
            convert_coco_to_yolo(&fx.config),
            Err(Error::MalformedBox(_))
        ));
        assert!(!fx.config.output_dir.exists());
    }

    #[test]
    fn unknown_category_is_reported() {
        let json = COCO_JSON.replace("\"category_id\": 3", "\"category_id\": 99");
        let fx = fixture(&json, &[]);
        assert!(matches!(
            convert_coco_to_yolo(&fx.config),
            Err(Error::UnknownCategory {
                annotation_id: 10,
                category_id: 99
            })
        ));
    }

    #[test]
    fn zero_sized_image_is_reported() {
        let json = COCO_JSON.replace("\"width\": 200", "\"width\": 0");
        let fx = fixture(&json, &[]);
        assert!(matches!(
            convert_coco_to_yolo(&fx.config),
            Err(Error::MalformedImage { .. })
        ));
    }

    #[test]
    fn copy_and_verify_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        let dst = dir.path().join("b.jpg");
        fs::write(&src, b"0123456789").unwrap();
        assert_eq!(copy_and_verify(&src, &dst).unwrap(), 10);
        assert_eq!(fs::read(&dst).unwrap(), b"0123456789");
        assert!(src.is_file());
    }
}
