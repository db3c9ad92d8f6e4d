use crate::error::{Error, Result};
use image::{self, RgbImage};
use std::path::Path;

pub fn read_image_as_rgb8(filepath: &Path) -> Result<RgbImage> {
    if !filepath.is_file() {
        return Err(Error::ImageNotFound {
            path: filepath.to_path_buf(),
        });
    }
    image::open(filepath)
        .map(|img| img.into_rgb8())
        .map_err(|source| Error::ImageRead {
            path: filepath.to_path_buf(),
            source,
        })
}

/// Width and height of an image, read from its header without decoding the pixels.
pub fn read_image_dimensions(filepath: &Path) -> Result<(u32, u32)> {
    if !filepath.is_file() {
        return Err(Error::ImageNotFound {
            path: filepath.to_path_buf(),
        });
    }
    image::image_dimensions(filepath).map_err(|source| Error::ImageRead {
        path: filepath.to_path_buf(),
        source,
    })
}

/// Saves an image, the format is picked from the file extension.
pub fn save_rgb8(image: &RgbImage, filepath: &Path) -> Result<()> {
    if let Some(parent) = filepath.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save(filepath).map_err(|source| Error::ImageWrite {
        path: filepath.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn read_test_data_as_rgb8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_image.png");
        let mut img = RgbImage::new(3, 3);
        img.put_pixel(0, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 1, Rgb([0, 255, 0]));
        img.put_pixel(2, 1, Rgb([0, 0, 255]));
        img.save(&path).unwrap();

        let img = read_image_as_rgb8(&path).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 255, 0]));
        assert_eq!(img.get_pixel(2, 1), &Rgb([0, 0, 255]));
        assert_eq!(img.get_pixel(2, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn missing_image() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_image_as_rgb8(&dir.path().join("street_photo.jpg")),
            Err(Error::ImageNotFound { .. })
        ));
    }

    #[test]
    fn unreadable_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(
            read_image_as_rgb8(&path),
            Err(Error::ImageRead { .. })
        ));
    }

    #[test]
    fn reads_dimensions_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbImage::new(7, 3).save(&path).unwrap();
        assert_eq!(read_image_dimensions(&path).unwrap(), (7, 3));
        assert!(matches!(
            read_image_dimensions(&dir.path().join("missing.png")),
            Err(Error::ImageNotFound { .. })
        ));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("fusion").join("out.png");
        save_rgb8(&RgbImage::new(2, 2), &path).unwrap();
        assert!(path.is_file());
    }
}
