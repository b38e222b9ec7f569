use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use post_asset_optimizer::orientation::Orientation;
use post_asset_optimizer::{AssetOptimizer, Config, FailureKind, OptimizeError, RunStatus};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn policy(max_dimension: u32) -> Config {
    Config {
        max_dimension,
        workers: 4,
        json_output: true,
        ..Default::default()
    }
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
}

/// JPEG bytes carrying an EXIF APP1 segment with only the orientation tag
fn jpeg_with_orientation(image: &RgbImage, orientation: u16) -> Vec<u8> {
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .unwrap();

    let mut tiff = vec![b'M', b'M', 0, 42, 0, 0, 0, 8, 0, 1, 0x01, 0x12, 0, 3, 0, 0, 0, 1];
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut tagged = jpeg[..2].to_vec();
    tagged.extend_from_slice(&[0xFF, 0xE1]);
    tagged.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    tagged.extend_from_slice(&app1);
    tagged.extend_from_slice(&jpeg[2..]);
    tagged
}

fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| (e.path().to_path_buf(), std::fs::read(e.path()).unwrap()))
        .collect();
    files.sort();
    files
}

fn assert_no_temp_files(root: &Path) {
    for (path, _) in snapshot(root) {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(!name.ends_with(".tmp"), "leftover temp file {}", path.display());
    }
}

#[tokio::test]
async fn test_mixed_directory_isolates_corrupt_file() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("2024").join("spring");
    std::fs::create_dir_all(&nested).unwrap();

    // Five oversized images, four already within bounds.
    for i in 0..5 {
        gradient(400 + i * 20, 200).save(temp.path().join(format!("wide-{i}.jpg"))).unwrap();
    }
    for i in 0..2 {
        gradient(80, 60).save(nested.join(format!("small-{i}.png"))).unwrap();
        gradient(90, 90).save(nested.join(format!("thumb-{i}.jpeg"))).unwrap();
    }
    std::fs::write(nested.join("broken.jpg"), b"definitely not a jpeg").unwrap();

    let small_before = std::fs::read(nested.join("small-0.png")).unwrap();
    let thumb_before = std::fs::read(nested.join("thumb-1.jpeg")).unwrap();

    let optimizer = AssetOptimizer::new(policy(100)).unwrap();
    let result = optimizer.run(temp.path()).await.unwrap();

    assert_eq!(result.len(), 10);
    assert_eq!(result.optimized_count(), 5);
    assert_eq!(result.no_op_count(), 4);
    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.failure_count_of(FailureKind::Decode), 1);
    assert_eq!(result.status(), RunStatus::Success);
    assert_eq!(result.status().exit_code(), 0);

    assert_eq!(std::fs::read(nested.join("small-0.png")).unwrap(), small_before);
    assert_eq!(std::fs::read(nested.join("thumb-1.jpeg")).unwrap(), thumb_before);
    assert_eq!(std::fs::read(nested.join("broken.jpg")).unwrap(), b"definitely not a jpeg");

    for i in 0..5 {
        let source_width = 400 + i * 20;
        let img = image::open(temp.path().join(format!("wide-{i}.jpg"))).unwrap();
        let (width, height) = img.dimensions();
        assert_eq!(width.max(height), 100);
        let expected_height = 200.0 * 100.0 / source_width as f64;
        assert!((height as f64 - expected_height).abs() <= 1.0);
    }

    assert_no_temp_files(temp.path());
}

#[tokio::test]
async fn test_second_run_is_fixed_point() {
    let temp = TempDir::new().unwrap();
    gradient(640, 480).save(temp.path().join("cover.jpg")).unwrap();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(150, 600, Rgba([10, 20, 30, 90])))
        .save(temp.path().join("banner.png"))
        .unwrap();

    let optimizer = AssetOptimizer::new(policy(120)).unwrap();
    let first = optimizer.run(temp.path()).await.unwrap();
    assert_eq!(first.optimized_count(), 2);

    let after_first = snapshot(temp.path());
    let second = optimizer.run(temp.path()).await.unwrap();

    assert_eq!(second.optimized_count(), 0);
    assert_eq!(second.no_op_count(), 2);
    assert_eq!(snapshot(temp.path()), after_first);

    let banner = image::open(temp.path().join("banner.png")).unwrap();
    assert_eq!(banner.dimensions(), (30, 120));
    assert!(banner.color().has_alpha());
}

#[tokio::test]
async fn test_empty_root_exits_zero() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("README.md"), b"no images here").unwrap();

    let optimizer = AssetOptimizer::new(policy(100)).unwrap();
    let result = optimizer.run(temp.path()).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.status().exit_code(), 0);
}

#[tokio::test]
async fn test_all_candidates_failing_exits_two() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("a.jpg"), b"garbage").unwrap();
    std::fs::write(temp.path().join("b.png"), b"\x89PNG\r\n\x1a\ntruncated").unwrap();

    let optimizer = AssetOptimizer::new(policy(100)).unwrap();
    let result = optimizer.run(temp.path()).await.unwrap();

    assert_eq!(result.failure_count(), 2);
    assert_eq!(result.status(), RunStatus::AllFailed);
    assert_eq!(result.status().exit_code(), 2);
}

#[tokio::test]
async fn test_unreadable_root_mutates_nothing() {
    let temp = TempDir::new().unwrap();
    gradient(500, 500).save(temp.path().join("outside.jpg")).unwrap();
    let before = snapshot(temp.path());

    let optimizer = AssetOptimizer::new(policy(100)).unwrap();
    let err = optimizer
        .run(&temp.path().join("does-not-exist"))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<OptimizeError>(),
        Some(OptimizeError::RootUnreadable { .. })
    ));
    assert_eq!(snapshot(temp.path()), before);
}

#[test]
fn test_dry_run_reports_without_writing() {
    let temp = TempDir::new().unwrap();
    gradient(300, 300).save(temp.path().join("photo.jpg")).unwrap();
    let before = snapshot(temp.path());

    let optimizer = AssetOptimizer::new(Config {
        dry_run: true,
        ..policy(100)
    })
    .unwrap();
    let result = tokio_test::block_on(optimizer.run(temp.path())).unwrap();

    assert_eq!(result.optimized_count(), 1);
    assert_eq!(snapshot(temp.path()), before);
}

#[tokio::test]
async fn test_rotated_phone_photo_stays_upright() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("portrait.jpg");
    std::fs::write(&path, jpeg_with_orientation(&gradient(400, 200), 6)).unwrap();
    assert_eq!(Orientation::read(&std::fs::read(&path).unwrap()), Orientation::Rotate90);

    let optimizer = AssetOptimizer::new(policy(100)).unwrap();
    let result = optimizer.run(temp.path()).await.unwrap();

    assert_eq!(result.optimized_count(), 1);
    assert_eq!(image::image_dimensions(&path).unwrap(), (50, 100));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_asset_is_neither_replaced_nor_followed() {
    let temp = TempDir::new().unwrap();
    let posts = temp.path().join("posts");
    let shared = temp.path().join("shared");
    std::fs::create_dir_all(&posts).unwrap();
    std::fs::create_dir_all(&shared).unwrap();
    gradient(400, 200).save(shared.join("hero.jpg")).unwrap();
    let target_before = std::fs::read(shared.join("hero.jpg")).unwrap();
    std::os::unix::fs::symlink(shared.join("hero.jpg"), posts.join("hero.jpg")).unwrap();

    let optimizer = AssetOptimizer::new(policy(100)).unwrap();
    let result = optimizer.run(&posts).await.unwrap();

    assert!(result.is_empty());
    assert!(std::fs::symlink_metadata(posts.join("hero.jpg")).unwrap().file_type().is_symlink());
    assert_eq!(std::fs::read(shared.join("hero.jpg")).unwrap(), target_before);
}

#[tokio::test]
async fn test_outcomes_are_stamped_at_discovery() {
    let temp = TempDir::new().unwrap();
    gradient(300, 300).save(temp.path().join("photo.jpg")).unwrap();
    let started = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let optimizer = AssetOptimizer::new(policy(100)).unwrap();
    let result = optimizer.run(temp.path()).await.unwrap();

    assert!(result.outcomes[0].discovered_at >= started);
}
