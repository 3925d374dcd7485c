use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rasterkit::{Error, SaveOptions, Subsampling, jpeg};

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("rasterkit-{tag}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn noisy(width: u32, height: u32) -> DynamicImage {
    let mut rng = SmallRng::seed_from_u64(7);
    let img = RgbImage::from_fn(width, height, |_, _| Rgb([rng.r#gen(), rng.r#gen(), rng.r#gen()]));
    DynamicImage::ImageRgb8(img)
}

#[test]
fn png_roundtrip_is_lossless() {
    let dir = temp_dir("png");
    let img = noisy(23, 17);
    let path = rasterkit::save(&img, dir.join("noise.png")).unwrap();
    let back = rasterkit::load_path(&path).unwrap();
    assert_eq!(back.to_rgb8(), img.to_rgb8());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn higher_quality_jpeg_is_larger() {
    let img = noisy(64, 64);
    let low = rasterkit::encode(&img, "jpg", &SaveOptions::default().quality(0.1)).unwrap();
    let high = rasterkit::encode(&img, "jpg", &SaveOptions::default().quality(1.0)).unwrap();
    assert!(high.len() > low.len(), "{} <= {}", high.len(), low.len());
}

#[test]
fn every_subsampling_lands_in_the_frame_header() {
    let dir = temp_dir("subsampling");
    let img = noisy(32, 32);
    for s in Subsampling::ALL {
        let path = dir.join(format!("{:02x}.jpg", s.code()));
        rasterkit::save_with(&img, &path, &SaveOptions::default().subsampling(s)).unwrap();
        let info = jpeg::inspect(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(info.components.len(), 3);
        let y = info.components[0];
        assert_eq!(y.horizontal, (s.code() >> 4) & 0xF, "{s}");
        assert_eq!(y.vertical, s.code() & 0xF, "{s}");
        assert_eq!(info.subsampling(), Some(s));
    }
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn default_save_is_444() {
    let bytes = rasterkit::encode(&noisy(16, 16), "jpeg", &SaveOptions::default()).unwrap();
    let info = jpeg::inspect(&bytes).unwrap();
    assert_eq!(info.subsampling(), Some(Subsampling::S444));
    assert!(!info.progressive);
}

#[test]
fn grayscale_jpeg_has_one_component() {
    let gray = GrayImage::from_fn(16, 16, |x, y| image::Luma([(x * y) as u8]));
    let img = DynamicImage::ImageLuma8(gray);
    let opts = SaveOptions::default().subsampling(Subsampling::S420);
    let bytes = rasterkit::encode(&img, "jpg", &opts).unwrap();
    let info = jpeg::inspect(&bytes).unwrap();
    assert_eq!(info.components.len(), 1);
    assert_eq!((info.components[0].horizontal, info.components[0].vertical), (1, 1));
}

#[test]
fn progressive_flag_is_honoured() {
    let img = noisy(16, 16);
    let on = rasterkit::encode(&img, "jpg", &SaveOptions::default().progressive(true)).unwrap();
    let off = rasterkit::encode(&img, "jpg", &SaveOptions::default().progressive(false)).unwrap();
    assert!(jpeg::inspect(&on).unwrap().progressive);
    assert!(!jpeg::inspect(&off).unwrap().progressive);
}

#[test]
fn unknown_extension_creates_no_file() {
    let dir = temp_dir("xyz");
    let path = dir.join("out.xyz");
    let err = rasterkit::save(&noisy(4, 4), &path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert!(!path.exists());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_directory_is_save_failed() {
    let dir = temp_dir("missing");
    let path = dir.join("nope").join("out.png");
    let err = rasterkit::save(&noisy(4, 4), &path).unwrap_err();
    assert!(matches!(err, Error::SaveFailed { .. }));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn uppercase_extension_and_gif() {
    let dir = temp_dir("gif");
    let path = rasterkit::save(&noisy(8, 8), dir.join("anim.GIF")).unwrap();
    let back = rasterkit::load_path(&path).unwrap();
    assert_eq!((back.width(), back.height()), (8, 8));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn loads_saved_file_by_url() {
    let dir = temp_dir("url");
    let path = rasterkit::save(&noisy(5, 3), dir.join("u.bmp")).unwrap();
    let url = url::Url::from_file_path(&path).unwrap();
    let back = rasterkit::load_url(url.as_str()).unwrap();
    assert_eq!((back.width(), back.height()), (5, 3));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn percent_encoded_url_is_decoded() {
    let dir = temp_dir("url");
    let nested = dir.join("with space");
    std::fs::create_dir_all(&nested).unwrap();
    let path = rasterkit::save(&noisy(4, 2), nested.join("a b.png")).unwrap();
    let url = url::Url::from_file_path(&path).unwrap();
    assert!(url.as_str().contains("%20"), "{url}");
    let back = rasterkit::load_url(url.as_str()).unwrap();
    assert_eq!((back.width(), back.height()), (4, 2));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn unencodable_sampling_fails_before_creating_a_file() {
    let dir = temp_dir("sampling");
    for (h, v) in [(3, 1), (4, 4)] {
        let path = dir.join(format!("{h}x{v}.jpg"));
        let s = Subsampling::from_factors(h, v).unwrap();
        let err = rasterkit::save_with(&noisy(8, 8), &path, &SaveOptions::default().subsampling(s))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(ref m) if m.contains("sampling")), "{err}");
        assert!(!path.exists(), "{} was created", path.display());
    }
    std::fs::remove_dir_all(dir).ok();
}
