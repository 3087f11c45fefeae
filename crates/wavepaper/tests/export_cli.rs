use std::process::Command;

use tempfile::TempDir;

#[test]
fn cpu_still_export_writes_a_png() {
    let root = TempDir::new().unwrap();
    let output_path = root.path().join("frames").join("still.png");

    let status = Command::new(env!("CARGO_BIN_EXE_wavepaper"))
        .env("WAVEPAPER_CONFIG_DIR", root.path())
        .env_remove("WAVEPAPER_CONFIG")
        .args(["--backend", "cpu", "--size", "48x32", "--still-time", "2.5"])
        .arg("--still-export")
        .arg(&output_path)
        .status()
        .expect("failed to run wavepaper still export");
    assert!(status.success());

    let image = image::open(&output_path).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (48, 32));
    assert!(image.pixels().all(|pixel| pixel.0[3] == 255));
}

#[test]
fn unsupported_export_format_fails() {
    let root = TempDir::new().unwrap();
    let output_path = root.path().join("still.exr");

    let output = Command::new(env!("CARGO_BIN_EXE_wavepaper"))
        .env("WAVEPAPER_CONFIG_DIR", root.path())
        .env_remove("WAVEPAPER_CONFIG")
        .args(["--backend", "cpu", "--size", "8x8"])
        .arg("--still-export")
        .arg(&output_path)
        .output()
        .expect("failed to run wavepaper still export");
    assert!(!output.status.success());
    assert!(!output_path.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported export format"));
}
