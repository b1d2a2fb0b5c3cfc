//! Generating from the per-layer density configuration must abort.

use nalgebra::Vector3;
use sierpinski_fill::{BBox3, FillMethod, FillMode, FillSettings, LogFile, SierpinskiFillProvider};
use std::process::Command;

const CHILD_ENV: &str = "SIERPINSKI_FILL_ABORT_CHILD";
const TEST_NAME: &str = "test_varying_per_layer_generate_exits";

#[test]
fn test_varying_per_layer_generate_exits() {
    if std::env::var_os(CHILD_ENV).is_some() {
        LogFile::console().install().expect("Failed to install logger");
        let volume = BBox3::new(Vector3::zeros(), Vector3::new(10.0, 10.0, 10.0));
        let settings = FillSettings::new(2.0, 0.4).with_mode(FillMode::VaryingPerLayer);
        let provider = SierpinskiFillProvider::from_settings(&volume, &settings)
            .expect("Failed to build provider");
        let _ = provider.generate(FillMethod::Cross, 1.0, 0.4, 0.0);
        unreachable!("generate returned");
    }

    let exe = std::env::current_exe().expect("Failed to locate test binary");
    let output = Command::new(exe)
        .args([TEST_NAME, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .expect("Failed to run child process");

    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(101), "child panicked instead of exiting");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not implemented"),
        "missing error message in: {}",
        stderr
    );
}
