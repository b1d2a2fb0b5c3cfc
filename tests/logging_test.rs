//! The log sink installed as the process logger

use log::LevelFilter;
use nalgebra::Vector3;
use serial_test::serial;
use sierpinski_fill::{BBox3, Error, LogFile, SierpinskiFillProvider};

#[test]
#[serial]
fn test_installed_logger_receives_construction_records() {
    let path = std::env::temp_dir().join(format!(
        "sierpinski_fill_install_{}.log",
        std::process::id()
    ));
    let sink = LogFile::new(Some(&path), false)
        .expect("Failed to open log")
        .with_level(LevelFilter::Debug);
    sink.clone().install().expect("Failed to install logger");

    let volume = BBox3::new(Vector3::zeros(), Vector3::new(8.0, 8.0, 8.0));
    SierpinskiFillProvider::new(&volume, 2.0, 0.4).expect("Failed to build provider");
    SierpinskiFillProvider::new_3d(&volume, 2.0, 0.4).expect("Failed to build provider");
    log::logger().flush();

    let text = std::fs::read_to_string(&path).expect("Failed to read log");
    assert!(text.contains("[DEBUG]"));
    assert!(text.contains("shared sierpinski fill"));
    assert!(text.contains("adaptive cross3d fill"));

    // only one logger per process
    assert!(matches!(LogFile::console().install(), Err(Error::Logger(_))));
}
