//! End-to-end tests of the fill provider

use nalgebra::Vector3;
use sierpinski_fill::{
    BBox3, Error, FillMethod, FillMode, FillSettings, ImageGrayScale, SierpinskiFillProvider,
    TgaIo,
};
use std::path::PathBuf;

fn volume(x: f32, y: f32, z: f32) -> BBox3 {
    BBox3::new(Vector3::zeros(), Vector3::new(x, y, z))
}

/// Left half black (dense), right half white (sparse).
fn write_split_image(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sierpinski_fill_tests_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("Failed to create temp dir");
    let path = dir.join(name);
    let mut image = ImageGrayScale::filled(16, 16, 1.0);
    for y in 0..16 {
        for x in 0..8 {
            image.set_value(x, y, 0.0);
        }
    }
    TgaIo::save_tga(&path, &image).expect("Failed to write density image");
    path
}

#[test]
fn test_fractal_config_of_flat_volume() {
    let provider = SierpinskiFillProvider::new(&volume(700.0, 300.0, 50.0), 250.0, 0.4)
        .expect("Failed to build provider");
    let config = provider.fractal_config();
    assert_eq!(config.depth, 3);
    assert!((config.side_length() - 707.1068).abs() < 0.01);
    let center = config.bounds.center();
    assert!((center.x - 350.0).abs() < 1e-3);
    assert!((center.y - 150.0).abs() < 1e-3);
}

#[test]
fn test_modes_are_exclusive() {
    let v = volume(20.0, 20.0, 20.0);
    let image = write_split_image("exclusive.tga");
    let providers = [
        SierpinskiFillProvider::new(&v, 2.0, 0.4).unwrap(),
        SierpinskiFillProvider::with_density_image(&v, 2.0, 0.4, &image).unwrap(),
        SierpinskiFillProvider::new_3d(&v, 2.0, 0.4).unwrap(),
        SierpinskiFillProvider::with_density_image_3d(&v, 2.0, 0.4, &image).unwrap(),
    ];
    for (i, provider) in providers.iter().enumerate() {
        assert!(
            provider.is_shared_pattern() != provider.is_adaptive_3d(),
            "provider {}",
            i
        );
        assert_eq!(provider.is_adaptive_3d(), i >= 2);
        assert_eq!(provider.layer_start_index().is_some(), i >= 2);
    }
}

#[test]
fn test_shared_image_fill_is_denser_where_dark() {
    let image = write_split_image("shared.tga");
    let v = volume(40.0, 40.0, 10.0);
    let provider = SierpinskiFillProvider::with_density_image(&v, 2.0, 0.4, &image)
        .expect("Failed to build provider");
    let center_x = provider.fractal_config().bounds.center().x;

    let polygon = provider.generate(FillMethod::Cross, 5.0, 0.4, 0.0);
    let left = polygon.vertices().iter().filter(|p| p.x < center_x).count();
    let right = polygon.len() - left;
    assert!(left > right, "left {} right {}", left, right);

    // the shared pattern is the same on every layer
    assert_eq!(polygon, provider.generate(FillMethod::Cross, 9.0, 0.4, 0.0));
}

#[test]
fn test_adaptive_image_fill() {
    let image = write_split_image("adaptive.tga");
    let v = volume(16.0, 16.0, 16.0);
    let provider = SierpinskiFillProvider::with_density_image_3d(&v, 2.0, 0.4, &image)
        .expect("Failed to build provider");
    let structure = provider.structure_3d().expect("adaptive structure");
    assert!(structure.max_layer_depth_jump() <= 2);

    let bounds = provider.fractal_config().bounds;
    for z in [0.1, 4.0, 8.0, 15.9] {
        let polygon = provider.generate(FillMethod::Cross3D, z, 0.4, 0.0);
        assert!(polygon.len() > 2, "layer at {}", z);
        for p in polygon.vertices() {
            assert!(bounds.flatten().contains(*p));
        }
        let left = polygon.vertices().iter().filter(|p| p.x < 8.0).count();
        assert!(left * 2 > polygon.len(), "layer at {}", z);
    }
}

#[test]
fn test_adaptive_layers_follow_start_index() {
    let v = volume(8.0, 8.0, 8.0);
    let provider = SierpinskiFillProvider::new_3d(&v, 2.0, 0.4).unwrap();
    let starts = provider.layer_start_index().unwrap();
    let structure = provider.structure_3d().unwrap();

    for (z, cell) in starts.iter() {
        assert_eq!(starts.start_cell(z), Some(cell));
        assert!(structure.cell(cell).is_leaf());
    }
    // below the first entry the first entry is used
    let (first_z, first_cell) = starts.iter().next().unwrap();
    assert_eq!(starts.start_cell(first_z - 1.0), Some(first_cell));

    let polygon = provider.generate(FillMethod::Cross, 3.3, 0.4, 0.0);
    let walker = structure.sequence(starts.start_cell(3.3).unwrap(), 3.3);
    assert_eq!(polygon, structure.generate_cross(&walker, 3.3));
}

#[test]
fn test_missing_image_is_an_error() {
    let v = volume(10.0, 10.0, 10.0);
    let missing = std::env::temp_dir().join("sierpinski_fill_missing_density.tga");
    assert!(matches!(
        SierpinskiFillProvider::with_density_image(&v, 2.0, 0.4, &missing),
        Err(Error::FileLoad(_))
    ));
    assert!(matches!(
        SierpinskiFillProvider::with_density_image_3d(&v, 2.0, 0.4, &missing),
        Err(Error::FileLoad(_))
    ));
}

#[test]
fn test_from_settings_matches_constructors() {
    let v = volume(20.0, 20.0, 20.0);
    let image = write_split_image("settings.tga");

    let settings = FillSettings::new(2.0, 0.4).with_density_image(&image);
    let from_settings = SierpinskiFillProvider::from_settings(&v, &settings).unwrap();
    let direct = SierpinskiFillProvider::with_density_image(&v, 2.0, 0.4, &image).unwrap();
    assert_eq!(
        from_settings.generate(FillMethod::Cross, 0.0, 0.4, 0.0),
        direct.generate(FillMethod::Cross, 0.0, 0.4, 0.0)
    );

    let settings = FillSettings::new(2.0, 0.4).with_mode(FillMode::Adaptive3D);
    let from_settings = SierpinskiFillProvider::from_settings(&v, &settings).unwrap();
    let direct = SierpinskiFillProvider::new_3d(&v, 2.0, 0.4).unwrap();
    assert_eq!(
        from_settings.generate(FillMethod::Cross, 7.5, 0.4, 0.0),
        direct.generate(FillMethod::Cross, 7.5, 0.4, 0.0)
    );

    let invalid = FillSettings::new(-2.0, 0.4);
    assert!(matches!(
        SierpinskiFillProvider::from_settings(&v, &invalid),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_construction_is_deterministic() {
    let v = volume(30.0, 20.0, 12.0);
    let a = SierpinskiFillProvider::new_3d(&v, 1.5, 0.4).unwrap();
    let b = SierpinskiFillProvider::new_3d(&v, 1.5, 0.4).unwrap();
    assert_eq!(a.fractal_config(), b.fractal_config());
    assert_eq!(a.layer_start_index(), b.layer_start_index());
    for z in [0.0, 2.2, 6.0, 11.9] {
        assert_eq!(
            a.generate(FillMethod::Cross, z, 0.4, 0.0),
            b.generate(FillMethod::Cross, z, 0.4, 0.0)
        );
    }
}
