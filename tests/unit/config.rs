use super::*;

#[test]
fn defaults_match_board_and_export_contract() {
    let cfg = RibbonConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.export.duration_secs, 15);
    assert_eq!(cfg.export.filename, "ribbon-output.mp4");
    assert_eq!(cfg.preview.width, DisplayWidth::Lower);
    assert_eq!(cfg.preview.params().duration.secs(), 30);
    assert_eq!(cfg.service.timeout(), Duration::from_secs(120));
}

#[test]
fn partial_toml_fills_in_defaults() {
    let cfg: RibbonConfig = toml::from_str(
        r#"
        [service]
        url = "https://render.example/api"

        [preview]
        direction = "right"
        width = 20208
        "#,
    )
    .unwrap();
    assert_eq!(cfg.service.url, "https://render.example/api");
    assert_eq!(cfg.service.timeout_secs, 120);
    assert_eq!(cfg.preview.direction, Direction::Right);
    assert_eq!(cfg.preview.width, DisplayWidth::UpperFullWrap);
    assert_eq!(cfg.export, ExportConfig::default());
}

#[test]
fn unknown_board_width_is_rejected() {
    let err = toml::from_str::<RibbonConfig>("[preview]\nwidth = 1234\n").unwrap_err();
    assert!(err.to_string().contains("1234"));
}

#[test]
fn preview_duration_is_clamped_like_the_slider() {
    let preview = PreviewConfig {
        duration_secs: 900,
        ..PreviewConfig::default()
    };
    assert_eq!(preview.params().duration.secs(), ScrollDuration::MAX);
}

#[test]
fn validation_rejects_zero_values() {
    let mut cfg = RibbonConfig::default();
    cfg.service.timeout_secs = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = RibbonConfig::default();
    cfg.preview.fps = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn save_then_load_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = RibbonConfig::default();
    cfg.export.output_dir = PathBuf::from("/srv/exports");
    cfg.preview.width = DisplayWidth::Upper;
    save_to_path(&cfg, &path).unwrap();

    assert_eq!(load_from_path(&path).unwrap(), cfg);
    assert!(load(Some(&path)).is_ok());
}

#[test]
fn missing_explicit_file_is_an_error() {
    assert!(load(Some(Path::new("/no/such/ribbon.toml"))).is_err());
}
