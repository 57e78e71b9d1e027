use super::*;

#[test]
fn test_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.name, "BrainFish");
    assert_eq!(config.author, "BlackBoxAI");
    assert_eq!(config.default_depth, 5);
    assert_eq!(config.max_depth, 32);
    assert!(config.own_book);
    assert_eq!(config.book_path, None);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_partial_file_keeps_defaults() {
    let config = EngineConfig::from_toml("default_depth = 3\nown_book = false\n", Path::new("x.toml")).unwrap();
    assert_eq!(config.default_depth, 3);
    assert!(!config.own_book);
    assert_eq!(config.name, "BrainFish");
}

#[test]
fn test_depths_are_clamped() {
    let config = EngineConfig::from_toml("default_depth = 50\nmax_depth = 10\n", Path::new("x.toml")).unwrap();
    assert_eq!(config.max_depth, 10);
    assert_eq!(config.default_depth, 10);
}

#[test]
fn test_bad_toml_names_the_file() {
    let err = EngineConfig::from_toml("default_depth = \"deep\"", Path::new("engine.toml")).unwrap_err();
    assert!(err.to_string().contains("engine.toml"));
}

#[test]
fn test_no_path_means_defaults() {
    let config = EngineConfig::from_args(vec!["brainfish".to_string()], None).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_config_flag_without_path() {
    let args = vec!["brainfish".to_string(), "--config".to_string()];
    assert!(matches!(
        EngineConfig::from_args(args, None),
        Err(ConfigError::MissingPath)
    ));
}

#[test]
fn test_config_flag_reads_file() {
    let path = std::env::temp_dir().join(format!("brainfish-config-{}.toml", std::process::id()));
    std::fs::write(&path, "name = \"Tester\"\nbook_path = \"book.json\"\n").unwrap();
    let args = vec![
        "brainfish".to_string(),
        "--config".to_string(),
        path.display().to_string(),
    ];
    let config = EngineConfig::from_args(args, Some("ignored.toml".to_string()));
    std::fs::remove_file(&path).ok();

    let config = config.unwrap();
    assert_eq!(config.name, "Tester");
    assert_eq!(config.book_path, Some(PathBuf::from("book.json")));
}

#[test]
fn test_env_path_missing_file_fails() {
    let result = EngineConfig::from_args(Vec::new(), Some("/nonexistent/brainfish.toml".to_string()));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}
