use std::path::PathBuf;

use hcvss::cli::config::{resolve_min_length, resolve_output, CliConfig};

use super::support::Workspace;

#[test]
fn config_file_values_feed_resolution() {
    let workspace = Workspace::new();
    let config_path = workspace.path("config.toml");
    std::fs::write(
        &config_path,
        "snapshot_file = \"team-snapshot.json\"\nmin_length = 32\noutput = \"yaml\"\n",
    )
    .unwrap();

    let config = CliConfig::load_from_path(&config_path).unwrap();
    assert_eq!(config.snapshot_file, Some(PathBuf::from("team-snapshot.json")));
    assert_eq!(resolve_min_length(None, &config), 32);
    assert_eq!(resolve_min_length(Some(8), &config), 8);
    assert_eq!(resolve_output(None, &config), "yaml");
}

#[test]
fn unknown_output_format_is_rejected() {
    let config = CliConfig { output: Some("xml".to_string()), ..Default::default() };
    let format = resolve_output(None, &config).parse::<hcvss::cli::output::OutputFormat>();
    assert!(format.is_err());
}
