//! Command execution against the gateway

use crate::cli::Commands;
use fire_core::{Gateway, GatewayConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Run one command, writing its JSON result to `out`
///
/// `config_path` is where `init-config` writes; `None` means the default
/// location.
pub fn run<W: Write>(
    gateway: &Gateway,
    config: &GatewayConfig,
    config_path: Option<&Path>,
    command: Commands,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Status => print_json(out, &gateway.status()),
        Commands::List { path } => print_json(out, &gateway.list_directory(&path)?),
        Commands::Tree => print_json(out, &gateway.build_tree()),
        Commands::Tags => print_json(out, &gateway.read_tags()),
        Commands::Tag { path, tags } => {
            gateway.update_tags(BTreeMap::from([(path.clone(), tags)]))?;
            print_json(out, &serde_json::json!({ "path": path, "tags": gateway.read_tags().get(&path) }))
        }
        Commands::Markers { path } => print_json(out, &gateway.read_markers(&path)?),
        Commands::Mark { path, markers } => {
            gateway.save_markers(&path, markers)?;
            print_json(out, &gateway.read_markers(&path)?)
        }
        Commands::Lessons => print_json(out, &gateway.list_lessons()),
        Commands::Lesson { name } => print_json(out, &gateway.get_lesson(&name)?),
        Commands::SaveLesson { file } => {
            let body = std::fs::read(&file)?;
            print_json(out, &gateway.save_lesson(&body)?)
        }
        Commands::Mkdir { path } => {
            gateway.make_dir(&path)?;
            print_json(out, &serde_json::json!({ "created": path }))
        }
        Commands::Upload { path, source } => {
            let mut file = std::fs::File::open(&source)?;
            let size = gateway.upload(&path, &mut file)?;
            print_json(out, &serde_json::json!({ "path": path, "size": size }))
        }
        Commands::Share { path, host } => {
            let host = host.unwrap_or_else(|| gateway.status().address);
            print_json(out, &gateway.share_url(&host, &path)?)
        }
        Commands::ImportMarkers => {
            let imported = gateway.import_legacy_markers()?;
            print_json(out, &serde_json::json!({ "imported": imported }))
        }
        Commands::InitConfig => {
            let written = match config_path {
                Some(path) => {
                    config.save_to(path)?;
                    path.to_path_buf()
                }
                None => {
                    config.save()?;
                    GatewayConfig::config_path()
                }
            };
            print_json(out, &serde_json::json!({ "config": written }))
        }
    }
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fire_core::{GatewayError, Marker};
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        base: std::path::PathBuf,
        config: GatewayConfig,
        gateway: Gateway,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().to_path_buf();
        let config = GatewayConfig::with_root(base.join("share"));
        config.ensure_root().unwrap();
        let gateway = Gateway::new(&config);
        Fixture { _temp_dir: temp_dir, base, config, gateway }
    }

    fn run_json(f: &Fixture, command: Commands) -> serde_json::Value {
        let mut out = Vec::new();
        run(&f.gateway, &f.config, None, command, &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_upload_list_and_tree() {
        let f = fixture();
        let source = f.base.join("local.png");
        std::fs::write(&source, b"12345").unwrap();

        let uploaded = run_json(&f, Commands::Upload { path: "notes/today.png".into(), source });
        assert_eq!(uploaded["size"], 5);

        let listing = run_json(&f, Commands::List { path: "notes".into() });
        assert_eq!(listing["files"][0]["name"], "today.png");
        assert_eq!(listing["files"][0]["size"], 5);

        let tree = run_json(&f, Commands::Tree);
        assert_eq!(tree[0]["children"][0]["path"], "notes/today.png");
    }

    #[test]
    fn test_tag_and_mark() {
        let f = fixture();

        let tagged = run_json(&f, Commands::Tag { path: "a.png".into(), tags: vec!["sky".into()] });
        assert_eq!(tagged["tags"], serde_json::json!(["sky"]));

        let cleared = run_json(&f, Commands::Tag { path: "a.png".into(), tags: vec![] });
        assert!(cleared["tags"].is_null());

        let marked = run_json(
            &f,
            Commands::Mark {
                path: "v.mp4".into(),
                markers: vec![Marker { time: 2.0, label: "go".into() }],
            },
        );
        assert_eq!(marked["markers"][0]["label"], "go");
        assert_eq!(run_json(&f, Commands::Tags)["v.mp4"], serde_json::json!(["annotated"]));
    }

    #[test]
    fn test_save_lesson_from_file() {
        let f = fixture();
        let file = f.base.join("plan.json");
        std::fs::write(&file, br#"{"name": "Week 3", "slides": []}"#).unwrap();

        let saved = run_json(&f, Commands::SaveLesson { file });
        assert_eq!(saved["name"], "Week 3");
        assert_eq!(run_json(&f, Commands::Lessons), serde_json::json!(["Week 3"]));
    }

    #[test]
    fn test_share_with_host() {
        let f = fixture();
        let link = run_json(
            &f,
            Commands::Share { path: "a b.png".into(), host: Some("10.0.0.2:8080".into()) },
        );
        assert_eq!(link["url"], "http://10.0.0.2:8080/files/a%20b.png");
    }

    #[test]
    fn test_init_config_writes_file() {
        let f = fixture();
        let path = f.base.join("conf/config.toml");

        let mut out = Vec::new();
        run(&f.gateway, &f.config, Some(&path), Commands::InitConfig, &mut out).unwrap();

        let loaded = GatewayConfig::load_from(&path).unwrap();
        assert_eq!(loaded.general.root_dir, f.config.general.root_dir);
    }

    #[test]
    fn test_errors_propagate() {
        let f = fixture();

        let mut out = Vec::new();
        let err = run(&f.gateway, &f.config, None, Commands::Lesson { name: "missing".into() }, &mut out)
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<GatewayError>(), Some(GatewayError::NotFound(_))));
        assert!(run(&f.gateway, &f.config, None, Commands::Markers { path: "".into() }, &mut out).is_err());
        assert!(out.is_empty());
    }
}
