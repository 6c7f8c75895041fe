//! CLI parse tests.

use super::{Cli, CliCommand, PriorityArg};
use clap::{CommandFactory, Parser};
use imgfetch_core::Priority;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn cli_parse_get() {
    match parse(&["imgfetch", "get", "https://a.com/x.png"]).command {
        CliCommand::Get { url, no_fetch } => {
            assert_eq!(url, "https://a.com/x.png");
            assert!(!no_fetch);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_no_fetch() {
    match parse(&["imgfetch", "get", "--no-fetch", "https://a.com/x.png"]).command {
        CliCommand::Get { no_fetch, .. } => assert!(no_fetch),
        _ => panic!("expected Get with --no-fetch"),
    }
}

#[test]
fn cli_parse_prefetch_many() {
    match parse(&["imgfetch", "prefetch", "https://a.com/1", "https://a.com/2"]).command {
        CliCommand::Prefetch { urls, priority } => {
            assert_eq!(urls, vec!["https://a.com/1", "https://a.com/2"]);
            assert_eq!(priority, PriorityArg::Normal);
        }
        _ => panic!("expected Prefetch"),
    }
}

#[test]
fn cli_parse_prefetch_priority() {
    match parse(&["imgfetch", "prefetch", "--priority", "high", "https://a.com/1"]).command {
        CliCommand::Prefetch { priority, .. } => {
            assert_eq!(Priority::from(priority), Priority::High);
        }
        _ => panic!("expected Prefetch with --priority"),
    }
}

#[test]
fn cli_prefetch_requires_a_url() {
    assert!(Cli::try_parse_from(["imgfetch", "prefetch"]).is_err());
}

#[test]
fn cli_parse_clear_with_config() {
    let cli = parse(&["imgfetch", "clear", "--config", "/tmp/imgfetch.toml"]);
    assert!(matches!(cli.command, CliCommand::Clear));
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/imgfetch.toml"))
    );
}

#[test]
fn cli_parse_key_and_inspect() {
    match parse(&["imgfetch", "key", "https://a.com/x.png"]).command {
        CliCommand::Key { url } => assert_eq!(url, "https://a.com/x.png"),
        _ => panic!("expected Key"),
    }
    match parse(&["imgfetch", "inspect", "https://a.com/x.png"]).command {
        CliCommand::Inspect { url } => assert_eq!(url, "https://a.com/x.png"),
        _ => panic!("expected Inspect"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["imgfetch", "completions", "bash"]).command {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[tokio::test]
async fn app_looks_up_blobs_under_normalized_keys() {
    use super::App;
    use imgfetch_core::config::ImgfetchConfig;
    use imgfetch_core::store::CacheStore;

    let dir = tempfile::tempdir().unwrap();
    let cfg = ImgfetchConfig {
        namespace: "thumbs".to_string(),
        cache_dir: Some(dir.path().to_path_buf()),
        ..ImgfetchConfig::default()
    };
    let app = App::compose(&cfg).unwrap();
    assert_eq!(app.namespace(), "thumbs");

    let key = imgfetch_core::normalize_key("https://a.com/x.png");
    assert_eq!(app.cached_path(&key).unwrap(), None);
    assert_eq!(app.cached_path("").unwrap(), None);

    app.store.write("thumbs", &key, b"png").unwrap();
    assert_eq!(
        app.cached_path(&key).unwrap(),
        Some(dir.path().join("thumbs").join("https:a.comx.png"))
    );

    app.fetcher.clear_cache().await;
    assert_eq!(app.cached_path(&key).unwrap(), None);
}

#[tokio::test]
async fn app_refuses_a_namespace_it_could_never_write() {
    use super::App;
    use imgfetch_core::config::ImgfetchConfig;

    let dir = tempfile::tempdir().unwrap();
    for namespace in ["", "a/b"] {
        let cfg = ImgfetchConfig {
            namespace: namespace.to_string(),
            cache_dir: Some(dir.path().to_path_buf()),
            ..ImgfetchConfig::default()
        };
        let err = App::compose(&cfg).err().expect("compose should fail");
        let msg = format!("{err:#}");
        assert!(msg.contains("configured namespace"), "{msg}");
        assert!(msg.contains("invalid cache namespace"), "{msg}");
    }
}
