//! Tests for check and config.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_check() {
    match parse(&["framepull", "check", "videos.csv"]) {
        CliCommand::Check { manifest, limit } => {
            assert_eq!(manifest, PathBuf::from("videos.csv"));
            assert!(limit.is_none());
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_check_with_limit() {
    match parse(&["framepull", "check", "videos.csv", "--limit", "25"]) {
        CliCommand::Check { limit, .. } => assert_eq!(limit, Some(25)),
        _ => panic!("expected Check with --limit"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["framepull", "config"]) {
        CliCommand::Config { config } => assert!(config.is_none()),
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_parse_config_explicit_path() {
    match parse(&["framepull", "config", "--config", "fp.toml"]) {
        CliCommand::Config { config } => assert_eq!(config.as_deref(), Some(Path::new("fp.toml"))),
        _ => panic!("expected Config with --config"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["framepull", "status"]).is_err());
}
