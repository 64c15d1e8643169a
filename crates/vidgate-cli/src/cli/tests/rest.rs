//! Tests for pin, gateways, config-path.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_pin() {
    match parse(&["vidgate", "pin", "clips/intro.mp4"]) {
        CliCommand::Pin { path } => assert_eq!(path, PathBuf::from("clips/intro.mp4")),
        _ => panic!("expected Pin"),
    }
}

#[test]
fn cli_parse_gateways() {
    match parse(&["vidgate", "gateways"]) {
        CliCommand::Gateways => {}
        _ => panic!("expected Gateways"),
    }
}

#[test]
fn cli_parse_config_path() {
    match parse(&["vidgate", "config-path"]) {
        CliCommand::ConfigPath => {}
        _ => panic!("expected ConfigPath"),
    }
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["vidgate", "download", "x"]).is_err());
}
