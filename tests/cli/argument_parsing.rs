//! Argument parsing tests

use clap::Parser;
use rollcall::app::cli::args::{Args, Command, ScanCommand};
use rollcall::backend::StudentId;
use serial_test::serial;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Result<Args, clap::Error> {
    Args::try_parse_from(std::iter::once("rollcall").chain(args.iter().copied()))
}

fn id(value: u64) -> StudentId {
    StudentId::new(value).unwrap()
}

#[test]
fn test_subcommands() {
    assert_eq!(
        parse(&["students", "--search", "ada"]).unwrap().command,
        Command::Students {
            search: Some("ada".to_string())
        }
    );
    assert_eq!(
        parse(&["remarks", "12", "Needs a seat near the front"])
            .unwrap()
            .command,
        Command::Remarks {
            id: id(12),
            text: "Needs a seat near the front".to_string()
        }
    );
    assert_eq!(
        parse(&["scan", "image", "card.png"]).unwrap().command,
        Command::Scan(ScanCommand::Image {
            file: PathBuf::from("card.png")
        })
    );
    assert_eq!(
        parse(&["login"]).unwrap().command,
        Command::Login { password: None }
    );
}

#[test]
fn test_student_id_must_be_positive() {
    assert!(parse(&["student", "0"]).is_err());
    assert!(parse(&["attendance", "-4"]).is_err());
    assert!(parse(&["attendance", "abc"]).is_err());
    assert_eq!(
        parse(&["attendance", "4"]).unwrap().command,
        Command::Attendance { id: id(4) }
    );
}

#[test]
fn test_subcommand_is_required() {
    assert!(parse(&[]).is_err());
    assert!(parse(&["scan"]).is_err());
}

#[test]
fn test_global_options_after_subcommand() {
    let args = parse(&[
        "scan",
        "camera",
        "--frames-dir",
        "/srv/frames",
        "--api-url",
        "http://register.local",
        "--cooldown-ms",
        "500",
    ])
    .unwrap();

    assert_eq!(args.frames_dir(), Some(&PathBuf::from("/srv/frames")));
    assert_eq!(args.api_url.as_deref(), Some("http://register.local"));
    assert_eq!(args.cooldown_ms, Some(500));
}

#[test]
fn test_color_flags() {
    assert_eq!(parse(&["students"]).unwrap().color_choice(), None);
    assert_eq!(
        parse(&["students", "--color"]).unwrap().color_choice(),
        Some(true)
    );
    assert_eq!(
        parse(&["students", "--no-color"]).unwrap().color_choice(),
        Some(false)
    );
    assert!(parse(&["students", "--color", "--no-color"]).is_err());
}

#[test]
fn test_log_options_are_validated() {
    assert!(parse(&["students", "--log-format", "xml"]).is_err());
    assert!(parse(&["students", "--log-level", "loud"]).is_err());

    let args = parse(&["students", "--log-format", "json", "--log-level", "debug"]).unwrap();
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
}

#[test]
#[serial]
fn test_token_and_url_from_environment() {
    std::env::set_var("ROLLCALL_TOKEN", "env-token");
    std::env::set_var("ROLLCALL_API_URL", "http://env.local");

    let from_env = parse(&["students"]).unwrap();
    let from_flag = parse(&["students", "--token", "flag-token"]).unwrap();

    std::env::remove_var("ROLLCALL_TOKEN");
    std::env::remove_var("ROLLCALL_API_URL");

    assert_eq!(from_env.token.as_deref(), Some("env-token"));
    assert_eq!(from_env.api_url.as_deref(), Some("http://env.local"));
    assert_eq!(from_flag.token.as_deref(), Some("flag-token"));
}
