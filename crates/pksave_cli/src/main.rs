use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use pksave_core::core_api::{Engine, Session};
use pksave_core::{Family, GameVersion, NoResign};
use pksave_render::{
    JsonStyle, TextRenderOptions, block_lines, render_json_report, render_json_rewrite,
    render_json_slots, render_report_text, slot_pairs,
};
use serde_json::Value as JsonValue;

const EXIT_IO: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_INVALID: i32 = 3;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    #[arg(long, value_name = "GAME", value_parser = parse_game_version)]
    game: Option<GameVersion>,
    #[arg(long)]
    json: bool,
    /// Print the authoritative copy of each generation 4 region.
    #[arg(long, conflicts_with_all = ["verify", "fix"])]
    slots: bool,
    /// Check every block; exits with status 3 if any checksum is stale.
    #[arg(long, conflicts_with = "fix")]
    verify: bool,
    /// Recompute every checksum and write the result to --output.
    #[arg(long)]
    fix: bool,
    /// List every block in the summary, not only failing ones.
    #[arg(long, short = 'v')]
    verbose: bool,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.fix && cli.output.is_none() {
        eprintln!("--fix requires --output <PATH>");
        process::exit(EXIT_USAGE);
    }
    if !cli.fix && cli.output.is_some() {
        eprintln!("--output requires --fix");
        process::exit(EXIT_USAGE);
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(EXIT_IO);
    });

    let mut session = Engine::new()
        .open_bytes(bytes, cli.game)
        .unwrap_or_else(|e| {
            eprintln!("Error opening save file: {}", cli.path.display());
            eprintln!("  {e}");
            process::exit(EXIT_IO);
        });
    log::info!(
        "opened {} as {} ({})",
        cli.path.display(),
        session.version(),
        session.family()
    );

    if cli.slots {
        print_slots(&session, cli.json);
        return;
    }
    if cli.fix {
        // --fix without --output exits above.
        let Some(out_path) = cli.output.as_ref() else {
            process::exit(EXIT_USAGE);
        };
        fix(&mut session, out_path, cli.json);
        return;
    }

    let report = session.verify().unwrap_or_else(|e| {
        eprintln!("Error verifying checksums: {e}");
        process::exit(EXIT_IO);
    });

    if cli.verify {
        if cli.json {
            print_json(&render_json_report(
                &session,
                &report,
                JsonStyle::CanonicalV1,
            ));
        } else {
            for line in block_lines(&report) {
                println!("{line}");
            }
        }
        if !report.is_valid() {
            process::exit(EXIT_INVALID);
        }
        return;
    }

    if cli.json {
        print_json(&render_json_report(
            &session,
            &report,
            JsonStyle::CanonicalV1,
        ));
    } else {
        let options = TextRenderOptions {
            verbose: cli.verbose,
        };
        print!("{}", render_report_text(&session, &report, options));
    }
}

fn print_slots(session: &Session, json: bool) {
    let slots = session.active_slots().unwrap_or_else(|e| {
        eprintln!("Error locating active slots: {e}");
        process::exit(EXIT_IO);
    });
    let slots = session.family().is_double_buffered().then_some(slots);

    if json {
        print_json(&render_json_slots(slots.as_ref(), JsonStyle::CanonicalV1));
        return;
    }
    for (key, value) in slot_pairs(slots.as_ref()) {
        println!("{key}={value}");
    }
}

fn fix(session: &mut Session, out_path: &Path, json: bool) {
    let summary = session
        .rewrite_checksums(&mut NoResign)
        .unwrap_or_else(|e| {
            eprintln!("Error rewriting checksums: {e}");
            process::exit(EXIT_IO);
        });
    if session.family() == Family::SunMoon {
        log::warn!(
            "{} saves are signed; {} still needs to be re-signed before it will load",
            session.family(),
            out_path.display()
        );
    }

    fs::write(out_path, session.bytes()).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(EXIT_IO);
    });

    if json {
        print_json(&render_json_rewrite(&summary, JsonStyle::CanonicalV1));
    } else {
        println!(
            "Rewrote {} checksums, saved to {}",
            summary.blocks,
            out_path.display()
        );
    }
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(EXIT_IO);
    });
    println!("{rendered}");
}

fn parse_game_version(value: &str) -> Result<GameVersion, String> {
    value.parse()
}
