use std::fmt::Write as _;

use pksave_core::core_api::{BlockReport, ChecksumReport, Session};
use pksave_core::{ActiveSlots, RewriteSummary};
use serde_json::{Map as JsonMap, Value as JsonValue};

const INDEX_COL_WIDTH: usize = 7;
const RANGE_COL_WIDTH: usize = 22;
const VALUE_COL_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// List every block, not just the ones that fail.
    pub verbose: bool,
}

pub fn render_json_report(
    session: &Session,
    report: &ChecksumReport,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(report_json(session, report)),
    }
}

pub fn render_json_slots(slots: Option<&ActiveSlots>, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => slots_json(slots),
    }
}

pub fn render_json_rewrite(summary: &RewriteSummary, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut out = JsonMap::new();
            out.insert(
                "family".to_string(),
                summary
                    .family
                    .map(|f| JsonValue::String(f.to_string()))
                    .unwrap_or(JsonValue::Null),
            );
            out.insert("blocks".to_string(), JsonValue::from(summary.blocks));
            out.insert("resigned".to_string(), JsonValue::Bool(summary.resigned));
            JsonValue::Object(out)
        }
    }
}

/// `key=value` lines for the active slots, in general/storage order.
pub fn slot_pairs(slots: Option<&ActiveSlots>) -> Vec<(&'static str, String)> {
    match slots {
        Some(slots) => vec![
            ("general", slots.general.to_string()),
            ("storage", slots.storage.to_string()),
        ],
        None => vec![("general", "n/a".to_string()), ("storage", "n/a".to_string())],
    }
}

pub fn render_report_text(
    session: &Session,
    report: &ChecksumReport,
    options: TextRenderOptions,
) -> String {
    let mut out = String::new();
    let invalid = report.invalid_blocks();

    writeln!(&mut out, "Game:    {}", session.version()).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Family:  {} (generation {})",
        report.family,
        report.family.generation()
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out, "Size:    {:#x} bytes", session.bytes().len())
        .expect("writing to String cannot fail");
    if let Some(slots) = &report.slots {
        writeln!(
            &mut out,
            "Slots:   general={} storage={}",
            slots.general, slots.storage
        )
        .expect("writing to String cannot fail");
    }
    writeln!(
        &mut out,
        "Blocks:  {} total, {} invalid",
        report.blocks.len(),
        invalid.len()
    )
    .expect("writing to String cannot fail");

    let listed: Vec<&BlockReport> = if options.verbose {
        report.blocks.iter().collect()
    } else {
        invalid
    };
    if listed.is_empty() {
        writeln!(&mut out, "All checksums valid.").expect("writing to String cannot fail");
        return out;
    }

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{:<iw$}{:<rw$}{:<vw$}{:<vw$}{:<vw$}Status",
        "Block",
        "Range",
        "Stored",
        "Mirror",
        "Computed",
        iw = INDEX_COL_WIDTH,
        rw = RANGE_COL_WIDTH,
        vw = VALUE_COL_WIDTH,
    )
    .expect("writing to String cannot fail");
    for block in listed {
        writeln!(&mut out, "{}", block_line(block)).expect("writing to String cannot fail");
    }
    out
}

/// One `key=value` line per block for line-oriented tooling.
pub fn block_lines(report: &ChecksumReport) -> Vec<String> {
    report
        .blocks
        .iter()
        .map(|b| {
            format!(
                "block={} stored={} computed={} valid={}",
                b.index,
                hex16(b.stored),
                hex16(b.computed),
                b.valid
            )
        })
        .collect()
}

fn block_line(block: &BlockReport) -> String {
    let range = format!("{:#07x}..{:#07x}", block.range.start, block.range.end);
    let mirror = block.mirror.map(hex16).unwrap_or_else(|| "-".to_string());
    format!(
        "{:<iw$}{:<rw$}{:<vw$}{:<vw$}{:<vw$}{}",
        block.index,
        range,
        hex16(block.stored),
        mirror,
        hex16(block.computed),
        if block.valid { "ok" } else { "BAD" },
        iw = INDEX_COL_WIDTH,
        rw = RANGE_COL_WIDTH,
        vw = VALUE_COL_WIDTH,
    )
}

fn report_json(session: &Session, report: &ChecksumReport) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    out.insert(
        "game".to_string(),
        JsonValue::String(report.version.to_string()),
    );
    out.insert(
        "family".to_string(),
        JsonValue::String(report.family.to_string()),
    );
    out.insert(
        "generation".to_string(),
        JsonValue::from(report.family.generation()),
    );
    out.insert("size".to_string(), JsonValue::from(session.bytes().len()));
    out.insert("slots".to_string(), slots_json(report.slots.as_ref()));
    out.insert("valid".to_string(), JsonValue::Bool(report.is_valid()));
    out.insert(
        "blocks".to_string(),
        JsonValue::Array(report.blocks.iter().map(block_json).collect()),
    );

    out
}

fn slots_json(slots: Option<&ActiveSlots>) -> JsonValue {
    match slots {
        Some(slots) => {
            let mut out = JsonMap::new();
            out.insert("general".to_string(), JsonValue::from(slots.general.index()));
            out.insert("storage".to_string(), JsonValue::from(slots.storage.index()));
            JsonValue::Object(out)
        }
        None => JsonValue::Null,
    }
}

fn block_json(block: &BlockReport) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("index".to_string(), JsonValue::from(block.index));
    out.insert("offset".to_string(), JsonValue::from(block.range.start));
    out.insert("length".to_string(), JsonValue::from(block.range.len()));
    out.insert("stored".to_string(), JsonValue::String(hex16(block.stored)));
    if let Some(mirror) = block.mirror {
        out.insert("mirror".to_string(), JsonValue::String(hex16(mirror)));
    }
    out.insert(
        "computed".to_string(),
        JsonValue::String(hex16(block.computed)),
    );
    out.insert("valid".to_string(), JsonValue::Bool(block.valid));
    JsonValue::Object(out)
}

fn hex16(value: u16) -> String {
    format!("0x{value:04X}")
}
