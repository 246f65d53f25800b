use std::io::{self, Write};
use std::path::Path;

use nearclose_core::{LookupReport, Notice, PriceRecord};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render_report(
    report: &LookupReport,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let payload = json!({ "report": report, "notices": report.notices() });
            write_json(&mut out, &payload, pretty)?;
        }
        OutputFormat::Table => write_report_table(&mut out, report)?,
    }
    Ok(())
}

pub fn render_export(
    path: &Path,
    records: usize,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let payload = json!({ "path": path.display().to_string(), "records": records });
            write_json(&mut out, &payload, pretty)?;
        }
        OutputFormat::Table => writeln!(out, "wrote {records} records to {}", path.display())?,
    }
    Ok(())
}

fn write_json<W: Write>(
    out: &mut W,
    payload: &serde_json::Value,
    pretty: bool,
) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    writeln!(out, "{text}")?;
    Ok(())
}

pub fn write_report_table<W: Write>(out: &mut W, report: &LookupReport) -> io::Result<()> {
    let summary = &report.proximity.summary;

    writeln!(out, "symbol      : {}", report.symbol)?;
    writeln!(out, "source      : {}", report.source)?;
    writeln!(out, "request_id  : {}", report.request_id)?;
    writeln!(
        out,
        "window      : {} .. {}",
        report.window.start.date(),
        report.window.end.date()
    )?;
    writeln!(out, "records     : {}", report.series.len())?;
    if let Some(currency) = report.quote.currency.as_deref() {
        writeln!(out, "currency    : {currency}")?;
    }

    writeln!(out, "comparison:")?;
    writeln!(
        out,
        "  {:>14}  {:>14}  {:>14}  {:>14}",
        "current", "target", "difference", "difference %"
    )?;
    writeln!(
        out,
        "  {:>14.2}  {:>14.2}  {:>14}  {:>14}",
        summary.current_price,
        summary.target_price,
        summary.signed_difference(),
        summary.signed_percent()
    )?;

    writeln!(out, "matches ({}):", report.proximity.matches.len())?;
    for record in &report.proximity.matches {
        write_record(out, record)?;
    }

    if let Some(closest) = &report.proximity.closest {
        writeln!(out, "closest:")?;
        write_record(out, closest)?;
    }

    write_notices(out, &report.notices())
}

fn write_record<W: Write>(out: &mut W, record: &PriceRecord) -> io::Result<()> {
    writeln!(out, "  {}  {:>10.2}", record.date, record.close)
}

fn write_notices<W: Write>(out: &mut W, notices: &[Notice]) -> io::Result<()> {
    if notices.is_empty() {
        return Ok(());
    }
    writeln!(out, "notices:")?;
    for notice in notices {
        writeln!(out, "  {notice}")?;
    }
    Ok(())
}
