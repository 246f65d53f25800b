//! HTML rendering for the lookup form and its results.

use std::fmt::Write;

use nearclose_core::{LookupReport, Notice, PriceRecord, PriceSeries};

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Arial, sans-serif; margin: 0; padding: 20px; background: #f4f6f8; }
        .container { max-width: 960px; margin: 0 auto; }
        .card { background: white; border-radius: 8px; padding: 20px; margin: 15px 0; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
        h1 { color: #1f2d3d; }
        h3 { color: #333; border-bottom: 2px solid #3b6ea5; padding-bottom: 6px; margin-top: 0; }
        table { width: 100%; border-collapse: collapse; }
        th { background: #3b6ea5; color: white; padding: 8px; text-align: right; }
        td { padding: 6px 8px; border-bottom: 1px solid #eee; text-align: right; font-family: 'Courier New', monospace; }
        .scroll { max-height: 420px; overflow-y: auto; }
        .notice { padding: 12px; border-radius: 6px; margin: 8px 0; }
        .success { background: #d4edda; color: #155724; }
        .warning { background: #fff3cd; color: #856404; }
        .info { background: #d1ecf1; color: #0c5460; }
        .error { background: #f8d7da; color: #721c24; }
"#;

/// Full page around `body`.
pub fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Stock Price Target Checker</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>Stock Price Target Checker</h1>
        <p>Enter the ticker and the target price to check.</p>
{body}
    </div>
</body>
</html>
"#
    )
}

/// The lookup form, pre-filled with what the user last typed.
pub fn form(ticker: &str, target_price: &str) -> String {
    format!(
        r#"        <form class="card" method="post" action="/check">
            <label>Ticker (e.g. BOVA11.SA): <input name="ticker" value="{}"></label>
            <label>Target price: <input name="target_price" inputmode="decimal" value="{}"></label>
            <button type="submit">Check</button>
        </form>
"#,
        escape(ticker),
        escape(target_price)
    )
}

pub fn notices(notices: &[Notice]) -> String {
    let mut html = String::new();
    for notice in notices {
        let _ = writeln!(
            html,
            r#"        <div class="notice {}">{}</div>"#,
            notice.level,
            escape(&notice.text)
        );
    }
    html
}

/// Raw data, comparison, closest close, download link and notices, in that order.
pub fn report(report: &LookupReport) -> String {
    let summary = &report.proximity.summary;
    let mut html = String::new();

    html.push_str(&card("Raw data downloaded", &raw_table(&report.series)));

    let comparison = format!(
        "<table><tr><th>Current price</th><th>Target price</th><th>Difference from target</th><th>Difference (%) from target</th></tr>\
         <tr><td>{:.2}</td><td>{:.2}</td><td>{}</td><td>{}</td></tr></table>",
        summary.current_price,
        summary.target_price,
        summary.signed_difference(),
        summary.signed_percent()
    );
    html.push_str(&card("Current price vs target", &comparison));

    if let Some(closest) = &report.proximity.closest {
        html.push_str(&card(
            "Closest close found",
            &records_table(std::slice::from_ref(closest)),
        ));
    }

    if !report.proximity.matches.is_empty() {
        html.push_str(&card(
            "Closes within tolerance",
            &records_table(&report.proximity.matches),
        ));
    }

    let link = format!(
        r#"<a href="/export?ticker={}&amp;as_of={}">Download raw data as a spreadsheet</a>"#,
        urlencoding::encode(report.symbol.as_str()),
        urlencoding::encode(&report.as_of.format_rfc3339())
    );
    html.push_str(&card("Export", &link));

    html.push_str(&notices(&report.notices()));
    html
}

fn card(title: &str, content: &str) -> String {
    format!(
        "        <div class=\"card\"><h3>{}</h3>{content}</div>\n",
        escape(title)
    )
}

fn raw_table(series: &PriceSeries) -> String {
    format!(
        "<div class=\"scroll\">{}</div>",
        records_table(series.records())
    )
}

fn records_table(records: &[PriceRecord]) -> String {
    let mut html = String::from(
        "<table><tr><th>Date</th><th>Open</th><th>High</th><th>Low</th><th>Close</th><th>Volume</th></tr>",
    );
    for record in records {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
            record.date,
            price_cell(record.open),
            price_cell(record.high),
            price_cell(record.low),
            record.close,
            record.volume.map(|v| v.to_string()).unwrap_or_default()
        );
    }
    html.push_str("</table>");
    html
}

fn price_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
