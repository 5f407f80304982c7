//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use proctor_core::model::option_label;
use proctor_core::report::AttemptReport;
use proctor_core::scoring::{PerformanceBand, SubjectScore};
use proctor_core::timer::format_clock;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn band_class(percentage: f64) -> &'static str {
    match PerformanceBand::from_percentage(percentage) {
        PerformanceBand::Strong => "strong",
        PerformanceBand::Moderate => "moderate",
        PerformanceBand::Weak => "weak",
    }
}

/// Generate an HTML report from an attempt report.
pub fn generate_html(report: &AttemptReport) -> String {
    let score = &report.score;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>proctor report: {}</title>\n",
        html_escape(&report.exam.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.exam.name)));
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | {} allowed | +{} / -{} marking | {}</p>\n",
        report.exam.question_count,
        format_clock(report.exam.duration_secs),
        report.exam.marking.correct,
        report.exam.marking.wrong_penalty,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Score</th><th>Percentage</th><th>Correct</th><th>Wrong</th><th>Unattempted</th><th>Time Spent</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    html.push_str(&format!(
        "<tr><td>{} / {}</td><td class=\"{}\">{:.1}% ({})</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        score.score,
        score.max_score,
        band_class(score.percentage),
        score.percentage,
        score.band,
        score.correct,
        score.wrong,
        score.unattempted,
        score.time_spent,
    ));
    html.push_str("</tbody></table>\n");

    if !score.subjects.is_empty() {
        html.push_str(&generate_bar_chart(&score.subjects));
    }
    html.push_str("</section>\n");

    // Per-subject results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Subjects</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Subject</th><th onclick=\"sortTable(1)\">Score</th><th onclick=\"sortTable(2)\">Percentage</th><th onclick=\"sortTable(3)\">Correct</th><th onclick=\"sortTable(4)\">Wrong</th><th onclick=\"sortTable(5)\">Unattempted</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for s in &score.subjects {
        let class = band_class(s.percentage);
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{} / {}</td><td>{:.1}%</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(s.subject.label()),
            s.score,
            s.max_score,
            s.percentage,
            s.correct,
            s.wrong,
            s.unattempted
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Answer sheet
    if !report.answers.is_empty() {
        html.push_str("<section class=\"answers\">\n");
        html.push_str("<details>\n<summary>Answer Sheet</summary>\n<p class=\"sheet\">");
        let cells: Vec<String> = report
            .answers
            .iter()
            .map(|(id, option)| format!("<span>Q{id}: {}</span>", option_label(*option)))
            .collect();
        html.push_str(&cells.join(" "));
        html.push_str("</p>\n</details>\n</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AttemptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(subjects: &[SubjectScore]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 220;

    let total_height = subjects.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, s) in subjects.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let fraction = (s.percentage / 100.0).clamp(0.0, 1.0);
        let width = (fraction * max_width as f64) as usize;

        let color = match PerformanceBand::from_percentage(s.percentage) {
            PerformanceBand::Strong => "#22c55e",
            PerformanceBand::Moderate => "#eab308",
            PerformanceBand::Weak => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(s.subject.label())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            s.percentage
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --strong: #dcfce7; --moderate: #fef9c3; --weak: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --strong: #064e3b; --moderate: #713f12; --weak: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.strong { background: var(--strong); }
.moderate { background: var(--moderate); }
.weak { background: var(--weak); }
.sheet span { display: inline-block; min-width: 5rem; font-family: monospace; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
