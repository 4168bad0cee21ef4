use chrono::NaiveDateTime;

use super::ScoreBand;
use crate::state::data::{SimilarityScores, VerificationResult};

/// One image card in the report
pub(super) struct CardView {
    pub file_name: String,
    pub mime: &'static str,
    pub base64: String,
    pub sha256: String,
}

/// Everything the document shows
pub(super) struct ReportView {
    pub generated_at: NaiveDateTime,
    pub cards: [CardView; 2],
    pub verdict: &'static str,
    pub result: VerificationResult,
    pub scores: SimilarityScores,
    /// Bands for [threshold-relative, absolute]
    pub bands: [ScoreBand; 2],
}

const STYLE: &str = r#"
    body { font-family: "Segoe UI", Arial, sans-serif; background: #f7f7f7; margin: 0; }
    .container { max-width: 960px; margin: auto; background: #fff; padding: 24px;
                 box-shadow: 0 4px 12px rgba(0,0,0,.1); }
    h2 { text-align: center; margin-top: 0; }
    .faces { display: flex; justify-content: space-between; gap: 20px; margin: 20px 0; }
    .card { flex: 1; text-align: center; border: 1px solid #ddd; border-radius: 8px; padding: 12px; }
    .card img { width: 100%; height: auto; max-height: 320px; object-fit: contain; border-radius: 4px; }
    .hash { font-size: 12px; color: #555; word-break: break-all; margin-top: 4px; }
    @media (max-width: 768px) { .faces { flex-direction: column; } }
"#;

pub(super) fn render(view: &ReportView) -> String {
    let [first, second] = &view.cards;
    let [band_a, band_b] = view.bands;

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>DeepFace Report</title>
<style>{style}</style>
</head>
<body>
<div class="container">
    <h2>DeepFace Face Comparison Report</h2>
    <p><b>Generated:</b> {generated_at}</p>

    <div class="faces">
{card1}
{card2}
    </div>

    <h3>Verification result</h3>
    <p><b>Verdict:</b> {verdict}</p>
    <ul>
        <li><b>distance:</b> {distance:.4} (lower is more similar)</li>
        <li><b>threshold:</b> {threshold:.4} (decision cutoff)</li>
    </ul>

    <h3>Similarity</h3>
    <ol>
        <li>Method A (relative to threshold): <b class="band-{label_a}" style="color:{color_a};">{score_a:.1}%</b> ({label_a})
            <br><small>Higher means more margin under the threshold</small></li>
        <li>Method B (inverse distance): <b class="band-{label_b}" style="color:{color_b};">{score_b:.1}%</b> ({label_b})
            <br><small>Rough intuitive percentage, for reference only</small></li>
    </ol>

    <p style="color:#666;">Note: <u>the verdict (✅ / ❌) is the authoritative decision</u>. Similarity A shows the margin, B is only a rough percentage.</p>
</div>
</body>
</html>
"#,
        style = STYLE,
        generated_at = view.generated_at.format("%Y-%m-%d %H:%M:%S"),
        card1 = render_card(1, first),
        card2 = render_card(2, second),
        verdict = view.verdict,
        distance = view.result.distance,
        threshold = view.result.threshold,
        score_a = view.scores.threshold_relative,
        score_b = view.scores.absolute,
        label_a = band_a.label(),
        color_a = band_a.css_color(),
        label_b = band_b.label(),
        color_b = band_b.css_color(),
    )
}

fn render_card(number: u8, card: &CardView) -> String {
    format!(
        r#"        <div class="card">
            <h3>Image {number}: {name}</h3>
            <img src="data:{mime};base64,{data}" alt="Image {number}">
            <div class="hash">SHA256: {hash}</div>
        </div>"#,
        number = number,
        name = escape_html(&card.file_name),
        mime = card.mime,
        data = card.base64,
        hash = card.sha256,
    )
}

/// Escape text for an HTML element body or attribute value
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
