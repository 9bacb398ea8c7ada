//! Plain-text rendering of a [`Brief`] for chat delivery.

use chrono::Local;
use nox_crime_brief_models::Brief;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━";

/// Context the brief itself does not carry.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Search radius the incidents were fetched with.
    pub radius_km: f64,
    /// Attribution line, e.g. the feed's name.
    pub source_name: String,
}

/// Renders `brief` as the text message sent to the user.
#[must_use]
pub fn render_brief(brief: &Brief, options: &RenderOptions) -> String {
    let radius = options.radius_km;

    if brief.is_all_clear() {
        return format!(
            "YOUR AREA: ALL CLEAR\n\n{}\n\nZero incidents within {radius} km this week.\n\
             Your area is safer than average.\n",
            brief.label
        );
    }

    let mut lines: Vec<String> = vec![
        "NOX CRIME INTELLIGENCE".to_string(),
        "Your Area Threat Assessment".to_string(),
        RULE.to_string(),
        String::new(),
        "YOUR LOCATION".to_string(),
        brief.label.clone(),
        String::new(),
        "THIS WEEK".to_string(),
        format!("{} incidents within {radius} km", brief.incident_count),
        String::new(),
        "THREAT BREAKDOWN".to_string(),
    ];
    lines.extend(brief.top_categories.iter().enumerate().map(|(i, share)| {
        format!(
            "{}. {}: {} ({}%)",
            i + 1,
            title_case(&share.category),
            share.count,
            share.rounded_percentage()
        )
    }));

    if let (Some(day), Some(bucket)) = (brief.riskiest_day, brief.riskiest_bucket) {
        lines.push(String::new());
        lines.push("HIGHEST RISK".to_string());
        lines.push(format!("{day}, {}", bucket.label()));
        lines.push(format!(
            "→ {} of {} incidents",
            brief.riskiest_bucket_count, brief.incident_count
        ));
    }

    if !brief.recommendations.is_empty() || brief.elevated_activity {
        lines.push(String::new());
        lines.push("RECOMMENDATIONS".to_string());
        lines.extend(brief.recommendations.iter().map(|r| format!("• {r}")));
        if brief.elevated_activity {
            lines.push("• ELEVATED ACTIVITY in your area".to_string());
        }
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push(format!("Intel: {}", options.source_name));
    lines.push(format!(
        "Updated: {}",
        brief
            .generated_at
            .with_timezone(&Local)
            .format("%b %d, %I:%M%p")
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `"MOTOR VEHICLE THEFT"` → `"Motor Vehicle Theft"`.
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
