//! Terminal views
//!
//! Every view is a pure function from state to a `String`. The REPL prints the
//! result; nothing here reads input or touches the controller.

use colored::*;
use std::fmt::Write as _;

use adgen_core::{AdCopy, Campaign, CreativeRef, CreativeType, GroundingSource, Intake, SegmentationStrategy};
use adgen_workflow::{Notice, NoticeLevel, Step, View, WorkflowState};

const DEFAULT_CLIENT_NAME: &str = "Client Name";
const DEFAULT_HEADLINE: &str = "Impactful Headline";
const DEFAULT_DESCRIPTION: &str = "Description of the offer";
const DEFAULT_CTA: &str = "Learn More";
const DEFAULT_DOMAIN: &str = "WWW.CLIENT.COM";
const MEDIA_PLACEHOLDER: &str = "Visual creative placeholder";
const PREVIEW_WIDTH: usize = 46;

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

fn section(title: &str) -> String {
    format!("{}\n{}", title.bold(), "─".repeat(title.chars().count()).dimmed())
}

/// Campaign overview with counters and the saved campaign table
pub fn render_dashboard(campaigns: &[Campaign]) -> String {
    let mut out = String::new();
    let images = campaigns
        .iter()
        .filter(|c| c.creative_type == CreativeType::Image)
        .count();
    let videos = campaigns.len() - images;

    let _ = writeln!(out, "{}", "Campaign Overview".bold());
    let _ = writeln!(out, "{}", format!("Managing {} client portfolios", campaigns.len()).dimmed());
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<18}{}", "Total Clients", campaigns.len().to_string().cyan().bold());
    let _ = writeln!(out, "  {:<18}{}", "Ads Generated", (campaigns.len() * 3).to_string().cyan().bold());
    let _ = writeln!(out, "  {:<18}{}", "Image creatives", images.to_string().cyan());
    let _ = writeln!(out, "  {:<18}{}", "Video creatives", videos.to_string().cyan());
    let _ = writeln!(out);

    if campaigns.is_empty() {
        let _ = writeln!(out, "{}", "No campaigns found. Start in the Strategy Lab.".dimmed());
        return out;
    }

    let _ = writeln!(out, "{}", section("Recent Campaigns"));
    let _ = writeln!(out, "  {:<4}{:<24}{:<34}{:<18}{}", "#", "Client", "URL", "Strategy", "Format");
    for (index, campaign) in campaigns.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:<4}{:<24}{:<34}{:<18}{}",
            index + 1,
            campaign.client_name,
            campaign.url,
            "Strategy Mapped".green(),
            campaign.creative_type
        );
    }
    out
}

/// Three-step wizard header; steps up to the current one are highlighted
pub fn render_step_indicator(current: Step) -> String {
    Step::ALL
        .iter()
        .map(|step| {
            let label = format!("{} {}", step.number(), step.label());
            if *step <= current {
                label.blue().bold().to_string()
            } else {
                label.dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&format!(" {} ", "›".dimmed()))
}

/// Intake fields and the scan button
pub fn render_intake_form(intake: &Intake, is_processing: bool, step: Step) -> String {
    let mut out = String::new();
    let unset = "(not set)".dimmed().to_string();
    let show = |value: &str| {
        if value.trim().is_empty() {
            unset.clone()
        } else {
            value.to_string()
        }
    };

    let _ = writeln!(out, "{}", section("Campaign Intake"));
    let _ = writeln!(out, "  {:<12}{}", "Client", show(&intake.client_name));
    let _ = writeln!(out, "  {:<12}{}", "Website", show(&intake.url));
    let _ = writeln!(out, "  {:<12}{}", "Objective", intake.objective.display_name());
    let _ = writeln!(out, "  {:<12}{}", "Format", intake.format.display_name());

    let button = if is_processing && step == Step::Research {
        "Extracting Stock Data...".yellow()
    } else {
        "Start Deep Scan".green().bold()
    };
    let _ = writeln!(out, "  [ {} ]  {}", button, "(scan)".dimmed());
    out
}

/// Meta feed mock-up of the ad
pub fn render_ad_preview(intake: &Intake, copy: Option<&AdCopy>, creative: Option<&CreativeRef>) -> String {
    let client = or_default(&intake.client_name, DEFAULT_CLIENT_NAME);
    let initial = intake
        .client_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "C".to_string());
    let domain = if intake.url.trim().is_empty() {
        DEFAULT_DOMAIN.to_string()
    } else {
        intake.url.trim().to_uppercase()
    };
    let (primary, headline, description, cta) = match copy {
        Some(copy) => (
            copy.primary_text.as_str(),
            or_default(&copy.headline, DEFAULT_HEADLINE),
            or_default(&copy.description, DEFAULT_DESCRIPTION),
            or_default(&copy.call_to_action, DEFAULT_CTA),
        ),
        None => ("", DEFAULT_HEADLINE, DEFAULT_DESCRIPTION, DEFAULT_CTA),
    };
    let media = match creative {
        Some(creative) => format!("[{}] {}", creative.creative_type, creative.uri()),
        None => MEDIA_PLACEHOLDER.to_string(),
    };

    let border = "─".repeat(PREVIEW_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "┌{}┐", border);
    let _ = writeln!(out, "  ({}) {}", initial.white().on_blue().bold(), client.bold());
    let _ = writeln!(out, "      {}", "Sponsored".dimmed());
    if !primary.trim().is_empty() {
        let _ = writeln!(out, "  {}", primary);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", media.cyan());
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", domain.dimmed());
    let _ = writeln!(out, "  {}", headline.bold());
    let _ = writeln!(out, "  {}", description);
    let _ = writeln!(out, "  [ {} ]", cta.blue().bold());
    let _ = writeln!(out, "└{}┘", border);
    out
}

/// Audience targeting produced by the research step
pub fn render_strategy_panel(strategy: &SegmentationStrategy) -> String {
    let mut out = String::new();
    let locations = if strategy.locations.is_empty() {
        "Global".to_string()
    } else {
        strategy.locations.join(", ")
    };

    let _ = writeln!(out, "{}", section("Segmentation Strategy"));
    let _ = writeln!(out, "  {:<12}{}", "Audience", strategy.audience_name.bold());
    let _ = writeln!(out, "  {:<12}{}", "Age", strategy.age_range);
    let _ = writeln!(out, "  {:<12}{}", "Locations", locations);
    let _ = writeln!(out, "  {:<12}{}", "Interests", strategy.interests.join(", "));
    if !strategy.detailed_targeting_summary.trim().is_empty() {
        let _ = writeln!(out, "  {:<12}\"{}\"", "Targeting", strategy.detailed_targeting_summary.italic());
    }
    if !strategy.behaviors.is_empty() {
        let _ = writeln!(out, "  {:<12}{}", "Behaviors", strategy.behaviors.join(", "));
    }
    if let Some(findings) = strategy.stock_findings.as_ref().filter(|f| !f.is_empty()) {
        let _ = writeln!(out, "  {}", "Stock findings".bold());
        for finding in findings {
            let _ = writeln!(out, "    • {}", finding);
        }
    }
    out
}

/// Grounding citations; empty when the analysis returned none
pub fn render_sources(sources: &[GroundingSource]) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", section("Analysis Sources (Grounding)"));
    for source in sources {
        let _ = writeln!(out, "  • {} {}", source.title, source.uri.dimmed());
    }
    out
}

/// Lab / factory workspace
pub fn render_workspace(state: &WorkflowState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", state.view.title().bold().underline());
    let _ = writeln!(out, "{}", render_step_indicator(state.step));
    let _ = writeln!(out);
    out.push_str(&render_intake_form(&state.intake, state.is_processing, state.step));
    let _ = writeln!(out);

    match &state.analysis {
        None => {
            let _ = writeln!(out, "{}", "Ready for Stock Analysis".bold());
            let _ = writeln!(
                out,
                "{}",
                "Enter the client URL and run a deep scan to extract inventory and audience insights."
                    .dimmed()
            );
        }
        Some(analysis) => {
            out.push_str(&render_ad_preview(&state.intake, Some(&analysis.copy), state.creative.as_ref()));
            let _ = writeln!(out);
            out.push_str(&render_strategy_panel(&analysis.strategy));
            let sources = render_sources(&analysis.sources);
            if !sources.is_empty() {
                let _ = writeln!(out);
                out.push_str(&sources);
            }
            let _ = writeln!(out);

            if state.can_save() {
                let _ = writeln!(out, "{} Creative ready. Type {} to deploy the campaign.", "🚀", "save".cyan());
            } else {
                let _ = writeln!(out, "{} {}", "✅".green(), "Scan Completed".green().bold());
                let _ = writeln!(
                    out,
                    "   Build the {} creative with {}",
                    state.intake.format.display_name(),
                    "build".cyan()
                );
            }
        }
    }

    if let Some(notice) = &state.notice {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", render_notice(notice));
    }
    out
}

/// Whole screen for the current view
pub fn render_view(state: &WorkflowState, campaigns: &[Campaign]) -> String {
    match state.view {
        View::Dashboard => render_dashboard(campaigns),
        View::StrategyLab | View::AdFactory => render_workspace(state),
    }
}

/// Feedback line for the last action
pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("{} {}", "ℹ️".cyan(), notice.message),
        NoticeLevel::Error => format!("{} {}", "❌".red(), notice.message.red()),
    }
}

/// One-line status summary
pub fn render_status(state: &WorkflowState) -> String {
    let activity = if state.is_processing { "processing".yellow() } else { "idle".green() };
    format!(
        "{} · step {} {} · {}",
        state.view.title().bold(),
        state.step.number(),
        state.step.label(),
        activity
    )
}
