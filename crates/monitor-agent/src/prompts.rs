//! Prompt constants for the monitor's model calls.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever prompt content changes
//! so logged verdicts can be traced back to the wording that produced them.

use coordination::{AttributionRequest, Contributions, SummaryRequest};

/// Prompt version. Bump on any prompt content change.
pub const PROMPT_VERSION: &str = "1.0.0";

/// Default system instruction for every model call.
pub const EVALUATOR_INSTRUCTION: &str = "You are an evaluator. Your task is to provide accurate \
and reliable evaluations for agentic responses to benchmark queries.";

/// Prefix for the raw evaluator text status update.
pub const EVALUATOR_TAG: &str = "[evaluator]";

const SUMMARY_PREAMBLE: &str = "\
Compress the conversation memory below into a single summary. Keep every claim, \
decision and fact that a participant introduced, and keep the speaker labels \
(`sender: text`) for anything attributable to a participant. Drop repetition and \
filler. Reply with the summary text only.";

const ATTRIBUTION_PREAMBLE: &str = "\
Given the memory context and each participant's raw contributions below, decide how \
much of the memory context each participant is responsible for. Reply with a single \
JSON object mapping each participant id to a percentage between 0 and 100, for example \
{\"alice\": 70, \"bob\": 30}. Use the participant ids exactly as given. Do not add \
any other keys.";

/// Build the contents for a summarization call.
pub fn summary_contents(request: &SummaryRequest) -> Vec<String> {
    let mut contents = Vec::with_capacity(request.history.len() + 1);
    contents.push(SUMMARY_PREAMBLE.to_string());
    contents.extend(request.history.iter().cloned());
    contents
}

/// Build the contents for an attribution call.
pub fn attribution_contents(request: &AttributionRequest) -> Vec<String> {
    vec![
        ATTRIBUTION_PREAMBLE.to_string(),
        format!("## Memory context\n\n{}", request.memory_context),
        format!(
            "## Contributions\n\n{}",
            render_contributions(&request.contributions)
        ),
    ]
}

fn render_contributions(contributions: &Contributions) -> String {
    contributions
        .iter()
        .map(|(sender, fragments)| {
            let lines = fragments
                .iter()
                .map(|f| format!("- {f}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("### {sender}\n{lines}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
