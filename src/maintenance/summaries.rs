use futures::{StreamExt, stream};
use lintbase_schema::ChatMessage;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::{DbActorHandle, RuleRow};
use crate::error::LintBaseError;
use crate::upstream::AiClient;

const SUMMARY_SYSTEM_PROMPT: &str = "You describe lint rules for developers. \
Answer with at most two plain sentences saying what the rule reports and why it matters. \
No markdown, no code blocks.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRun {
    pub requested: usize,
    pub generated: usize,
    pub failed: usize,
}

pub fn rule_summary_prompt(rule: &RuleRow) -> Vec<ChatMessage> {
    let mut user = format!("Rule `{}` from `{}`.", rule.name, rule.package_name);
    if let Some(description) = rule.description.as_deref().filter(|d| !d.trim().is_empty()) {
        user.push_str(&format!("\nDescription: {}", description.trim()));
    }
    if let Some(rule_type) = rule.rule_type.as_deref() {
        user.push_str(&format!("\nType: {rule_type}"));
    }
    if rule.fixable {
        user.push_str("\nThe rule is auto-fixable.");
    }
    vec![ChatMessage::system(SUMMARY_SYSTEM_PROMPT), ChatMessage::user(user)]
}

/// Summarizes up to `limit` rules without a summary, storing each one as it completes.
///
/// A failed completion is logged and counted; the rule stays unsummarized.
pub async fn generate_rule_summaries(
    db: &DbActorHandle,
    ai: &AiClient,
    limit: i64,
) -> Result<SummaryRun, LintBaseError> {
    let rules = db.list_unsummarized_rules(limit.max(0)).await?;
    let cfg = ai.config();
    let max_tokens = cfg.summary_max_tokens;
    let concurrency = cfg.concurrency.max(1);

    let mut run = SummaryRun {
        requested: rules.len(),
        ..SummaryRun::default()
    };
    info!(rules = run.requested, concurrency, "rule summary generation started");

    let mut results = stream::iter(rules)
        .map(|rule| async move {
            let summary = ai.complete(rule_summary_prompt(&rule), Some(max_tokens)).await;
            (rule, summary)
        })
        .buffer_unordered(concurrency);

    while let Some((rule, summary)) = results.next().await {
        match summary {
            Ok(summary) => {
                db.set_rule_summary(rule.id, summary).await?;
                debug!(rule_id = rule.id, rule = %rule.name, "rule summary stored");
                run.generated += 1;
            }
            Err(err) => {
                warn!(rule_id = rule.id, rule = %rule.name, error = %err, "rule summary failed");
                run.failed += 1;
            }
        }
    }

    info!(
        generated = run.generated,
        failed = run.failed,
        "rule summary generation finished"
    );
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_rule_and_description() {
        let rule = RuleRow {
            id: 1,
            linter_id: 1,
            package_name: "eslint-plugin-react".to_string(),
            name: "jsx-key".to_string(),
            description: Some("Disallow missing `key` props".to_string()),
            fixable: false,
            has_suggestions: false,
            deprecated: false,
            requires_type_checking: false,
            rule_type: Some("problem".to_string()),
            url: None,
            options: "[]".to_string(),
            summary: None,
        };
        let messages = rule_summary_prompt(&rule);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("`jsx-key` from `eslint-plugin-react`"));
        assert!(messages[1].content.contains("Disallow missing `key` props"));
        assert!(messages[1].content.contains("Type: problem"));
        assert!(!messages[1].content.contains("auto-fixable"));
    }
}
