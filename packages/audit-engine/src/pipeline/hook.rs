//! One-line outreach summary derived from an audit.

use crate::types::{audit::ProviderResponse, finding::Field};

/// Render the hook sentence for one subject.
///
/// `responses` are in query order; only responders (see
/// [`ProviderResponse::responded`]) are named or counted.
pub fn generate_hook(
    subject_name: &str,
    consensus_issues: &[Field],
    responses: &[ProviderResponse],
) -> String {
    let responders: Vec<&ProviderResponse> = responses.iter().filter(|r| r.responded()).collect();

    if responders.is_empty() {
        return format!(
            "We attempted to audit how AI models describe {} — check your profile for accuracy.",
            subject_name
        );
    }

    let names: Vec<&str> = responders.iter().map(|r| r.display_name.as_str()).collect();
    let any_findings = responders.iter().any(|r| !r.findings.is_empty());

    let top = match consensus_issues.first() {
        Some(top) if any_findings => *top,
        _ => {
            return format!(
                "We audited how {} describe {} — minor gaps found in your profile.",
                format_names(&names),
                subject_name
            );
        }
    };

    let fields = format_fields(consensus_issues);
    let n = responders.len();
    let k = responders.iter().filter(|r| r.flags(top)).count();

    if n >= 2 && k == n {
        let quantifier = if n == 2 { "both" } else { "all" };
        format!(
            "Asked {} about {} — {} got your {} wrong.",
            format_names(&names),
            subject_name,
            quantifier,
            fields
        )
    } else if k >= 2 && 2 * k > n {
        format!(
            "{} out of {} AI models we tested have incorrect info about {}'s {}.",
            k, n, subject_name, fields
        )
    } else {
        format!(
            "We found gaps in how AI models describe {}'s {}.",
            subject_name, fields
        )
    }
}

/// "A, B, and C" / "A and B" / "A" / "AI models".
pub fn format_names(names: &[&str]) -> String {
    match names {
        [] => "AI models".to_string(),
        [only] => only.to_string(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// Labels of the top two issue fields joined with "and".
fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .take(2)
        .map(Field::label)
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::finding::{Finding, FindingType};

    fn answered(key: &str, name: &str, fields: &[Field]) -> ProviderResponse {
        ProviderResponse::empty(key, name).with_accuracy(60).with_findings(
            fields
                .iter()
                .map(|f| Finding::new(*f, FindingType::Incorrect))
                .collect(),
        )
    }

    #[test]
    fn test_format_names() {
        assert_eq!(format_names(&[]), "AI models");
        assert_eq!(format_names(&["ChatGPT"]), "ChatGPT");
        assert_eq!(format_names(&["ChatGPT", "Claude"]), "ChatGPT and Claude");
        assert_eq!(
            format_names(&["ChatGPT", "Claude", "Perplexity"]),
            "ChatGPT, Claude, and Perplexity"
        );
        assert_eq!(
            format_names(&["ChatGPT", "Claude", "Perplexity", "Gemini"]),
            "ChatGPT, Claude, Perplexity, and Gemini"
        );
    }

    #[test]
    fn test_nobody_responded() {
        let responses = vec![
            ProviderResponse::empty("chatgpt", "ChatGPT").with_error("boom"),
            ProviderResponse::empty("claude", "Claude").with_error("boom"),
        ];
        assert_eq!(
            generate_hook("Acme", &[], &responses),
            "We attempted to audit how AI models describe Acme — check your profile for accuracy."
        );
    }

    #[test]
    fn test_no_consensus_is_minor_gaps() {
        let responses = vec![
            answered("chatgpt", "ChatGPT", &[Field::Pricing]),
            answered("claude", "Claude", &[]),
        ];
        assert_eq!(
            generate_hook("Acme", &[], &responses),
            "We audited how ChatGPT and Claude describe Acme — minor gaps found in your profile."
        );
    }

    #[test]
    fn test_everyone_agrees_three() {
        let responses = vec![
            answered("chatgpt", "ChatGPT", &[Field::Pricing, Field::Icp]),
            answered("claude", "Claude", &[Field::Pricing, Field::Icp]),
            answered("perplexity", "Perplexity", &[Field::Pricing]),
        ];
        assert_eq!(
            generate_hook("Acme", &[Field::Pricing, Field::Icp], &responses),
            "Asked ChatGPT, Claude, and Perplexity about Acme — all got your pricing and ideal customer profile wrong."
        );
    }

    #[test]
    fn test_everyone_agrees_two() {
        let responses = vec![
            answered("chatgpt", "ChatGPT", &[Field::Features]),
            answered("claude", "Claude", &[Field::Features]),
            ProviderResponse::empty("perplexity", "Perplexity").with_error("missing credentials"),
        ];
        assert_eq!(
            generate_hook("Acme", &[Field::Features], &responses),
            "Asked ChatGPT and Claude about Acme — both got your features wrong."
        );
    }

    #[test]
    fn test_majority() {
        let responses = vec![
            answered("chatgpt", "ChatGPT", &[Field::Pricing]),
            answered("claude", "Claude", &[Field::Pricing]),
            answered("perplexity", "Perplexity", &[]),
        ];
        assert_eq!(
            generate_hook("Acme", &[Field::Pricing], &responses),
            "2 out of 3 AI models we tested have incorrect info about Acme's pricing."
        );
    }

    #[test]
    fn test_minority_is_soft() {
        let responses = vec![
            answered("a", "A", &[Field::Pricing]),
            answered("b", "B", &[Field::Pricing]),
            answered("c", "C", &[]),
            answered("d", "D", &[]),
        ];
        assert_eq!(
            generate_hook("Acme", &[Field::Pricing], &responses),
            "We found gaps in how AI models describe Acme's pricing."
        );
    }
}
