//! Combine per-provider findings into consensus issues and a score.
//!
//! The output is a pure function of the input slice and config: ordering
//! follows first appearance, never hash iteration order.

use std::collections::BTreeSet;

use crate::types::{
    audit::{ConsensusReport, ProviderResponse},
    config::{AccuracyBasis, AuditConfig},
    finding::{Field, Finding, Severity},
};

/// Occurrences of one field across all responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTally {
    pub field: Field,

    /// Findings on this field, across every provider
    pub count: usize,

    /// Indices of the responses that reported it
    pub providers: BTreeSet<usize>,
}

/// Tally findings per field in first-seen order.
pub fn tally_fields(responses: &[ProviderResponse]) -> Vec<FieldTally> {
    let mut tallies: Vec<FieldTally> = Vec::new();

    for (idx, response) in responses.iter().enumerate() {
        for finding in &response.findings {
            match tallies.iter_mut().find(|t| t.field == finding.field) {
                Some(tally) => {
                    tally.count += 1;
                    tally.providers.insert(idx);
                }
                None => tallies.push(FieldTally {
                    field: finding.field,
                    count: 1,
                    providers: BTreeSet::from([idx]),
                }),
            }
        }
    }

    tallies
}

/// Fields reported by at least `threshold` distinct providers, most-reported first.
///
/// Ties keep first-seen order (the sort is stable).
pub fn consensus_issues(responses: &[ProviderResponse], threshold: usize) -> Vec<Field> {
    let mut agreed: Vec<FieldTally> = tally_fields(responses)
        .into_iter()
        .filter(|t| t.count >= threshold && t.providers.len() >= threshold)
        .collect();

    agreed.sort_by(|a, b| b.count.cmp(&a.count));
    agreed.into_iter().map(|t| t.field).collect()
}

/// Findings on a consensus field or of high severity, in encounter order.
pub fn worst_issues(responses: &[ProviderResponse], consensus: &[Field], limit: usize) -> Vec<Finding> {
    responses
        .iter()
        .flat_map(|r| r.findings.iter())
        .filter(|f| consensus.contains(&f.field) || f.severity == Severity::High)
        .take(limit)
        .cloned()
        .collect()
}

/// Mean accuracy score, rounded to one decimal place.
pub fn overall_accuracy(responses: &[ProviderResponse], basis: AccuracyBasis) -> f64 {
    let scores: Vec<f64> = responses
        .iter()
        .filter(|r| match basis {
            AccuracyBasis::AllProviders => true,
            AccuracyBasis::RespondedOnly => r.responded(),
        })
        .map(|r| f64::from(r.accuracy_score))
        .collect();

    if scores.is_empty() {
        return 0.0;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Aggregate one subject's responses.
pub fn aggregate(responses: &[ProviderResponse], config: &AuditConfig) -> ConsensusReport {
    let consensus = consensus_issues(responses, config.consensus_threshold);
    let worst = worst_issues(responses, &consensus, config.worst_issue_limit);

    ConsensusReport {
        worst_issues: worst,
        overall_accuracy: overall_accuracy(responses, config.accuracy_basis),
        has_issues: responses.iter().any(|r| !r.findings.is_empty()),
        models_responded: responses
            .iter()
            .filter(|r| r.responded())
            .map(|r| r.provider.clone())
            .collect(),
        consensus_issues: consensus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::finding::FindingType;

    fn finding(field: Field) -> Finding {
        Finding::new(field, FindingType::Incorrect)
    }

    fn response(name: &str, score: u8, fields: &[Field]) -> ProviderResponse {
        ProviderResponse::empty(name, name)
            .with_accuracy(score)
            .with_findings(fields.iter().copied().map(finding).collect())
    }

    #[test]
    fn test_single_report_is_not_consensus() {
        let responses = vec![
            response("a", 70, &[Field::Pricing]),
            response("b", 80, &[]),
            response("c", 90, &[]),
        ];
        assert!(consensus_issues(&responses, 2).is_empty());
    }

    #[test]
    fn test_two_reports_are_consensus() {
        let responses = vec![
            response("a", 70, &[Field::Pricing]),
            response("b", 80, &[Field::Pricing]),
            response("c", 90, &[]),
        ];
        assert_eq!(consensus_issues(&responses, 2), vec![Field::Pricing]);
    }

    #[test]
    fn test_same_provider_twice_is_not_consensus() {
        let responses = vec![
            response("a", 70, &[Field::Pricing, Field::Pricing]),
            response("b", 80, &[]),
        ];
        assert!(consensus_issues(&responses, 2).is_empty());
    }

    #[test]
    fn test_order_by_count_then_first_seen() {
        let responses = vec![
            response("a", 50, &[Field::Icp, Field::Features, Field::Pricing]),
            response("b", 50, &[Field::Features, Field::Pricing, Field::Icp]),
            response("c", 50, &[Field::Pricing]),
        ];
        assert_eq!(
            consensus_issues(&responses, 2),
            vec![Field::Pricing, Field::Icp, Field::Features]
        );
    }

    #[test]
    fn test_worst_issues_keep_consensus_and_high_severity() {
        let mut a = response("a", 50, &[Field::Pricing, Field::Category]);
        a.findings.push(finding(Field::Description).with_severity(Severity::High));
        let b = response("b", 50, &[Field::Pricing]);
        let responses = vec![a, b];

        let worst = worst_issues(&responses, &[Field::Pricing], 5);
        let fields: Vec<Field> = worst.iter().map(|f| f.field).collect();
        assert_eq!(fields, vec![Field::Pricing, Field::Description, Field::Pricing]);
    }

    #[test]
    fn test_worst_issues_truncate() {
        let responses = vec![
            response("a", 50, &Field::ALL),
            response("b", 50, &Field::ALL),
        ];
        let worst = worst_issues(&responses, &Field::ALL, 5);
        assert_eq!(worst.len(), 5);
        assert_eq!(worst[0].field, Field::Pricing);
        assert_eq!(worst[4].field, Field::Icp);
    }

    #[test]
    fn test_accuracy_counts_failures_by_default() {
        let responses = vec![
            response("a", 80, &[]),
            response("b", 60, &[]),
            ProviderResponse::empty("c", "c").with_error("network error"),
        ];
        assert_eq!(overall_accuracy(&responses, AccuracyBasis::AllProviders), 46.7);
        assert_eq!(overall_accuracy(&responses, AccuracyBasis::RespondedOnly), 70.0);
    }

    #[test]
    fn test_accuracy_with_no_responders() {
        let responses = vec![ProviderResponse::empty("a", "a"), ProviderResponse::empty("b", "b")];
        assert_eq!(overall_accuracy(&responses, AccuracyBasis::AllProviders), 0.0);
        assert_eq!(overall_accuracy(&responses, AccuracyBasis::RespondedOnly), 0.0);
        assert_eq!(overall_accuracy(&[], AccuracyBasis::AllProviders), 0.0);
    }

    #[test]
    fn test_aggregate_models_responded() {
        let responses = vec![
            response("chatgpt", 0, &[Field::Pricing]),
            ProviderResponse::empty("claude", "Claude").with_error("timed out"),
            response("perplexity", 85, &[]),
        ];
        let report = aggregate(&responses, &AuditConfig::default());

        assert_eq!(report.models_responded, vec!["chatgpt", "perplexity"]);
        assert!(report.has_issues);
        assert!(report.consensus_issues.is_empty());
    }

    #[test]
    fn test_custom_threshold() {
        let responses = vec![
            response("a", 50, &[Field::Pricing]),
            response("b", 50, &[Field::Pricing]),
        ];
        let config = AuditConfig::default().with_consensus_threshold(3);
        assert!(aggregate(&responses, &config).consensus_issues.is_empty());

        let config = AuditConfig::default().with_consensus_threshold(1);
        assert_eq!(aggregate(&responses, &config).consensus_issues, vec![Field::Pricing]);
    }
}
