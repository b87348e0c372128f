//! Nearest-match risk estimation.
//!
//! The base score comes from the knowledge-base record closest in GC content.
//! It is then passed through [`ADJUSTMENTS`], a fixed sequence of named
//! multipliers applied in declaration order (age, smoking, sex). Each step
//! that fires is recorded in the estimate.

use tracing::{debug, info};

use crate::analysis::features::{gc_content, validate_nucleotides};
use crate::data_handling::knowledge_base::KnowledgeBase;
use crate::errors::{AnalysisError, Result};
use crate::models::{AppliedFactor, RiskEstimate, RiskFactors, Sex};

/// Ages strictly above this trigger the age multiplier.
pub const AGE_THRESHOLD: u32 = 50;

/// One named multiplier step of the adjustment pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Adjustment {
    pub name: &'static str,
    pub multiplier: f64,
    applies: fn(&RiskFactors) -> bool,
}

impl Adjustment {
    pub fn applies(&self, factors: &RiskFactors) -> bool {
        (self.applies)(factors)
    }
}

pub const ADJUSTMENTS: [Adjustment; 3] = [
    Adjustment {
        name: "age",
        multiplier: 1.2,
        applies: |f| f.age > AGE_THRESHOLD,
    },
    Adjustment {
        name: "smoking",
        multiplier: 1.5,
        applies: |f| f.is_smoker,
    },
    Adjustment {
        name: "sex",
        multiplier: 1.1,
        applies: |f| f.sex == Sex::Male,
    },
];

/// Runs `base_score` through the pipeline, returning the adjusted score and
/// the steps that fired, in order.
pub fn apply_adjustments(base_score: f64, factors: &RiskFactors) -> (f64, Vec<AppliedFactor>) {
    ADJUSTMENTS
        .iter()
        .filter(|step| step.applies(factors))
        .fold((base_score, Vec::new()), |(score, mut applied), step| {
            applied.push(AppliedFactor {
                name: step.name.to_string(),
                multiplier: step.multiplier,
            });
            (score * step.multiplier, applied)
        })
}

/// Scores queries against a loaded knowledge base.
pub struct RiskEstimator<'a> {
    knowledge_base: &'a KnowledgeBase,
}

impl<'a> RiskEstimator<'a> {
    pub fn new(knowledge_base: &'a KnowledgeBase) -> Self {
        Self { knowledge_base }
    }

    pub fn estimate(&self, gc_content: f64, factors: &RiskFactors) -> Result<RiskEstimate> {
        let matched = self.knowledge_base.nearest(gc_content)?;
        debug!(
            "Query gc {:.2} matched record gc {:.2} ({})",
            gc_content, matched.gc_content, matched.risk_category
        );

        let (adjusted, factors_applied) = apply_adjustments(matched.risk_score, factors);
        Ok(RiskEstimate {
            sequence_length: None,
            gc_content,
            matched_gc_content: matched.gc_content,
            base_risk_score: matched.risk_score,
            risk_category: matched.risk_category.clone(),
            adjusted_risk_score: adjusted,
            factors_applied,
            factors: *factors,
        })
    }

    /// Upper-cases and validates `sequence` against A/C/G/T before computing
    /// its GC content. Invalid symbols never reach the GC computation.
    pub fn estimate_sequence(&self, sequence: &str, factors: &RiskFactors) -> Result<RiskEstimate> {
        let sequence = sequence.trim().to_uppercase();
        if sequence.is_empty() {
            return Err(AnalysisError::InvalidSequence {
                id: "query".to_string(),
                reason: "sequence is empty".to_string(),
            });
        }
        validate_nucleotides(&sequence)?;

        let gc = gc_content(&sequence)?;
        let mut estimate = self.estimate(gc, factors)?;
        estimate.sequence_length = Some(sequence.len());
        info!(
            "Risk estimate for {} nt query: {:.4} ({})",
            sequence.len(),
            estimate.adjusted_risk_score,
            estimate.risk_category
        );
        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KnowledgeBaseRecord;

    fn kb() -> KnowledgeBase {
        let rows = [(30.0, 1.0, "low"), (50.0, 2.0, "medium"), (70.0, 3.0, "high")];
        KnowledgeBase::from_records(
            rows.iter()
                .map(|&(gc, score, cat)| KnowledgeBaseRecord {
                    gc_content: gc,
                    risk_score: score,
                    risk_category: cat.to_string(),
                })
                .collect(),
        )
        .unwrap()
    }

    fn factors(age: u32, is_smoker: bool, sex: Sex) -> RiskFactors {
        RiskFactors { age, is_smoker, sex }
    }

    #[test]
    fn all_factors_compose_in_order() {
        let kb = kb();
        let estimate = RiskEstimator::new(&kb)
            .estimate(49.0, &factors(60, true, Sex::Male))
            .unwrap();
        assert_eq!(estimate.matched_gc_content, 50.0);
        assert_eq!(estimate.base_risk_score, 2.0);
        assert_eq!(estimate.risk_category, "medium");
        assert!((estimate.adjusted_risk_score - 3.96).abs() < 1e-9);
        let names: Vec<&str> = estimate.factors_applied.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["age", "smoking", "sex"]);
    }

    #[test]
    fn no_factors_leaves_score_unchanged() {
        let kb = kb();
        let estimate = RiskEstimator::new(&kb)
            .estimate(71.0, &factors(50, false, Sex::Female))
            .unwrap();
        assert_eq!(estimate.adjusted_risk_score, 3.0);
        assert!(estimate.factors_applied.is_empty());
        assert_eq!(estimate.risk_category, "high");
    }

    #[test]
    fn each_step_in_isolation() {
        assert!(ADJUSTMENTS[0].applies(&factors(51, false, Sex::Female)));
        assert!(!ADJUSTMENTS[0].applies(&factors(50, false, Sex::Female)));
        assert!(ADJUSTMENTS[1].applies(&factors(0, true, Sex::Female)));
        assert!(!ADJUSTMENTS[1].applies(&factors(0, false, Sex::Female)));
        assert!(ADJUSTMENTS[2].applies(&factors(0, false, Sex::Male)));
        assert!(!ADJUSTMENTS[2].applies(&factors(0, false, Sex::Female)));

        let (score, applied) = apply_adjustments(2.0, &factors(20, true, Sex::Female));
        assert!((score - 3.0).abs() < 1e-12);
        assert_eq!(applied, vec![AppliedFactor { name: "smoking".to_string(), multiplier: 1.5 }]);
    }

    #[test]
    fn category_is_not_adjusted() {
        let kb = kb();
        let estimate = RiskEstimator::new(&kb)
            .estimate(30.0, &factors(90, true, Sex::Male))
            .unwrap();
        assert_eq!(estimate.risk_category, "low");
        assert!(estimate.adjusted_risk_score > estimate.base_risk_score);
    }

    #[test]
    fn equidistant_query_takes_lower_record() {
        let kb = kb();
        let estimate = RiskEstimator::new(&kb)
            .estimate(40.0, &factors(20, false, Sex::Female))
            .unwrap();
        assert_eq!(estimate.risk_category, "low");
    }

    #[test]
    fn sequence_query_is_validated_first() {
        let kb = kb();
        let estimator = RiskEstimator::new(&kb);
        match estimator.estimate_sequence("ACGTNX", &factors(20, false, Sex::Female)) {
            Err(AnalysisError::InvalidCharacter { symbols, .. }) => assert_eq!(symbols, vec!['N', 'X']),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn sequence_query_is_case_insensitive() {
        let kb = kb();
        let estimate = RiskEstimator::new(&kb)
            .estimate_sequence(" atgc ", &factors(20, false, Sex::Female))
            .unwrap();
        assert_eq!(estimate.gc_content, 50.0);
        assert_eq!(estimate.sequence_length, Some(4));
        assert_eq!(estimate.risk_category, "medium");
    }

    #[test]
    fn empty_sequence_query_is_rejected() {
        let kb = kb();
        assert!(matches!(
            RiskEstimator::new(&kb).estimate_sequence("", &factors(20, false, Sex::Male)),
            Err(AnalysisError::InvalidSequence { .. })
        ));
    }

    #[test]
    fn empty_knowledge_base_is_reported() {
        let kb = KnowledgeBase::from_records(Vec::new()).unwrap();
        assert!(matches!(
            RiskEstimator::new(&kb).estimate(50.0, &factors(20, false, Sex::Male)),
            Err(AnalysisError::EmptyKnowledgeBase)
        ));
    }
}
