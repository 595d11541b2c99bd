use adk_core::LlmResponse;
use adk_eval::prelude::*;
use proptest::prelude::*;

fn verdict_response(valid: bool) -> LlmResponse {
    let verdict = if valid { "Valid" } else { "INVALID" };
    LlmResponse::text(format!("{{\"is_the_agent_response_valid\": \"{}\"}}", verdict))
}

proptest! {
    #[test]
    fn scores_are_binary(valid in any::<bool>()) {
        let rater = FinalResponseMatchV2Evaluator::new(
            EvalMetric::final_response_match_v2(0.5).unwrap(),
        )
        .unwrap();
        let score = rater.convert_auto_rater_response_to_score(&verdict_response(valid)).unwrap();
        prop_assert_eq!(score, if valid { 1.0 } else { 0.0 });
    }

    #[test]
    fn overall_score_is_fraction_of_valid(
        verdicts in prop::collection::vec(any::<bool>(), 1..32),
        threshold in 0.0f64..=1.0,
    ) {
        let rater = FinalResponseMatchV2Evaluator::new(
            EvalMetric::final_response_match_v2(threshold).unwrap(),
        )
        .unwrap();
        let results: Vec<PerInvocationResult> = verdicts
            .iter()
            .enumerate()
            .map(|(i, &valid)| {
                let inv = Invocation::from_text(format!("inv_{i}"), "q", "a");
                let score = if valid { 1.0 } else { 0.0 };
                PerInvocationResult::new(inv.clone(), inv, score, threshold)
            })
            .collect();

        let result = rater.aggregate_invocation_results(results).unwrap();
        let expected = verdicts.iter().filter(|v| **v).count() as f64 / verdicts.len() as f64;
        prop_assert_eq!(result.overall_score, expected);
        prop_assert!((0.0..=1.0).contains(&result.overall_score));
        prop_assert_eq!(result.per_invocation_results.len(), verdicts.len());
        prop_assert_eq!(result.passed(), expected >= threshold);
    }
}
