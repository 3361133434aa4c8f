//! Weekly symbol assignment and per-phase word collapsing.
//!
//! Symbols come from an ordered rule table; the first rule whose predicate
//! holds wins. The order is fixed and must not be simplified: rule 5 is
//! kept even where rule 4 already covers it.

use quinary_model::{StudyWeek, SubjectId, TrialPhase, UsePatternWord, WeekRecord, WeekSymbol};

use crate::error::{PipelineError, Result};
use crate::weeks::WeekTally;

/// One named entry of the precedence table.
#[derive(Debug, Clone, Copy)]
pub struct SymbolRule {
    pub name: &'static str,
    pub symbol: WeekSymbol,
    pub applies: fn(&WeekTally) -> bool,
}

fn positive_only(tally: &WeekTally) -> bool {
    tally.n_positive > 0 && tally.n_negative == 0
}

fn negative_only(tally: &WeekTally) -> bool {
    tally.n_negative > 0 && tally.n_positive == 0
}

fn mixed(tally: &WeekTally) -> bool {
    tally.n_positive > 0 && tally.n_negative > 0
}

fn expected_no_data(tally: &WeekTally) -> bool {
    !tally.has_observations() && tally.week >= 1 && tally.expected
}

fn missing_visit(tally: &WeekTally) -> bool {
    !tally.has_observations() && tally.n_missing > 0
}

fn not_expected(_: &WeekTally) -> bool {
    true
}

/// Precedence order of the encoder. The last rule always applies.
pub static SYMBOL_RULES: [SymbolRule; 6] = [
    SymbolRule {
        name: "positive_only",
        symbol: WeekSymbol::Positive,
        applies: positive_only,
    },
    SymbolRule {
        name: "negative_only",
        symbol: WeekSymbol::Negative,
        applies: negative_only,
    },
    SymbolRule {
        name: "mixed",
        symbol: WeekSymbol::Mixed,
        applies: mixed,
    },
    SymbolRule {
        name: "expected_no_data",
        symbol: WeekSymbol::Missing,
        applies: expected_no_data,
    },
    SymbolRule {
        name: "missing_visit",
        symbol: WeekSymbol::Missing,
        applies: missing_visit,
    },
    SymbolRule {
        name: "not_expected",
        symbol: WeekSymbol::NotExpected,
        applies: not_expected,
    },
];

/// First rule that applies to `tally`.
pub fn evaluate(tally: &WeekTally) -> &'static SymbolRule {
    let last = &SYMBOL_RULES[SYMBOL_RULES.len() - 1];
    SYMBOL_RULES
        .iter()
        .find(|rule| (rule.applies)(tally))
        .unwrap_or(last)
}

pub fn assign_symbol(tally: &WeekTally) -> WeekSymbol {
    evaluate(tally).symbol
}

/// Encodes every tally of one subject.
pub fn encode_weeks(subject: SubjectId, tallies: &[WeekTally]) -> Vec<WeekRecord> {
    tallies
        .iter()
        .map(|tally| WeekRecord {
            subject,
            week: tally.week,
            phase: tally.phase,
            n_positive: tally.n_positive,
            n_negative: tally.n_negative,
            n_present: tally.n_present,
            n_missing: tally.n_missing,
            expected: tally.expected,
            symbol: assign_symbol(tally),
        })
        .collect()
}

/// Randomization weeks carried on every word row of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomizationWeeks {
    pub first: StudyWeek,
    pub second: Option<StudyWeek>,
}

struct WordBuilder {
    phase: TrialPhase,
    start_week: StudyWeek,
    end_week: StudyWeek,
    word: String,
}

/// Concatenates week symbols into one word per phase, in phase order.
///
/// `records` must be ordered by week. Each phase must cover a contiguous
/// run of weeks; a hole is reported as [`PipelineError::WeekGap`].
pub fn collapse_words(
    subject: SubjectId,
    records: &[WeekRecord],
    rand_weeks: RandomizationWeeks,
) -> Result<Vec<UsePatternWord>> {
    let mut builders: Vec<WordBuilder> = Vec::new();
    for record in records {
        match builders.iter_mut().find(|builder| builder.phase == record.phase) {
            Some(builder) => {
                let expected = builder.end_week + 1;
                if record.week != expected {
                    return Err(PipelineError::WeekGap {
                        subject,
                        phase: record.phase,
                        expected,
                        found: record.week,
                    });
                }
                builder.end_week = record.week;
                builder.word.push(record.symbol.as_char());
            }
            None => builders.push(WordBuilder {
                phase: record.phase,
                start_week: record.week,
                end_week: record.week,
                word: record.symbol.as_char().to_string(),
            }),
        }
    }
    builders.sort_by_key(|builder| builder.phase);
    Ok(builders
        .into_iter()
        .map(|builder| UsePatternWord {
            subject,
            phase: builder.phase,
            start_week: builder.start_week,
            end_week: builder.end_week,
            rand_week_1: rand_weeks.first,
            rand_week_2: rand_weeks.second,
            word: builder.word,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(week: StudyWeek, positive: u32, negative: u32, missing: u32, expected: bool) -> WeekTally {
        WeekTally {
            n_positive: positive,
            n_negative: negative,
            n_missing: missing,
            ..WeekTally::empty(week, TrialPhase::Phase1, expected)
        }
    }

    fn record(week: StudyWeek, phase: TrialPhase, symbol: WeekSymbol) -> WeekRecord {
        WeekRecord {
            subject: SubjectId(1),
            week,
            phase,
            n_positive: 0,
            n_negative: 0,
            n_present: 0,
            n_missing: 0,
            expected: true,
            symbol,
        }
    }

    const RAND: RandomizationWeeks = RandomizationWeeks {
        first: 0,
        second: None,
    };

    #[test]
    fn each_rule_fires_on_its_own_case() {
        assert_eq!(evaluate(&tally(2, 1, 0, 0, true)).name, "positive_only");
        assert_eq!(evaluate(&tally(2, 0, 3, 0, true)).name, "negative_only");
        assert_eq!(evaluate(&tally(2, 1, 1, 0, true)).name, "mixed");
        assert_eq!(evaluate(&tally(2, 0, 0, 0, true)).name, "expected_no_data");
        assert_eq!(evaluate(&tally(-1, 0, 0, 1, false)).name, "missing_visit");
        assert_eq!(evaluate(&tally(-1, 0, 0, 0, false)).name, "not_expected");
    }

    #[test]
    fn observations_beat_missing_visits() {
        assert_eq!(assign_symbol(&tally(3, 2, 0, 1, true)), WeekSymbol::Positive);
        assert_eq!(assign_symbol(&tally(3, 0, 1, 1, true)), WeekSymbol::Negative);
    }

    #[test]
    fn week_one_without_expectation_is_not_expected() {
        assert_eq!(assign_symbol(&tally(1, 0, 0, 0, false)), WeekSymbol::NotExpected);
        assert_eq!(assign_symbol(&tally(0, 0, 0, 0, true)), WeekSymbol::NotExpected);
    }

    #[test]
    fn words_per_phase() {
        let records = vec![
            record(-1, TrialPhase::Baseline, WeekSymbol::NotExpected),
            record(0, TrialPhase::Baseline, WeekSymbol::Missing),
            record(1, TrialPhase::Phase1, WeekSymbol::Negative),
            record(2, TrialPhase::Phase1, WeekSymbol::Mixed),
            record(3, TrialPhase::Phase2, WeekSymbol::Positive),
        ];
        let rand = RandomizationWeeks {
            first: 0,
            second: Some(3),
        };
        let words = collapse_words(SubjectId(1), &records, rand).unwrap();
        let summary: Vec<(TrialPhase, StudyWeek, StudyWeek, &str)> = words
            .iter()
            .map(|word| (word.phase, word.start_week, word.end_week, word.word.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (TrialPhase::Baseline, -1, 0, "_o"),
                (TrialPhase::Phase1, 1, 2, "-*"),
                (TrialPhase::Phase2, 3, 3, "+"),
            ]
        );
        assert!(words.iter().all(|word| word.rand_week_2 == Some(3)));
    }

    #[test]
    fn gap_is_fatal() {
        let records = vec![
            record(1, TrialPhase::Phase1, WeekSymbol::Negative),
            record(2, TrialPhase::Phase1, WeekSymbol::Negative),
            record(4, TrialPhase::Phase1, WeekSymbol::Negative),
        ];
        match collapse_words(SubjectId(1), &records, RAND) {
            Err(PipelineError::WeekGap {
                expected, found, ..
            }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 4);
            }
            other => panic!("expected WeekGap, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_week_is_fatal() {
        let records = vec![
            record(1, TrialPhase::Phase1, WeekSymbol::Negative),
            record(1, TrialPhase::Phase1, WeekSymbol::Positive),
        ];
        assert!(matches!(
            collapse_words(SubjectId(1), &records, RAND),
            Err(PipelineError::WeekGap { .. })
        ));
    }

    #[test]
    fn no_weeks_no_words() {
        assert!(collapse_words(SubjectId(1), &[], RAND).unwrap().is_empty());
    }
}
