//! Induction delay: days from first randomization to first nonzero dose.

use quinary_model::{Event, EventPayload, InductionDelay, StudyDay, SubjectId};

fn first_randomization(events: &[Event]) -> Option<(StudyDay, Option<String>)> {
    events
        .iter()
        .filter_map(|event| match &event.payload {
            EventPayload::Randomization {
                index: 1,
                treatment,
            } => Some((event.day, treatment.clone())),
            _ => None,
        })
        .min_by_key(|(day, _)| *day)
}

fn first_nonzero_dose(events: &[Event]) -> Option<StudyDay> {
    events
        .iter()
        .filter(|event| {
            matches!(event.payload, EventPayload::Dose { amount } if amount != 0.0 && !amount.is_nan())
        })
        .map(|event| event.day)
        .min()
}

/// Computes one subject's induction delay from its events.
///
/// The delay is `None` when the subject never received a nonzero dose or was
/// never randomized. Negative delays (dosed before randomization) are kept.
pub fn induction_delay(subject: SubjectId, events: &[Event]) -> InductionDelay {
    let randomization = first_randomization(events);
    let treatment_start_day = first_nonzero_dose(events);
    let randomization_day = randomization.as_ref().map(|(day, _)| *day);
    let delay = match (randomization_day, treatment_start_day) {
        (Some(randomized), Some(started)) => Some(started - randomized),
        _ => None,
    };
    InductionDelay {
        subject,
        randomization_day,
        treatment: randomization.and_then(|(_, treatment)| treatment),
        treatment_start_day,
        delay,
    }
}

/// Induction delays for every subject appearing in `events`, ordered by subject.
pub fn induction_delays(events: &[Event]) -> Vec<InductionDelay> {
    let mut subjects: Vec<SubjectId> = events.iter().map(|event| event.subject).collect();
    subjects.sort();
    subjects.dedup();
    subjects
        .into_iter()
        .map(|subject| {
            let own: Vec<Event> = events
                .iter()
                .filter(|event| event.subject == subject)
                .cloned()
                .collect();
            induction_delay(subject, &own)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn randomized(day: StudyDay, index: u8) -> Event {
        Event::new(
            SubjectId(1),
            day,
            EventPayload::Randomization {
                index,
                treatment: Some("BUP".to_string()),
            },
        )
    }

    fn dose(day: StudyDay, amount: f64) -> Event {
        Event::new(SubjectId(1), day, EventPayload::Dose { amount })
    }

    #[test]
    fn delay_from_first_nonzero_dose() {
        let events = vec![randomized(2, 1), dose(2, 0.0), dose(5, 8.0), dose(6, 16.0)];
        let delay = induction_delay(SubjectId(1), &events);
        assert_eq!(delay.randomization_day, Some(2));
        assert_eq!(delay.treatment_start_day, Some(5));
        assert_eq!(delay.delay, Some(3));
        assert_eq!(delay.treatment.as_deref(), Some("BUP"));
    }

    #[test]
    fn never_dosed_is_undefined_not_zero() {
        let events = vec![randomized(0, 1), dose(0, 0.0)];
        let delay = induction_delay(SubjectId(1), &events);
        assert_eq!(delay.delay, None);
        assert_eq!(delay.treatment_start_day, None);
    }

    #[test]
    fn dosing_before_randomization_is_negative() {
        let events = vec![dose(-2, 4.0), randomized(1, 1)];
        assert_eq!(induction_delay(SubjectId(1), &events).delay, Some(-3));
    }

    #[test]
    fn same_day_dose_is_zero() {
        let events = vec![randomized(4, 1), dose(4, 2.0)];
        assert_eq!(induction_delay(SubjectId(1), &events).delay, Some(0));
    }

    #[test]
    fn second_randomization_is_not_the_anchor() {
        let events = vec![randomized(50, 2), dose(51, 8.0)];
        let delay = induction_delay(SubjectId(1), &events);
        assert_eq!(delay.randomization_day, None);
        assert_eq!(delay.delay, None);
    }

    #[test]
    fn all_subjects_in_order() {
        let mut events = vec![
            Event::new(SubjectId(3), 0, EventPayload::Dose { amount: 1.0 }),
            randomized(0, 1),
        ];
        events.push(dose(1, 1.0));
        let delays = induction_delays(&events);
        assert_eq!(delays.len(), 2);
        assert_eq!(delays[0].subject, SubjectId(1));
        assert_eq!(delays[0].delay, Some(1));
        assert_eq!(delays[1].delay, None);
    }
}
