use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::classification::aggregate::resolve_criteria;
use crate::classification::domain::{
    ApplicantId, CriterionId, CriterionKind, InvalidEvent, RegistrationId, RegistrationStatus,
};
use crate::classification::memory::InMemoryStore;
use crate::classification::ranker::{rank, RankingInput};
use crate::classification::repository::{RegistrationStore, RepositoryError};
use crate::classification::ClassificationError;

#[test]
fn ties_fall_back_to_registration_time() {
    let store = Arc::new(scenario_store());
    let service = service_with(store.clone());

    let outcome = service.rank(&EVENT).expect("ranking succeeds");

    let order: Vec<_> = outcome
        .ranked
        .iter()
        .map(|entry| (entry.registration.id, entry.position(), entry.score()))
        .collect();
    assert_eq!(
        order,
        vec![
            (RegistrationId(2), 1, points(95)),
            (RegistrationId(1), 2, points(80)),
            (RegistrationId(3), 3, points(80)),
        ]
    );
    assert_eq!(outcome.approved(), 2);
    assert_eq!(outcome.waitlisted(), 1);

    let status = |id| {
        store
            .registration(&RegistrationId(id))
            .expect("lookup succeeds")
            .expect("registration present")
            .status
    };
    assert_eq!(status(2), RegistrationStatus::Approved);
    assert_eq!(status(1), RegistrationStatus::Approved);
    assert_eq!(status(3), RegistrationStatus::Waitlisted);
}

#[test]
fn identical_scores_and_timestamps_break_on_registration_id() {
    let event = event(1, vec![config(1, 10)]);
    let catalog = HashMap::from([(CriterionId(1), criterion(1, CriterionKind::AgeAscending))]);
    let criteria = resolve_criteria(&event, &catalog);

    let same_time = at(5, 14, 0);
    let registrations: Vec<_> = [7, 3, 5]
        .into_iter()
        .map(|id| registration(id, &format!("0000000000{id}"), same_time))
        .collect();
    let applicants: HashMap<ApplicantId, _> = registrations
        .iter()
        .map(|entry| {
            let person = applicant(&entry.applicant_id.0, "Gêmeo", Some(born_years_ago(25)));
            (person.id.clone(), person)
        })
        .collect();

    let outcome = rank(RankingInput {
        event: &event,
        criteria: &criteria,
        registrations: &registrations,
        applicants: &applicants,
        awards: &HashMap::new(),
        today: today(),
        now: now(),
    })
    .expect("ranking succeeds");

    let ids: Vec<_> = outcome.ranked.iter().map(|entry| entry.registration.id.0).collect();
    let positions: Vec<_> = outcome.ranked.iter().map(|entry| entry.position()).collect();
    assert_eq!(ids, vec![3, 5, 7]);
    assert_eq!(positions, vec![1, 2, 3]);
    assert_eq!(outcome.approved(), 1);
    // Every registrant shares the earliest timestamp.
    assert!(outcome.ranked.iter().all(|entry| entry.score() == points(75)));
}

fn order_store(registrants: &[(u64, &str, u32)]) -> InMemoryStore {
    let store = InMemoryStore::default();
    store
        .insert_criterion(criterion(1, CriterionKind::RegistrationOrder))
        .expect("criterion inserted");
    store
        .insert_event(event(1, vec![config(1, 10)]))
        .expect("event inserted");
    for &(id, cpf, day) in registrants {
        store
            .insert_applicant(applicant(cpf, "Participante", None))
            .expect("applicant inserted");
        store
            .register(registration(id, cpf, at(day, 8, 0)))
            .expect("registration inserted");
    }
    store
}

#[test]
fn single_registration_is_first_in_line() {
    let service = service_with(Arc::new(order_store(&[(1, "12345678901", 2)])));

    let outcome = service.rank(&EVENT).expect("ranking succeeds");

    assert_eq!(outcome.ranked.len(), 1);
    assert_eq!(outcome.ranked[0].score().to_string(), "100.00");
    assert_eq!(outcome.ranked[0].position(), 1);
    assert_eq!(
        outcome.ranked[0].registration.status,
        RegistrationStatus::Approved
    );
}

#[test]
fn second_registrant_waits_when_one_seat_is_offered() {
    let store = order_store(&[(1, "12345678901", 2), (2, "10987654321", 3)]);
    let service = service_with(Arc::new(store));

    let outcome = service.rank(&EVENT).expect("ranking succeeds");

    let statuses: Vec<_> = outcome
        .ranked
        .iter()
        .map(|entry| (entry.registration.id, entry.score(), entry.registration.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (RegistrationId(1), points(100), RegistrationStatus::Approved),
            (RegistrationId(2), points(0), RegistrationStatus::Waitlisted),
        ]
    );
}

#[test]
fn events_without_seats_are_rejected_on_insert() {
    let store = InMemoryStore::default();

    match store.insert_event(event(0, Vec::new())) {
        Err(RepositoryError::InvalidEvent(InvalidEvent::ZeroCapacity { event })) => {
            assert_eq!(event, EVENT);
        }
        other => panic!("expected zero capacity rejection, got {other:?}"),
    }
    assert!(store.snapshot().expect("snapshot").events.is_empty());
}

#[test]
fn event_without_registrations_ranks_nothing() {
    let store = InMemoryStore::default();
    store
        .insert_event(event(10, Vec::new()))
        .expect("event inserted");
    let service = service_with(Arc::new(store));

    let outcome = service.rank(&EVENT).expect("ranking succeeds");

    assert!(outcome.ranked.is_empty());
    assert!(outcome.batch().is_empty());
}

#[test]
fn positions_are_contiguous_and_capacity_bounds_approval() {
    let store = InMemoryStore::default();
    store
        .insert_criterion(criterion(1, CriterionKind::AgeAscending))
        .expect("criterion inserted");
    store
        .insert_criterion(criterion(2, CriterionKind::RegistrationOrder))
        .expect("criterion inserted");
    store
        .insert_event(event(4, vec![config(1, 7), config(2, 3)]))
        .expect("event inserted");
    for id in 1..=9u64 {
        let cpf = format!("{id:011}");
        let age = 18 + (id as i32 % 3) * 5;
        store
            .insert_applicant(applicant(&cpf, "Participante", Some(born_years_ago(age))))
            .expect("applicant inserted");
        store
            .register(registration(id, &cpf, at(1 + (id as u32 % 4), 9, 0)))
            .expect("registration inserted");
    }
    let service = service_with(Arc::new(store));

    let outcome = service.rank(&EVENT).expect("ranking succeeds");

    let positions: Vec<_> = outcome.ranked.iter().map(|entry| entry.position()).collect();
    assert_eq!(positions, (1..=9).collect::<Vec<u32>>());
    for entry in &outcome.ranked {
        let expected = if entry.position() <= 4 {
            RegistrationStatus::Approved
        } else {
            RegistrationStatus::Waitlisted
        };
        assert_eq!(entry.registration.status, expected);
    }
    assert!(outcome
        .ranked
        .windows(2)
        .all(|pair| pair[0].score() >= pair[1].score()));
}

#[test]
fn rerunning_with_a_fixed_clock_is_idempotent() {
    let store = Arc::new(scenario_store());
    let service = service_with(store.clone());

    service.rank(&EVENT).expect("first run");
    let first = store.snapshot().expect("snapshot");
    service.rank(&EVENT).expect("second run");
    let second = store.snapshot().expect("snapshot");

    assert_eq!(first.classifications, second.classifications);
    assert_eq!(first.awards, second.awards);
    assert_eq!(first.registrations, second.registrations);
}

#[test]
fn concurrent_runs_on_one_event_leave_a_consistent_ranking() {
    let store = Arc::new(scenario_store());
    let service = Arc::new(service_with(store.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || service.rank(&EVENT).map(|outcome| outcome.ranked.len()))
        })
        .collect();
    for handle in handles {
        let ranked = handle
            .join()
            .expect("thread completes")
            .expect("ranking succeeds");
        assert_eq!(ranked, 3);
    }

    let mut positions: Vec<_> = classifications(&store)
        .values()
        .map(|classification| classification.position)
        .collect();
    positions.sort();
    assert_eq!(positions, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn missing_applicant_aborts_the_run_without_writes() {
    let store = scenario_store();
    store
        .register(registration(4, "99999999999", at(4, 9, 0)))
        .expect("registration inserted");
    let store = Arc::new(store);
    let service = service_with(store.clone());

    match service.rank(&EVENT) {
        Err(ClassificationError::ApplicantNotFound {
            registration,
            applicant,
        }) => {
            assert_eq!(registration, RegistrationId(4));
            assert_eq!(applicant, ApplicantId("99999999999".to_string()));
        }
        other => panic!("expected missing applicant, got {other:?}"),
    }
    assert!(classifications(&store).is_empty());
}
