//! Concurrent writers against one record, and the vote counter staying in
//! step with the vote rows.

use std::sync::Arc;

use crate::integration::fixtures::Harness;
use js_01_record_storage::{RecordRepository, VoteRepository};
use js_02_status_transition::{
    replay, DraftChanges, TransitionApi, TransitionError, TransitionRequest,
};
use js_03_vote_aggregation::{VoteApi, VoteError};
use proptest::prelude::*;
use shared_types::{Actor, AdminId, RecordStatus, UrgencyLevel, UserId, VoteKind};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_triage_has_one_winner() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Rehema");
    let record_id = h.draft(citizen, "Double allocation", UrgencyLevel::Low).await.id;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let transitions = h.service.transitions.clone();
        let admin = AdminId::new();
        tasks.push(tokio::spawn(async move {
            transitions
                .request_transition(TransitionRequest::new(
                    record_id,
                    RecordStatus::UnderInvestigation,
                    Actor::Admin(admin),
                ))
                .await
        }));
    }

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(
                e,
                TransitionError::InvalidTransition {
                    from: RecordStatus::UnderInvestigation,
                    to: RecordStatus::UnderInvestigation,
                }
            ),
        }
    }
    assert_eq!(winners, 1);

    let history = h.service.transitions.history(record_id).to_vec().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(replay(&history), Ok(RecordStatus::UnderInvestigation));
    h.settle().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resolve_and_reject_race() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Mumbua");
    let admin = h.admin("Langat");
    let record_id = h
        .under_investigation(citizen, admin, "Fuel siphoning", UrgencyLevel::Medium)
        .await
        .id;

    let resolve = {
        let transitions = h.service.transitions.clone();
        tokio::spawn(async move {
            transitions
                .request_transition(
                    TransitionRequest::new(record_id, RecordStatus::Resolved, Actor::Admin(admin))
                        .with_reason("Recovered"),
                )
                .await
        })
    };
    let reject = {
        let transitions = h.service.transitions.clone();
        tokio::spawn(async move {
            transitions
                .request_transition(
                    TransitionRequest::new(record_id, RecordStatus::Rejected, Actor::Admin(admin))
                        .with_reason("Unfounded"),
                )
                .await
        })
    };
    let outcomes = [resolve.await.unwrap(), reject.await.unwrap()];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);

    let stored = h.service.transitions.get_record(record_id).unwrap();
    assert!(stored.status.is_terminal());
    let history = h.service.transitions.history(record_id).to_vec().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(replay(&history), Ok(stored.status));
    h.settle().await;
}

#[tokio::test]
async fn test_concurrent_votes_keep_count_in_step() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Wairimu");
    let record_id = h.draft(citizen, "Unpaid contractors", UrgencyLevel::Low).await.id;
    let votes = h.service.votes.clone();
    let voters: Vec<UserId> = (0..40).map(|_| UserId::new()).collect();

    std::thread::scope(|s| {
        for (i, voter) in voters.iter().enumerate() {
            let votes = Arc::clone(&votes);
            s.spawn(move || {
                let kind = if i % 3 == 0 {
                    VoteKind::Urgent
                } else {
                    VoteKind::Support
                };
                votes.cast_vote(record_id, *voter, kind).unwrap();
                if i % 4 == 0 {
                    votes.retract_vote(record_id, *voter).unwrap();
                }
            });
        }
    });

    let rows = h.service.ledger.votes_for(&record_id).unwrap();
    let stored = h.service.ledger.get_record(&record_id).unwrap().unwrap();
    assert_eq!(rows.len(), 30);
    assert_eq!(stored.vote_count, 30);
    assert_eq!(votes.tally(record_id).unwrap().total(), 30);
    h.settle().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_votes_racing_edits_and_transitions_are_all_counted() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Nafula");
    let admin = h.admin("Otieno");
    let record_id = h.draft(citizen, "Diverted bursaries", UrgencyLevel::Low).await.id;

    let voting: Vec<_> = (0..4)
        .map(|lane| {
            let votes = h.service.votes.clone();
            tokio::task::spawn_blocking(move || {
                for i in 0..25 {
                    let voter = UserId::new();
                    votes.cast_vote(record_id, voter, VoteKind::Support).unwrap();
                    if (lane + i) % 5 == 0 {
                        votes.retract_vote(record_id, voter).unwrap();
                    }
                }
            })
        })
        .collect();

    let transitions = h.service.transitions.clone();
    let editing = tokio::spawn(async move {
        for round in 0..20 {
            let changes = DraftChanges {
                title: Some(format!("Diverted bursaries, revision {round}")),
                ..Default::default()
            };
            transitions
                .update_draft(record_id, Actor::Citizen(citizen), changes)
                .await
                .unwrap();
            tokio::task::yield_now().await;
        }
        transitions
            .request_transition(TransitionRequest::new(
                record_id,
                RecordStatus::UnderInvestigation,
                Actor::Admin(admin),
            ))
            .await
            .unwrap();
        for _ in 0..20 {
            transitions
                .request_transition(
                    TransitionRequest::new(
                        record_id,
                        RecordStatus::UnderInvestigation,
                        Actor::Admin(admin),
                    )
                    .with_assignee(AdminId::new()),
                )
                .await
                .unwrap();
            tokio::task::yield_now().await;
        }
    });

    for lane in voting {
        lane.await.unwrap();
    }
    editing.await.unwrap();

    let rows = h.service.ledger.votes_for(&record_id).unwrap();
    let stored = h.service.ledger.get_record(&record_id).unwrap().unwrap();
    assert_eq!(rows.len(), 80);
    assert_eq!(stored.vote_count, 80);
    assert_eq!(stored.title, "Diverted bursaries, revision 19");
    assert_eq!(stored.status, RecordStatus::UnderInvestigation);
    assert_eq!(
        h.service.transitions.history(record_id).to_vec().unwrap().len(),
        21
    );
    h.settle().await;
}

#[tokio::test]
async fn test_racing_duplicate_votes_count_once() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Kerubo");
    let record_id = h.draft(citizen, "Procurement kickbacks", UrgencyLevel::Low).await.id;
    let votes = h.service.votes.clone();
    let voter = UserId::new();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let votes = Arc::clone(&votes);
                s.spawn(move || votes.cast_vote(record_id, voter, VoteKind::Support))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, VoteError::DuplicateVote { .. })));
    assert_eq!(
        h.service.ledger.get_record(&record_id).unwrap().unwrap().vote_count,
        1
    );
    h.settle().await;
}

#[tokio::test]
async fn test_reconcile_repairs_drifted_counter() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Auma");
    let record = h.draft(citizen, "Ghost roads", UrgencyLevel::Low).await;
    for _ in 0..5 {
        h.service
            .votes
            .cast_vote(record.id, UserId::new(), VoteKind::Support)
            .unwrap();
    }

    let mut drifted = h.service.ledger.get_record(&record.id).unwrap().unwrap();
    drifted.vote_count = 99;
    h.service.ledger.put_record(&drifted).unwrap();

    assert_eq!(h.service.votes.reconcile(record.id).unwrap(), 5);
    assert_eq!(
        h.service.ledger.get_record(&record.id).unwrap().unwrap().vote_count,
        5
    );
    // Already consistent: nothing changes.
    assert_eq!(h.service.votes.reconcile(record.id).unwrap(), 5);
    h.settle().await;
}

fn arb_status() -> impl Strategy<Value = RecordStatus> {
    prop::sample::select(RecordStatus::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Whatever sequence of requests arrives, the stored history replays
    /// to the stored status and has one entry per accepted request.
    #[test]
    fn prop_history_replays_to_current_status(
        targets in prop::collection::vec((arb_status(), any::<bool>(), any::<bool>()), 0..12)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let h = Harness::start(Harness::fast_config());
            let citizen = h.citizen("Prop");
            let admin = AdminId::new();
            let record = h.draft(citizen, "Generated", UrgencyLevel::Low).await;

            let mut accepted = 0usize;
            for (target, with_reason, reassign) in targets {
                h.clock.advance(10);
                let mut request = TransitionRequest::new(record.id, target, Actor::Admin(admin));
                if with_reason {
                    request = request.with_reason("generated reason");
                }
                if reassign {
                    request = request.with_assignee(AdminId::new());
                }
                if h.service.transitions.request_transition(request).await.is_ok() {
                    accepted += 1;
                }
            }

            let stored = h.service.transitions.get_record(record.id).unwrap();
            let history = h.service.transitions.history(record.id).to_vec().unwrap();
            assert_eq!(history.len(), accepted);
            assert_eq!(replay(&history), Ok(stored.status));
            h.settle().await;
        });
    }
}
