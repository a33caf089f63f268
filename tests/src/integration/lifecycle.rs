//! Record lifecycle through the wired service: transitions, audit trail,
//! anonymous intake and cascade deletion.

use crate::integration::fixtures::Harness;
use js_01_record_storage::{AuditLog, NotificationRepository, VoteRepository};
use js_02_status_transition::{
    replay, DraftChanges, NewRecord, TransitionApi, TransitionError, TransitionRequest,
};
use js_03_vote_aggregation::VoteApi;
use shared_types::{
    Actor, DeliveryStatus, NotificationChannel, Recipient, RecordKind, RecordStatus,
    UrgencyLevel, UserId, VoteKind,
};

#[tokio::test]
async fn test_triage_then_resolve_notifies_creator() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Wanjiru");
    let admin = h.admin("Kamau");

    let record = h
        .draft(citizen, "Ghost workers at county office", UrgencyLevel::Medium)
        .await;
    assert_eq!(record.status, RecordStatus::Draft);
    assert_eq!(h.service.transitions.history(record.id).to_vec().unwrap().len(), 0);

    h.clock.advance(60_000);
    let triaged = h
        .service
        .transitions
        .request_transition(TransitionRequest::new(
            record.id,
            RecordStatus::UnderInvestigation,
            Actor::Admin(admin),
        ))
        .await
        .unwrap();
    assert_eq!(triaged.old_status, RecordStatus::Draft);
    assert_eq!(h.service.transitions.history(record.id).to_vec().unwrap().len(), 1);

    h.clock.advance(60_000);
    let resolved = h
        .service
        .transitions
        .request_transition(
            TransitionRequest::new(record.id, RecordStatus::Resolved, Actor::Admin(admin))
                .with_reason("Payroll audited and names removed"),
        )
        .await
        .unwrap();
    assert_eq!(resolved.actor, Some(admin));

    let stored = h.service.transitions.get_record(record.id).unwrap();
    assert_eq!(stored.status, RecordStatus::Resolved);
    assert_eq!(stored.assigned_admin, Some(admin));
    assert_eq!(
        stored.resolution_notes.as_deref(),
        Some("Payroll audited and names removed")
    );

    let history = h.service.transitions.history(record.id).to_vec().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(replay(&history), Ok(RecordStatus::Resolved));
    assert!(history[0].timestamp < history[1].timestamp);
    assert!(history.iter().all(|e| e.actor == Some(admin)));

    let settled = h.settle().await;
    assert_eq!(settled.stats.events, 2);
    assert_eq!(settled.stats.sent, 4);

    let log = settled.ledger.notifications_for(&record.id).unwrap();
    assert_eq!(log.len(), 4);
    assert!(log
        .iter()
        .all(|n| n.recipient == Recipient::Citizen(citizen) && n.status == DeliveryStatus::Sent));

    let emails = settled.email.sent();
    assert_eq!(emails.len(), 2);
    assert!(emails.iter().all(|m| m.address == "wanjiru@example.org"));
    assert!(emails
        .iter()
        .any(|m| m.message.body.contains("Resolution Notes: Payroll audited")));
    assert!(settled
        .sms
        .sent()
        .iter()
        .all(|m| m.address.starts_with("+2547")));
}

#[tokio::test]
async fn test_refused_transitions_leave_no_trace() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Achieng");
    let admin = h.admin("Mutua");
    let record = h.draft(citizen, "Inflated tender", UrgencyLevel::Low).await;
    let transitions = &h.service.transitions;

    let err = transitions
        .request_transition(TransitionRequest::new(
            record.id,
            RecordStatus::Resolved,
            Actor::Admin(admin),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TransitionError::InvalidTransition {
            from: RecordStatus::Draft,
            to: RecordStatus::Resolved,
        }
    );

    let err = transitions
        .request_transition(
            TransitionRequest::new(record.id, RecordStatus::Rejected, Actor::Admin(admin))
                .with_reason("   "),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::MissingReason { .. }));

    let err = transitions
        .request_transition(TransitionRequest::new(
            record.id,
            RecordStatus::UnderInvestigation,
            Actor::Citizen(citizen),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, TransitionError::Forbidden { .. }));

    assert_eq!(transitions.get_record(record.id).unwrap(), record);
    assert_eq!(transitions.history(record.id).to_vec().unwrap().len(), 0);

    let settled = h.settle().await;
    assert_eq!(settled.stats.events, 0);
    assert!(settled.ledger.notifications_for(&record.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_terminal_records_accept_nothing() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Chebet");
    let admin = h.admin("Odhiambo");
    let record = h.draft(citizen, "Land grab", UrgencyLevel::Medium).await;

    h.service
        .transitions
        .request_transition(
            TransitionRequest::new(record.id, RecordStatus::Rejected, Actor::Admin(admin))
                .with_reason("Duplicate of an earlier report"),
        )
        .await
        .unwrap();

    for target in RecordStatus::ALL {
        let err = h
            .service
            .transitions
            .request_transition(
                TransitionRequest::new(record.id, target, Actor::Admin(admin))
                    .with_reason("try again"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }
    assert_eq!(h.service.transitions.history(record.id).to_vec().unwrap().len(), 1);
    h.settle().await;
}

#[tokio::test]
async fn test_creator_edits_only_while_draft() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Njoki");
    let admin = h.admin("Wekesa");
    let record = h.draft(citizen, "Broken borehole", UrgencyLevel::Low).await;

    let changes = DraftChanges {
        kind: Some(RecordKind::Intervention),
        title: Some("Borehole funds missing".into()),
        ..Default::default()
    };
    let edited = h
        .service
        .transitions
        .update_draft(record.id, Actor::Citizen(citizen), changes.clone())
        .await
        .unwrap();
    assert_eq!(edited.kind, RecordKind::Intervention);
    assert_eq!(edited.title, "Borehole funds missing");

    let stranger = h
        .service
        .transitions
        .update_draft(record.id, Actor::Citizen(UserId::new()), changes.clone())
        .await
        .unwrap_err();
    assert!(matches!(stranger, TransitionError::Forbidden { .. }));

    h.service
        .transitions
        .request_transition(TransitionRequest::new(
            record.id,
            RecordStatus::UnderInvestigation,
            Actor::Admin(admin),
        ))
        .await
        .unwrap();
    let late = h
        .service
        .transitions
        .update_draft(record.id, Actor::Citizen(citizen), changes)
        .await
        .unwrap_err();
    assert!(matches!(late, TransitionError::NotDraft { .. }));
    h.settle().await;
}

#[tokio::test]
async fn test_anonymous_intake_is_triaged_immediately() {
    let h = Harness::start(Harness::fast_config());

    let (record, event) = h
        .service
        .transitions
        .submit_anonymous(NewRecord::new(
            RecordKind::RedFlag,
            "Checkpoint bribes",
            "Officers at the weighbridge",
        ))
        .await
        .unwrap();

    assert!(record.is_anonymous());
    assert_eq!(record.status, RecordStatus::UnderInvestigation);
    assert_eq!(event.old_status, RecordStatus::Draft);
    assert_eq!(event.actor, None);

    let history = h.service.transitions.history(record.id).to_vec().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].actor, None);

    // Nobody to tell: no creator and nothing escalated.
    let settled = h.settle().await;
    assert_eq!(settled.stats.events, 1);
    assert_eq!(settled.stats.skipped, 1);
    assert!(settled.ledger.notifications_for(&record.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_urgent_anonymous_record_reaches_assigned_admin() {
    let h = Harness::start(Harness::fast_config());
    let admin = h.admin("Nduta");

    let (record, _) = h
        .service
        .transitions
        .submit_anonymous(
            NewRecord::new(RecordKind::Intervention, "Collapsed bridge", "School route cut off")
                .with_urgency(UrgencyLevel::Critical),
        )
        .await
        .unwrap();
    let assigned = h
        .service
        .transitions
        .request_transition(
            TransitionRequest::new(
                record.id,
                RecordStatus::UnderInvestigation,
                Actor::Admin(admin),
            )
            .with_assignee(admin),
        )
        .await
        .unwrap();

    let settled = h.settle().await;
    let all = settled.ledger.notifications_for(&record.id).unwrap();
    assert!(all.iter().all(|n| n.recipient == Recipient::Admin(admin)));
    let log: Vec<_> = all
        .into_iter()
        .filter(|n| n.event_id == assigned.event_id)
        .collect();
    assert_eq!(log.len(), 2);
    let sms = log
        .iter()
        .find(|n| n.channel == NotificationChannel::Sms)
        .unwrap();
    assert!(sms.message.starts_with("Jiseti Alert:"));
}

#[tokio::test]
async fn test_delete_cascades_to_owned_rows() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Akinyi");
    let admin = h.admin("Barasa");
    let record = h
        .under_investigation(citizen, admin, "Fake invoices", UrgencyLevel::Medium)
        .await;

    for _ in 0..3 {
        h.service
            .votes
            .cast_vote(record.id, UserId::new(), VoteKind::Support)
            .unwrap();
    }

    let creator_delete = h
        .service
        .transitions
        .delete_record(record.id, Actor::Citizen(citizen))
        .await
        .unwrap_err();
    assert!(matches!(creator_delete, TransitionError::NotDraft { .. }));

    let removed = h
        .service
        .transitions
        .delete_record(record.id, Actor::Admin(admin))
        .await
        .unwrap();
    assert_eq!(removed.vote_count, 3);

    let err = h.service.transitions.get_record(record.id).unwrap_err();
    assert_eq!(err, TransitionError::RecordNotFound { record_id: record.id });
    assert!(h.service.transitions.history(record.id).to_vec().unwrap().is_empty());

    let settled = h.settle().await;
    assert!(settled.ledger.votes_for(&record.id).unwrap().is_empty());
    assert_eq!(settled.ledger.next_sequence(&record.id).unwrap(), 0);
    // Deliveries of the triage event may finish after the delete, but
    // nothing they write survives it.
    assert!(settled.ledger.notifications_for(&record.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_status_distribution() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Moraa");
    let admin = h.admin("Kiprop");

    h.draft(citizen, "one", UrgencyLevel::Low).await;
    h.draft(citizen, "two", UrgencyLevel::Low).await;
    h.under_investigation(citizen, admin, "three", UrgencyLevel::Low)
        .await;

    let dist = h.service.transitions.status_distribution().unwrap();
    assert_eq!(dist.get(RecordStatus::Draft), 2);
    assert_eq!(dist.get(RecordStatus::UnderInvestigation), 1);
    assert_eq!(dist.get(RecordStatus::Resolved), 0);
    assert_eq!(dist.total(), 3);
    h.settle().await;
}
