//! Transition events flowing through the queue, the worker and the
//! channel adapters.

use std::time::Duration;

use crate::integration::fixtures::Harness;
use js_01_record_storage::NotificationRepository;
use js_02_status_transition::{TransitionApi, TransitionRequest};
use js_03_vote_aggregation::VoteApi;
use js_04_notification_dispatch::{ChannelError, DispatchApi, MemoryChannel, SkipReason};
use shared_types::{
    Actor, DeliveryStatus, NotificationChannel, Recipient, RecordStatus, UrgencyLevel, UserId,
    VoteKind,
};

#[tokio::test]
async fn test_failing_sms_leaves_one_terminal_entry_per_pair() {
    let h = Harness::start(Harness::fast_config());
    h.sms
        .fail_always(ChannelError::Transient("gateway timeout".into()));
    let citizen = h.citizen("Halima");
    let admin = h.admin("Omondi");

    let record = h
        .under_investigation(citizen, admin, "Stolen relief food", UrgencyLevel::High)
        .await;
    assert_eq!(record.assigned_admin, Some(admin));

    let settled = h.settle().await;
    let log = settled.ledger.notifications_for(&record.id).unwrap();

    // Two recipients on two channels.
    assert_eq!(log.len(), 4);
    assert!(log.iter().all(|n| n.status.is_terminal()));
    for recipient in [Recipient::Citizen(citizen), Recipient::Admin(admin)] {
        for channel in [NotificationChannel::Email, NotificationChannel::Sms] {
            let entries: Vec<_> = log
                .iter()
                .filter(|n| n.recipient == recipient && n.channel == channel)
                .collect();
            assert_eq!(entries.len(), 1, "{recipient} on {channel:?}");
            let entry = entries[0];
            match channel {
                NotificationChannel::Sms => {
                    assert_eq!(entry.status, DeliveryStatus::Failed);
                    assert_eq!(entry.attempts, 3);
                    assert_eq!(entry.error.as_deref(), Some("transient: gateway timeout"));
                    assert_eq!(entry.external_id, None);
                }
                _ => {
                    assert_eq!(entry.status, DeliveryStatus::Sent);
                    assert_eq!(entry.attempts, 1);
                    assert!(entry.external_id.is_some());
                    assert!(entry.sent_at.is_some());
                }
            }
        }
    }

    assert_eq!(settled.sms.calls(), 6);
    assert_eq!(settled.email.sent().len(), 2);
    assert_eq!(settled.stats.sent, 2);
    assert_eq!(settled.stats.failed, 2);

    let alerts = settled.alerts.failures();
    assert_eq!(alerts.len(), 2);
    assert!(alerts
        .iter()
        .all(|a| a.channel == NotificationChannel::Sms && a.attempts == 3));
    assert!(settled.alerts.unstored().is_empty());
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried_or_alerted() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Baraka");
    let admin = h.admin("Naliaka");
    h.email.fail_address(
        "baraka@example.org",
        ChannelError::Permanent("mailbox does not exist".into()),
    );

    let record = h
        .under_investigation(citizen, admin, "Rigged recruitment", UrgencyLevel::Low)
        .await;

    let settled = h.settle().await;
    let log = settled.ledger.notifications_for(&record.id).unwrap();
    let email = log
        .iter()
        .find(|n| n.channel == NotificationChannel::Email)
        .unwrap();
    assert_eq!(email.status, DeliveryStatus::Failed);
    assert_eq!(email.attempts, 1);
    assert_eq!(settled.email.calls(), 1);
    assert!(settled.alerts.failures().is_empty());
}

#[tokio::test]
async fn test_redeliver_after_outage() {
    let h = Harness::start(Harness::fast_config());
    h.sms
        .fail_always(ChannelError::Transient("network unreachable".into()));
    let citizen = h.citizen("Zawadi");
    let admin = h.admin("Ruto");
    let record = h
        .under_investigation(citizen, admin, "Missing bursary funds", UrgencyLevel::Medium)
        .await;

    let dispatcher = h.service.dispatcher.clone();
    let settled = h.settle().await;
    let failed: Vec<_> = settled
        .ledger
        .notifications_for(&record.id)
        .unwrap()
        .into_iter()
        .filter(|n| n.status == DeliveryStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);

    settled.sms.heal();
    let report = dispatcher.redeliver_failed(record.id).await.unwrap();
    assert_eq!(report.event_id, None);
    assert_eq!(report.sent(), 1);

    let log = dispatcher.delivery_log(record.id).unwrap();
    assert_eq!(log.len(), 3);
    let retry = log
        .iter()
        .find(|n| n.retry_of == Some(failed[0].id))
        .unwrap();
    assert_eq!(retry.status, DeliveryStatus::Sent);
    assert_eq!(retry.event_id, failed[0].event_id);
    assert_eq!(retry.message, failed[0].message);

    // The original failure stays as it was.
    let original = log.iter().find(|n| n.id == failed[0].id).unwrap();
    assert_eq!(original.status, DeliveryStatus::Failed);

    let again = dispatcher.redeliver_failed(record.id).await.unwrap();
    assert_eq!(again.skipped, Some(SkipReason::NothingToRedeliver));
}

#[tokio::test]
async fn test_urgent_votes_escalate_through_service() {
    let mut config = Harness::fast_config();
    config.dispatch.urgent_vote_threshold = 2;
    let h = Harness::start(config);
    let citizen = h.citizen("Imani");
    let admin = h.admin("Kariuki");
    let record = h
        .under_investigation(citizen, admin, "Dumped medicine", UrgencyLevel::Low)
        .await;

    for _ in 0..2 {
        h.service
            .votes
            .cast_vote(record.id, UserId::new(), VoteKind::Urgent)
            .unwrap();
    }
    let tally = h.service.votes.tally(record.id).unwrap();
    assert!(tally.escalates(2));

    let event = h
        .service
        .transitions
        .request_transition(
            TransitionRequest::new(record.id, RecordStatus::Resolved, Actor::Admin(admin))
                .with_reason("Stock recovered"),
        )
        .await
        .unwrap();

    let settled = h.settle().await;
    let resolved: Vec<_> = settled
        .ledger
        .notifications_for(&record.id)
        .unwrap()
        .into_iter()
        .filter(|n| n.event_id == event.event_id)
        .collect();
    assert_eq!(resolved.len(), 4);
    assert_eq!(
        resolved
            .iter()
            .filter(|n| n.recipient == Recipient::Admin(admin))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_reassignment_notifications_can_be_switched_off() {
    let mut config = Harness::fast_config();
    config.dispatch.notify_on_reassignment = false;
    let h = Harness::start(config);
    let citizen = h.citizen("Faith");
    let first = h.admin("Mwangi");
    let second = h.admin("Atieno");
    let record = h
        .under_investigation(citizen, first, "Tender splitting", UrgencyLevel::Critical)
        .await;

    let reassigned = h
        .service
        .transitions
        .request_transition(
            TransitionRequest::new(
                record.id,
                RecordStatus::UnderInvestigation,
                Actor::Admin(first),
            )
            .with_assignee(second),
        )
        .await
        .unwrap();
    assert!(reassigned.is_reassignment());

    let settled = h.settle().await;
    assert_eq!(settled.stats.events, 2);
    assert_eq!(settled.stats.skipped, 1);
    let log = settled.ledger.notifications_for(&record.id).unwrap();
    assert!(log.iter().all(|n| n.event_id != reassigned.event_id));
}

#[tokio::test]
async fn test_deletion_mid_flight_leaves_nothing_behind() {
    let h = Harness::start_with_channels(
        Harness::fast_config(),
        MemoryChannel::email().with_latency(Duration::from_millis(50)),
        MemoryChannel::sms().with_latency(Duration::from_millis(50)),
    );
    let citizen = h.citizen("Neema");
    let admin = h.admin("Kibet");
    let record = h
        .under_investigation(citizen, admin, "Diverted CDF money", UrgencyLevel::Medium)
        .await;

    // Let the worker pick the event up and start sending.
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.service
        .transitions
        .delete_record(record.id, Actor::Admin(admin))
        .await
        .unwrap();

    let settled = h.settle().await;
    assert_eq!(settled.stats.events, 1);
    assert!(settled.ledger.notifications_for(&record.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_event_for_deleted_record_is_skipped() {
    let h = Harness::start(Harness::fast_config());
    let citizen = h.citizen("Salma");
    let admin = h.admin("Koech");
    let record = h.draft(citizen, "Cartel at the port", UrgencyLevel::Low).await;

    let event = h
        .service
        .transitions
        .request_transition(TransitionRequest::new(
            record.id,
            RecordStatus::UnderInvestigation,
            Actor::Admin(admin),
        ))
        .await
        .unwrap();
    h.service
        .transitions
        .delete_record(record.id, Actor::Admin(admin))
        .await
        .unwrap();

    // Dispatch again directly: the record is gone, so nothing is planned.
    let report = h.service.dispatcher.dispatch(&event).await.unwrap();
    assert_eq!(report.skipped, Some(SkipReason::RecordDeleted));
    assert!(report.deliveries.is_empty());
    h.settle().await;
}
