//! # Jiseti Benchmarks
//!
//! | Group | Operation |
//! |-------|-----------|
//! | js-02 Status Transition | submit + triage, history scan |
//! | js-03 Vote Aggregation | cast / retract with counter update |
//! | js-04 Notification Dispatch | one event to two recipients on two channels |

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use js_01_record_storage::{InMemoryKVStore, KvLedger, RecordRepository};
use js_02_status_transition::{
    NewRecord, TransitionApi, TransitionConfig, TransitionEngine, TransitionRequest,
};
use js_03_vote_aggregation::{VoteAggregator, VoteApi};
use js_04_notification_dispatch::{
    Contact, DispatchApi, DispatchConfig, MemoryChannel, NotificationDispatcher, StaticDirectory,
    TracingAlertSink,
};
use shared_bus::{EventPublisher, PublishError};
use shared_types::{
    Actor, AdminId, EventId, ManualTimeSource, Recipient, Record, RecordKind, RecordStatus,
    SystemTimeSource, TransitionEvent, UrgencyLevel, UserId, VoteKind,
};
use tokio::runtime::Runtime;

type Ledger = KvLedger<InMemoryKVStore>;

/// Publisher that drops every event.
struct Discard;

#[async_trait]
impl EventPublisher for Discard {
    async fn publish(&self, _event: TransitionEvent) -> Result<(), PublishError> {
        Ok(())
    }

    fn events_published(&self) -> u64 {
        0
    }
}

fn engine(ledger: Arc<Ledger>) -> TransitionEngine<Ledger, Discard> {
    TransitionEngine::new(
        ledger,
        Arc::new(Discard),
        Arc::new(SystemTimeSource),
        TransitionConfig::default(),
    )
}

fn bench_transitions(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let ledger = Arc::new(KvLedger::in_memory());
    let engine = engine(ledger);
    let citizen = Actor::Citizen(UserId::new());
    let admin = Actor::Admin(AdminId::new());

    let mut group = c.benchmark_group("js-02-status-transition");

    group.bench_function("submit_and_triage", |b| {
        b.iter(|| {
            rt.block_on(async {
                let record = engine
                    .submit_record(
                        NewRecord::new(RecordKind::RedFlag, "bench", "bench"),
                        citizen,
                    )
                    .await
                    .unwrap();
                engine
                    .request_transition(TransitionRequest::new(
                        record.id,
                        RecordStatus::UnderInvestigation,
                        admin,
                    ))
                    .await
                    .unwrap();
                black_box(record.id)
            })
        })
    });

    for len in [10u32, 100, 500] {
        let record = rt.block_on(async {
            let record = engine
                .submit_record(NewRecord::new(RecordKind::RedFlag, "long", "long"), citizen)
                .await
                .unwrap();
            engine
                .request_transition(TransitionRequest::new(
                    record.id,
                    RecordStatus::UnderInvestigation,
                    admin,
                ))
                .await
                .unwrap();
            for _ in 1..len {
                engine
                    .request_transition(
                        TransitionRequest::new(record.id, RecordStatus::UnderInvestigation, admin)
                            .with_assignee(AdminId::new()),
                    )
                    .await
                    .unwrap();
            }
            record
        });

        group.throughput(Throughput::Elements(u64::from(len)));
        group.bench_with_input(BenchmarkId::new("history_scan", len), &record.id, |b, id| {
            b.iter(|| black_box(engine.history(*id).to_vec().unwrap().len()))
        });
    }

    group.finish();
}

fn bench_votes(c: &mut Criterion) {
    let ledger = Arc::new(KvLedger::in_memory());
    let record = Record::draft(RecordKind::Intervention, "votes", "votes", None, 0);
    ledger.put_record(&record).unwrap();
    let votes = VoteAggregator::new(ledger, Arc::new(SystemTimeSource));

    let mut group = c.benchmark_group("js-03-vote-aggregation");
    group.bench_function("cast_then_retract", |b| {
        b.iter(|| {
            let user = UserId::new();
            votes.cast_vote(record.id, user, VoteKind::Support).unwrap();
            black_box(votes.retract_vote(record.id, user).unwrap())
        })
    });
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let ledger = Arc::new(KvLedger::in_memory());
    let directory = Arc::new(StaticDirectory::new());
    let creator = UserId::new();
    let admin = AdminId::new();
    directory.insert(
        Recipient::Citizen(creator),
        Contact::new("Citizen", "citizen@example.org").with_phone("0700000001"),
    );
    directory.insert(
        Recipient::Admin(admin),
        Contact::new("Admin", "admin@example.org").with_phone("0700000002"),
    );

    let mut record = Record::draft(RecordKind::RedFlag, "dispatch", "dispatch", Some(creator), 0)
        .with_urgency(UrgencyLevel::Critical);
    record.status = RecordStatus::UnderInvestigation;
    record.assigned_admin = Some(admin);
    ledger.put_record(&record).unwrap();

    let dispatcher = NotificationDispatcher::new(
        ledger,
        directory,
        Arc::new(TracingAlertSink),
        Arc::new(ManualTimeSource::new(0)),
        DispatchConfig::default(),
    )
    .with_channel(Arc::new(MemoryChannel::email()))
    .with_channel(Arc::new(MemoryChannel::sms()));

    let mut group = c.benchmark_group("js-04-notification-dispatch");
    group.throughput(Throughput::Elements(4));
    group.bench_function("dispatch_urgent_event", |b| {
        b.iter(|| {
            let event = TransitionEvent {
                event_id: EventId::new(),
                record_id: record.id,
                old_status: RecordStatus::Draft,
                new_status: RecordStatus::UnderInvestigation,
                actor: Some(admin),
                reason: None,
                timestamp: 0,
            };
            let report = rt.block_on(dispatcher.dispatch(&event)).unwrap();
            black_box(report.sent())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_transitions, bench_votes, bench_dispatch);
criterion_main!(benches);
