use std::sync::mpsc::sync_channel;
use std::sync::Arc;

use eventing::{AggregatorError, EventAggregator, EventAggregatorConfig, EventTypeKey};

use crate::aggregator::{aggregator, runtime, DELIVERY_TIMEOUT, QUIET_PERIOD};
use crate::fakes::{
    ChannelEventHandler, EventData, EventReceiver, EventSource, FakeEvent, OtherFakeEvent,
};

/// Publishes an [`OtherFakeEvent`] when dropped.
struct PublishOnDrop {
    aggregator: EventAggregator,
}

impl Drop for PublishOnDrop {
    fn drop(&mut self) {
        self.aggregator.publish(OtherFakeEvent);
    }
}

#[test]
fn dispose_without_subscriber_does_not_panic() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);

    aggregator.dispose();

    assert_eq!(aggregator.registry_count(), 0);
}

#[test]
fn dispose_with_single_subscriber_does_not_panic() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let _unsubscriber = aggregator.subscribe_fn(|_: &FakeEvent| {});

    aggregator.dispose();

    assert_eq!(aggregator.registry_count(), 0);
}

#[test]
fn dispose_with_multiple_subscribers_does_not_panic() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let _first = aggregator.subscribe_fn(|_: &FakeEvent| {});
    let _second = aggregator.subscribe_fn(|_: &FakeEvent| {});
    let _other = aggregator.subscribe_fn(|_: &OtherFakeEvent| {});

    assert_eq!(aggregator.registry_count(), 2);

    aggregator.dispose();
    aggregator.dispose();

    assert_eq!(aggregator.registry_count(), 0);
}

#[test]
fn dispose_survives_handler_publishing_on_drop() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let guard = PublishOnDrop {
        aggregator: aggregator.clone(),
    };

    let _stopped = aggregator.subscribe_fn(|_: &OtherFakeEvent| {});
    let _unsubscriber = aggregator.subscribe_fn(move |_: &FakeEvent| {
        let _guard = &guard;
    });

    let (done, disposed) = sync_channel(1);
    let disposing = aggregator.clone();
    std::thread::spawn(move || {
        disposing.dispose();
        let _ = done.send(());
    });

    assert_eq!(disposed.recv_timeout(DELIVERY_TIMEOUT), Ok(()));
    assert_eq!(aggregator.registry_count(), 0);
}

#[test]
fn dispose_stops_delivery() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let source = EventSource::new(aggregator.clone());
    let receiver = EventReceiver::new();

    let unsubscriber = receiver.subscribe(&aggregator);
    aggregator.dispose();
    source.emit(EventData::random());

    assert_eq!(receiver.wait(QUIET_PERIOD), None);
    // The registration is already gone: revoking it is a no-op.
    unsubscriber.unsubscribe();
    assert!(unsubscriber.is_revoked());
}

#[test]
fn aggregator_is_usable_after_dispose() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let _stale = aggregator.subscribe_fn(|_: &FakeEvent| {});
    aggregator.dispose();

    let receiver = EventReceiver::new();
    let unsubscriber = receiver.subscribe(&aggregator);
    let data = EventData::random();
    EventSource::new(aggregator.clone()).emit(data.clone());

    assert_eq!(receiver.wait(DELIVERY_TIMEOUT), Some(data));
    unsubscriber.unsubscribe();
}

#[test]
fn publishing_absent_event_is_invalid_argument() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);

    let result = aggregator.try_publish::<FakeEvent>(None);

    assert!(matches!(
        result,
        Err(AggregatorError::InvalidArgument { argument: "event" })
    ));
}

#[test]
fn subscribing_absent_handler_is_invalid_argument() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);

    let closure = aggregator.try_subscribe_fn::<FakeEvent, fn(&FakeEvent)>(None);
    let handler = aggregator.try_subscribe::<FakeEvent, ChannelEventHandler>(None);

    assert!(matches!(
        closure,
        Err(AggregatorError::InvalidArgument { argument: "handler" })
    ));
    assert!(matches!(
        handler,
        Err(AggregatorError::InvalidArgument { argument: "handler" })
    ));
    assert_eq!(aggregator.registry_count(), 0);
}

#[test]
fn present_arguments_are_accepted() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let receiver = EventReceiver::new();

    let unsubscriber = aggregator
        .try_subscribe_fn(Some(|_: &FakeEvent| {}))
        .unwrap();
    let data_unsubscriber = receiver.subscribe(&aggregator);
    let data = EventData::random();

    aggregator
        .try_publish(Some(FakeEvent { data: data.clone() }))
        .unwrap();

    assert_eq!(receiver.wait(DELIVERY_TIMEOUT), Some(data));
    unsubscriber.unsubscribe();
    data_unsubscriber.unsubscribe();
}

#[test]
fn last_unsubscribe_retires_registry() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let first = aggregator.subscribe_fn(|_: &FakeEvent| {});
    let second = aggregator.subscribe_fn(|_: &FakeEvent| {});

    assert_eq!(first.event_type(), EventTypeKey::of::<FakeEvent>());
    assert_ne!(first.token(), second.token());
    assert_eq!(aggregator.subscriber_count::<FakeEvent>(), 2);

    first.unsubscribe();
    assert_eq!(aggregator.subscriber_count::<FakeEvent>(), 1);
    assert_eq!(aggregator.registry_count(), 1);

    second.unsubscribe();
    assert_eq!(aggregator.subscriber_count::<FakeEvent>(), 0);
    assert_eq!(aggregator.registry_count(), 0);
}

#[test]
fn unsubscribe_is_idempotent() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let first = aggregator.subscribe_fn(|_: &FakeEvent| {});
    let second = aggregator.subscribe_fn(|_: &FakeEvent| {});

    first.unsubscribe();
    first.unsubscribe();

    assert!(first.is_revoked());
    assert!(!second.is_revoked());
    assert_eq!(aggregator.subscriber_count::<FakeEvent>(), 1);

    second.unsubscribe();
}

#[test]
fn dropping_unsubscriber_keeps_subscription() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);

    drop(aggregator.subscribe_fn(|_: &FakeEvent| {}));

    assert_eq!(aggregator.subscriber_count::<FakeEvent>(), 1);
}

#[test]
fn unsubscriber_does_not_keep_aggregator_alive() {
    let runtime = runtime();
    let aggregator = aggregator(&runtime);
    let unsubscriber = aggregator.subscribe_fn(|_: &FakeEvent| {});

    drop(aggregator);

    unsubscriber.unsubscribe();
    assert!(unsubscriber.is_revoked());
}

#[test]
fn new_outside_runtime_fails() {
    let result = EventAggregator::new(EventAggregatorConfig::default());

    assert!(matches!(result, Err(AggregatorError::NoRuntime(_))));
}

#[test]
fn concurrent_subscribe_and_unsubscribe_leave_no_registry() {
    let runtime = runtime();
    let aggregator = Arc::new(aggregator(&runtime));

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let aggregator = Arc::clone(&aggregator);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let unsubscriber = aggregator.subscribe_fn(|_: &FakeEvent| {});
                    aggregator.publish(FakeEvent {
                        data: EventData::random(),
                    });
                    unsubscriber.unsubscribe();
                }
            })
        })
        .collect();

    threads.into_iter().for_each(|thread| thread.join().unwrap());

    assert_eq!(aggregator.subscriber_count::<FakeEvent>(), 0);
    assert_eq!(aggregator.registry_count(), 0);
}
