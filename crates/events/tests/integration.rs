//! Integration tests for events

#[cfg(test)]
mod tests {
    use txflow_events::*;
    use txflow_types::OperationKind;

    #[tokio::test]
    async fn test_emit_wraps_event_with_meta() {
        let (tx, mut rx) = channel();

        tx.emit(AppEvent::Lifecycle(LifecycleEvent::OperationStarted {
            reference: "app/org.example.App/x86_64/stable".into(),
            kind: OperationKind::Install,
        }));
        tx.emit(AppEvent::General(GeneralEvent::warning_with_context(
            "plan has no apps",
            "transaction.invalid_plan",
        )));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.meta.source, EventSource::LIFECYCLE);
        assert_eq!(first.meta.level, EventLevel::Info);
        assert_eq!(
            first.meta.correlation_id.as_deref(),
            Some("app/org.example.App/x86_64/stable")
        );

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second.event,
            AppEvent::General(GeneralEvent::Warning { .. })
        ));
        assert_eq!(second.meta.level, EventLevel::Warn);
        assert_eq!(second.meta.correlation_id, None);
        assert_ne!(first.meta.event_id, second.meta.event_id);
    }

    #[test]
    fn test_emit_with_meta_keeps_caller_metadata() {
        let (tx, mut rx) = channel();
        let parent = EventMeta::new(EventLevel::Info, EventSource::TRANSACTION);
        let meta = EventMeta::new(EventLevel::Warn, EventSource::PROGRESS)
            .with_parent(parent.event_id);

        tx.emit_with_meta(
            meta,
            AppEvent::Progress(ProgressEvent::Unknown {
                reference: "r".into(),
            }),
        );

        let message = rx.try_recv().unwrap();
        assert_eq!(message.meta.parent_id, Some(parent.event_id));
        assert_eq!(message.meta.level, EventLevel::Warn);
    }

    #[test]
    fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit(AppEvent::Progress(ProgressEvent::Unknown {
            reference: "ignored".into(),
        }));
    }

    #[test]
    fn test_missing_sender_is_silent() {
        let none: Option<EventSender> = None;
        none.emit(AppEvent::Transaction(TransactionEvent::Completed { operations: 0 }));
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Transaction(TransactionEvent::Ready {
            operations: 3,
            apps: 2,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "transaction");
        assert_eq!(json["event"]["type"], "Ready");
        assert_eq!(json["event"]["operations"], 3);
    }

    #[test]
    fn test_level_round_trip_through_tracing() {
        for level in [
            EventLevel::Trace,
            EventLevel::Debug,
            EventLevel::Info,
            EventLevel::Warn,
            EventLevel::Error,
        ] {
            let tracing_level: tracing::Level = level.into();
            assert_eq!(EventLevel::from(tracing_level), level);
        }
    }
}
