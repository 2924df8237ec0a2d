//! Load, reload, and snapshot-swap behavior through the public surface.

use std::io::Write;

use opsrecall::prelude::*;

fn memory_sources(records: Vec<SourceRecord>) -> Vec<Box<dyn RecordSource>> {
    vec![Box::new(MemorySource::new("fixture", records))]
}

#[test]
fn jsonl_sources_load_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.jsonl");
    let mut file = std::fs::File::create(&path).expect("create fixture");
    writeln!(
        file,
        r#"{{"kind":"incident","id":"INC-1","opened":"2024-03-01T10:00:00Z","closed":"2024-03-01T12:30:00Z","priority":"critical","category":"database","symptom":"replica lag caused stale reads","resolution":"promoted standby and rebuilt replica","status":"closed"}}"#
    )
    .expect("write incident");
    writeln!(
        file,
        r#"{{"kind":"issue","key":"OPS-1","summary":"replica rebuild automation","description":"automate standby promotion","status":"Resolved","priority":"high","assignee":"sre-team","components":["database"],"labels":[],"created":"2024-03-02T09:00:00Z","updated":"2024-03-10T09:00:00Z"}}"#
    )
    .expect("write issue");
    writeln!(file, "this line is not json").expect("write garbage");

    let engine = RecallEngine::new(EngineConfig::default()).expect("engine");
    let sources: Vec<Box<dyn RecordSource>> =
        vec![Box::new(JsonlSource::new("records", &path))];
    let report = engine.load(&sources).expect("load");

    assert_eq!(report.incidents, 1);
    assert_eq!(report.issues, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.total_rows, 3);

    let result = engine
        .query(&QueryRequest::new("replica lag stale reads"))
        .expect("query");
    assert_eq!(result.evidence[0].id, "INC-1");
    assert!(!result.evidence[0].snippet.is_empty());
}

#[test]
fn missing_source_file_fails_load_with_structured_error() {
    let engine = RecallEngine::new(EngineConfig::default()).expect("engine");
    let sources: Vec<Box<dyn RecordSource>> = vec![Box::new(JsonlSource::new(
        "ghost",
        "/no/such/file.jsonl",
    ))];
    let err = engine.load(&sources).unwrap_err();
    assert!(matches!(err, RecallError::SourceMissing { .. }));
    assert!(!engine.is_ready());
}

#[test]
fn failed_reload_keeps_prior_snapshot_serving() {
    let engine = RecallEngine::new(EngineConfig::default()).expect("engine");
    engine
        .load(&memory_sources(vec![SourceRecord::Incident(
            Incident::new("INC-1").with_symptom("original snapshot data"),
        )]))
        .expect("initial load");

    // A reload that fails the record floor must not disturb the snapshot.
    let err = engine.load(&memory_sources(Vec::new())).unwrap_err();
    assert!(matches!(err, RecallError::RecordFloor { .. }));

    let result = engine
        .query(&QueryRequest::new("original snapshot data"))
        .expect("query still served");
    assert_eq!(result.evidence[0].id, "INC-1");
    assert_eq!(engine.stats().expect("stats").incidents, 1);
}

#[test]
fn successful_reload_replaces_snapshot_atomically() {
    let engine = RecallEngine::new(EngineConfig::default()).expect("engine");
    engine
        .load(&memory_sources(vec![SourceRecord::Incident(
            Incident::new("INC-OLD").with_symptom("first generation"),
        )]))
        .expect("first load");
    engine
        .load(&memory_sources(vec![SourceRecord::Incident(
            Incident::new("INC-NEW").with_symptom("second generation"),
        )]))
        .expect("second load");

    let old = engine
        .query(&QueryRequest::new("first generation"))
        .expect("query");
    assert!(old.evidence.is_empty(), "old snapshot must be fully gone");

    let new = engine
        .query(&QueryRequest::new("second generation"))
        .expect("query");
    assert_eq!(new.evidence[0].id, "INC-NEW");
}

#[test]
fn corrupt_heavy_source_fails_and_engine_stays_not_ready() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("corrupt.jsonl");
    std::fs::write(
        &path,
        "garbage one\ngarbage two\ngarbage three\n{\"kind\":\"incident\",\"id\":\"INC-1\",\"opened\":null,\"closed\":null,\"priority\":\"low\",\"category\":\"\",\"symptom\":\"lone survivor\",\"resolution\":\"\",\"status\":\"open\"}\n",
    )
    .expect("write corrupt fixture");

    let engine = RecallEngine::new(EngineConfig::default()).expect("engine");
    let sources: Vec<Box<dyn RecordSource>> =
        vec![Box::new(JsonlSource::new("corrupt", &path))];
    let err = engine.load(&sources).unwrap_err();
    // 3 of 4 rows skipped: above the 0.5 tolerance.
    assert!(matches!(
        err,
        RecallError::SkipRatioExceeded { skipped: 3, total: 4, .. }
    ));
    assert!(!engine.is_ready());
}

#[test]
fn queries_on_one_snapshot_run_concurrently() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let engine = std::sync::Arc::new(RecallEngine::new(EngineConfig::default()).expect("engine"));
    let records: Vec<SourceRecord> = (0..50)
        .map(|n| {
            SourceRecord::Incident(
                Incident::new(format!("INC-{n}"))
                    .with_symptom(format!("broker partition {n} under-replicated")),
            )
        })
        .collect();
    engine.load(&memory_sources(records)).expect("load");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..20 {
                    let result = engine
                        .query(&QueryRequest::new("broker partition under-replicated"))
                        .expect("query");
                    assert!(!result.evidence.is_empty());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("query thread");
    }
}
