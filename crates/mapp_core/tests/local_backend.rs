use mapp_core::{
    codec, CrudService, DateTime, LocalBackend, ModelBackend, ModelId, OperationContext, Page,
    SharedStore, SingleEnum, SingleModel, StoreLocation,
};
use std::sync::Arc;
use std::thread;

const SCENARIO_BODY: &str = r#"{"single_bool":true,"single_int":42,"single_float":3.14,"single_string":"x","single_enum":"red","single_datetime":"2000-01-11T12:34:56"}"#;

fn memory_backend() -> (LocalBackend, OperationContext) {
    let backend = LocalBackend::new(Arc::new(SharedStore::new()));
    let ctx = OperationContext::in_memory();
    backend.create_table(&ctx).unwrap();
    (backend, ctx)
}

fn record(n: i64) -> SingleModel {
    SingleModel {
        id: ModelId::Unassigned,
        single_bool: n % 2 == 0,
        single_int: n,
        single_float: n as f64 / 2.0,
        single_string: format!("record {n}"),
        single_enum: SingleEnum::Green,
        single_datetime: DateTime::parse("2021-06-01T08:00:00").unwrap(),
    }
}

#[test]
fn identities_increase_from_one_and_list_in_order() {
    let (backend, ctx) = memory_backend();

    for n in 1..=4 {
        let created = backend.create(&ctx, record(n)).unwrap();
        assert_eq!(created.id, ModelId::assigned(n.to_string()));
    }

    let list = backend.list(&ctx, Page::new(0, 4)).unwrap();
    assert_eq!(list.total, 4);
    let ids: Vec<_> = list.items.iter().map(|m| m.id.clone()).collect();
    assert_eq!(
        ids,
        ["1", "2", "3", "4"].map(ModelId::assigned).to_vec()
    );
    assert_eq!(list.items[2].single_int, 3);
}

#[test]
fn offset_past_end_keeps_true_total() {
    let (backend, ctx) = memory_backend();
    for n in 1..=3 {
        backend.create(&ctx, record(n)).unwrap();
    }

    let list = backend.list(&ctx, Page::new(3, 10)).unwrap();
    assert_eq!(list.total, 3);
    assert!(list.items.is_empty());

    let list = backend.list(&ctx, Page::new(50, 10)).unwrap();
    assert_eq!(list.total, 3);
    assert!(list.items.is_empty());
}

#[test]
fn ten_records_page_by_five() {
    let (backend, ctx) = memory_backend();
    for n in 1..=10 {
        backend.create(&ctx, record(n)).unwrap();
    }

    let first = backend.list(&ctx, Page::new(0, 5)).unwrap();
    assert_eq!(first.total, 10);
    assert_eq!(first.items.len(), 5);

    let last = backend.list(&ctx, Page::new(9, 5)).unwrap();
    assert_eq!(last.total, 10);
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, ModelId::assigned("10"));
}

#[test]
fn delete_of_missing_identity_succeeds_and_leaves_others() {
    let (backend, ctx) = memory_backend();
    let kept = backend.create(&ctx, record(1)).unwrap();

    backend.delete(&ctx, "999").unwrap();
    backend.delete(&ctx, "not-a-number").unwrap();

    assert_eq!(backend.read(&ctx, "1").unwrap(), kept);
    backend.delete(&ctx, "1").unwrap();
    backend.delete(&ctx, "1").unwrap();
}

#[test]
fn update_of_missing_identity_is_not_found_and_changes_nothing() {
    let (backend, ctx) = memory_backend();
    let kept = backend.create(&ctx, record(1)).unwrap();

    let err = backend.update(&ctx, "2", record(99)).unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert_eq!(err.to_string(), "single model 2 not found");

    let list = backend.list(&ctx, Page::new(0, 10)).unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.items, vec![kept]);
}

#[test]
fn read_of_non_numeric_identity_is_not_found() {
    let (backend, ctx) = memory_backend();
    assert_eq!(backend.read(&ctx, "abc").unwrap_err().code(), "not_found");
}

#[test]
fn create_read_update_delete_scenario() {
    let store = Arc::new(SharedStore::new());
    let service = CrudService::new(LocalBackend::new(store));
    let ctx = OperationContext::in_memory();
    service.create_table(&ctx).unwrap();

    let created = service.create(&ctx, SCENARIO_BODY).unwrap();
    assert_eq!(created.id, ModelId::assigned("1"));

    let read = service.read(&ctx, "1").unwrap();
    assert_eq!(read, created);
    assert_eq!(read.single_int, 42);
    assert_eq!(read.single_float, 3.14);
    assert_eq!(read.single_enum, SingleEnum::Red);
    assert_eq!(read.single_datetime.to_string(), "2000-01-11T12:34:56");

    let updated_body = SCENARIO_BODY.replace("\"single_int\":42", "\"single_int\":200");
    let updated = service.update(&ctx, "1", &updated_body).unwrap();
    assert_eq!(updated.id, ModelId::assigned("1"));
    assert_eq!(service.read(&ctx, "1").unwrap().single_int, 200);

    service.delete(&ctx, "1").unwrap();
    assert_eq!(service.read(&ctx, "1").unwrap_err().code(), "not_found");
}

#[test]
fn invalid_body_never_reaches_storage() {
    let (backend, ctx) = memory_backend();
    let service = CrudService::new(backend.clone());

    let err = service
        .create(&ctx, &SCENARIO_BODY.replace("red", "purple"))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_body().code, "validation_error");
    assert_eq!(backend.list(&ctx, Page::new(0, 10)).unwrap().total, 0);
}

#[test]
fn create_table_is_idempotent() {
    let (backend, ctx) = memory_backend();
    backend.create(&ctx, record(1)).unwrap();

    let status = backend.create_table(&ctx).unwrap();
    assert_eq!(status.status, "success");
    assert_eq!(backend.list(&ctx, Page::new(0, 10)).unwrap().total, 1);
}

#[test]
fn operations_before_table_creation_are_db_errors() {
    let backend = LocalBackend::new(Arc::new(SharedStore::new()));
    let ctx = OperationContext::in_memory();

    let err = backend.create(&ctx, record(1)).unwrap_err();
    assert_eq!(err.code(), "db_error");
}

#[test]
fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = OperationContext::new(
        "http://localhost:5005",
        StoreLocation::File(dir.path().join("nested").join("mapp.sqlite3")),
    );

    let first = LocalBackend::new(Arc::new(SharedStore::new()));
    first.create_table(&ctx).unwrap();
    let created = first.create(&ctx, record(7)).unwrap();
    drop(first);

    let second = LocalBackend::new(Arc::new(SharedStore::new()));
    assert_eq!(second.read(&ctx, "1").unwrap(), created);
}

#[test]
fn timestamps_are_stored_as_absolute_utc_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mapp.sqlite3");
    let ctx = OperationContext::new("http://localhost:5005", StoreLocation::File(path.clone()));

    let backend = LocalBackend::new(Arc::new(SharedStore::new()));
    backend.create_table(&ctx).unwrap();
    backend
        .create(&ctx, codec::decode(SCENARIO_BODY).unwrap())
        .unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    let (stored_bool, stored_time): (i64, String) = conn
        .query_row(
            "SELECT single_bool, single_datetime FROM single_model WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(stored_bool, 1);
    assert_eq!(stored_time, "2000-01-11T12:34:56Z");
}

#[test]
fn concurrent_creates_share_one_handle() {
    let (backend, ctx) = memory_backend();

    let handles: Vec<_> = (1..=8)
        .map(|n| {
            let backend = backend.clone();
            let ctx = ctx.clone();
            thread::spawn(move || backend.create(&ctx, record(n)).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let list = backend.list(&ctx, Page::new(0, 20)).unwrap();
    assert_eq!(list.total, 8);
}

#[test]
fn year_zero_survives_create_read_and_list() {
    let (backend, ctx) = memory_backend();
    let mut model = record(1);
    model.single_datetime = DateTime::parse("0000-01-01T00:00:00").unwrap();

    let created = backend.create(&ctx, model).unwrap();
    let read = backend.read(&ctx, "1").unwrap();
    assert_eq!(read, created);
    assert!(codec::encode(&read).contains(r#""single_datetime":"0000-01-01T00:00:00""#));

    let list = backend.list(&ctx, Page::new(0, 10)).unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.items[0].single_datetime.to_string(), "0000-01-01T00:00:00");
}

#[test]
fn padded_or_signed_identities_never_alias_a_row() {
    let (backend, ctx) = memory_backend();
    backend.create(&ctx, record(1)).unwrap();

    assert_eq!(backend.read(&ctx, "01").unwrap_err().code(), "not_found");
    assert_eq!(
        backend.update(&ctx, "+1", record(9)).unwrap_err().code(),
        "not_found"
    );
    backend.delete(&ctx, "+1").unwrap();
    backend.delete(&ctx, "01").unwrap();

    let kept = backend.read(&ctx, "1").unwrap();
    assert_eq!(kept.single_int, 1);
    assert_eq!(kept.id, ModelId::assigned("1"));
}

#[test]
fn non_finite_float_is_rejected_before_storage() {
    let (backend, ctx) = memory_backend();
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut model = record(1);
        model.single_float = bad;
        let err = backend.create(&ctx, model).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.code(), "invalid_field");
    }
    assert_eq!(backend.list(&ctx, Page::new(0, 10)).unwrap().total, 0);

    backend.create(&ctx, record(1)).unwrap();
    let mut model = record(2);
    model.single_float = f64::NAN;
    assert!(backend.update(&ctx, "1", model).unwrap_err().is_validation());
    assert_eq!(backend.read(&ctx, "1").unwrap().single_float, 0.5);
}
