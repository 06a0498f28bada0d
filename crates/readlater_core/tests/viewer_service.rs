use readlater_core::db::open_db_in_memory;
use readlater_core::{
    RepoError, SqliteViewerRepository, Viewer, ViewerService, ViewerValidationError,
};
use std::collections::BTreeSet;

#[test]
fn current_viewer_is_none_for_empty_store() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());

    assert_eq!(service.current_viewer().unwrap(), None);
}

#[test]
fn save_viewer_then_refresh_profile() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());

    service.save_viewer(&Viewer::new("u1", "Ann", "ann")).unwrap();
    let refreshed = Viewer::new("u1", "Ann", "ann").with_profile_image_url("http://img/new");
    service.save_viewer(&refreshed).unwrap();

    assert_eq!(service.current_viewer().unwrap(), Some(refreshed.clone()));
    assert_eq!(service.get_all().unwrap(), vec![refreshed]);
}

#[test]
fn sign_out_removes_viewer_and_is_noop_when_absent() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());
    service.save_viewer(&Viewer::new("u1", "Ann", "ann")).unwrap();

    assert!(service.sign_out("u1").unwrap());
    assert!(!service.sign_out("u1").unwrap());
    assert!(service.get_all().unwrap().is_empty());
}

#[test]
fn switch_account_replaces_other_viewers() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());
    service
        .upsert_all(&[Viewer::new("u1", "Ann", "ann"), Viewer::new("u2", "Bob", "bob")])
        .unwrap();

    let next = Viewer::new("u3", "Cid", "cid").with_intercom_hash("hash3");
    service.switch_account(&next).unwrap();

    assert_eq!(service.get_all().unwrap(), vec![next.clone()]);
    let ids: BTreeSet<String> = ["u1".to_string(), "u3".to_string()].into();
    assert_eq!(service.load_by_ids(&ids).unwrap(), vec![next]);
}

#[test]
fn switch_account_rejects_invalid_viewer_before_removing_anything() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());
    service.save_viewer(&Viewer::new("u1", "Ann", "ann")).unwrap();

    let err = service
        .switch_account(&Viewer::new("", "Nobody", "nobody"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ViewerValidationError::EmptyUserId)
    ));
    assert_eq!(service.get_all().unwrap().len(), 1);
}

#[test]
fn delete_passes_not_found_through() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());

    let err = service
        .delete(&Viewer::new("ghost", "Ghost", "ghost"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "ghost"));
}

#[test]
fn switch_account_failure_keeps_previous_viewers() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());
    service
        .upsert_all(&[Viewer::new("u1", "Ann", "ann"), Viewer::new("u2", "Bob", "bob")])
        .unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_u3 BEFORE INSERT ON viewer
         WHEN NEW.userID = 'u3'
         BEGIN SELECT RAISE(ABORT, 'blocked viewer'); END;",
    )
    .unwrap();

    let err = service
        .switch_account(&Viewer::new("u3", "Cid", "cid"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(service.get_all().unwrap().len(), 2);
}

#[test]
fn save_viewer_rejects_blank_user_id_but_upsert_all_stores_it() {
    let conn = open_db_in_memory().unwrap();
    let service = ViewerService::new(SqliteViewerRepository::try_new(&conn).unwrap());

    let err = service
        .save_viewer(&Viewer::new("  ", "Nobody", "nobody"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ViewerValidationError::EmptyUserId)
    ));
    assert!(service.get_all().unwrap().is_empty());

    service
        .upsert_all(&[Viewer::new("  ", "Nobody", "nobody")])
        .unwrap();
    assert_eq!(service.get_all().unwrap().len(), 1);
}
