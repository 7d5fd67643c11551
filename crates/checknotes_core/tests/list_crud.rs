use checknotes_core::db::open_db_in_memory;
use checknotes_core::{
    ItemRepository, ListKind, ListRepository, NewList, RepoError, SqliteItemRepository,
    SqliteListRepository,
};
use rusqlite::{params, Connection};

const OLD_STAMP: &str = "2000-01-01 00:00:00.000";

#[test]
fn create_checklist_inserts_items_in_order() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let list_id = lists
        .create_list(&NewList::checklist("Shopping", ["Milk", "Eggs", "Milk"]))
        .unwrap();

    let loaded = items.get_items(list_id).unwrap();
    let texts: Vec<_> = loaded.iter().map(|item| item.text.as_str()).collect();
    assert_eq!(texts, vec!["Milk", "Eggs", "Milk"]);
    assert!(loaded.iter().all(|item| !item.checked));
    assert!(loaded.iter().all(|item| item.list_id == list_id));
    assert!(loaded.windows(2).all(|pair| pair[0].id < pair[1].id));

    let summary = lists.get_list(list_id).unwrap().unwrap();
    assert_eq!(summary.title, "Shopping");
    assert_eq!(summary.kind, ListKind::Checklist);
    assert!(summary.note_text.is_none());
    assert!(summary.created_at.is_some());
    assert_eq!(summary.updated_at, summary.created_at);
    assert!(!summary.pinned);
    assert!(!summary.archived);
    assert!(!summary.is_deleted());
}

#[test]
fn create_text_note_ignores_items() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let mut note = NewList::text_note("Ideas", "write the plan")
        .with_color("#bfdbfe")
        .with_pinned(true);
    note.items = vec!["stray".to_string()];
    let list_id = lists.create_list(&note).unwrap();

    assert!(items.get_items(list_id).unwrap().is_empty());
    let summary = lists.get_list(list_id).unwrap().unwrap();
    assert_eq!(summary.kind, ListKind::Text);
    assert_eq!(summary.note_text.as_deref(), Some("write the plan"));
    assert_eq!(summary.color, "#bfdbfe");
    assert!(summary.pinned);
    assert_eq!((summary.item_count, summary.done_count), (0, 0));
}

#[test]
fn create_checklist_drops_note_text() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();

    let mut list = NewList::checklist("Todo", ["one"]);
    list.note_text = Some("ignored".to_string());
    let list_id = lists.create_list(&list).unwrap();

    assert!(lists.get_list(list_id).unwrap().unwrap().note_text.is_none());
}

#[test]
fn list_ids_are_not_reused_after_hard_delete() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();

    let first = lists.create_list(&NewList::text_note("a", "")).unwrap();
    lists.delete_permanently(first).unwrap();
    let second = lists.create_list(&NewList::text_note("b", "")).unwrap();

    assert!(second > first);
}

#[test]
fn add_item_appends_and_touches_parent() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Shopping", ["Milk"]))
        .unwrap();
    backdate(&conn, list_id);

    let item_id = items.add_item(list_id, "Eggs").unwrap();

    let loaded = items.get_items(list_id).unwrap();
    assert_eq!(loaded.last().unwrap().id, item_id);
    assert_eq!(loaded.last().unwrap().text, "Eggs");
    assert!(raw_updated_at(&conn, list_id).as_str() > OLD_STAMP);
}

#[test]
fn add_item_to_missing_list_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let err = items.add_item(42, "orphan").unwrap_err();
    assert!(matches!(err, RepoError::ListNotFound(42)));
    assert_eq!(item_row_count(&conn), 0);
}

#[test]
fn add_item_to_text_note_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists.create_list(&NewList::text_note("Ideas", "x")).unwrap();

    let err = items.add_item(list_id, "nope").unwrap_err();
    assert!(matches!(err, RepoError::NotAChecklist(id) if id == list_id));
}

#[test]
fn set_item_checked_updates_flag_and_touches_parent() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Shopping", ["Milk", "Eggs"]))
        .unwrap();
    let eggs = items.get_items(list_id).unwrap()[1].id;
    backdate(&conn, list_id);
    let before = lists.get_list(list_id).unwrap().unwrap().updated_at;

    items.set_item_checked(eggs, true).unwrap();

    let loaded = items.get_items(list_id).unwrap();
    assert!(!loaded[0].checked);
    assert!(loaded[1].checked);
    let after = lists.get_list(list_id).unwrap().unwrap().updated_at;
    assert!(after >= before);
    assert!(after > before);
}

#[test]
fn set_item_checked_on_missing_item_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let err = items.set_item_checked(7, true).unwrap_err();
    assert!(matches!(err, RepoError::ItemNotFound(7)));
    assert!(err.is_not_found());
}

#[test]
fn touch_never_moves_updated_at_backwards() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Shopping", ["Milk"]))
        .unwrap();
    conn.execute(
        "UPDATE lists SET updated_at = '2999-01-01 00:00:00.000' WHERE id = ?1;",
        [list_id],
    )
    .unwrap();

    let item_id = items.get_items(list_id).unwrap()[0].id;
    items.set_item_checked(item_id, true).unwrap();

    assert_eq!(raw_updated_at(&conn, list_id), "2999-01-01 00:00:00.000");
}

#[test]
fn uncheck_checked_items_clears_all_and_touches_once() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Chores", ["a", "b", "c"]))
        .unwrap();
    for item in items.get_items(list_id).unwrap().iter().take(2) {
        items.set_item_checked(item.id, true).unwrap();
    }
    backdate(&conn, list_id);

    assert_eq!(items.uncheck_checked_items(list_id).unwrap(), 2);
    assert!(items.get_items(list_id).unwrap().iter().all(|item| !item.checked));
    assert!(raw_updated_at(&conn, list_id).as_str() > OLD_STAMP);

    backdate(&conn, list_id);
    assert_eq!(items.uncheck_checked_items(list_id).unwrap(), 0);
    assert!(raw_updated_at(&conn, list_id).as_str() > OLD_STAMP);
}

#[test]
fn uncheck_on_missing_list_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    assert!(matches!(
        items.uncheck_checked_items(3).unwrap_err(),
        RepoError::ListNotFound(3)
    ));
}

#[test]
fn pin_and_archive_write_flag_and_touch_together() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let list_id = lists.create_list(&NewList::text_note("Ideas", "")).unwrap();

    backdate(&conn, list_id);
    lists.set_pinned(list_id, true).unwrap();
    assert!(lists.get_list(list_id).unwrap().unwrap().pinned);
    assert!(raw_updated_at(&conn, list_id).as_str() > OLD_STAMP);

    backdate(&conn, list_id);
    lists.set_archived(list_id, true).unwrap();
    let summary = lists.get_list(list_id).unwrap().unwrap();
    assert!(summary.archived);
    assert!(raw_updated_at(&conn, list_id).as_str() > OLD_STAMP);

    lists.set_pinned(list_id, false).unwrap();
    lists.set_archived(list_id, false).unwrap();
    let summary = lists.get_list(list_id).unwrap().unwrap();
    assert!(!summary.pinned);
    assert!(!summary.archived);
}

#[test]
fn flag_writes_on_missing_list_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();

    assert!(matches!(
        lists.set_pinned(9, true).unwrap_err(),
        RepoError::ListNotFound(9)
    ));
    assert!(matches!(
        lists.set_archived(9, true).unwrap_err(),
        RepoError::ListNotFound(9)
    ));
    assert!(matches!(
        lists.soft_delete(9).unwrap_err(),
        RepoError::ListNotFound(9)
    ));
}

#[test]
fn soft_delete_sets_timestamp_without_touching_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Old", ["x"]))
        .unwrap();
    backdate(&conn, list_id);

    lists.soft_delete(list_id).unwrap();

    assert_eq!(raw_updated_at(&conn, list_id), OLD_STAMP);
    let summary = lists.get_list(list_id).unwrap().unwrap();
    assert!(summary.is_deleted());
    assert!(summary.deleted_at.unwrap() >= summary.created_at.unwrap());
}

#[test]
fn soft_delete_is_idempotent_and_keeps_first_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let list_id = lists.create_list(&NewList::text_note("Gone", "")).unwrap();

    lists.soft_delete(list_id).unwrap();
    conn.execute(
        "UPDATE lists SET deleted_at = '2020-02-02 02:02:02.000' WHERE id = ?1;",
        [list_id],
    )
    .unwrap();
    lists.soft_delete(list_id).unwrap();

    let deleted_at: String = conn
        .query_row(
            "SELECT deleted_at FROM lists WHERE id = ?1;",
            [list_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(deleted_at, "2020-02-02 02:02:02.000");
}

#[test]
fn soft_deleted_list_rejects_mutations_but_keeps_rows() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Trip", ["Passport"]))
        .unwrap();
    let item_id = items.get_items(list_id).unwrap()[0].id;
    lists.soft_delete(list_id).unwrap();

    assert!(matches!(
        items.add_item(list_id, "Tickets").unwrap_err(),
        RepoError::ListNotFound(_)
    ));
    assert!(matches!(
        items.set_item_checked(item_id, true).unwrap_err(),
        RepoError::ItemNotFound(_)
    ));
    assert!(matches!(
        items.uncheck_checked_items(list_id).unwrap_err(),
        RepoError::ListNotFound(_)
    ));
    assert!(matches!(
        lists.set_pinned(list_id, true).unwrap_err(),
        RepoError::ListNotFound(_)
    ));
    assert_eq!(items.delete_items(&[item_id]).unwrap(), 0);

    assert_eq!(items.get_items(list_id).unwrap().len(), 1);
    assert!(lists.get_list(list_id).unwrap().is_some());
}

#[test]
fn hard_delete_cascades_to_items() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let keep = lists.create_list(&NewList::checklist("Keep", ["k"])).unwrap();
    let drop_id = lists
        .create_list(&NewList::checklist("Drop", ["a", "b", "c"]))
        .unwrap();

    lists.delete_permanently(drop_id).unwrap();

    assert!(lists.get_list(drop_id).unwrap().is_none());
    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM items WHERE list_id NOT IN (SELECT id FROM lists);",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
    assert_eq!(item_row_count(&conn), 1);
    assert!(lists.get_list(keep).unwrap().is_some());
    assert!(matches!(
        lists.delete_permanently(drop_id).unwrap_err(),
        RepoError::ListNotFound(_)
    ));
}

#[test]
fn delete_items_removes_selected_rows_and_touches_parents() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let first = lists
        .create_list(&NewList::checklist("First", ["a", "b", "c"]))
        .unwrap();
    let second = lists
        .create_list(&NewList::checklist("Second", ["x"]))
        .unwrap();
    let untouched = lists
        .create_list(&NewList::checklist("Third", ["y"]))
        .unwrap();
    let first_items = items.get_items(first).unwrap();
    let second_items = items.get_items(second).unwrap();
    for list_id in [first, second, untouched] {
        backdate(&conn, list_id);
    }

    let removed = items
        .delete_items(&[first_items[0].id, first_items[2].id, second_items[0].id, 9999])
        .unwrap();

    assert_eq!(removed, 3);
    let remaining: Vec<_> = items
        .get_items(first)
        .unwrap()
        .into_iter()
        .map(|item| item.text)
        .collect();
    assert_eq!(remaining, vec!["b"]);
    assert!(items.get_items(second).unwrap().is_empty());
    assert!(raw_updated_at(&conn, first).as_str() > OLD_STAMP);
    assert!(raw_updated_at(&conn, second).as_str() > OLD_STAMP);
    assert_eq!(raw_updated_at(&conn, untouched), OLD_STAMP);
}

#[test]
fn delete_items_with_empty_set_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    assert_eq!(items.delete_items(&[]).unwrap(), 0);
}

#[test]
fn get_items_of_unknown_list_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    assert!(items.get_items(123).unwrap().is_empty());
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    assert!(matches!(
        SqliteListRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("lists"))
    ));
    assert!(matches!(
        SqliteItemRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("lists"))
    ));
}

#[test]
fn unknown_kind_in_storage_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let list_id = lists.create_list(&NewList::text_note("x", "")).unwrap();
    conn.execute(
        "UPDATE lists SET kind = 'board' WHERE id = ?1;",
        params![list_id],
    )
    .unwrap();

    assert!(matches!(
        lists.get_list(list_id).unwrap_err(),
        RepoError::InvalidData(_)
    ));
}

#[test]
fn failed_create_leaves_no_partial_list() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_bad_item BEFORE INSERT ON items
         WHEN NEW.text = 'bad'
         BEGIN
             SELECT RAISE(ABORT, 'rejected item');
         END;",
    )
    .unwrap();

    let err = lists
        .create_list(&NewList::checklist("Half", ["ok", "bad"]))
        .unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(list_row_count(&conn), 0);
    assert_eq!(item_row_count(&conn), 0);
}

#[test]
fn failed_item_delete_rolls_back_parent_touch() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Guarded", ["drop", "keep"]))
        .unwrap();
    let ids: Vec<_> = items
        .get_items(list_id)
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    backdate(&conn, list_id);
    conn.execute_batch(
        "CREATE TRIGGER protect_keep BEFORE DELETE ON items
         WHEN OLD.text = 'keep'
         BEGIN
             SELECT RAISE(ABORT, 'protected item');
         END;",
    )
    .unwrap();

    assert!(matches!(
        items.delete_items(&ids).unwrap_err(),
        RepoError::Db(_)
    ));

    assert_eq!(items.get_items(list_id).unwrap().len(), 2);
    assert_eq!(raw_updated_at(&conn, list_id), OLD_STAMP);
}

#[test]
fn failed_touch_rolls_back_uncheck() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();
    let list_id = lists
        .create_list(&NewList::checklist("Frozen", ["a", "b"]))
        .unwrap();
    for item in items.get_items(list_id).unwrap() {
        items.set_item_checked(item.id, true).unwrap();
    }
    conn.execute_batch(
        "CREATE TRIGGER freeze_lists BEFORE UPDATE OF updated_at ON lists
         BEGIN
             SELECT RAISE(ABORT, 'lists are frozen');
         END;",
    )
    .unwrap();

    assert!(matches!(
        items.uncheck_checked_items(list_id).unwrap_err(),
        RepoError::Db(_)
    ));

    assert!(items.get_items(list_id).unwrap().iter().all(|item| item.checked));
}

fn backdate(conn: &Connection, list_id: i64) {
    conn.execute(
        "UPDATE lists SET updated_at = ?1 WHERE id = ?2;",
        params![OLD_STAMP, list_id],
    )
    .unwrap();
}

fn raw_updated_at(conn: &Connection, list_id: i64) -> String {
    conn.query_row(
        "SELECT updated_at FROM lists WHERE id = ?1;",
        [list_id],
        |row| row.get(0),
    )
    .unwrap()
}

fn item_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
        .unwrap()
}

fn list_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM lists;", [], |row| row.get(0))
        .unwrap()
}
