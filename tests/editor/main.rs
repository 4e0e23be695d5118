mod support;

use folio::{
    Book, DocumentStore, EditorError, EditorState, ErrorKind, Event, Outcome, StoreError,
    VersionTag, Writing,
};
use folio::record::EVENTS;
use support::{book, day, event, session_with, titles, BOOKS_JS, EVENTS_JS};

// --- Events end to end ---

#[tokio::test]
async fn adding_an_event_writes_with_the_observed_tag() {
    let store = folio::InMemoryDocumentStore::new();
    store
        .seed_with_version("events.js", EVENTS_JS, "abc123")
        .unwrap();
    let session = folio::Session::new(store.clone());
    let mut events = session.collection::<Event>();

    assert_eq!(events.load().await.unwrap(), 1);
    assert_eq!(events.version().await, Some(VersionTag::new("abc123")));

    let outcome = events.create(event("Future Talk", "2099-05-01")).await.unwrap();
    let written = outcome.version().unwrap().clone();
    assert_ne!(written.as_str(), "abc123");
    assert_eq!(events.version().await, Some(written.clone()));
    assert_eq!(store.version("events.js").unwrap(), Some(written));
    assert_eq!(events.listing().await.unwrap().len(), 2);
    assert_eq!(store.changes().unwrap()[0].message, "Add event: Future Talk");

    // The written file carries both events.
    let text = String::from_utf8(store.content("events.js").unwrap().unwrap()).unwrap();
    let written_titles: Vec<String> = EVENTS
        .decode(&text)
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        written_titles,
        ["The Long View: Kennan Institute Discussion", "Future Talk"]
    );

    let fresh = folio::Session::new(store.clone());
    let mut reloaded = fresh.collection::<Event>();
    assert_eq!(reloaded.load().await.unwrap(), 2);

    // A client still holding the old tag is turned away.
    let err = store
        .write_document("events.js", b"const events = [];", &"abc123".into(), "stale")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::VersionConflict { .. }));

    let split = events.partition(day("2025-01-01")).await.unwrap();
    assert_eq!(titles(&split.upcoming, |e: &Event| e.title.as_str()), ["Future Talk"]);
    assert_eq!(
        titles(&split.past, |e: &Event| e.title.as_str()),
        ["The Long View: Kennan Institute Discussion"]
    );

    let created = events.get("future-talk").await.unwrap().unwrap();
    assert_eq!(created.date, "2099-05-01");
}

#[tokio::test]
async fn stale_tag_from_another_session_surfaces_conflict() {
    let (store, first) = session_with(&[("events.js", EVENTS_JS)]);
    let second = folio::Session::new(store.clone());

    let mut mine = first.collection::<Event>();
    let mut theirs = second.collection::<Event>();
    mine.load().await.unwrap();
    theirs.load().await.unwrap();

    theirs.create(event("Their Talk", "2099-01-01")).await.unwrap();
    let err = mine.create(event("My Talk", "2099-02-02")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VersionConflict);
    assert!(mine.notice().unwrap().is_error());
    assert_eq!(mine.state(), EditorState::Ready);
    assert_eq!(mine.listing().await.unwrap().len(), 1);

    // Reloading picks up the other write and the retry goes through.
    mine.load().await.unwrap();
    mine.create(event("My Talk", "2099-02-02")).await.unwrap();
    assert_eq!(mine.listing().await.unwrap().len(), 3);
}

// --- Load failures ---

#[tokio::test]
async fn malformed_reload_keeps_previous_state() {
    let (store, session) = session_with(&[("books.js", BOOKS_JS)]);
    let mut books = session.collection::<Book>();
    books.load().await.unwrap();
    let version = books.version().await;

    store.seed("books.js", "const books = [ { title: 'Broken' ").unwrap();
    let err = books.load().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    assert_eq!(books.state(), EditorState::Ready);
    assert!(books.notice().unwrap().message.starts_with("Error loading books"));
    assert_eq!(books.version().await, version);
    assert_eq!(books.listing().await.unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_first_load_leaves_editor_uninitialized() {
    let (_, session) = session_with(&[("books.js", "const books = [oops];")]);
    let mut books = session.collection::<Book>();
    assert!(books.load().await.is_err());
    assert_eq!(books.state(), EditorState::Uninitialized);
    assert!(matches!(
        books.records().await,
        Err(EditorError::NotLoaded { .. })
    ));
}

#[tokio::test]
async fn transient_write_failure_leaves_cache_untouched() {
    let (store, session) = session_with(&[("books.js", BOOKS_JS)]);
    let mut books = session.collection::<Book>();
    books.load().await.unwrap();
    let before = books.version().await;

    store
        .fail_next(StoreError::Transient("connection reset".into()))
        .unwrap();
    let err = books.create(book("Fourth", "2025")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(books.version().await, before);
    assert_eq!(books.listing().await.unwrap().len(), 3);
}

// --- Shared cache ---

#[tokio::test]
async fn editors_on_one_path_share_the_cache_slot() {
    let (_, session) = session_with(&[("books.js", BOOKS_JS)]);
    let mut writer = session.collection::<Book>();
    let reader = session.collection::<Book>();
    writer.load().await.unwrap();

    writer.create(book("Fourth", "2025")).await.unwrap();

    assert_eq!(reader.version().await, writer.version().await);
    let order = titles(&reader.records().await.unwrap(), |b: &Book| b.title.as_str());
    assert_eq!(order, ["Fourth", "Second", "Third", "First"]);
}

#[tokio::test]
async fn logout_drops_cached_documents() {
    let (store, session) = session_with(&[("books.js", BOOKS_JS)]);
    session.collection::<Book>().load().await.unwrap();
    assert_eq!(session.cache().len(), 1);
    session.logout();

    let session = folio::Session::new(store);
    assert!(matches!(
        session.collection::<Book>().listing().await,
        Err(EditorError::NotLoaded { .. })
    ));
}

// --- Deletes ---

#[tokio::test]
async fn delete_then_reload_keeps_remaining_order() {
    let (store, session) = session_with(&[("books.js", BOOKS_JS)]);
    let mut books = session.collection::<Book>();
    books.load().await.unwrap();

    let outcome = books.delete("second", true).await.unwrap();
    assert!(matches!(outcome, Outcome::Saved { .. }));
    assert_eq!(store.changes().unwrap()[0].message, "Delete book: Second");

    let fresh = folio::Session::new(store);
    let mut reloaded = fresh.collection::<Book>();
    reloaded.load().await.unwrap();
    let listing = reloaded.listing().await.unwrap();
    assert_eq!(titles(&listing, |b: &Book| b.title.as_str()), ["First", "Third"]);
    assert_eq!(listing[0].id.as_deref(), Some("first"));
    assert_eq!(listing[1].extra["shelf"], "top");
}

#[tokio::test]
async fn declined_delete_touches_nothing() {
    let (store, session) = session_with(&[("books.js", BOOKS_JS)]);
    let mut books = session.collection::<Book>();
    books.load().await.unwrap();

    let mut prompts = Vec::new();
    let outcome = books
        .delete_at(0, |prompt: &str| {
            prompts.push(prompt.to_string());
            false
        })
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(prompts, ["Are you sure you want to delete this book?"]);
    assert!(store.changes().unwrap().is_empty());
    assert_eq!(books.listing().await.unwrap().len(), 3);
}

// --- Missing files ---

#[tokio::test]
async fn missing_file_loads_empty_and_first_save_creates_it() {
    let (store, session) = session_with(&[]);
    let mut writing = session.collection::<Writing>();

    assert_eq!(writing.load().await.unwrap(), 0);
    assert_eq!(writing.version().await, None);

    let piece = Writing {
        title: "Who are the Irish?".into(),
        outlet: "The Guardian".into(),
        date: "25 September 2024".into(),
        link: "https://www.theguardian.com/".into(),
        ..Writing::default()
    };
    writing.create(piece).await.unwrap();

    let text = String::from_utf8(store.content("writing.js").unwrap().unwrap()).unwrap();
    assert!(text.starts_with("/**\n * Selected Writing Data\n"));
    assert!(text.contains("\"id\": \"who-are-the-irish\""));
    assert_eq!(writing.version().await, store.version("writing.js").unwrap());
}

#[tokio::test]
async fn mutation_before_load_is_rejected() {
    let (store, session) = session_with(&[("books.js", BOOKS_JS)]);
    let mut books = session.collection::<Book>();
    let err = books.create(book("Fourth", "2025")).await.unwrap_err();
    assert!(matches!(err, EditorError::NotLoaded { .. }));
    assert_eq!(books.state(), EditorState::Uninitialized);
    assert!(store.changes().unwrap().is_empty());
}
