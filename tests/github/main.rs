#![cfg(feature = "github")]

mod mock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use folio::{
    Book, ClientConfig, Credentials, DocumentStore, EntryKind, GitHubStore, InMemoryDocumentStore,
    Session, StoreError, VersionTag,
};
use mock::{Mock, TOKEN};

const BOOKS_JS: &str = "const books = [\n    { title: 'Hotel Lux', publisher: 'Footnote Press', year: '2024', cover: 'images/book-cover-1.png', description: 'Communists in Moscow.' }\n];\n";

async fn setup(store: InMemoryDocumentStore) -> (Mock, ClientConfig) {
    let mock = Mock::new(store);
    let base = mock::spawn(mock.clone()).await;
    let config = ClientConfig::new()
        .with_api_base(base.clone())
        .with_raw_base(format!("{}/raw", base));
    (mock, config)
}

fn credentials(token: &str) -> Credentials {
    Credentials::new(token, "mcasey/site", "main").unwrap()
}

// --- Login ---

#[tokio::test]
async fn login_checks_the_token() {
    let (_, config) = setup(InMemoryDocumentStore::new()).await;

    assert!(Session::<GitHubStore>::login(credentials(TOKEN), config.clone()).await.is_ok());
    let err = Session::<GitHubStore>::login(credentials("wrong"), config).await.err().unwrap();
    assert_eq!(err, StoreError::Unauthorized("Bad credentials".into()));
}

// --- Contents API ---

#[tokio::test]
async fn fetch_decodes_wrapped_base64_and_reports_blob_sha() {
    let store = InMemoryDocumentStore::new();
    let long = "x".repeat(500);
    let seeded = store.seed("notes/long.txt", long.clone()).unwrap();
    let (_, config) = setup(store).await;
    let github = GitHubStore::new(credentials(TOKEN), config).unwrap();

    let document = github.fetch_document("notes/long.txt").await.unwrap();
    assert_eq!(document.content, long.into_bytes());
    assert_eq!(document.version, seeded);
    assert_eq!(document.version, VersionTag::of_content(&document.content));
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let (_, config) = setup(InMemoryDocumentStore::new()).await;
    let github = GitHubStore::new(credentials(TOKEN), config).unwrap();
    let err = github.fetch_document("books.js").await.unwrap_err();
    assert_eq!(err, StoreError::NotFound { path: "books.js".into() });
}

#[tokio::test]
async fn write_sends_sha_branch_and_base64_content() {
    let store = InMemoryDocumentStore::new();
    let v1 = store.seed("books.js", BOOKS_JS).unwrap();
    let (mock, config) = setup(store).await;
    let github = GitHubStore::new(credentials(TOKEN), config).unwrap();

    let v2 = github
        .write_document("books.js", b"const books = [];", &v1, "Update books")
        .await
        .unwrap();
    assert_eq!(v2, VersionTag::of_content(b"const books = [];"));

    let put = &mock.puts()[0];
    assert_eq!(put["sha"], v1.as_str());
    assert_eq!(put["branch"], "main");
    assert_eq!(put["message"], "Update books");
    assert_eq!(
        STANDARD.decode(put["content"].as_str().unwrap()).unwrap(),
        b"const books = [];".to_vec()
    );

    // The first tag is now stale.
    let err = github
        .write_document("books.js", b"const books = [1];", &v1, "Update books")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn create_over_existing_file_is_a_conflict() {
    let store = InMemoryDocumentStore::new();
    store.seed("books.js", BOOKS_JS).unwrap();
    let (mock, config) = setup(store).await;
    let github = GitHubStore::new(credentials(TOKEN), config).unwrap();

    let err = github
        .create_document("books.js", b"const books = [];", "Add books")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(mock.puts()[0].get("sha").is_none());
}

#[tokio::test]
async fn lists_directories_and_commits() {
    let store = InMemoryDocumentStore::new();
    store.seed("images/a.png", vec![0u8; 1536]).unwrap();
    store.seed("images/landing/about/b.jpg", b"b".to_vec()).unwrap();
    let (_, config) = setup(store).await;
    let github = GitHubStore::new(credentials(TOKEN), config).unwrap();

    let entries = github.list_directory("images").await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.png");
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[0].size, 1536);
    assert_eq!(entries[1].kind, EntryKind::Dir);

    github.create_document("one.txt", b"1", "First").await.unwrap();
    github.create_document("two.txt", b"2", "Second").await.unwrap();
    let changes = github.list_recent_changes(5).await.unwrap();
    let messages: Vec<&str> = changes.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, ["Second", "First"]);
}

// --- Through the session ---

#[tokio::test]
async fn editing_books_over_the_contents_api() {
    let store = InMemoryDocumentStore::new();
    store.seed("books.js", BOOKS_JS).unwrap();
    store.seed("images/cover.png", b"png".to_vec()).unwrap();
    let (mock, config) = setup(store.clone()).await;

    let session = Session::<GitHubStore>::login(credentials(TOKEN), config).await.unwrap();
    let mut books = session.collection::<Book>();
    assert_eq!(books.load().await.unwrap(), 1);

    let book = Book {
        title: "The Next One".into(),
        publisher: "Footnote Press".into(),
        year: "2027".into(),
        cover: "images/cover.png".into(),
        description: "Forthcoming.".into(),
        ..Book::default()
    };
    books.create(book).await.unwrap();
    assert_eq!(books.version().await, store.version("books.js").unwrap());
    assert_eq!(mock.puts()[0]["message"], "Add book: The Next One");

    let order: Vec<String> = books
        .records()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(order, ["The Next One", "Hotel Lux"]);

    let images = folio::assets::recent_images(&session, 12).await.unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0]
        .url
        .as_deref()
        .unwrap()
        .ends_with("/raw/mcasey/site/main/images/cover.png"));

    let dashboard = folio::dashboard::summary(&session).await.unwrap();
    assert_eq!(dashboard.image_count, 1);
    assert_eq!(dashboard.recent_changes[0].message, "Add book: The Next One");
}
