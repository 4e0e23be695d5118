pub mod assets;
pub mod codec;
mod config;
pub mod dashboard;
pub mod editor;
#[cfg(feature = "logger")]
pub mod logging;
pub mod ordering;
pub mod record;
pub mod session;
pub mod store;

pub use assets::{AssetError, ImageInfo, UploadedImage};
pub use codec::{CodecError, SourceTemplate};
pub use config::{ClientConfig, Credentials, CredentialsError};
pub use dashboard::Dashboard;
pub use editor::{
    CollectionEditor, Confirm, EditorError, EditorState, ErrorKind, LandingEditor, Notice,
    NoticeLevel, Outcome, SingletonEditor,
};
pub use ordering::EventPartition;
pub use record::{
    Book, Category, CurrentPlaying, CurrentReading, Documentary, Event, ImageBox, LandingConfig,
    Podcast, Record, Singleton, SortPolicy, TimelineEntry, Writing,
};
pub use session::Session;
#[cfg(feature = "github")]
pub use store::GitHubStore;
pub use store::{
    ChangeRecord, DirectoryEntry, Document, DocumentStore, EntryKind, InMemoryDocumentStore,
    StoreError, VersionTag,
};
