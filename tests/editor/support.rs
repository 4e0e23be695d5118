//! Shared fixtures for editor tests.

use chrono::NaiveDate;
use folio::{Book, Event, InMemoryDocumentStore, Session};

pub const EVENTS_JS: &str = r#"/**
 * Events Data
 * Stores upcoming and past events for the PUBLIC HISTORY section
 */

const events = [
    {
        id: 'kennan-institute-2024',
        title: 'The Long View: Kennan Institute Discussion',
        date: '2024-02-26',
        time: '14:00',
        timezone: 'EST',
        location: 'Online',
        description: 'Labor history and modern political movements.',
        link: null,
        badge: 'Online'
    }
];

// Export for use in main site
if (typeof module !== 'undefined' && module.exports) {
    module.exports = events;
}
"#;

pub const BOOKS_JS: &str = r#"const books = [
    { title: 'First', publisher: 'P', year: '2019', cover: 'a.png', description: 'd' },
    { title: 'Second', publisher: 'P', year: '2024', cover: 'b.png', description: 'd' },
    { title: 'Third', publisher: 'P', year: 2021, cover: 'c.png', description: 'd', shelf: 'top' }
];
"#;

pub fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

pub fn session_with(files: &[(&str, &str)]) -> (InMemoryDocumentStore, Session<InMemoryDocumentStore>) {
    let store = InMemoryDocumentStore::new();
    for (path, text) in files {
        store.seed(path, *text).unwrap();
    }
    (store.clone(), Session::new(store))
}

pub fn event(title: &str, date: &str) -> Event {
    Event {
        title: title.into(),
        date: date.into(),
        time: "18:30".into(),
        timezone: "GMT".into(),
        location: "Dublin".into(),
        description: "A talk.".into(),
        ..Event::default()
    }
}

pub fn book(title: &str, year: &str) -> Book {
    Book {
        title: title.into(),
        publisher: "Footnote Press".into(),
        year: year.into(),
        cover: "images/cover.png".into(),
        description: "A book.".into(),
        ..Book::default()
    }
}

pub fn titles<T, F: Fn(&T) -> &str>(items: &[T], title: F) -> Vec<String> {
    items.iter().map(|item| title(item).to_string()).collect()
}
