use folio::codec::{decode, decode_named, encode, CodecError, Keyword, SourceTemplate};
use folio::record::{BOOKS, EVENTS, LANDING, READING};
use folio::{Book, LandingConfig};
use serde_json::{json, Value};

const BOOKS_JS: &str = r#"/**
 * Books Data
 * Stores published books for the BOOKS section
 *
 * DATA STRUCTURE:
 * - id: Unique identifier (string)
 * - year: Publication year (string or number)
 */

const books = [
    {
        id: 'hotel-lux-2024',
        title: 'Hotel Lux: An Intimate History of Communism\'s Forgotten Radicals',
        publisher: 'Footnote Press',
        year: '2024',
        description: 'Lives of international communists in Moscow during the 1920s–1940s.',
        cover: 'images/book-cover-1.png',
        publisherLink: 'https://footnotepress.com',
        reviewsLink: null
    }
    // Add more books here
];

// Export for use in main site
if (typeof module !== 'undefined' && module.exports) {
    module.exports = books;
}
"#;

const EVENTS_JS: &str = r#"const events = [
    {
        id: 'kennan-institute-2026',
        title: 'The Long View: Kennan Institute Discussion',
        date: '2026-02-26',
        time: '14:00',
        timezone: 'EST',
        location: 'Online',
        link: 'https://www.timeanddate.com/worldclock/converter.html?iso=20260226T190000&p1=263',
        badge: 'Online',
    },
];
"#;

const LANDING_JS: &str = r#"/**
 * Landing Images Configuration
 */

const landingConfig = {
    about: {
        images: [
            'images/landing/about/about1.jpg'
        ],
        rotation: 'daily',
        label: 'About Box'
    },
    books: {
        label: 'Selected Writing Box'
    }
};

// Export for use in carousel script
if (typeof module !== 'undefined' && module.exports) {
    module.exports = landingConfig;
}
"#;

const WRITING_JS: &str = r#"const writing = [
    {
        "title": "Who are the Irish? ",
        "outlet": "The Guardian",
        "date": "25 September 2024",
        "link": "https://www.theguardian.com/commentisfree/2024/sep/25/who-are-the-irish"
    }
]
"#;

// --- Decoding real file layouts ---

#[test]
fn decodes_books_file_with_banner_comments_and_footer() {
    let declaration = decode(BOOKS_JS).unwrap();
    assert_eq!(declaration.keyword, Keyword::Const);
    assert_eq!(declaration.name, "books");

    let books: Vec<Book> = serde_json::from_value(declaration.value).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(
        books[0].title,
        "Hotel Lux: An Intimate History of Communism's Forgotten Radicals"
    );
    assert_eq!(books[0].year, "2024");
    assert!(books[0].description.contains("1920s–1940s"));
}

#[test]
fn decodes_trailing_commas() {
    let value = EVENTS.decode(EVENTS_JS).unwrap();
    assert_eq!(value[0]["badge"], "Online");
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn decodes_double_quoted_keys_without_semicolon() {
    let declaration = decode_named(WRITING_JS, "writing").unwrap();
    assert_eq!(declaration.value[0]["title"], "Who are the Irish? ");
}

#[test]
fn landing_boxes_keep_file_order() {
    let value = LANDING.decode(LANDING_JS).unwrap();
    let config: LandingConfig = serde_json::from_value(value).unwrap();
    assert_eq!(config.names().collect::<Vec<_>>(), ["about", "books"]);
    assert!(config.get("books").unwrap().images.is_empty());
    assert_eq!(config.get("about").unwrap().label.as_deref(), Some("About Box"));
}

// --- Rejections ---

#[test]
fn rejects_executable_content() {
    for text in [
        "const books = [foo()];",
        "const books = [undefined];",
        "const books = [`${x}`];",
        "const books = [1,,2];",
        "const books = [NaN];",
    ] {
        let err = decode(text).unwrap_err();
        assert!(
            matches!(err, CodecError::Malformed { .. }),
            "{} gave {:?}",
            text,
            err
        );
    }
}

#[test]
fn rejects_missing_or_ambiguous_declarations() {
    assert!(decode("// const books = [];").is_err());
    assert!(decode("const a = [];\nconst b = [];").is_err());
    assert!(decode_named(BOOKS_JS, "events").is_err());
}

#[test]
fn truncated_file_reports_offset() {
    let text = "const books = [\n    { title: 'Hotel Lux'";
    match decode(text).unwrap_err() {
        CodecError::Malformed { offset, .. } => assert!(offset <= text.len()),
        other => panic!("unexpected error {:?}", other),
    }
}

// --- Round trips ---

#[test]
fn round_trip_preserves_quotes_nulls_and_order() {
    let value = json!([
        {
            "id": "it-s-here",
            "title": "It's \"here\" \\ now",
            "year": "2024",
            "reviewsLink": null,
            "tags": [],
            "meta": {}
        }
    ]);
    let text = BOOKS.encode(&value).unwrap();
    let decoded = BOOKS.decode(&text).unwrap();
    assert_eq!(decoded, value);

    let keys: Vec<&String> = decoded[0]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(keys, ["id", "title", "year", "reviewsLink", "tags", "meta"]);
}

#[test]
fn round_trip_keeps_floats_distinct_from_integers() {
    let value = json!({ "a": 1.0, "b": 2, "c": -0.0, "d": 0.25, "e": 1e21 });
    let text = BOOKS.encode(&value).unwrap();
    let decoded = BOOKS.decode(&text).unwrap();
    assert_eq!(decoded, value);
    assert!(decoded["a"].is_f64());
    assert!(decoded["b"].is_u64());
    assert!(decoded["c"].as_f64().unwrap().is_sign_negative());
}

#[test]
fn round_trip_empty_collections() {
    let template = SourceTemplate::new("/**\n * Books Data\n */", "books");
    for value in [json!([]), json!({})] {
        let text = encode(&value, &template).unwrap();
        assert_eq!(decode(&text).unwrap().value, value);
    }
}

#[test]
fn re_encoding_a_decoded_file_is_stable() {
    let value = READING
        .decode("const currentReading = { title: 'Dune', author: 'Frank Herbert', cover: '', note: null };")
        .unwrap();
    let first = READING.encode(&value).unwrap();
    let second = READING.encode(&READING.decode(&first).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn encoded_layout_matches_site_files() {
    let value: Value = json!([{ "title": "A", "year": 2020 }]);
    let text = BOOKS.encode(&value).unwrap();
    assert!(text.starts_with("/**\n * Books Data\n"));
    assert!(text.contains(
        "const books = [\n    {\n        \"title\": \"A\",\n        \"year\": 2020\n    }\n];\n"
    ));
    assert!(text.ends_with(
        "// Export for use in main site\nif (typeof module !== 'undefined' && module.exports) {\n    module.exports = books;\n}\n"
    ));
}
