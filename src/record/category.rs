/// How a collection is ordered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// As stored in the file.
    FileOrder,
    /// Newest year first; non-numeric years count as 0.
    YearDescending { field: &'static str },
    /// Upcoming dates ascending, then past dates descending.
    DateSplit { field: &'static str },
    /// ISO sort date descending, undated last.
    SortDateDescending { field: &'static str },
}

/// Static description of one content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Plural name, e.g. `books`.
    pub name: &'static str,
    /// Singular label used in commit messages, e.g. `book`.
    pub label: &'static str,
    /// Path of the file in the repository.
    pub path: &'static str,
    /// Name of the declared binding.
    pub binding: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub export_note: &'static str,
    pub required: &'static [&'static str],
    pub ordering: SortPolicy,
    /// Commit message for whole-file saves.
    pub save_message: &'static str,
}

const MAIN_SITE: &str = "Export for use in main site";

pub const BOOKS: Category = Category {
    name: "books",
    label: "book",
    path: "books.js",
    binding: "books",
    title: "Books Data",
    summary: "Stores published books for the BOOKS section",
    export_note: MAIN_SITE,
    required: &["title", "publisher", "year", "cover", "description"],
    ordering: SortPolicy::YearDescending { field: "year" },
    save_message: "Update books",
};

pub const EVENTS: Category = Category {
    name: "events",
    label: "event",
    path: "events.js",
    binding: "events",
    title: "Events Data",
    summary: "Stores upcoming and past events for the PUBLIC HISTORY section",
    export_note: MAIN_SITE,
    required: &["title", "date", "time", "timezone", "location", "description"],
    ordering: SortPolicy::DateSplit { field: "date" },
    save_message: "Update events",
};

pub const WRITING: Category = Category {
    name: "writing",
    label: "writing",
    path: "writing.js",
    binding: "writing",
    title: "Selected Writing Data",
    summary: "Articles, essays, and other writing for popular audiences",
    export_note: MAIN_SITE,
    required: &["title", "outlet", "date", "link"],
    ordering: SortPolicy::FileOrder,
    save_message: "Update writing",
};

pub const PODCASTS: Category = Category {
    name: "podcasts",
    label: "podcast",
    path: "podcasts.js",
    binding: "podcasts",
    title: "Podcasts Data",
    summary: "Recent podcast appearances and interviews",
    export_note: MAIN_SITE,
    required: &["title", "podcastName", "year", "embedUrl"],
    ordering: SortPolicy::YearDescending { field: "year" },
    save_message: "Update podcasts",
};

pub const DOCUMENTARIES: Category = Category {
    name: "documentaries",
    label: "documentary",
    path: "documentaries.js",
    binding: "documentaries",
    title: "Documentaries Data",
    summary: "Films and documentaries featuring historical consultation or participation",
    export_note: MAIN_SITE,
    required: &["title", "productionCompany", "year", "role"],
    ordering: SortPolicy::YearDescending { field: "year" },
    save_message: "Update documentaries",
};

pub const TIMELINE: Category = Category {
    name: "timeline",
    label: "timeline entry",
    path: "projects.js",
    binding: "timelineData",
    title: "Career Timeline Data",
    summary: "Projects and achievements for the career timeline",
    export_note: "Export for use in timeline.js",
    required: &["title", "type", "date", "sortDate", "scope", "description"],
    ordering: SortPolicy::SortDateDescending { field: "sortDate" },
    save_message: "Update timeline",
};

pub const READING: Category = Category {
    name: "reading",
    label: "current reading",
    path: "reading.js",
    binding: "currentReading",
    title: "Current Reading Data",
    summary: "Stores information about what is currently being read",
    export_note: MAIN_SITE,
    required: &["title", "author"],
    ordering: SortPolicy::FileOrder,
    save_message: "Update current reading",
};

pub const PLAYING: Category = Category {
    name: "playing",
    label: "current playing",
    path: "playing.js",
    binding: "currentPlaying",
    title: "Current Playing Data",
    summary: "Stores information about what is currently being played",
    export_note: MAIN_SITE,
    required: &["title", "developer"],
    ordering: SortPolicy::FileOrder,
    save_message: "Update current playing",
};

pub const LANDING: Category = Category {
    name: "landing",
    label: "landing images",
    path: "landing-config.js",
    binding: "landingConfig",
    title: "Landing Images Configuration",
    summary: "Controls rotating images for various sections of the site",
    export_note: "Export for use in carousel script",
    required: &[],
    ordering: SortPolicy::FileOrder,
    save_message: "Update landing images configuration",
};
