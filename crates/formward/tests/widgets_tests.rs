//! Integration tests for the widgets around forms: course search, the auth
//! stub, toasts, and config-driven storage.

use formward::config::{SearchConfig, StorageBackend, TimingConfig};
use formward::search::RECENT_SEARCHES_KEY;
use formward::*;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn course(id: &str, title: &str, category: &str, description: &str) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        level: None,
    }
}

#[fixture]
fn catalog() -> Vec<Course> {
    vec![
        course("surf-101", "Beginner Surf", "Water", "Foam boards and flat water"),
        course("surf-adv", "Advanced Surf Coaching", "Water", "Reef breaks"),
        course("yoga-am", "Morning Yoga", "Wellness", "Sunrise flow on the beach"),
        course("kayak", "Sea Kayaking", "Water", "Paddle the bay"),
    ]
}

fn ids(search: &CourseSearch) -> Vec<&str> {
    search.results().map(|c| c.id.as_str()).collect()
}

// ============================================================================
// Course search
// ============================================================================

#[rstest]
fn test_search_debounces_to_latest_input(catalog: Vec<Course>) {
    let storage = MemoryStorage::new();
    let mut search = CourseSearch::new(catalog, Arc::new(storage.clone()), &SearchConfig::default())
        .with_clock(Clock::new());

    search.input("su");
    search.advance(Duration::from_millis(100));
    assert_eq!(search.query(), "");
    assert!(search.is_pending());

    search.input("surf");
    search.advance(Duration::from_millis(299));
    assert_eq!(search.result_count(), 4);

    search.advance(Duration::from_millis(1));
    assert!(!search.is_pending());
    assert_eq!(search.query(), "surf");
    assert_eq!(ids(&search), vec!["surf-101", "surf-adv"]);
    assert_eq!(search.recent_searches().collect::<Vec<_>>(), vec!["surf"]);
}

#[rstest]
fn test_search_poll_with_shared_clock(catalog: Vec<Course>) {
    let clock = Clock::new();
    let mut search = CourseSearch::new(catalog, Arc::new(MemoryStorage::new()), &SearchConfig::default())
        .with_clock(clock.clone());

    search.input("beach");
    clock.advance(Duration::from_millis(300));
    search.poll();
    assert_eq!(ids(&search), vec!["yoga-am"]);
}

#[rstest]
#[case("WATER", 3)]
#[case("reef", 1)]
#[case("  kayak ", 1)]
#[case("snowboard", 0)]
fn test_search_matches_title_category_description(
    catalog: Vec<Course>,
    #[case] query: &str,
    #[case] expected: usize,
) {
    let mut search = CourseSearch::new(catalog, Arc::new(MemoryStorage::new()), &SearchConfig::default());
    search.search_now(query);
    assert_eq!(search.result_count(), expected);
}

#[rstest]
fn test_recent_searches_are_bounded_and_persisted(catalog: Vec<Course>) {
    let storage = MemoryStorage::new();
    let config = SearchConfig::default();
    let mut search = CourseSearch::new(catalog.clone(), Arc::new(storage.clone()), &config);

    for query in ["surf", "yoga", "kayak", "reef", "beach", "flow", "bay"] {
        search.search_now(query);
    }
    search.search_now("Yoga");
    search.search_now("");

    let expected = vec!["Yoga", "bay", "flow", "beach", "reef"];
    assert_eq!(search.recent_searches().collect::<Vec<_>>(), expected);

    let reopened = CourseSearch::new(catalog, Arc::new(storage.clone()), &config);
    assert_eq!(reopened.recent_searches().collect::<Vec<_>>(), expected);

    search.clear_recent();
    assert_eq!(search.recent_searches().count(), 0);
    assert!(storage.get_item(RECENT_SEARCHES_KEY).unwrap().is_none());
}

#[rstest]
fn test_recent_searches_dedupe_accented_queries(catalog: Vec<Course>) {
    let mut search = CourseSearch::new(catalog, Arc::new(MemoryStorage::new()), &SearchConfig::default());
    search.search_now("Crème");
    search.search_now("CRÈME");

    assert_eq!(search.recent_searches().collect::<Vec<_>>(), vec!["CRÈME"]);
}

#[test]
fn test_category_filter_folds_unicode_case() {
    let courses = vec![
        course("patisserie", "Pastry Basics", "Pâtisserie", ""),
        course("surf-101", "Beginner Surf", "Water", ""),
    ];
    let mut search = CourseSearch::new(courses, Arc::new(MemoryStorage::new()), &SearchConfig::default());

    search.set_category(Some("PÂTISSERIE".to_string()));
    assert_eq!(ids(&search), vec!["patisserie"]);
}

#[rstest]
fn test_render_results_highlights_query(catalog: Vec<Course>) {
    let mut search = CourseSearch::new(catalog, Arc::new(MemoryStorage::new()), &SearchConfig::default());
    search.search_now("yoga");

    assert_eq!(
        search.render_results().into_string(),
        r#"<ul class="course-results"><li class="course-result" data-course="yoga-am"><span class="course-title">Morning <mark>Yoga</mark></span><span class="course-category">Wellness</span></li></ul>"#
    );
}

// ============================================================================
// Auth stub
// ============================================================================

#[fixture]
fn auth() -> AuthStore {
    AuthStore::new(Arc::new(MemoryStorage::new()))
}

#[rstest]
fn test_register_login_logout(auth: AuthStore) {
    auth.register("Ada Lovelace", "Ada@Example.com", "Analytical1843").unwrap();
    assert!(!auth.is_logged_in());

    let session = auth.login("ada@example.com", "Analytical1843").unwrap();
    assert_eq!(session.name, "Ada Lovelace");
    assert_eq!(session.email, "ada@example.com");
    assert_eq!(auth.current_user(), Some(session));

    auth.logout().unwrap();
    assert!(auth.current_user().is_none());
}

#[rstest]
fn test_duplicate_email_rejected(auth: AuthStore) {
    auth.register("Ada", "ada@example.com", "Analytical1843").unwrap();
    let err = auth.register("Other Ada", " ADA@example.com ", "Different99x").unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

#[rstest]
fn test_wrong_password(auth: AuthStore) {
    auth.register("Ada", "ada@example.com", "Analytical1843").unwrap();
    let err = auth.login("ada@example.com", "analytical1843").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!auth.is_logged_in());
}

#[rstest]
#[case("", "ada@example.com", "Analytical1843")]
#[case("Ada", "not-an-email", "Analytical1843")]
#[case("Ada", "ada@example.com", "short")]
fn test_register_validation(
    auth: AuthStore,
    #[case] name: &str,
    #[case] email: &str,
    #[case] password: &str,
) {
    let err = auth.register(name, email, password).unwrap_err();
    assert!(matches!(
        err,
        AuthError::MissingName | AuthError::InvalidEmail | AuthError::WeakPassword(_)
    ));
    assert!(auth.login(email, password).is_err());
}

#[test]
fn test_corrupt_session_counts_as_logged_out() {
    let storage = MemoryStorage::new();
    storage.set_item("currentUser", "not json").unwrap();
    let auth = AuthStore::new(Arc::new(storage));
    assert!(!auth.is_logged_in());
}

// ============================================================================
// Toasts
// ============================================================================

#[test]
fn test_toasts_expire_with_configured_lifetime() {
    let clock = Clock::new();
    let timing = TimingConfig {
        toast_ms: 1000,
        ..TimingConfig::default()
    };
    let toasts = ToastQueue::from_config(clock.clone(), &timing);

    toasts.success("Saved");
    let sticky = toasts.show("Offline", ToastOptions::new(ToastKind::Warning).duration(Duration::ZERO));

    clock.advance(Duration::from_millis(999));
    assert_eq!(toasts.active().len(), 2);

    clock.advance(Duration::from_millis(1));
    let active = toasts.active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].message, "Offline");
    assert_eq!(toasts.prune(), 1);

    assert!(toasts.remove(sticky));
    assert!(!toasts.remove(sticky));
    assert!(toasts.active().is_empty());
}

#[test]
fn test_toast_stack_drops_oldest() {
    let toasts = ToastQueue::new(Clock::new()).with_max_visible(2);
    toasts.info("one");
    toasts.info("two");
    toasts.error("three");

    let messages: Vec<String> = toasts.active().into_iter().map(|t| t.message).collect();
    assert_eq!(messages, vec!["two".to_string(), "three".to_string()]);
}

// ============================================================================
// Config-driven storage
// ============================================================================

#[test]
fn test_filesystem_backend_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("formward.toml");
    let data_dir = dir.path().join("data");
    std::fs::write(
        &config_path,
        format!(
            "[timing]\nreset_delay_ms = 500\n\n[storage]\ndefault_form_id = \"enquiry\"\n\n[storage.backend]\ntype = \"filesystem\"\npath = '{}'\n",
            data_dir.display()
        ),
    )
    .unwrap();

    let config = FormwardConfig::load(&config_path).unwrap();
    assert_eq!(
        config.storage.backend,
        StorageBackend::Filesystem {
            path: data_dir.clone()
        }
    );

    let form = || {
        FormElement::anonymous()
            .field(Field::text("name").required())
            .field(Field::email("email"))
    };

    let mut first = FormController::new(form(), FormOptions::from_config(&config), config.open_storage().unwrap());
    assert_eq!(first.form_id(), "enquiry");
    first.handle_input("name", "Grace");
    first.handle_input("email", "grace@example.com");
    assert_eq!(first.submit(), SubmitOutcome::Submitted { persisted: true });

    first.advance(Duration::from_millis(500));
    assert_eq!(first.form().value_of("name"), "");

    let storage = config.open_storage().unwrap();
    let second = FormController::new(form(), FormOptions::from_config(&config), storage.clone());
    assert_eq!(second.form().value_of("name"), "Grace");
    assert_eq!(second.form().value_of("email"), "grace@example.com");
    assert_eq!(FormController::submissions(storage.as_ref(), "enquiry").len(), 1);
}

#[test]
fn test_missing_config_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = FormwardConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, FormwardConfig::default());
    assert_eq!(config.storage.backend, StorageBackend::Memory);
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("formward.toml");
    std::fs::write(&path, "[timing]\nreset_delay_ms = \"soon\"\n").unwrap();
    assert!(FormwardConfig::load(&path).is_err());
}
