//! Registration flow walkthrough.
//!
//! Registers an email, enters the guarded verification page, then clears
//! the pending registration from a second context and watches the guard
//! redirect.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=guardpost=debug cargo run --example auth_flow
//! ```

use guardpost::auth::{auth_routes, RegisterForm, REGISTER_EMAIL_KEY, REGISTER_PATH};
use guardpost::{
    FileStore, GuardpostConfig, GuardpostError, KeyValueStore, RouteGuard, StorageAccessor,
    ThemeController,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), GuardpostError> {
    let config = GuardpostConfig {
        namespace: "guardpost-demo",
        ..GuardpostConfig::default()
    };
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config)?);
    let router = auth_routes();

    let mut themes = ThemeController::new(store.clone(), false);
    println!("Theme: {}", themes.theme());
    println!("Theme after toggle: {}", themes.toggle()?);

    let before = router.resolve("/register/verification", &store)?;
    println!("Before registering: {:?} at {}", before.view, before.path);

    let mut register = StorageAccessor::new(store.clone(), [REGISTER_EMAIL_KEY]);
    let next = RegisterForm::new("demo@example.com").submit(&mut register)?;

    let after = router.resolve(next, &store)?;
    println!("After registering: {:?} at {}", after.view, after.path);

    let mut verification =
        RouteGuard::new("verification page", [REGISTER_EMAIL_KEY], REGISTER_PATH)
            .mount(store.clone());
    println!("Mounted guard: {:?}", verification.render());

    // A second context discards the pending registration.
    let mut other = StorageAccessor::new(store.clone(), [REGISTER_EMAIL_KEY]);
    other.set(REGISTER_EMAIL_KEY, None);

    println!("After removal elsewhere: {:?}", verification.render());

    // Untracked writes are ignored with a warning.
    other.set("not-tracked", Some("ignored"));

    Ok(())
}
