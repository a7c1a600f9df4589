//! Synchronous surface for host bindings
//!
//! Hosts call plain blocking functions. A process-wide adapter is built from
//! settings on first use unless the host installs its own beforehand, and all
//! calls run on a private tokio runtime.

use once_cell::sync::{Lazy, OnceCell};
use std::future::Future;
use std::sync::Arc;

use gu_xlit_config::{load_settings, Settings};
use gu_xlit_core::{Error, Result};

use crate::adapter::Transliterator;
use crate::loader::SettingsLoader;

static ADAPTER: OnceCell<Arc<Transliterator>> = OnceCell::new();

static RUNTIME: Lazy<std::result::Result<tokio::runtime::Runtime, String>> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("gu-xlit-bridge")
        .enable_all()
        .build()
        .map_err(|e| e.to_string())
});

/// Install the adapter used by the free functions
///
/// Fails if an adapter was already installed or built by an earlier call.
pub fn install(adapter: Arc<Transliterator>) -> Result<()> {
    ADAPTER
        .set(adapter)
        .map_err(|_| Error::Configuration("transliteration adapter already initialized".to_string()))
}

fn adapter() -> &'static Arc<Transliterator> {
    ADAPTER.get_or_init(|| {
        let env = std::env::var("GU_XLIT_ENV").ok();
        let settings = match load_settings(env.as_deref()) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            },
        };
        let language = settings.engine.language;
        Arc::new(Transliterator::new(
            Arc::new(SettingsLoader::new(settings.engine)),
            language,
        ))
    })
}

/// Drive `fut` to completion on the bridge runtime
///
/// Calls made from inside another tokio runtime are moved to a scoped thread,
/// since blocking a runtime worker on a second runtime panics.
fn block_on<F>(fut: F) -> Option<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    let runtime = match RUNTIME.as_ref() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Bridge runtime unavailable");
            return None;
        },
    };

    if tokio::runtime::Handle::try_current().is_ok() {
        std::thread::scope(|scope| scope.spawn(|| runtime.block_on(fut)).join().ok())
    } else {
        Some(runtime.block_on(fut))
    }
}

/// Transliterate one sentence; returns the trimmed input on any failure
pub fn transliterate(sentence: &str) -> String {
    block_on(adapter().transliterate(sentence)).unwrap_or_else(|| sentence.trim().to_string())
}

/// Same contract as [`transliterate`]
pub fn batch_transliterate(text: &str) -> String {
    block_on(adapter().batch_transliterate(text)).unwrap_or_else(|| text.trim().to_string())
}
