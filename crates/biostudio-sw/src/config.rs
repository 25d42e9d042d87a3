//! Worker configuration.
//!
//! Everything the worker needs to route and cache requests is fixed at
//! startup: the cache version tag, the precache manifest, and the path
//! rules. Bumping `cache_version` is the only supported way to invalidate
//! previously stored entries.

use serde::{Deserialize, Serialize};
use url::Url;

/// Service worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Origin the worker controls.
    pub scope: Url,

    /// Version tag naming the current cache store.
    pub cache_version: String,

    /// Resources fetched and stored at install time. Entries may be local
    /// paths (resolved against `scope`) or absolute third-party URLs.
    pub precache: Vec<String>,

    /// Placeholder page served when a navigation fails with no cached copy.
    pub offline_path: String,

    /// Own-origin path prefix identifying static assets.
    pub static_prefix: String,

    /// Third-party content-delivery hosts treated as static assets.
    pub cdn_hosts: Vec<String>,

    /// Path marker for administrative routes that must always see live data.
    pub admin_marker: String,

    /// Notification defaults.
    pub notifications: NotificationDefaults,
}

/// Defaults applied when a push payload omits a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDefaults {
    /// Product name, used as the notification title when absent.
    pub title: String,

    /// Generic body when the payload carries none.
    pub body: String,

    /// Notification icon path.
    pub icon: String,

    /// Badge icon path.
    pub badge: String,

    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,

    /// Navigation target when the payload carries no URL.
    pub url: String,
}

impl WorkerConfig {
    /// Create a configuration for a given scope with the standard manifest
    /// and routing rules. The scope is the only deployment-specific field,
    /// so there is no scope-less constructor.
    pub fn for_scope(scope: Url) -> Self {
        Self {
            scope,
            cache_version: "biostudio-v1".to_string(),
            precache: vec![
                "/".to_string(),
                "/offline".to_string(),
                "/static/css/landing.css".to_string(),
                "/static/js/gamification.js".to_string(),
                "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css"
                    .to_string(),
                "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/js/bootstrap.bundle.min.js"
                    .to_string(),
                "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css"
                    .to_string(),
            ],
            offline_path: "/offline".to_string(),
            static_prefix: "/static/".to_string(),
            cdn_hosts: vec![
                "cdn.jsdelivr.net".to_string(),
                "cdnjs.cloudflare.com".to_string(),
            ],
            admin_marker: "/admin/".to_string(),
            notifications: NotificationDefaults::default(),
        }
    }

    /// Resolve a precache entry or navigation target against the scope.
    pub fn resolve(&self, path: &str) -> Option<Url> {
        self.scope.join(path).ok()
    }
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "Biohacking Studio".to_string(),
            body: "Voce tem uma notificacao!".to_string(),
            icon: "/static/icons/icon-192x192.png".to_string(),
            badge: "/static/icons/icon-72x72.png".to_string(),
            vibrate: vec![100, 50, 100],
            url: "/student/dashboard".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkerConfig {
        WorkerConfig::for_scope(Url::parse("http://localhost:8000/").unwrap())
    }

    #[test]
    fn test_standard_manifest_includes_offline_page() {
        let config = config();
        assert!(config.precache.iter().any(|p| p == &config.offline_path));
    }

    #[test]
    fn test_resolve_local_path() {
        let url = config().resolve("/offline").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/offline");
    }

    #[test]
    fn test_resolve_absolute_url_keeps_host() {
        let url = config()
            .resolve("https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css")
            .unwrap();
        assert_eq!(url.host_str(), Some("cdn.jsdelivr.net"));
    }

    #[test]
    fn test_for_scope_keeps_standard_rules() {
        let scope = Url::parse("https://studio.example/").unwrap();
        let config = WorkerConfig::for_scope(scope.clone());
        assert_eq!(config.scope, scope);
        assert_eq!(config.cache_version, "biostudio-v1");
        assert_eq!(config.admin_marker, "/admin/");
    }
}
