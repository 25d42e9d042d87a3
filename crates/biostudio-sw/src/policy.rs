//! Request classification and routing strategies.
//!
//! `classify` is pure: the strategy for a request is decided once, before
//! any I/O, and never changes mid-request.

use http::Method;

use crate::config::WorkerConfig;
use crate::fetch::Request;

/// What kind of resource a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    /// Any method other than GET.
    NonRead,
    /// Administrative route; operators must always see live data.
    Admin,
    /// Own-origin static asset or allow-listed CDN resource.
    StaticAsset,
    /// Request whose Accept header includes HTML.
    HtmlPage,
    /// Background API calls and everything else.
    Other,
}

/// How the worker resolves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Not intercepted; the request proceeds untouched.
    PassThrough,
    /// Serve from the store when possible, network on miss.
    CacheFirst,
    /// Network, then cached copy, then the offline placeholder page.
    NetworkFirstWithFallback,
    /// Network, then cached copy, then nothing.
    NetworkFirstSilent,
}

impl ResourceClass {
    /// Classify a request. Rules are evaluated in order; first match wins.
    pub fn of(config: &WorkerConfig, request: &Request) -> Self {
        if request.method != Method::GET {
            return Self::NonRead;
        }

        if request.url.as_str().contains(&config.admin_marker) {
            return Self::Admin;
        }

        let own_origin = request.url.origin() == config.scope.origin();
        let static_path = own_origin && request.url.path().starts_with(&config.static_prefix);
        let cdn_host = request
            .url
            .host_str()
            .is_some_and(|host| config.cdn_hosts.iter().any(|cdn| cdn == host));
        if static_path || cdn_host {
            return Self::StaticAsset;
        }

        if request.wants_html() {
            return Self::HtmlPage;
        }

        Self::Other
    }

    /// The strategy this class maps to.
    pub fn strategy(self) -> Strategy {
        match self {
            Self::NonRead | Self::Admin => Strategy::PassThrough,
            Self::StaticAsset => Strategy::CacheFirst,
            Self::HtmlPage => Strategy::NetworkFirstWithFallback,
            Self::Other => Strategy::NetworkFirstSilent,
        }
    }
}

/// Decide the routing strategy for a request.
pub fn classify(config: &WorkerConfig, request: &Request) -> Strategy {
    ResourceClass::of(config, request).strategy()
}
