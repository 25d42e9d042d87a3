//! Controlled pages (Clients API surface the worker needs).

use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use url::Url;

/// An open page.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client ID.
    pub id: String,

    /// Page URL.
    pub url: Url,

    /// Whether focused.
    pub focused: bool,

    /// Whether this worker controls the page.
    pub controlled: bool,
}

fn next_client_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("client-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Open pages visible to the worker.
#[derive(Debug, Default)]
pub struct Clients {
    clients: HashMap<String, Client>,
}

impl Clients {
    /// Create a new clients manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a client by ID.
    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// All open window clients.
    pub fn match_all(&self) -> Vec<&Client> {
        self.clients.values().collect()
    }

    /// Register an open page.
    pub fn add(&mut self, url: Url) -> String {
        let id = next_client_id();
        self.clients.insert(
            id.clone(),
            Client {
                id: id.clone(),
                url,
                focused: false,
                controlled: false,
            },
        );
        id
    }

    /// Remove a closed page.
    pub fn remove(&mut self, id: &str) -> Option<Client> {
        self.clients.remove(id)
    }

    /// Focus a client. Returns false if the client is gone.
    pub fn focus(&mut self, id: &str) -> bool {
        match self.clients.get_mut(id) {
            Some(client) => {
                client.focused = true;
                true
            }
            None => false,
        }
    }

    /// Open a new page at the given URL.
    pub fn open_window(&mut self, url: Url) -> Client {
        let id = next_client_id();
        let client = Client {
            id: id.clone(),
            url,
            focused: true,
            controlled: true,
        };
        self.clients.insert(id, client.clone());
        client
    }

    /// Take control of every open page immediately.
    pub fn claim(&mut self) {
        for client in self.clients.values_mut() {
            client.controlled = true;
        }
    }

    /// Number of open pages.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no pages are open.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut clients = Clients::new();
        let id = clients.add(Url::parse("https://studio.example/totem").unwrap());

        let client = clients.get(&id).unwrap();
        assert_eq!(client.url.path(), "/totem");
        assert!(!client.controlled);
    }

    #[test]
    fn test_remove_closed_page() {
        let mut clients = Clients::new();
        let id = clients.add(Url::parse("https://studio.example/totem").unwrap());

        let removed = clients.remove(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(clients.get(&id).is_none());
        assert!(clients.remove(&id).is_none());
        assert!(clients.is_empty());
    }

    #[test]
    fn test_focus() {
        let mut clients = Clients::new();
        let id = clients.add(Url::parse("https://studio.example/").unwrap());

        assert!(clients.focus(&id));
        assert!(clients.get(&id).unwrap().focused);
        assert!(!clients.focus("client-missing"));
    }

    #[test]
    fn test_open_window_is_focused_and_controlled() {
        let mut clients = Clients::new();
        let client = clients.open_window(Url::parse("https://studio.example/student/dashboard").unwrap());

        assert!(client.focused);
        assert!(client.controlled);
        assert_eq!(clients.len(), 1);
    }

    #[test]
    fn test_claim_controls_all() {
        let mut clients = Clients::new();
        clients.add(Url::parse("https://studio.example/").unwrap());
        clients.add(Url::parse("https://studio.example/totem").unwrap());

        clients.claim();
        assert!(clients.match_all().iter().all(|c| c.controlled));
    }
}
