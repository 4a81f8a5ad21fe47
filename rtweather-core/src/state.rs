use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    client::WeatherClient,
    model::{RequestState, WeatherQuery},
};

/// Holds the state of the most recent search and lets front ends watch it.
///
/// The cell starts empty. Each [`search`](Self::search) replaces it with
/// [`RequestState::Loading`] and later with the outcome. Searches are not
/// cancelled, so when they overlap the last one to finish wins.
#[derive(Debug, Clone)]
pub struct WeatherViewModel {
    api_key: String,
    client: Arc<dyn WeatherClient>,
    state: Arc<watch::Sender<Option<RequestState>>>,
}

impl WeatherViewModel {
    pub fn new(client: Arc<dyn WeatherClient>, api_key: impl Into<String>) -> Self {
        let (state, _) = watch::channel(None);
        Self { api_key: api_key.into(), client, state: Arc::new(state) }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<RequestState>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Option<RequestState> {
        self.state.borrow().clone()
    }

    /// Must be called from within a Tokio runtime.
    pub fn search(&self, city: impl Into<String>) -> JoinHandle<()> {
        let query = WeatherQuery::new(self.api_key.clone(), city);
        debug!(city = %query.city, "search started");

        self.state.send_replace(Some(RequestState::Loading));

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let next = match client.fetch(&query).await {
                Ok(record) => {
                    info!(city = %query.city, location = %record.location.name, "weather loaded");
                    RequestState::Success(record)
                }
                Err(err) => {
                    info!(city = %query.city, error = %err, "weather request failed");
                    RequestState::Error(err.message().to_string())
                }
            };
            state.send_replace(Some(next));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::WeatherApiClient,
        error::RequestFailed,
        model::{
            WeatherRecord,
            tests::{LONDON_JSON, london},
        },
    };
    use async_trait::async_trait;
    use std::{collections::HashMap, time::Duration};
    use tokio::sync::Notify;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    /// Answers per city; cities listed in `gated` wait for `release`.
    #[derive(Debug, Default)]
    struct FakeClient {
        answers: HashMap<String, Result<WeatherRecord, RequestFailed>>,
        gated: Vec<String>,
        release: Notify,
    }

    #[async_trait]
    impl WeatherClient for FakeClient {
        async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherRecord, RequestFailed> {
            if self.gated.contains(&query.city) {
                self.release.notified().await;
            }
            self.answers
                .get(&query.city)
                .cloned()
                .unwrap_or_else(|| Err(RequestFailed::new("unknown city")))
        }
    }

    fn named(name: &str) -> WeatherRecord {
        let mut record = london();
        record.location.name = name.to_string();
        record
    }

    #[test]
    fn starts_without_state() {
        let vm = WeatherViewModel::new(Arc::new(FakeClient::default()), "KEY");
        assert_eq!(vm.current(), None);
    }

    #[tokio::test]
    async fn search_goes_through_loading_to_success() {
        let mut fake = FakeClient::default();
        fake.answers.insert("London".into(), Ok(london()));
        fake.gated.push("London".into());
        let fake = Arc::new(fake);

        let vm = WeatherViewModel::new(fake.clone(), "KEY");
        let mut rx = vm.subscribe();

        let handle = vm.search("London");
        assert_eq!(vm.current(), Some(RequestState::Loading));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        fake.release.notify_one();
        rx.changed().await.unwrap();
        handle.await.unwrap();

        let state = rx.borrow().clone().expect("state set");
        assert_eq!(state.record().map(|r| r.location.name.as_str()), Some("London"));
    }

    #[tokio::test]
    async fn failure_becomes_error_state() {
        let mut fake = FakeClient::default();
        fake.answers.insert("".into(), Err(RequestFailed::new("Parameter q is missing.")));

        let vm = WeatherViewModel::new(Arc::new(fake), "KEY");
        vm.search("").await.unwrap();

        assert_eq!(vm.current(), Some(RequestState::Error("Parameter q is missing.".into())));
    }

    #[tokio::test]
    async fn new_search_restarts_at_loading() {
        let mut fake = FakeClient::default();
        fake.answers.insert("Paris".into(), Ok(named("Paris")));
        fake.answers.insert("Rome".into(), Ok(named("Rome")));
        fake.gated.push("Rome".into());
        let fake = Arc::new(fake);

        let vm = WeatherViewModel::new(fake.clone(), "KEY");
        vm.search("Paris").await.unwrap();
        assert!(vm.current().and_then(|s| s.record().cloned()).is_some());

        let handle = vm.search("Rome");
        assert_eq!(vm.current(), Some(RequestState::Loading));

        fake.release.notify_one();
        handle.await.unwrap();
        assert_eq!(vm.current().unwrap().record().unwrap().location.name, "Rome");
    }

    #[tokio::test]
    async fn overlapping_searches_settle_on_a_completed_result() {
        let mut fake = FakeClient::default();
        fake.answers.insert("Slow".into(), Ok(named("Slow")));
        fake.answers.insert("Fast".into(), Ok(named("Fast")));
        fake.gated.push("Slow".into());
        let fake = Arc::new(fake);

        let vm = WeatherViewModel::new(fake.clone(), "KEY");
        let slow = vm.search("Slow");
        let fast = vm.search("Fast");
        fast.await.unwrap();

        fake.release.notify_one();
        tokio::time::timeout(Duration::from_secs(5), slow)
            .await
            .expect("no deadlock")
            .unwrap();

        let state = vm.current().expect("state set");
        let name = state.record().expect("success").location.name.clone();
        assert!(name == "Slow" || name == "Fast", "{name}");
    }

    #[tokio::test]
    async fn unreachable_provider_error_hides_api_key() {
        let client = Arc::new(WeatherApiClient::with_base_url("http://127.0.0.1:1"));
        let vm = WeatherViewModel::new(client, "SECRET123");

        vm.search("London").await.unwrap();

        let state = vm.current().expect("state set");
        let message = state.error_message().expect("error state");
        assert!(!message.is_empty());
        assert!(!message.contains("SECRET123"), "{message}");
    }

    #[tokio::test]
    async fn works_against_http_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LONDON_JSON))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("q", ""))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":{"code":1003,"message":"Parameter q is missing."}}"#),
            )
            .mount(&server)
            .await;

        let client = Arc::new(WeatherApiClient::with_base_url(server.uri()));
        let vm = WeatherViewModel::new(client, "KEY");

        vm.search("London").await.unwrap();
        assert_eq!(vm.current().unwrap().record().unwrap().location.name, "London");

        vm.search("").await.unwrap();
        let state = vm.current().unwrap();
        let message = state.error_message().expect("error state");
        assert!(message.contains("Parameter q is missing."), "{message}");
    }
}
