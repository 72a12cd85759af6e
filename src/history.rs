//! Searchable list of past battles.

use log::{debug, error};
use tokio::sync::watch;

use crate::battle::Battle;
use crate::client::BattleApi;
use crate::state::{Generation, Observable};

pub const LIST_FAILED_MESSAGE: &str = "Failed to load the data. Please check if the server is running!";

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct HistoryState {
    pub battles: Vec<Battle>,
    pub error_message: Option<String>,
}

/// Outcome of one refresh, as seen by the caller that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RefreshOutcome {
    Loaded(usize),
    Failed,
    /// A later refresh was issued before this one answered.
    Superseded,
}

pub struct HistoryBrowser<C> {
    api: C,
    state: Observable<HistoryState>,
    generation: Generation,
}

impl<C: BattleApi> HistoryBrowser<C> {
    pub fn new(api: C) -> Self {
        HistoryBrowser {
            api,
            state: Observable::default(),
            generation: Generation::new(),
        }
    }

    /// Creates a browser and runs the initial unfiltered refresh.
    pub async fn mount(api: C) -> Self {
        let browser = HistoryBrowser::new(api);
        browser.refresh().await;
        browser
    }

    /// Mounts the browser, then filters by `query` when it is non-empty.
    pub async fn mount_with_query(api: C, query: &str) -> Self {
        let browser = HistoryBrowser::mount(api).await;
        if !query.is_empty() {
            browser.refresh_list(query).await;
        }
        browser
    }

    pub fn state(&self) -> HistoryState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<HistoryState> {
        self.state.subscribe()
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        self.refresh_list("").await
    }

    /// Re-fetches the list. An empty query means no filter. Only the most
    /// recently issued refresh may write its result.
    pub async fn refresh_list(&self, query: &str) -> RefreshOutcome {
        let token = self.generation.advance();
        self.state.update(|s| s.error_message = None);

        let filter = Some(query).filter(|q| !q.is_empty());
        let result = self.api.list_battles(filter).await;
        if !self.generation.is_current(token) {
            debug!("history refresh {} for {:?} superseded", token, query);
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(battles) => {
                let count = battles.len();
                debug!("history refresh {} for {:?}: {} battles", token, query, count);
                self.state.update(|s| s.battles = battles);
                RefreshOutcome::Loaded(count)
            }
            Err(e) => {
                error!("history refresh {} for {:?} failed: {}", token, query, e);
                self.state.set(HistoryState {
                    battles: Vec::new(),
                    error_message: Some(LIST_FAILED_MESSAGE.to_string()),
                });
                RefreshOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::battle::{Creature, WinnerSide};
    use crate::client::ClientError;

    fn finished(id: u64, first: &str, second: &str) -> Battle {
        Battle::pending(
            id,
            Creature::named(first),
            Creature::named(second),
            "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        )
        .finish(WinnerSide::First, "2024-01-01T00:00:01Z".parse().expect("timestamp"))
    }

    #[derive(Default)]
    struct Scripted {
        lists: RefCell<VecDeque<Result<Vec<Battle>, ClientError>>>,
        queries: RefCell<Vec<Option<String>>>,
    }

    impl BattleApi for Scripted {
        async fn create_random_battle(&self) -> Result<Battle, ClientError> {
            Err(ClientError::Other("unused".to_string()))
        }

        async fn simulate_battle(&self, _id: u64) -> Result<Battle, ClientError> {
            Err(ClientError::Other("unused".to_string()))
        }

        async fn list_battles(&self, query: Option<&str>) -> Result<Vec<Battle>, ClientError> {
            self.queries.borrow_mut().push(query.map(str::to_string));
            self.lists
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[tokio::test]
    async fn empty_query_is_sent_as_no_filter() {
        let api = Scripted::default();
        let browser = HistoryBrowser::new(&api);
        browser.refresh().await;
        browser.refresh_list("").await;
        browser.refresh_list("pika").await;
        assert_eq!(*api.queries.borrow(), vec![None, None, Some("pika".to_string())]);
    }

    #[tokio::test]
    async fn mount_loads_unfiltered_list_verbatim() {
        let api = Scripted::default();
        let listed = vec![finished(3, "Onix", "Abra"), finished(1, "Pikachu", "Eevee")];
        api.lists.borrow_mut().push_back(Ok(listed.clone()));

        let browser = HistoryBrowser::mount(&api).await;
        let state = browser.state();
        assert_eq!(state.battles, listed);
        assert_eq!(state.error_message, None);
    }

    #[tokio::test]
    async fn mount_with_query_loads_unfiltered_then_filters() {
        let api = Scripted::default();
        api.lists
            .borrow_mut()
            .push_back(Ok(vec![finished(2, "Onix", "Abra"), finished(1, "Pikachu", "Eevee")]));
        api.lists.borrow_mut().push_back(Ok(vec![finished(1, "Pikachu", "Eevee")]));

        let browser = HistoryBrowser::mount_with_query(&api, "pika").await;
        assert_eq!(*api.queries.borrow(), vec![None, Some("pika".to_string())]);
        assert_eq!(browser.state().battles, vec![finished(1, "Pikachu", "Eevee")]);
    }

    #[tokio::test]
    async fn mount_with_empty_query_fetches_once() {
        let api = Scripted::default();
        HistoryBrowser::mount_with_query(&api, "").await;
        assert_eq!(*api.queries.borrow(), vec![None]);
    }

    #[tokio::test]
    async fn failure_clears_previous_results() {
        let api = Scripted::default();
        api.lists.borrow_mut().push_back(Ok(vec![finished(1, "Pikachu", "Eevee")]));
        api.lists
            .borrow_mut()
            .push_back(Err(ClientError::Status { status: 503, body: String::new() }));

        let browser = HistoryBrowser::new(&api);
        assert_eq!(browser.refresh().await, RefreshOutcome::Loaded(1));
        assert_eq!(browser.refresh_list("x").await, RefreshOutcome::Failed);

        let state = browser.state();
        assert!(state.battles.is_empty());
        assert_eq!(state.error_message.as_deref(), Some(LIST_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn success_after_failure_clears_error() {
        let api = Scripted::default();
        api.lists.borrow_mut().push_back(Err(ClientError::Other("down".to_string())));
        api.lists.borrow_mut().push_back(Ok(vec![finished(2, "Mew", "Ditto")]));

        let browser = HistoryBrowser::new(&api);
        browser.refresh().await;
        browser.refresh().await;
        let state = browser.state();
        assert_eq!(state.error_message, None);
        assert_eq!(state.battles.len(), 1);
    }
}
