//! Async search controller.
//!
//! [`SearchController::spawn`] starts one task that owns a [`SearchState`] and is
//! the only code that ever mutates it. Callers hold a cloneable
//! [`SearchHandle`], send it input events, and observe [`SearchSnapshot`]s.
//!
//! The task multiplexes four sources:
//!
//! - commands from handles, drained in batches (one batch = one event cycle);
//! - the single debounce timer, replaced on every query change;
//! - completed fetch tasks, whose responses are checked against the latest
//!   request sequence before being applied;
//! - the optional popular-searches refresh interval.

use std::collections::HashMap;
use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{Id, JoinError, JoinSet};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, error, info};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::provider::SearchProvider;
use crate::state::{DebounceTicket, FetchPlan, SearchState};
use crate::types::*;

/// Debounce delay used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    pub debounce: Duration,
    /// Re-fetch popular searches on this period. `None` = once at start-up.
    pub popular_refresh: Option<Duration>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self { debounce: DEFAULT_DEBOUNCE, popular_refresh: None }
    }
}

impl From<&SearchConfig> for ControllerOptions {
    fn from(config: &SearchConfig) -> Self {
        Self { debounce: config.debounce(), popular_refresh: config.popular_refresh() }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Command {
    SetQuery(String),
    Move(Direction),
    Confirm,
    Pick(String),
    Dismiss,
    Blur,
    Focus,
    Clear,
    RefreshPopular,
    Close,
}

enum Completion {
    Search { seq: u64, result: Result<Vec<Article>, SearchError> },
    Popular { seq: u64, result: Result<Vec<PopularSearch>, SearchError> },
}

#[derive(Debug, Clone, Copy)]
enum FetchKind {
    Search(u64),
    Popular(u64),
}

struct PendingDebounce {
    ticket: DebounceTicket,
    sleep: Pin<Box<Sleep>>,
}

// ---------------------------------------------------------------------------
// Controller task
// ---------------------------------------------------------------------------

pub struct SearchController<P> {
    provider: Arc<P>,
    options: ControllerOptions,
    state: SearchState,
    snapshots: watch::Sender<SearchSnapshot>,
    debounce: Option<PendingDebounce>,
    tasks: JoinSet<Completion>,
    /// Which fetch each running task performs, so a panicked task can still
    /// be settled.
    task_kinds: HashMap<Id, FetchKind>,
}

impl<P: SearchProvider> SearchController<P> {
    /// Start the controller on the current tokio runtime.
    pub fn spawn(provider: P, options: ControllerOptions) -> SearchHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = SearchState::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());

        let controller = Self {
            provider: Arc::new(provider),
            options,
            state,
            snapshots: snapshot_tx,
            debounce: None,
            tasks: JoinSet::new(),
            task_kinds: HashMap::new(),
        };
        tokio::spawn(controller.run(command_rx));

        SearchHandle { commands: command_tx, snapshots: snapshot_rx }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(debounce = ?self.options.debounce, "Search controller started");

        let mut refresh = self.options.popular_refresh.map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        self.fetch_popular();
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(first) = command else { break };
                    let mut cycle = vec![first];
                    while let Ok(next) = commands.try_recv() {
                        cycle.push(next);
                    }
                    if !self.handle_cycle(cycle) {
                        break;
                    }
                }
                ticket = expire(&mut self.debounce) => {
                    self.debounce = None;
                    let plan = self.state.debounce_expired(ticket);
                    self.execute(plan);
                }
                Some(joined) = self.tasks.join_next_with_id() => self.complete(joined),
                _ = tick(&mut refresh) => self.fetch_popular(),
            }
            self.publish();
        }

        // In-flight fetches can never be applied once the loop is gone.
        self.tasks.abort_all();
        info!("Search controller stopped");
    }

    /// Apply one event cycle. Returns false when the controller should stop.
    ///
    /// A blur hides the list only after the rest of the cycle ran, and not at
    /// all if the cycle contained a pointer pick.
    fn handle_cycle(&mut self, cycle: Vec<Command>) -> bool {
        let mut picked = false;
        let mut blurred = false;

        for command in cycle {
            match command {
                Command::SetQuery(text) => {
                    let ticket = self.state.set_query(text);
                    self.schedule(ticket);
                }
                Command::Move(direction) => self.state.move_selection(direction),
                Command::Confirm => {
                    if let Some(ticket) = self.state.confirm_selection() {
                        self.schedule(ticket);
                    }
                }
                Command::Pick(title) => {
                    picked = true;
                    let ticket = self.state.select_by_pointer(title);
                    self.schedule(ticket);
                }
                Command::Dismiss => self.state.dismiss(),
                Command::Blur => blurred = true,
                Command::Focus => {
                    blurred = false;
                    self.state.focus();
                }
                Command::Clear => {
                    self.debounce = None;
                    self.state.clear();
                }
                Command::RefreshPopular => self.fetch_popular(),
                Command::Close => return false,
            }
        }

        if blurred && !picked {
            self.state.dismiss();
        }
        true
    }

    /// Replace the pending timer; the previous one never fires.
    fn schedule(&mut self, ticket: DebounceTicket) {
        self.debounce = Some(PendingDebounce {
            ticket,
            sleep: Box::pin(tokio::time::sleep(self.options.debounce)),
        });
    }

    fn execute(&mut self, plan: FetchPlan) {
        let FetchPlan::Issue(ticket) = plan else { return };
        debug!(seq = ticket.seq, query = ticket.query.as_str(), "Issuing search");
        let provider = Arc::clone(&self.provider);
        let handle = self.tasks.spawn(async move {
            let result = provider.search(&ticket.query).await;
            Completion::Search { seq: ticket.seq, result }
        });
        self.task_kinds.insert(handle.id(), FetchKind::Search(ticket.seq));
    }

    fn fetch_popular(&mut self) {
        let seq = self.state.begin_popular();
        let provider = Arc::clone(&self.provider);
        let handle = self.tasks.spawn(async move {
            let result = provider.popular().await;
            Completion::Popular { seq, result }
        });
        self.task_kinds.insert(handle.id(), FetchKind::Popular(seq));
    }

    fn complete(&mut self, joined: Result<(Id, Completion), JoinError>) {
        match joined {
            Ok((id, completion)) => {
                self.task_kinds.remove(&id);
                match completion {
                    Completion::Search { seq, result } => {
                        self.state.apply_response(seq, result);
                    }
                    Completion::Popular { seq, result } => {
                        self.state.apply_popular(seq, result);
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Fetch task failed");
                let failure = || SearchError::Provider("search provider crashed".to_string());
                match self.task_kinds.remove(&e.id()) {
                    Some(FetchKind::Search(seq)) => {
                        self.state.apply_response(seq, Err(failure()));
                    }
                    Some(FetchKind::Popular(seq)) => {
                        self.state.apply_popular(seq, Err(failure()));
                    }
                    None => {}
                }
            }
        }
    }

    fn publish(&self) {
        let next = self.state.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

async fn expire(pending_debounce: &mut Option<PendingDebounce>) -> DebounceTicket {
    match pending_debounce {
        Some(p) => {
            p.sleep.as_mut().await;
            p.ticket
        }
        None => pending().await,
    }
}

async fn tick(refresh: &mut Option<Interval>) {
    match refresh {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Input side and observation side of a running controller.
///
/// Every input method returns [`SearchError::Closed`] once the controller has
/// stopped. Dropping the last handle stops the controller.
#[derive(Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SearchSnapshot>,
}

impl SearchHandle {
    fn send(&self, command: Command) -> Result<(), SearchError> {
        self.commands.send(command).map_err(|_| SearchError::Closed)
    }

    /// New raw input; restarts the debounce and shows the list.
    pub fn set_query(&self, text: impl Into<String>) -> Result<(), SearchError> {
        self.send(Command::SetQuery(text.into()))
    }

    pub fn move_selection(&self, direction: Direction) -> Result<(), SearchError> {
        self.send(Command::Move(direction))
    }

    /// Accept the entry under the cursor. Nothing happens without a selection.
    pub fn confirm_selection(&self) -> Result<(), SearchError> {
        self.send(Command::Confirm)
    }

    /// Accept an entry picked by pointer. Wins over a blur in the same cycle.
    pub fn select_by_pointer(&self, title: impl Into<String>) -> Result<(), SearchError> {
        self.send(Command::Pick(title.into()))
    }

    /// Hide the list (escape key). The query is kept.
    pub fn dismiss(&self) -> Result<(), SearchError> {
        self.send(Command::Dismiss)
    }

    /// The input lost focus. Hides the list at the end of the event cycle.
    pub fn blur(&self) -> Result<(), SearchError> {
        self.send(Command::Blur)
    }

    pub fn focus(&self) -> Result<(), SearchError> {
        self.send(Command::Focus)
    }

    pub fn clear(&self) -> Result<(), SearchError> {
        self.send(Command::Clear)
    }

    pub fn refresh_popular(&self) -> Result<(), SearchError> {
        self.send(Command::RefreshPopular)
    }

    /// Stop the controller. The pending timer is cancelled and in-flight
    /// responses are ignored.
    pub fn close(&self) -> Result<(), SearchError> {
        self.send(Command::Close)
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the next snapshot this handle has not seen yet.
    pub async fn changed(&mut self) -> Result<SearchSnapshot, SearchError> {
        self.snapshots.changed().await.map_err(|_| SearchError::Closed)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `predicate`, checking the current one first.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SearchSnapshot) -> bool,
    ) -> Result<SearchSnapshot, SearchError> {
        let snapshot = self.snapshots.wait_for(predicate).await.map_err(|_| SearchError::Closed)?;
        Ok(snapshot.clone())
    }
}
