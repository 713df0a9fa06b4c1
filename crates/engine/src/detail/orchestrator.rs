use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use atlas_types::{AtlasError, CountryEntity, PhotoRecord, SummaryRecord, WeatherSnapshot};
use atlas_util::normalize_subject_key;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::node::{NodeState, NodeStatus, QueryNode, TransitionError};
use crate::cache::{QueryClient, QueryResult};

const TRANSITION_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Entity,
    Weather,
    Summary,
    Photos,
}

/// One node status change for the subject identified by `subject_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEvent {
    pub subject_key: String,
    pub node: NodeKind,
    pub status: NodeStatus,
}

/// Point-in-time view of the detail graph.
#[derive(Debug, Clone, Default)]
pub struct DetailSnapshot {
    pub subject_key: String,
    pub entity: NodeState<CountryEntity>,
    pub weather: NodeState<WeatherSnapshot>,
    pub summary: NodeState<SummaryRecord>,
    pub photos: NodeState<Vec<PhotoRecord>>,
}

impl DetailSnapshot {
    pub fn status(&self, node: NodeKind) -> NodeStatus {
        match node {
            NodeKind::Entity => self.entity.status(),
            NodeKind::Weather => self.weather.status(),
            NodeKind::Summary => self.summary.status(),
            NodeKind::Photos => self.photos.status(),
        }
    }

    /// Whether no node is waiting on a request.
    pub fn is_settled(&self) -> bool {
        [NodeKind::Entity, NodeKind::Weather, NodeKind::Summary, NodeKind::Photos]
            .into_iter()
            .all(|node| self.status(node) != NodeStatus::Loading)
    }
}

#[derive(Debug, Default)]
struct DetailGraph {
    subject_key: String,
    entity: QueryNode<CountryEntity>,
    weather: QueryNode<WeatherSnapshot>,
    summary: QueryNode<SummaryRecord>,
    photos: QueryNode<Vec<PhotoRecord>>,
}

impl DetailGraph {
    fn reset(&mut self, subject_key: String) {
        self.subject_key = subject_key;
        self.entity.reset();
        self.weather.reset();
        self.summary.reset();
        self.photos.reset();
    }

    fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            subject_key: self.subject_key.clone(),
            entity: self.entity.state().clone(),
            weather: self.weather.state().clone(),
            summary: self.summary.state().clone(),
            photos: self.photos.state().clone(),
        }
    }
}

type NodeSelector<T> = fn(&mut DetailGraph) -> &mut QueryNode<T>;

/// Drives the country detail graph: the entity query is the root, and
/// weather, summary and photos run only after it succeeds.
///
/// Results arriving for a subject that is no longer current are dropped.
pub struct DetailOrchestrator {
    client: Arc<QueryClient>,
    photo_credential: Option<String>,
    graph: Mutex<DetailGraph>,
    snapshots: watch::Sender<DetailSnapshot>,
    transitions: broadcast::Sender<DetailEvent>,
}

impl std::fmt::Debug for DetailOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailOrchestrator")
            .field("subject_key", &self.lock().subject_key)
            .field("photos_enabled", &self.photo_credential.is_some())
            .finish_non_exhaustive()
    }
}

impl DetailOrchestrator {
    pub fn new(client: Arc<QueryClient>, photo_credential: Option<String>) -> Self {
        let photo_credential = photo_credential.filter(|key| !key.trim().is_empty());
        let (snapshots, _) = watch::channel(DetailSnapshot::default());
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Self {
            client,
            photo_credential,
            graph: Mutex::new(DetailGraph::default()),
            snapshots,
            transitions,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn transitions(&self) -> broadcast::Receiver<DetailEvent> {
        self.transitions.subscribe()
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        self.lock().snapshot()
    }

    /// Load the detail graph for `subject` and return the snapshot once every
    /// node it started has settled, or once a newer subject took over.
    pub async fn load(&self, subject: &str) -> DetailSnapshot {
        let key = normalize_subject_key(subject);
        let name = subject.split_whitespace().collect::<Vec<_>>().join(" ");
        {
            let mut graph = self.lock();
            graph.reset(key.clone());
            if key.is_empty() {
                debug!("empty subject; detail graph left inactive");
                return self.publish(&graph, &[]);
            }
            log_rejected(NodeKind::Entity, graph.entity.start(true));
            self.publish(&graph, &[NodeKind::Entity]);
        }
        info!(subject = %key, "loading country detail");

        let outcome = self.client.country(&name).await;
        let entity = outcome.as_ref().ok().map(Arc::clone);
        if !self.apply(&key, NodeKind::Entity, |graph| &mut graph.entity, outcome) {
            return self.snapshot();
        }
        let Some(entity) = entity else {
            return self.snapshot();
        };

        let coordinates = entity.weather_coordinates();
        let photo_credential = self.photo_credential.as_deref();
        {
            let mut graph = self.lock();
            if graph.subject_key != key {
                return graph.snapshot();
            }
            let ready = graph.entity.state().is_success();
            match coordinates {
                Some(_) => log_rejected(NodeKind::Weather, graph.weather.start(ready)),
                None => {
                    debug!(subject = %key, "no coordinates; weather not requested");
                    let error = AtlasError::missing_coordinates(entity.common_name());
                    log_rejected(NodeKind::Weather, graph.weather.fail_precondition(ready, error));
                }
            }
            log_rejected(NodeKind::Summary, graph.summary.start(ready));
            let mut changed = vec![NodeKind::Weather, NodeKind::Summary];
            if photo_credential.is_some() {
                log_rejected(NodeKind::Photos, graph.photos.start(ready));
                changed.push(NodeKind::Photos);
            }
            self.publish(&graph, &changed);
        }

        let weather = async {
            if let Some(coordinates) = coordinates {
                let outcome = self.client.weather(coordinates).await;
                self.apply(&key, NodeKind::Weather, |graph| &mut graph.weather, outcome);
            }
        };
        let summary = async {
            let outcome = self.client.summary(entity.common_name()).await;
            self.apply(&key, NodeKind::Summary, |graph| &mut graph.summary, outcome);
        };
        let photos = async {
            if let Some(credential) = photo_credential {
                let outcome = self.client.photos(&entity, Some(credential)).await;
                self.apply(&key, NodeKind::Photos, |graph| &mut graph.photos, outcome);
            }
        };
        tokio::join!(weather, summary, photos);

        self.snapshot()
    }

    /// Settle `node` with `outcome` if `key` is still the current subject.
    /// Returns whether the outcome was applied.
    fn apply<T>(&self, key: &str, node: NodeKind, select: NodeSelector<T>, outcome: QueryResult<T>) -> bool {
        let mut graph = self.lock();
        if graph.subject_key != key {
            debug!(stale = %key, current = %graph.subject_key, ?node, "discarding result for a previous subject");
            return false;
        }
        if let Err(error) = &outcome {
            warn!(subject = %key, ?node, error = %error, "detail query failed");
        }
        let applied = select(&mut *graph).settle(outcome);
        log_rejected(node, applied);
        if applied.is_ok() {
            self.publish(&graph, &[node]);
        }
        applied.is_ok()
    }

    fn publish(&self, graph: &DetailGraph, changed: &[NodeKind]) -> DetailSnapshot {
        let snapshot = graph.snapshot();
        for node in changed {
            // Nobody listening is fine.
            let _ = self.transitions.send(DetailEvent {
                subject_key: snapshot.subject_key.clone(),
                node: *node,
                status: snapshot.status(*node),
            });
        }
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    fn lock(&self) -> MutexGuard<'_, DetailGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_rejected(node: NodeKind, result: Result<(), TransitionError>) {
    if let Err(error) = result {
        debug!(?node, error = %error, "node transition rejected");
    }
}
