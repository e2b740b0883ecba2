//! Event dispatch: apply an update, resolve handlers, fan out
//!
//! One incoming notification flows through Receive -> Apply -> Resolve ->
//! Invoke -> Complete. The apply phase is synchronous and never suspends,
//! so same-topic updates applied by one dispatcher can never interleave;
//! handler invocation is the only suspension point and is a fan-out/fan-in
//! barrier, not fire-and-forget.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use arcstr::ArcStr;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::{
	mpsc::{channel, Receiver, Sender},
	oneshot,
};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use super::error::DispatchError;
use super::handler::{EventKind, HandlerError, TopicEvent};
use super::registry::{HandlerId, HandlerRegistry};
use super::subscription_index::SubscriptionIndex;
use crate::topic::{Topic, TopicSpecification};

/// Dispatcher performance and behavior settings
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
	/// Capacity of the dispatch loop command channel
	pub command_channel_capacity: usize,
	/// Size of the handler resolution cache (must be > 0)
	pub resolution_cache_size: usize,
}

impl Default for DispatcherSettings {
	fn default() -> Self {
		Self {
			command_channel_capacity: 100,
			resolution_cache_size: 100,
		}
	}
}

impl DispatcherSettings {
	fn resolution_cache_size(&self) -> NonZeroUsize {
		NonZeroUsize::new(self.resolution_cache_size)
			.unwrap_or(NonZeroUsize::MIN)
	}
}

/// One notification delivered by the transport layer.
#[derive(Debug, Clone)]
pub enum TopicNotification {
	/// A topic became available; creates local state for it
	Subscribed {
		/// The topic's slash-separated path
		path: ArcStr,
		/// Creation-time type and properties
		specification: TopicSpecification,
	},
	/// The topic's value changed
	Update {
		/// The topic's slash-separated path
		path: ArcStr,
		/// Raw update bytes: a full value or a delta instruction stream
		payload: Vec<u8>,
		/// True if `payload` is a delta against the current value
		is_delta: bool,
	},
	/// The topic was removed; drops local state for it
	Unsubscribed {
		/// The topic's slash-separated path
		path: ArcStr,
	},
}

impl TopicNotification {
	/// The path of the topic this notification concerns.
	pub fn path(&self) -> &ArcStr {
		match self {
			| TopicNotification::Subscribed { path, .. } => path,
			| TopicNotification::Update { path, .. } => path,
			| TopicNotification::Unsubscribed { path } => path,
		}
	}
}

/// Sequences update application and handler invocation per event.
///
/// `process` takes `&mut self`, so callers drive events strictly one at a
/// time and same-topic updates apply in arrival order. No timeout is
/// imposed on handlers: a handler that never completes blocks only its own
/// event's completion.
pub struct EventDispatcher {
	topics: HashMap<ArcStr, Topic>,
	index: SubscriptionIndex,
}

impl EventDispatcher {
	/// Creates a dispatcher resolving handlers against the given registry.
	pub fn new(
		registry: Arc<HandlerRegistry>,
		settings: &DispatcherSettings,
	) -> Self {
		Self {
			topics: HashMap::new(),
			index: SubscriptionIndex::new(
				registry,
				settings.resolution_cache_size(),
			),
		}
	}

	/// The current value of a known topic.
	pub fn topic_value(&self, path: &str) -> Option<Arc<[u8]>> {
		self.topics.get(path).and_then(Topic::value)
	}

	/// Returns true if the topic is currently known.
	pub fn contains_topic(&self, path: &str) -> bool {
		self.topics.contains_key(path)
	}

	/// Number of currently known topics.
	pub fn topic_count(&self) -> usize {
		self.topics.len()
	}

	/// Processes one notification to completion.
	///
	/// On an apply failure the event is aborted: the error is returned, no
	/// handler runs, and the topic's cached value is left at its pre-event
	/// state. Handler failures never surface here; they are confined to
	/// their own tasks and logged.
	pub async fn process(
		&mut self,
		notification: TopicNotification,
	) -> Result<(), DispatchError> {
		match notification {
			| TopicNotification::Subscribed {
				path,
				specification,
			} => {
				if self.topics.contains_key(&path) {
					// Path and type are immutable after creation
					debug!(topic = %path, "Duplicate subscription notification ignored");
					return Ok(());
				}
				let topic = Topic::new(path.clone(), specification);
				let event = self.build_event(&topic, EventKind::Subscribe);
				self.topics.insert(path, topic);
				self.fan_out(event).await;
				Ok(())
			}
			| TopicNotification::Update {
				path,
				payload,
				is_delta,
			} => {
				let topic = self
					.topics
					.get_mut(&path)
					.ok_or_else(|| DispatchError::unknown_topic(path.as_str()))?;
				let value = topic
					.apply_update(&payload, is_delta)
					.map_err(|source| {
						DispatchError::apply(path.as_str(), source)
					})?;
				let event = TopicEvent {
					kind: EventKind::Update,
					path: path.clone(),
					value: Some(value),
					topic_type: topic.topic_type(),
					properties: Arc::clone(topic.specification().properties()),
				};
				self.fan_out(event).await;
				Ok(())
			}
			| TopicNotification::Unsubscribed { path } => {
				let topic = self.topics.remove(&path).ok_or_else(|| {
					DispatchError::unknown_topic(path.as_str())
				})?;
				let event = self.build_event(&topic, EventKind::Unsubscribe);
				self.fan_out(event).await;
				Ok(())
			}
		}
	}

	fn build_event(&self, topic: &Topic, kind: EventKind) -> TopicEvent {
		TopicEvent {
			kind,
			path: topic.path().clone(),
			value: topic.value(),
			topic_type: topic.topic_type(),
			properties: Arc::clone(topic.specification().properties()),
		}
	}

	/// Starts every resolved handler on its own task and joins them all.
	async fn fan_out(&self, event: TopicEvent) {
		let resolved = self.index.resolve(&event.path, event.topic_type);
		if resolved.is_empty() {
			debug!(
				topic = %event.path,
				kind = %event.kind,
				"No handlers interested in event"
			);
			return;
		}

		type InvocationResult = (HandlerId, Result<(), HandlerError>);
		let mut running: FuturesUnordered<JoinHandle<InvocationResult>> =
			FuturesUnordered::new();
		for (id, handler) in &resolved.handlers {
			let handler = Arc::clone(handler);
			let event = event.clone();
			let id = *id;
			running.push(tokio::spawn(async move {
				(id, handler.handle(event).await)
			}));
		}

		while let Some(joined) = running.next().await {
			match joined {
				| Ok((_, Ok(()))) => {}
				| Ok((id, Err(err))) => {
					// Confined to this handler; siblings keep running
					error!(
						handler_id = ?id,
						topic = %event.path,
						kind = %event.kind,
						error = %err,
						"Handler invocation failed"
					);
				}
				| Err(join_err) => {
					error!(
						topic = %event.path,
						kind = %event.kind,
						error = ?join_err,
						"Handler task panicked or was cancelled"
					);
				}
			}
		}
	}
}

/// Command processed by the dispatch loop actor
#[derive(Debug)]
pub enum Command {
	/// Process one notification and ack the result
	Deliver(
		TopicNotification,
		oneshot::Sender<Result<(), DispatchError>>,
	),
}

/// Actor owning an [`EventDispatcher`] behind a command channel.
pub struct DispatchLoopActor {
	dispatcher: EventDispatcher,
	command_rx: Receiver<Command>,
	shutdown_rx: oneshot::Receiver<()>,
}

impl DispatchLoopActor {
	/// Spawns the dispatch loop on the current tokio runtime.
	pub fn spawn(
		registry: Arc<HandlerRegistry>,
		settings: DispatcherSettings,
	) -> (DispatchLoopController, DispatchLoopHandle) {
		let (command_tx, command_rx) =
			channel(settings.command_channel_capacity);
		let (shutdown_tx, shutdown_rx) = oneshot::channel();
		let actor = Self {
			dispatcher: EventDispatcher::new(registry, &settings),
			command_rx,
			shutdown_rx,
		};
		let join_handler = tokio::spawn(async move { actor.run().await });

		let controller = DispatchLoopController {
			shutdown_tx,
			join_handler,
		};
		let handle = DispatchLoopHandle { command_tx };
		(controller, handle)
	}

	async fn run(mut self) {
		loop {
			tokio::select! {
				_ = &mut self.shutdown_rx => {
					info!("DispatchLoopActor: Shutdown signal received");
					break;
				}
				cmd = self.command_rx.recv() => {
					if let Some(cmd) = cmd {
						self.handle_command(cmd).await;
					} else {
						info!("DispatchLoopActor: Command channel closed, exiting");
						break;
					}
				}
			}
		}
		info!("DispatchLoopActor: Exiting run loop");
	}

	async fn handle_command(&mut self, command: Command) {
		match command {
			| Command::Deliver(notification, response_tx) => {
				let path = notification.path().clone();
				let result = self.dispatcher.process(notification).await;
				if let Err(err) = &result {
					error!(
						topic = %path,
						error = %err,
						error_type = err.error_type(),
						"Event aborted"
					);
				}
				if response_tx.send(result).is_err() {
					warn!(
						topic = %path,
						"Could not send dispatch response (receiver dropped)"
					);
				}
			}
		}
	}
}

/// Shuts the dispatch loop down and joins it.
pub struct DispatchLoopController {
	shutdown_tx: oneshot::Sender<()>,
	join_handler: JoinHandle<()>,
}

impl DispatchLoopController {
	/// Signals shutdown and waits for the actor to exit.
	pub async fn shutdown(self) -> Result<(), JoinError> {
		let _ = self.shutdown_tx.send(()).inspect_err(|_| {
			warn!("DispatchLoopController: Shutdown signal already sent");
		});
		self.join_handler.await.inspect_err(|err| {
			warn!(
				error = ?err,
				"DispatchLoopController: Actor run failed"
			);
		})
	}
}

/// Cloneable sender used to deliver notifications to the dispatch loop.
#[derive(Clone)]
pub struct DispatchLoopHandle {
	command_tx: Sender<Command>,
}

impl DispatchLoopHandle {
	/// Delivers one notification and waits until the event is fully
	/// processed (all matched handlers finished).
	pub async fn deliver(
		&self,
		notification: TopicNotification,
	) -> Result<(), DispatchError> {
		let (tx, rx) = oneshot::channel();
		self.command_tx
			.send(Command::Deliver(notification, tx))
			.await
			.map_err(|_| DispatchError::ChannelClosed)?;
		rx.await.map_err(|_| DispatchError::ResponseLost)?
	}
}
