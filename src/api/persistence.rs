use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};

use super::client::{MindMapApi, MindMapDraft};
use crate::components::mind_map::types::MindMap;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
	/// Another save for this client has not completed yet.
	InFlight,
	/// Auto-save never persists an empty graph.
	Empty,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SaveOutcome {
	Created(MindMap),
	Updated(MindMap),
	Skipped(SkipReason),
}

/// Clears the in-flight flag when the save future completes or is dropped.
struct InFlightGuard(Rc<Cell<bool>>);

impl InFlightGuard {
	fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
		if flag.replace(true) {
			None
		} else {
			Some(Self(flag.clone()))
		}
	}
}

impl Drop for InFlightGuard {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

/// Translates editor contents to and from the `mindmaps` collaborator and
/// remembers which persisted map is open.
///
/// Clones share the remembered id and the in-flight guard.
pub struct PersistenceClient<A> {
	api: Rc<A>,
	current_id: Rc<RefCell<Option<String>>>,
	/// Bumped by [`PersistenceClient::forget`]; a save started under an older
	/// generation does not record its id.
	generation: Rc<Cell<u64>>,
	in_flight: Rc<Cell<bool>>,
}

impl<A> Clone for PersistenceClient<A> {
	fn clone(&self) -> Self {
		Self {
			api: self.api.clone(),
			current_id: self.current_id.clone(),
			generation: self.generation.clone(),
			in_flight: self.in_flight.clone(),
		}
	}
}

impl<A: MindMapApi> PersistenceClient<A> {
	pub fn new(api: A) -> Self {
		Self {
			api: Rc::new(api),
			current_id: Rc::new(RefCell::new(None)),
			generation: Rc::new(Cell::new(0)),
			in_flight: Rc::new(Cell::new(false)),
		}
	}

	pub fn current_id(&self) -> Option<String> {
		self.current_id.borrow().clone()
	}

	pub fn is_saving(&self) -> bool {
		self.in_flight.get()
	}

	fn bump_generation(&self) -> u64 {
		let next = self.generation.get() + 1;
		self.generation.set(next);
		next
	}

	/// Detaches from the persisted map; the next save creates a new one.
	pub fn forget(&self) {
		self.current_id.replace(None);
		self.bump_generation();
	}

	fn remember(&self, generation: u64, id: &str) {
		if self.generation.get() == generation {
			self.current_id.replace(Some(id.to_string()));
		} else {
			debug!("ignoring id {} from a superseded map", id);
		}
	}

	/// Creates the map on first save and updates it afterwards. At most one
	/// save runs at a time; overlapping calls are skipped.
	pub async fn save(&self, draft: MindMapDraft) -> Result<SaveOutcome> {
		let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
			debug!("save skipped: another save is in flight");
			return Ok(SaveOutcome::Skipped(SkipReason::InFlight));
		};
		let generation = self.generation.get();
		match self.current_id() {
			Some(id) => {
				let saved = self.api.update(&id, &draft).await?;
				info!("updated mind map {}", saved.id);
				Ok(SaveOutcome::Updated(saved))
			}
			None => {
				let saved = self.api.create(&draft).await?;
				info!("created mind map {}", saved.id);
				self.remember(generation, &saved.id);
				Ok(SaveOutcome::Created(saved))
			}
		}
	}

	/// Timer-driven save: skips empty graphs, otherwise behaves like [`Self::save`].
	pub async fn autosave(&self, draft: MindMapDraft) -> Result<SaveOutcome> {
		if draft.nodes.is_empty() {
			return Ok(SaveOutcome::Skipped(SkipReason::Empty));
		}
		self.save(draft).await
	}

	/// Fetches a map and makes it the current one. Supersedes any save or
	/// load still in flight; returns `None` when this load was itself
	/// superseded before it completed.
	pub async fn load(&self, id: &str) -> Result<Option<MindMap>> {
		let generation = self.bump_generation();
		let map = self.api.get(id).await?;
		if self.generation.get() != generation {
			debug!("discarding superseded load of {}", map.id);
			return Ok(None);
		}
		self.remember(generation, &map.id);
		info!("loaded mind map {} ({} nodes)", map.id, map.nodes.len());
		Ok(Some(map))
	}

	pub async fn list(&self) -> Result<Vec<MindMap>> {
		self.api.list().await
	}

	pub async fn delete(&self, id: &str) -> Result<()> {
		self.api.delete(id).await?;
		if self.current_id().as_deref() == Some(id) {
			self.forget();
		}
		info!("deleted mind map {}", id);
		Ok(())
	}
}
