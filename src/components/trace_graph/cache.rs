//! Offline session snapshots: the in-progress graph, saved under a per-question key so an
//! annotator can reload the page without losing work.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::store::{ImportReport, TraceGraph};
use super::types::{GraphData, NodeId};

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
	#[error("storage unavailable: {0}")]
	Storage(String),

	#[error("corrupt snapshot: {0}")]
	Json(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// String key/value storage the snapshots are written to.
pub trait SnapshotStorage {
	fn get_item(&self, key: &str) -> CacheResult<Option<String>>;
	fn set_item(&mut self, key: &str, value: &str) -> CacheResult<()>;
	fn remove_item(&mut self, key: &str) -> CacheResult<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
	items: HashMap<String, String>,
}

impl SnapshotStorage for MemoryStorage {
	fn get_item(&self, key: &str) -> CacheResult<Option<String>> {
		Ok(self.items.get(key).cloned())
	}

	fn set_item(&mut self, key: &str, value: &str) -> CacheResult<()> {
		self.items.insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove_item(&mut self, key: &str) -> CacheResult<()> {
		self.items.remove(key);
		Ok(())
	}
}

/// `window.localStorage`.
pub struct BrowserStorage(web_sys::Storage);

impl BrowserStorage {
	pub fn local() -> CacheResult<Self> {
		web_sys::window()
			.ok_or_else(|| CacheError::Storage("no window".into()))?
			.local_storage()
			.map_err(|e| CacheError::Storage(format!("{e:?}")))?
			.map(Self)
			.ok_or_else(|| CacheError::Storage("localStorage disabled".into()))
	}
}

impl SnapshotStorage for BrowserStorage {
	fn get_item(&self, key: &str) -> CacheResult<Option<String>> {
		self.0
			.get_item(key)
			.map_err(|e| CacheError::Storage(format!("{e:?}")))
	}

	fn set_item(&mut self, key: &str, value: &str) -> CacheResult<()> {
		self.0
			.set_item(key, value)
			.map_err(|e| CacheError::Storage(format!("{e:?}")))
	}

	fn remove_item(&mut self, key: &str) -> CacheResult<()> {
		self.0
			.remove_item(key)
			.map_err(|e| CacheError::Storage(format!("{e:?}")))
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
	pub graph: GraphData,
	pub active_node_id: Option<NodeId>,
}

/// e.g. `breadcrumbsStorage-<question id>`.
pub fn snapshot_key(tool: &str, question_id: &str) -> String {
	format!("{tool}Storage-{question_id}")
}

pub fn save_snapshot(
	storage: &mut impl SnapshotStorage,
	key: &str,
	graph: &TraceGraph,
) -> CacheResult<()> {
	let snapshot = SessionSnapshot {
		graph: graph.export_graph(),
		active_node_id: graph.active().cloned(),
	};
	storage.set_item(key, &serde_json::to_string(&snapshot)?)?;
	debug!("saved {} nodes under {key}", snapshot.graph.nodes.len());
	Ok(())
}

pub fn load_snapshot(storage: &impl SnapshotStorage, key: &str) -> CacheResult<Option<SessionSnapshot>> {
	match storage.get_item(key)? {
		Some(json) => Ok(Some(serde_json::from_str(&json)?)),
		None => Ok(None),
	}
}

/// Drop the snapshot once the graph has been submitted.
pub fn clear_snapshot(storage: &mut impl SnapshotStorage, key: &str) -> CacheResult<()> {
	storage.remove_item(key)
}

/// Hand the finished graph to `submit`, then drop the snapshot so the next load starts from
/// a fresh parent graph.
pub fn submit_session(
	storage: &mut impl SnapshotStorage,
	key: &str,
	graph: &TraceGraph,
	submit: impl FnOnce(GraphData),
) -> CacheResult<()> {
	submit(graph.export_graph());
	clear_snapshot(storage, key)?;
	debug!("submitted and cleared {key}");
	Ok(())
}

/// Resume a cached session if there is a readable one, else start from the parent graph.
pub fn restore_or_import(
	graph: &mut TraceGraph,
	storage: &impl SnapshotStorage,
	key: &str,
	parent: GraphData,
	parent_active: Option<&NodeId>,
) -> ImportReport {
	match load_snapshot(storage, key) {
		Ok(Some(snapshot)) => {
			debug!("resuming cached session {key}");
			graph.import_graph(snapshot.graph, snapshot.active_node_id.as_ref())
		}
		Ok(None) => graph.import_graph(parent, parent_active),
		Err(e) => {
			warn!("ignoring unreadable snapshot {key}: {e}");
			graph.import_graph(parent, parent_active)
		}
	}
}
