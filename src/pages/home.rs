use leptos::prelude::*;
use log::{error, info};

use crate::components::trace_graph::cache::snapshot_key;
use crate::components::trace_graph::state::EditorConfig;
use crate::components::trace_graph::{
	GraphData, GraphInterchange, TraceGraphCanvas, Volume, VolumeBounds,
};

const NAMESPACE: &str = "breadcrumbs";
const AUTHOR: &str = "demo";

/// A question's starting graph as the annotation store hands it out: one seed synapse.
const SAMPLE_GRAPH: &str = r#"{
	"author": "admin",
	"nodes": [
		{"id": "seed", "coordinate": [2560, 2560, 32], "type": "initial", "namespace": "breadcrumbs"}
	],
	"links": [],
	"directed": true,
	"multigraph": false
}"#;

fn sample_volume() -> Volume {
	Volume {
		id: "sample-volume".into(),
		bounds: VolumeBounds::new([2304.0, 2304.0, 0.0], [2816.0, 2816.0, 64.0]),
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let interchange = GraphInterchange::new(sample_volume(), NAMESPACE, AUTHOR);
	let bounds = interchange.volume.bounds;

	let parent = match interchange.parse(SAMPLE_GRAPH) {
		Ok(graph) => graph,
		Err(e) => {
			error!("could not read sample graph: {e}");
			GraphData::default()
		}
	};
	let graph_data = Signal::derive(move || parent.clone());
	let config = EditorConfig {
		author: AUTHOR.into(),
		..EditorConfig::default()
	};

	// Posting to the annotation store happens elsewhere; show what would be sent.
	let on_submit = Callback::new(move |graph: GraphData| {
		match interchange.to_remote(&graph).to_json() {
			Ok(json) => info!("submit {} nodes: {json}", graph.nodes.len()),
			Err(e) => error!("could not encode graph: {e}"),
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<TraceGraphCanvas
					data=graph_data
					volume=bounds
					config=config
					storage_key=snapshot_key(NAMESPACE, "sample")
					on_submit=on_submit
				/>
				<div class="graph-overlay">
					<h1>"Breadcrumbs"</h1>
					<p class="subtitle">
						"Click to extend the trace. Right-click to select. Scroll for slices, ctrl+scroll to zoom. Backspace deletes a leaf, s saves, Enter submits."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
