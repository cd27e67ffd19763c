use crate::coerce::CoercionPolicy;
use crate::config::Config;
use crate::derive::{compute_need, GraphData};
use crate::dims::Dimensions;
use crate::error::Result;
use crate::gateway::{check_state, ModelSnapshot, Transport, Verdict};
use crate::layout::{layout, LayoutParams, Viewport};
use crate::matrix::{CellRef, Matrix, MatrixStore, ResizePolicy};
use crate::scenario::{example_scenario, Scenario};
use crate::scene::{render, Scene};
use crate::status::CheckStatus;
use crate::Quantity;
use log::{debug, error, info, warn};

/// A check that has been started but not finished. `snapshot` is the request body; it
/// was copied out of the store when the check began.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckTicket {
    pub token: u64,
    pub snapshot: ModelSnapshot,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CheckApplied {
    Applied,
    /// A newer check was started after this one; the result was dropped.
    Stale,
}

/// Owns the model and keeps the derived views in step with it.
///
/// Edits only touch the store. Need, edges, layout and scene are rebuilt from scratch
/// by `draw_graph` (or by a check result that carries a graph) and never patched.
pub struct Editor {
    store: MatrixStore,
    coercion: CoercionPolicy,
    resize: ResizePolicy,
    viewport: Viewport,
    params: LayoutParams,
    scene: Option<Scene>,
    status: CheckStatus,

    next_token: u64,
    // token and shape of the newest check still waiting for a result
    pending: Option<(u64, Dimensions)>,
}

impl Editor {
    pub fn new(config: &Config) -> Self {
        Self {
            store: MatrixStore::new(),
            coercion: config.coercion,
            resize: config.resize,
            viewport: config.viewport,
            params: config.layout.clone(),
            scene: None,
            status: CheckStatus::default(),
            next_token: 1,
            pending: None,
        }
    }

    pub fn store(&self) -> &MatrixStore {
        &self.store
    }

    pub fn dims(&self) -> Option<Dimensions> {
        self.store.dims()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn status(&self) -> &CheckStatus {
        &self.status
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Takes effect on the next draw.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Commits new raw P and R inputs. Returns false, changing nothing, while either
    /// input is missing or not a positive count.
    pub fn set_dimensions(&mut self, processes: &str, resources: &str) -> bool {
        match Dimensions::parse(processes, resources) {
            Some(dims) => {
                self.resize(dims);
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, dims: Dimensions) {
        self.store.rebuild(dims, self.resize);
    }

    pub fn cell(&self, cell: CellRef) -> Option<Quantity> {
        self.store.get(cell)
    }

    pub fn set_cell(&mut self, cell: CellRef, value: Quantity) -> Result<()> {
        self.store.set(cell, value)
    }

    /// Coerces `raw` and stores it. Returns the value actually stored.
    pub fn set_cell_raw(&mut self, cell: CellRef, raw: &str) -> Result<Quantity> {
        let value = self.coercion.coerce(raw)?;
        self.store.set(cell, value)?;
        Ok(value)
    }

    pub fn need(&self) -> Matrix {
        compute_need(self.store.alloc(), self.store.max())
    }

    /// Re-derives Need and the edges from the current cells and replaces the scene.
    /// Does nothing while there are no dimensions.
    pub fn draw_graph(&mut self) -> Option<&Scene> {
        let dims = match self.store.dims() {
            Some(dims) => dims,
            None => {
                debug!("draw_graph: no dimensions yet");
                return None;
            }
        };
        let data = GraphData::from_model(self.store.alloc(), self.store.max());
        Some(self.draw_data(dims, &data))
    }

    fn draw_data(&mut self, dims: Dimensions, data: &GraphData) -> &Scene {
        let edges = data.edges();
        let layout = layout(dims, self.viewport, &self.params);
        let scene = render(&layout, &edges);
        debug!(
            "drew {}: {} nodes, {} edges",
            dims,
            scene.nodes.len(),
            scene.edges.len()
        );
        self.scene.insert(scene)
    }

    /// Replaces the whole model. Every cell goes through the coercion policy, as if it
    /// had been typed in; under `Strict` a negative cell rejects the whole scenario and
    /// the store is unchanged. The scene is left alone until the next draw.
    pub fn load_scenario(&mut self, mut scenario: Scenario) -> Result<()> {
        let policy = self.coercion;
        let cells = scenario
            .alloc
            .cells_mut()
            .iter_mut()
            .chain(scenario.max.cells_mut().iter_mut())
            .chain(scenario.avail.iter_mut());
        for cell in cells {
            *cell = policy.coerce_value(*cell)?;
        }
        self.store
            .load(scenario.dims, scenario.alloc, scenario.max, scenario.avail)
    }

    /// Loads the built-in 3×3 example and draws it.
    pub fn load_example(&mut self) -> Option<&Scene> {
        let ex = example_scenario();
        if let Err(e) = self.load_scenario(ex) {
            // the example is well-formed, so this is a bug
            error!("failed to load example: {}", e);
            return None;
        }
        info!("Loaded sample matrices.");
        self.draw_graph()
    }

    /// Starts a check: snapshots the store and marks both indicators pending. Returns
    /// `None` while there are no dimensions.
    pub fn begin_check(&mut self) -> Option<CheckTicket> {
        let snapshot = match ModelSnapshot::from_store(&self.store) {
            Some(snapshot) => snapshot,
            None => {
                warn!("Error: P and R must be positive integers.");
                return None;
            }
        };
        let dims = self.store.dims()?;
        let token = self.next_token;
        self.next_token += 1;
        if let Some((old, _)) = self.pending.replace((token, dims)) {
            debug!("check {} superseded by check {}", old, token);
        }
        self.status = CheckStatus::pending();
        Some(CheckTicket { token, snapshot })
    }

    /// Applies the result of the check identified by `token`, unless a newer check has
    /// been started since. A verdict with a graph redraws from the backend's matrices,
    /// shaped to the dimensions the request was sent with; a verdict without one keeps
    /// the current scene. Failures put both indicators into the error state and leave
    /// the scene alone.
    pub fn finish_check(&mut self, token: u64, outcome: Result<Verdict>) -> CheckApplied {
        let dims = match self.pending {
            Some((pending, dims)) if pending == token => dims,
            _ => {
                debug!("dropping result of stale check {}", token);
                return CheckApplied::Stale;
            }
        };
        self.pending = None;

        match outcome {
            Ok(verdict) => {
                info!(
                    "Banker: system is {}.",
                    if verdict.safe { "SAFE" } else { "UNSAFE" }
                );
                if verdict.deadlock {
                    info!("Deadlock detected from RAG edges.");
                } else {
                    info!("No deadlock detected in RAG.");
                }
                self.status = verdict.status();
                if let Some(graph) = &verdict.graph {
                    let data = graph.to_graph_data(dims);
                    self.draw_data(dims, &data);
                }
            }
            Err(e) => {
                if e.is_transport() {
                    error!("Failed to contact backend: {}", e);
                } else {
                    error!("Error: {}", e);
                }
                self.status = CheckStatus::error(e.to_string());
            }
        }
        CheckApplied::Applied
    }

    /// Runs a whole check synchronously over `transport`.
    pub fn check(&mut self, transport: &dyn Transport) -> Option<CheckApplied> {
        let ticket = self.begin_check()?;
        let outcome = check_state(transport, &ticket.snapshot);
        Some(self.finish_check(ticket.token, outcome))
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::EdgeKind;
    use crate::error::Error;
    use crate::gateway::GraphPayload;
    use crate::status::{DeadlockStatus, SafetyStatus};
    use crate::testing::*;

    fn alloc(process: usize, resource: usize) -> CellRef {
        CellRef::Allocation { process, resource }
    }

    #[test]
    fn incomplete_dimensions_are_a_no_op() {
        init_test();
        let mut ed = Editor::default();
        assert!(!ed.set_dimensions("", "3"));
        assert!(!ed.set_dimensions("3", "0"));
        assert_eq!(ed.dims(), None);
        assert!(ed.draw_graph().is_none());

        assert!(ed.set_dimensions("2", "2"));
        ed.set_cell(alloc(1, 1), 4).unwrap();
        assert!(!ed.set_dimensions("x", "2"));
        assert_eq!(ed.dims(), Dimensions::new(2, 2));
        assert_eq!(ed.cell(alloc(1, 1)), Some(4));
    }

    #[test]
    fn large_dimensions_build() {
        init_test();
        let mut ed = Editor::default();
        assert!(ed.set_dimensions("300", "2"));
        assert_eq!(ed.dims(), Dimensions::new(300, 2));
        assert_eq!(ed.store().alloc().num_cells(), 600);
        assert_eq!(ed.store().avail().len(), 2);

        let scene = ed.draw_graph().unwrap();
        assert_eq!(scene.nodes.len(), 302);
    }

    #[test]
    fn raw_cells_are_coerced() {
        let mut ed = Editor::default();
        ed.set_dimensions("1", "2");
        assert_eq!(ed.set_cell_raw(alloc(0, 0), "7").unwrap(), 7);
        assert_eq!(ed.set_cell_raw(alloc(0, 1), "seven").unwrap(), 0);
        assert_eq!(ed.cell(alloc(0, 0)), Some(7));
        assert!(matches!(
            ed.set_cell_raw(alloc(1, 0), "1"),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn strict_cells_reject_and_keep_old_value() {
        let config = Config {
            coercion: CoercionPolicy::Strict,
            ..Config::default()
        };
        let mut ed = Editor::new(&config);
        ed.set_dimensions("1", "1");
        ed.set_cell_raw(alloc(0, 0), "3").unwrap();
        assert!(matches!(
            ed.set_cell_raw(alloc(0, 0), "three"),
            Err(Error::InvalidCell { .. })
        ));
        assert_eq!(ed.cell(alloc(0, 0)), Some(3));
    }

    fn scenario_with_negatives() -> Scenario {
        let mut sc = example_scenario();
        sc.alloc[(0, 1)] = -2;
        sc.avail[2] = -1;
        sc
    }

    #[test]
    fn scenario_cells_are_coerced() {
        init_test();
        let mut ed = Editor::default();
        ed.load_scenario(scenario_with_negatives()).unwrap();
        assert_eq!(ed.cell(alloc(0, 1)), Some(0));
        assert_eq!(ed.cell(CellRef::Available { resource: 2 }), Some(0));
        assert_eq!(ed.cell(CellRef::Maximum { process: 0, resource: 0 }), Some(7));
    }

    #[test]
    fn strict_rejects_negative_scenario_cells() {
        let config = Config {
            coercion: CoercionPolicy::Strict,
            ..Config::default()
        };
        let mut ed = Editor::new(&config);
        ed.set_dimensions("1", "1");
        assert!(matches!(
            ed.load_scenario(scenario_with_negatives()),
            Err(Error::InvalidCell { .. })
        ));
        assert_eq!(ed.dims(), Dimensions::new(1, 1));
        ed.load_scenario(example_scenario()).unwrap();
        assert_eq!(ed.dims(), Dimensions::new(3, 3));
    }

    #[test]
    fn cell_edits_do_not_redraw() {
        let mut ed = Editor::default();
        let before = ed.load_example().cloned().unwrap();
        ed.set_cell(alloc(0, 0), 5).unwrap();
        assert_eq!(ed.scene(), Some(&before));
        let after = ed.draw_graph().unwrap();
        assert_ne!(after, &before);
        assert!(after
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::Allocation && e.process == 0 && e.resource == 0));
    }

    #[test]
    fn example_need() {
        let mut ed = Editor::default();
        ed.load_example();
        assert_eq!(
            ed.need().to_rows(),
            vec![vec![7, 4, 3], vec![1, 2, 2], vec![6, 0, 0]]
        );
    }

    #[test]
    fn check_without_dimensions_does_nothing() {
        init_test();
        let mut ed = Editor::default();
        assert!(ed.begin_check().is_none());
        assert_eq!(ed.status(), &CheckStatus::default());
    }

    #[test]
    fn snapshot_is_taken_at_begin() {
        let mut ed = Editor::default();
        ed.load_example();
        let ticket = ed.begin_check().unwrap();
        ed.set_cell(alloc(0, 0), 99).unwrap();
        assert_eq!(ticket.snapshot.alloc[0][0], 0);
        assert_eq!(ed.status(), &CheckStatus::pending());
    }

    #[test]
    fn latest_check_wins() {
        init_test();
        let mut ed = Editor::default();
        ed.load_example();
        let first = ed.begin_check().unwrap();
        let second = ed.begin_check().unwrap();
        assert!(second.token > first.token);

        let unsafe_verdict = Verdict {
            safe: false,
            safe_sequence: vec![],
            deadlock: true,
            graph: None,
        };
        let safe_verdict = Verdict {
            safe: true,
            safe_sequence: vec![1, 0, 2],
            deadlock: false,
            graph: None,
        };

        assert_eq!(
            ed.finish_check(second.token, Ok(safe_verdict)),
            CheckApplied::Applied
        );
        assert_eq!(
            ed.finish_check(first.token, Ok(unsafe_verdict.clone())),
            CheckApplied::Stale
        );
        assert_eq!(ed.status().safety, SafetyStatus::Safe(vec![1, 0, 2]));
        assert_eq!(ed.status().deadlock, DeadlockStatus::Clear);

        // a result is applied at most once
        assert_eq!(
            ed.finish_check(second.token, Ok(unsafe_verdict)),
            CheckApplied::Stale
        );
    }

    #[test]
    fn backend_graph_replaces_local_edges() {
        let mut ed = Editor::default();
        ed.load_example();
        let ticket = ed.begin_check().unwrap();
        let verdict = Verdict {
            safe: false,
            safe_sequence: vec![],
            deadlock: true,
            graph: Some(GraphPayload {
                alloc: vec![vec![1, 0, 0]],
                need: vec![vec![0, 0, 0], vec![0, 0, 3]],
            }),
        };
        ed.finish_check(ticket.token, Ok(verdict));
        let scene = ed.scene().unwrap();
        assert_eq!(scene.nodes.len(), 6);
        assert_eq!(scene.edges.len(), 2);
        assert_eq!(scene.count_edges(EdgeKind::Allocation), 1);
        assert_eq!(scene.count_edges(EdgeKind::Request), 1);
    }

    #[test]
    fn verdict_without_graph_keeps_scene() {
        let mut ed = Editor::default();
        let before = ed.load_example().cloned();
        let ticket = ed.begin_check().unwrap();
        ed.finish_check(
            ticket.token,
            Ok(Verdict {
                safe: true,
                safe_sequence: vec![],
                deadlock: false,
                graph: None,
            }),
        );
        assert_eq!(ed.scene().cloned(), before);
    }

    #[test]
    fn failures_mark_both_indicators() {
        init_test();
        let mut ed = Editor::default();
        let before = ed.load_example().cloned();

        let ticket = ed.begin_check().unwrap();
        ed.finish_check(ticket.token, Err(Error::Transport("refused".into())));
        assert!(ed.status().is_error());
        assert_eq!(ed.status().safety.badge().text, "Error");
        assert_eq!(ed.status().deadlock.badge().text, "Error");
        assert_eq!(ed.scene().cloned(), before);

        let ticket = ed.begin_check().unwrap();
        ed.finish_check(
            ticket.token,
            Err(Error::Backend("Available resources must have length R.".into())),
        );
        assert_eq!(
            ed.status().summary(),
            "Available resources must have length R."
        );
        assert_eq!(ed.scene().cloned(), before);
    }

    #[test]
    fn synchronous_check() {
        let mut ed = Editor::default();
        ed.load_example();
        let transport = |_: &str| -> Result<String> {
            Ok(r#"{"safe": true, "safeSequence": ["P1", "P2", "P0"], "deadlock": false}"#.into())
        };
        assert_eq!(ed.check(&transport), Some(CheckApplied::Applied));
        assert_eq!(ed.status().summary(), "Safe sequence: P1 → P2 → P0.");
    }
}
