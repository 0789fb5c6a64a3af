//! Segregation engine - owns the city and drives it tick by tick
//!
//! Each tick first replaces last frame's schools with the ones from the
//! newest detection frame, then (while running) relocates every
//! dissatisfied static occupant once.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::city::arena::CellArena;
use crate::city::cell::Cell;
use crate::city::neighbours::{asymmetric_edges, insert_cell, retract_cell, update_neighbour_set};
use crate::core::config::{RelocationPolicy, SimulationConfig};
use crate::core::error::{Result, SegregationError};
use crate::core::types::{BuildingKind, CellId, OccupantType, Tick};
use crate::detection::{DetectionFrame, DetectionSource};
use crate::render::colors::{marker_sort_order, occupant_color, CellObserver, NoopObserver};
use crate::simulation::report::{Census, StepOutcome, TickReport};
use crate::simulation::satisfaction::is_satisfied;
use crate::spatial::{BruteForceIndex, SpatialIndex};
use crate::world::layout::Layout;

/// The segregation model
pub struct SegregationEngine<S: SpatialIndex = BruteForceIndex> {
    config: SimulationConfig,
    cells: CellArena,
    index: S,
    /// Permanent cells in layout order
    static_cells: Vec<CellId>,
    /// Schools placed for the current detection frame
    instantiated: Vec<CellId>,
    rng: ChaCha8Rng,
    observer: Box<dyn CellObserver>,
    running: bool,
    current_tick: Tick,
}

impl SegregationEngine<BruteForceIndex> {
    /// Build the static cells of `layout` and initialise them
    pub fn new(config: SimulationConfig, layout: &Layout) -> Self {
        Self::with_index(config, layout, BruteForceIndex::new())
    }
}

impl<S: SpatialIndex> SegregationEngine<S> {
    /// Same as [`SegregationEngine::new`] with a caller-supplied spatial index
    pub fn with_index(config: SimulationConfig, layout: &Layout, mut index: S) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut cells = CellArena::with_capacity(layout.len());
        let static_cells: Vec<CellId> = layout
            .cells()
            .map(|cell| {
                let center = cell.center();
                let id = cells.insert(cell);
                index.insert(id, center);
                id
            })
            .collect();

        let mut engine = Self {
            config,
            cells,
            index,
            static_cells,
            instantiated: Vec::new(),
            rng,
            observer: Box::new(NoopObserver),
            running: false,
            current_tick: 0,
        };
        engine.init_buildings();
        engine
    }

    /// Validate `config` before building the engine
    pub fn try_new(config: SimulationConfig, layout: &Layout, index: S) -> Result<Self> {
        config.validate().map_err(SegregationError::InvalidConfig)?;
        layout.validate()?;
        Ok(Self::with_index(config, layout, index))
    }

    /// Route visual side effects to `observer`
    pub fn with_observer(mut self, observer: impl CellObserver + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    /// Replace the observer and repaint every live cell through it
    pub fn set_observer(&mut self, observer: impl CellObserver + 'static) {
        self.observer = Box::new(observer);
        let live: Vec<(CellId, OccupantType)> = self
            .cells
            .iter()
            .map(|(id, cell)| (id, cell.occupant_type()))
            .collect();
        for (id, occupant) in live {
            self.observer.occupant_changed(id, occupant, occupant_color(occupant));
        }
    }

    /// Reset every static cell to the canonical starting state
    ///
    /// Weights are assigned from each cell's current kind before the kind
    /// is forced to residency, every neighbour set is recomputed from the
    /// spatial index, and every cell is made vacant.
    pub fn init_buildings(&mut self) {
        let radius = self.config.neighbour_radius;
        for i in 0..self.static_cells.len() {
            let id = self.static_cells[i];
            let Some(kind) = self.cells.get(id).map(Cell::kind) else {
                continue;
            };
            let weight = self.config.weight_for(kind);
            if let Some(cell) = self.cells.get_mut(id) {
                cell.set_weight(weight);
            }

            update_neighbour_set(&mut self.cells, &self.index, id, radius);

            if let Some(cell) = self.cells.get_mut(id) {
                cell.set_kind(BuildingKind::Residency);
            }
            self.set_occupant(id, OccupantType::Vacant);
        }

        tracing::info!("Initialised {} static cells", self.static_cells.len());
    }

    /// Assign every static cell a random occupant
    pub fn seed_random_cells(&mut self) {
        let thresholds = self.config.seeding;
        for i in 0..self.static_cells.len() {
            let draw = self.rng.gen_range(0..thresholds.range);
            self.set_occupant(self.static_cells[i], thresholds.classify(draw));
        }
        tracing::debug!("Seeded {} static cells", self.static_cells.len());
    }

    /// Relocate every dissatisfied static occupant once
    ///
    /// Dissatisfied cells are visited in layout order. Under the legacy
    /// policy each one swaps with a static cell drawn uniformly with
    /// replacement, and nothing moves when no vacant cell exists. Under
    /// the vacant-only policy each one takes a distinct vacant cell until
    /// none are left.
    pub fn step(&mut self, tolerance_threshold: f32) -> StepOutcome {
        let mut dissatisfied = Vec::new();
        let mut vacant = Vec::new();

        for &id in &self.static_cells {
            let Some(cell) = self.cells.get(id) else {
                continue;
            };
            let occupant = cell.occupant_type();
            if !occupant.is_vacant()
                && cell.kind() != BuildingKind::School
                && !is_satisfied(cell, &self.cells, tolerance_threshold)
            {
                dissatisfied.push(id);
            }
            if occupant.is_vacant() {
                vacant.push(id);
            }
        }

        let mut outcome = StepOutcome {
            dissatisfied: dissatisfied.len(),
            vacant: vacant.len(),
            relocations: 0,
        };

        match self.config.relocation {
            RelocationPolicy::Legacy => {
                if !vacant.is_empty() && !self.static_cells.is_empty() {
                    for &mover in &dissatisfied {
                        let pick = self.rng.gen_range(0..self.static_cells.len());
                        let target = self.static_cells[pick];
                        if self.swap_occupants(mover, target) {
                            outcome.relocations += 1;
                        }
                    }
                }
            }
            RelocationPolicy::VacantOnly => {
                for &mover in &dissatisfied {
                    if vacant.is_empty() {
                        break;
                    }
                    let pick = self.rng.gen_range(0..vacant.len());
                    let target = vacant.swap_remove(pick);
                    if self.swap_occupants(mover, target) {
                        outcome.relocations += 1;
                    }
                }
            }
        }

        tracing::debug!(
            "Model step: {} dissatisfied, {} vacant, {} relocations",
            outcome.dissatisfied,
            outcome.vacant,
            outcome.relocations
        );
        outcome
    }

    /// Swap occupant type and weight between two cells as a pair
    ///
    /// Returns `false` without touching anything when `a` and `b` are the
    /// same cell or either is missing.
    pub fn swap_occupants(&mut self, a: CellId, b: CellId) -> bool {
        let Some((first, second)) = self.cells.get_pair_mut(a, b) else {
            return false;
        };
        let (occupant_a, weight_a) = (first.occupant_type(), first.weight());
        first.set_occupant_type(second.occupant_type());
        first.set_weight(second.weight());
        second.set_occupant_type(occupant_a);
        second.set_weight(weight_a);

        let (occupant_a, occupant_b) = (first.occupant_type(), second.occupant_type());
        self.observer.occupant_changed(a, occupant_a, occupant_color(occupant_a));
        self.observer.occupant_changed(b, occupant_b, occupant_color(occupant_b));
        true
    }

    /// Replace the current schools with those of `frame`
    ///
    /// Returns the number of schools placed. `None` leaves the city without
    /// schools until the next valid frame. Detections with unknown labels
    /// are skipped.
    pub fn refresh_schools(&mut self, frame: Option<&DetectionFrame>) -> usize {
        for id in std::mem::take(&mut self.instantiated) {
            if retract_cell(&mut self.cells, &mut self.index, id).is_some() {
                self.observer.cell_retired(id);
            }
        }

        let Some(frame) = frame else {
            return 0;
        };

        let radius = self.config.neighbour_radius;
        for detection in &frame.detections {
            let Some(occupant) = OccupantType::from_label(&detection.label) else {
                tracing::debug!("Skipping detection with unknown label {:?}", detection.label);
                continue;
            };

            let position = frame.world_position(detection, &self.config.world_mapping);
            let mut school = Cell::school_marker(position, occupant);
            school.set_weight(self.config.school_weight);

            let id = insert_cell(&mut self.cells, &mut self.index, school, radius);
            self.instantiated.push(id);

            self.observer.marker_placed(id, position, occupant, marker_sort_order(occupant));
            self.observer.occupant_changed(id, occupant, occupant_color(occupant));
        }

        debug_assert!(asymmetric_edges(&self.cells).is_empty());
        self.instantiated.len()
    }

    /// Advance one tick: refresh schools, then step if running
    pub fn tick(&mut self, detections: &impl DetectionSource) -> TickReport {
        let frame = detections.latest_detections();
        let schools_placed = self.refresh_schools(frame.as_ref());

        let step = if self.running {
            Some(self.step(self.config.tolerance_threshold))
        } else {
            None
        };

        self.current_tick += 1;
        TickReport {
            tick: self.current_tick,
            schools_placed,
            running: self.running,
            step,
        }
    }

    /// Set a cell's occupant and notify the observer
    pub fn set_occupant(&mut self, id: CellId, occupant: OccupantType) {
        let Some(cell) = self.cells.get_mut(id) else {
            return;
        };
        cell.set_occupant_type(occupant);
        self.observer.occupant_changed(id, occupant, occupant_color(occupant));
    }

    /// Set a static cell's weight
    pub fn set_weight(&mut self, id: CellId, weight: u32) -> Result<()> {
        let cell = self
            .cells
            .get_mut(id)
            .ok_or(SegregationError::CellNotFound(id))?;
        cell.set_weight(weight);
        Ok(())
    }

    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Restart the RNG from a fixed seed
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Change the tolerance used by [`SegregationEngine::tick`]
    ///
    /// Finite values are clamped into `[0, 1]`; NaN and infinities are
    /// rejected and leave the current tolerance in place.
    pub fn set_tolerance(&mut self, tolerance_threshold: f32) -> Result<()> {
        if !tolerance_threshold.is_finite() {
            return Err(SegregationError::InvalidConfig(format!(
                "tolerance_threshold ({}) must be finite",
                tolerance_threshold
            )));
        }
        self.config.tolerance_threshold = tolerance_threshold.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn cells(&self) -> &CellArena {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn static_cells(&self) -> &[CellId] {
        &self.static_cells
    }

    pub fn instantiated_cells(&self) -> &[CellId] {
        &self.instantiated
    }

    pub fn census(&self) -> Census {
        Census::collect(&self.cells, &self.static_cells, self.config.tolerance_threshold)
    }
}
