//! The simulation engine: snake, trail, food, and the game state machine.
//!
//! One call to [`Engine::tick`] is one discrete simulation step. The engine
//! owns all game state and mutates it only here; drivers schedule ticks,
//! render from the read accessors, and inspect the returned [`TickOutcome`].

use std::collections::VecDeque;

use rand::Rng;

use crate::field::{Field, Pos, Vector};
use crate::score::ScoreStore;

/// Trail length a fresh snake starts with. A trail at or below this length
/// cannot meaningfully self-intersect.
pub const MIN_TRAIL_LENGTH: usize = 3;

/// Sub-steps per logical tile in smooth mode.
pub const SMOOTH_FACTOR: f64 = 8.0;

/// Both-axis distance under which a fractional head counts as eating.
pub const FOOD_TOLERANCE: f64 = 1.0;

const PLACE_FOOD_ATTEMPTS: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Init,
    Running,
    Paused,
    GameOver,
}

/// What a single tick amounted to. The driver inspects this instead of
/// subscribing to callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Not running; the frame only re-validated existing state.
    Idle,
    /// Normal movement.
    Moved,
    /// The head reached the food; the trail cap grew by one.
    Ate,
    /// The snake bit itself. The score here is frozen from the moment of
    /// collision, before the trail resets.
    GameOver { final_score: usize },
}

pub struct Engine {
    field: Field,
    tile_size: u16,
    head: Pos,
    food: Pos,
    trail: VecDeque<Pos>,
    trail_length: usize,
    vector: Vector,
    vector_fresh: bool,
    vector_delta: f64,
    smooth: bool,
    state: GameState,
    final_score: usize,
    high_score: usize,
    scores: Box<dyn ScoreStore>,
}

impl Engine {
    pub fn new(
        width: u16,
        height: u16,
        tile_size: u16,
        scores: Box<dyn ScoreStore>,
        rng: &mut impl Rng,
    ) -> Engine {
        let field = Field::from_viewport(width, height, tile_size);
        let high_score = scores.load();

        let mut engine = Engine {
            field,
            tile_size,
            head: field.center(),
            food: field.center(),
            trail: VecDeque::new(),
            trail_length: MIN_TRAIL_LENGTH,
            vector: Vector::ZERO,
            vector_fresh: false,
            vector_delta: 1.0,
            smooth: false,
            state: GameState::Init,
            final_score: 0,
            high_score,
            scores,
        };
        engine.place_food(rng);
        engine
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickOutcome {
        let running = self.state == GameState::Running;

        if running {
            if self.vector_fresh {
                self.vector_fresh = false;
                if self.smooth {
                    // A turn mid-tile: shed the fractional drift, then cover a
                    // whole tile so the coming sub-steps stay grid-aligned.
                    self.head = self.head.rounded();
                    self.head = self.head.offset(self.vector.scaled(SMOOTH_FACTOR));
                } else {
                    self.head = self.head.offset(self.vector);
                }
            } else {
                self.head = self.head.offset(self.vector);
            }
        }

        // Wrap even when paused or over so rendering never leaves the field.
        self.head = self.field.wrap(self.head);

        if self.trail.is_empty() {
            self.trail.push_front(self.head);
        }

        // Fractional positions can coincide with several cells; scan them all.
        let bitten = self.trail.iter().any(|cell| self.hits_trail(*cell));
        if bitten && running && self.trail.len() > MIN_TRAIL_LENGTH {
            return self.finish();
        }

        if running {
            self.trail.push_front(self.head);
            self.trim_trail();
        }

        if self.matches_food(self.head, self.food) {
            self.trail_length += 1;
            self.place_food(rng);
            return TickOutcome::Ate;
        }

        if running {
            TickOutcome::Moved
        } else {
            TickOutcome::Idle
        }
    }

    /// Installs a new movement vector, flagged fresh for the next tick.
    pub fn set_vector(&mut self, vector: Vector) {
        self.vector = vector;
        self.vector_fresh = true;
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Running {
            self.state = GameState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state != GameState::GameOver {
            self.state = GameState::Running;
        }
    }

    /// Resets snake, trail, food, and length. Grid size, smooth mode, and the
    /// high score survive.
    pub fn reinitialize(&mut self, rng: &mut impl Rng) {
        self.head = self.field.center();
        self.trail.clear();
        self.trail_length = MIN_TRAIL_LENGTH;
        self.vector = Vector::ZERO;
        self.vector_fresh = false;
        self.final_score = 0;
        self.state = GameState::Init;
        self.place_food(rng);
    }

    pub fn enable_smooth_mode(&mut self) {
        if self.smooth {
            return;
        }
        self.smooth = true;
        self.vector_delta /= SMOOTH_FACTOR;
        self.vector = self.vector.scaled(1.0 / SMOOTH_FACTOR);
    }

    pub fn disable_smooth_mode(&mut self) {
        if !self.smooth {
            return;
        }
        self.smooth = false;
        self.vector_delta *= SMOOTH_FACTOR;
        self.vector = self.vector.scaled(SMOOTH_FACTOR);

        // Accumulated fractional drift must go before integer-grid matching
        // takes over again.
        self.head = self.head.rounded();
        for cell in &mut self.trail {
            *cell = cell.rounded();
        }
    }

    /// Recomputes the grid for a new viewport, re-places food, and runs one
    /// tick so the visible frame is immediately consistent.
    pub fn resize(&mut self, width: u16, height: u16, rng: &mut impl Rng) -> TickOutcome {
        let x_inset = self.field.x_min();
        self.field = Field::from_viewport(width, height, self.tile_size).inset_x(x_inset);
        self.place_food(rng);
        self.tick(rng)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn head(&self) -> Pos {
        self.head
    }

    pub fn food(&self) -> Pos {
        self.food
    }

    /// Past positions, most recent first.
    pub fn trail(&self) -> &VecDeque<Pos> {
        &self.trail
    }

    /// The running score is the trail cap itself.
    pub fn score(&self) -> usize {
        self.trail_length
    }

    pub fn final_score(&self) -> usize {
        self.final_score
    }

    pub fn high_score(&self) -> usize {
        self.high_score
    }

    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    pub fn vector_delta(&self) -> f64 {
        self.vector_delta
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn tile_size(&self) -> u16 {
        self.tile_size
    }

    fn finish(&mut self) -> TickOutcome {
        let final_score = self.trail_length;
        self.final_score = final_score;
        if final_score > self.high_score {
            self.high_score = final_score;
            self.scores.save(final_score);
        }
        self.trail_length = MIN_TRAIL_LENGTH;
        self.state = GameState::GameOver;
        self.trim_trail();
        TickOutcome::GameOver { final_score }
    }

    fn trim_trail(&mut self) {
        while self.trail.len() > self.trail_length {
            self.trail.pop_back();
        }
    }

    /// The trail check tolerates one sub-step in smooth mode; strict `<`
    /// keeps adjacent sub-steps, exactly one delta apart, from matching.
    fn hits_trail(&self, cell: Pos) -> bool {
        if self.smooth {
            cell.near(self.head, self.vector_delta)
        } else {
            cell == self.head
        }
    }

    fn matches_food(&self, a: Pos, b: Pos) -> bool {
        if self.smooth {
            a.near(b, FOOD_TOLERANCE)
        } else {
            a == b
        }
    }

    /// Bounded random placement with a deterministic fallback. On a fully
    /// occupied board the previous food stays where it was.
    fn place_food(&mut self, rng: &mut impl Rng) {
        for _ in 0..PLACE_FOOD_ATTEMPTS {
            let candidate = self.random_cell(rng);
            if !self.food_on_trail(candidate) {
                self.food = candidate;
                return;
            }
        }

        for y in 0..self.field.y_max() {
            for x in self.field.x_min()..self.field.x_max() {
                let candidate = Pos {
                    x: f64::from(x),
                    y: f64::from(y),
                };
                if !self.food_on_trail(candidate) {
                    self.food = candidate;
                    return;
                }
            }
        }
    }

    fn random_cell(&self, rng: &mut impl Rng) -> Pos {
        Pos {
            x: f64::from(rng.gen_range(self.field.x_min()..self.field.x_max())),
            y: f64::from(rng.gen_range(0..self.field.y_max())),
        }
    }

    fn food_on_trail(&self, candidate: Pos) -> bool {
        self.trail.iter().any(|cell| self.matches_food(*cell, candidate))
    }
}

#[cfg(test)]
impl Engine {
    pub(crate) fn force_state(&mut self, state: GameState) {
        self.state = state;
    }
}
