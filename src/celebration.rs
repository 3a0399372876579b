use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Instant;

use crate::sinks::CelebrationSink;

pub const CONFETTI_DURATION_SECS: f64 = 3.0;
pub const CONFETTI_PIECES: usize = 160;
/// Number of distinct confetti colours the renderer cycles through
pub const CONFETTI_COLORS: usize = 6;

const SYMBOLS: [char; 6] = ['■', '▪', '●', '◆', '▲', '*'];
const GRAVITY: f64 = 6.0;

/// One piece of confetti
#[derive(Debug, Clone)]
pub struct ConfettiPiece {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    /// Seconds before the piece starts falling
    pub delay: f64,
    pub max_age: f64,
}

impl ConfettiPiece {
    fn new<R: Rng>(rng: &mut R, width: f64) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(1.0)),
            y: rng.gen_range(-3.0..0.0),
            vel_x: rng.gen_range(-2.0..2.0),
            vel_y: rng.gen_range(1.0..4.0),
            symbol: *SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..CONFETTI_COLORS),
            age: 0.0,
            delay: rng.gen_range(0.0..0.6),
            max_age: rng.gen_range(2.5..4.0),
        }
    }

    fn is_falling(&self) -> bool {
        self.age >= self.delay
    }

    fn update(&mut self, dt: f64) -> bool {
        self.age += dt;
        if self.is_falling() {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_y += GRAVITY * dt;
        }
        self.age < self.max_age
    }
}

/// Completion message plus a short confetti burst
#[derive(Debug)]
pub struct CelebrationAnimation {
    pub pieces: Vec<ConfettiPiece>,
    pub started_at: Instant,
    pub last_update: Instant,
    pub duration: f64, // seconds
    pub is_active: bool,
    pub message_visible: bool,
    pub width: f64,
    pub height: f64,
}

impl CelebrationAnimation {
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            started_at: Instant::now(),
            last_update: Instant::now(),
            duration: CONFETTI_DURATION_SECS,
            is_active: false,
            message_visible: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width as f64;
        self.height = height as f64;
    }

    pub fn launch(&mut self, pieces: usize) {
        let mut rng = rand::thread_rng();
        self.pieces.clear();
        self.started_at = Instant::now();
        self.last_update = self.started_at;
        self.is_active = true;
        for _ in 0..pieces {
            self.pieces.push(ConfettiPiece::new(&mut rng, self.width));
        }
    }

    pub fn clear(&mut self) {
        self.is_active = false;
        self.pieces.clear();
    }

    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Advance physics by the real time since the previous update.
    pub fn update_at(&mut self, now: Instant) {
        if !self.is_active {
            return;
        }

        if now.saturating_duration_since(self.started_at).as_secs_f64() >= self.duration {
            self.clear();
            return;
        }

        let dt = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        let bottom = self.height + 2.0;
        self.pieces
            .retain_mut(|piece| piece.update(dt) && piece.y <= bottom);
    }
}

impl Default for CelebrationAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl CelebrationSink for CelebrationAnimation {
    fn show_completion(&mut self) {
        self.message_visible = true;
        self.launch(CONFETTI_PIECES);
    }

    fn hide_completion(&mut self) {
        self.message_visible = false;
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_hidden_and_inactive() {
        let celebration = CelebrationAnimation::new();
        assert!(!celebration.is_active);
        assert!(!celebration.message_visible);
        assert!(celebration.pieces.is_empty());
    }

    #[test]
    fn show_completion_launches_full_burst() {
        let mut celebration = CelebrationAnimation::new();
        celebration.resize(100, 30);
        celebration.show_completion();

        assert!(celebration.message_visible);
        assert!(celebration.is_active);
        assert_eq!(celebration.pieces.len(), CONFETTI_PIECES);
        assert!(celebration
            .pieces
            .iter()
            .all(|p| p.x >= 0.0 && p.x < 100.0 && p.color_index < CONFETTI_COLORS));
    }

    #[test]
    fn hide_completion_clears_everything() {
        let mut celebration = CelebrationAnimation::new();
        celebration.show_completion();
        celebration.hide_completion();

        assert!(!celebration.message_visible);
        assert!(!celebration.is_active);
        assert!(celebration.pieces.is_empty());
    }

    #[test]
    fn pieces_fall_after_their_delay() {
        let mut rng = rand::thread_rng();
        let mut piece = ConfettiPiece::new(&mut rng, 80.0);
        piece.delay = 0.0;
        let start_y = piece.y;
        let start_vel = piece.vel_y;

        assert!(piece.update(0.1));
        assert!(piece.y > start_y);
        assert!(piece.vel_y > start_vel);
    }

    #[test]
    fn delayed_piece_holds_position() {
        let mut rng = rand::thread_rng();
        let mut piece = ConfettiPiece::new(&mut rng, 80.0);
        piece.delay = 1.0;
        let (x, y) = (piece.x, piece.y);
        piece.update(0.1);
        assert_eq!((piece.x, piece.y), (x, y));
    }

    #[test]
    fn burst_expires_after_duration() {
        let mut celebration = CelebrationAnimation::new();
        celebration.show_completion();
        celebration.duration = 0.0;
        celebration.update();

        assert!(!celebration.is_active);
        assert!(celebration.pieces.is_empty());
        // Message outlives the confetti
        assert!(celebration.message_visible);
    }

    #[test]
    fn pieces_move_by_elapsed_time() {
        let mut celebration = CelebrationAnimation::new();
        celebration.resize(80, 24);
        celebration.launch(1);
        {
            let piece = &mut celebration.pieces[0];
            piece.delay = 0.0;
            piece.max_age = 10.0;
            piece.y = 0.0;
            piece.vel_y = 2.0;
        }

        let quarter = celebration.last_update + Duration::from_millis(250);
        celebration.update_at(quarter);
        let piece = &celebration.pieces[0];
        assert!((piece.y - 0.5).abs() < 1e-9, "moved {}", piece.y);
        assert!((piece.age - 0.25).abs() < 1e-9);

        // A second update at the same instant doesn't move anything
        celebration.update_at(quarter);
        assert!((celebration.pieces[0].y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn burst_expires_by_wall_time_not_update_count() {
        let mut celebration = CelebrationAnimation::new();
        celebration.show_completion();
        let start = celebration.started_at;

        celebration.update_at(start + Duration::from_millis(2_900));
        assert!(celebration.is_active);
        celebration.update_at(start + Duration::from_millis(3_000));
        assert!(!celebration.is_active);
    }

    #[test]
    fn pieces_below_the_screen_are_dropped() {
        let mut celebration = CelebrationAnimation::new();
        celebration.resize(20, 10);
        celebration.launch(5);
        for piece in &mut celebration.pieces {
            piece.delay = 0.0;
            piece.max_age = 10.0;
        }
        celebration.pieces[0].y = 50.0;
        celebration.update();

        assert_eq!(celebration.pieces.len(), 4);
    }
}
