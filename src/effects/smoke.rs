use crate::sim::Matrix4;

/// Seconds each smoke frame stays on screen.
pub const SMOKE_FRAME_DELAYS: [f32; 6] = [0.2, 0.2, 0.5, 0.5, 0.5, 0.5];

/// Seconds between puffs at speed setting 1.
pub const SMOKE_INTERVAL: f32 = 5.0;

/// One playing copy of a flipbook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipbookInstance {
    pub transform: Matrix4,
    pub frame: usize,
    pub elapsed: f32,
    pub repeat: bool,
}

/// Frame timing shared by every instance of one animation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flipbook {
    delays: Vec<f32>,
    instances: Vec<FlipbookInstance>,
}

impl Flipbook {
    /// Negative or NaN delays are treated as zero-length frames.
    pub fn new(delays: Vec<f32>) -> Self {
        Self {
            delays: delays
                .into_iter()
                .map(|d| if d > 0.0 { d } else { 0.0 })
                .collect(),
            instances: Vec::new(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.delays.len()
    }

    pub fn instances(&self) -> &[FlipbookInstance] {
        &self.instances
    }

    pub fn spawn(&mut self, transform: Matrix4, repeat: bool) {
        self.instances.push(FlipbookInstance {
            transform,
            frame: 0,
            elapsed: 0.0,
            repeat,
        });
    }

    /// Advances every instance by `dt` seconds.
    ///
    /// Repeating instances may skip several frames in one call. A one-shot
    /// instance moves at most one frame per call and is dropped once it runs
    /// past its last frame.
    pub fn advance_time(&mut self, dt: f32) {
        let delays = &self.delays;
        let count = delays.len();
        let cycle: f32 = delays.iter().sum();
        if count == 0 {
            self.instances.clear();
            return;
        }

        self.instances.retain_mut(|instance| {
            instance.elapsed += dt;
            let mut steps = 0;
            while instance.elapsed >= delays[instance.frame] {
                instance.elapsed -= delays[instance.frame];
                instance.frame += 1;
                if !instance.repeat {
                    break;
                }
                instance.frame %= count;
                steps += 1;
                // a cycle of zero-length frames never consumes time
                if steps >= count && cycle <= 0.0 {
                    break;
                }
            }
            instance.repeat || instance.frame < count
        });
    }
}

/// Emits smoke puffs at the locomotive on a speed-dependent timer.
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeEmitter {
    pub enabled: bool,
    since_last: f32,
    flipbook: Flipbook,
}

impl Default for SmokeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SmokeEmitter {
    pub fn new() -> Self {
        Self {
            enabled: false,
            since_last: 0.0,
            flipbook: Flipbook::new(SMOKE_FRAME_DELAYS.to_vec()),
        }
    }

    pub fn flipbook(&self) -> &Flipbook {
        &self.flipbook
    }

    /// Steps existing puffs, then emits a new one at `locomotive` if the
    /// interval for `speed` has passed. The timer restarts whenever it
    /// fires, whether or not smoke is enabled. Returns `true` when a puff
    /// was emitted.
    pub fn tick(&mut self, dt: f32, speed: f32, locomotive: Matrix4) -> bool {
        self.flipbook.advance_time(dt);
        self.since_last += dt;

        if speed <= 0.0 || self.since_last <= SMOKE_INTERVAL / speed {
            return false;
        }
        self.since_last = 0.0;
        if !self.enabled {
            return false;
        }
        self.flipbook.spawn(locomotive, false);
        true
    }
}
