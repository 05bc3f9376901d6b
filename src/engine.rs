//! Game state machine
//!
//! `Engine` owns the session and routes commands and frames to it. It is the
//! only place that talks to the score reporter and the local store, so the
//! simulation itself stays free of I/O.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::ConfigError;
use crate::input::Command;
use crate::leaderboard::ScoreReporter;
use crate::persistence::{KeyValueStore, Profile};
use crate::render::Snapshot;
use crate::sim::{Ambient, GameEvent, GamePhase, Session, TickInput, tick};
use crate::tuning::Tuning;

pub struct Engine<R: ScoreReporter> {
    session: Session,
    ambient: Ambient,
    reporter: R,
    store: Option<Box<dyn KeyValueStore>>,
    profile: Profile,
    /// Derives one seed per run so restarts never replay the same obstacles
    seeds: Pcg32,
    /// Guards the once-per-run score submission
    reported: bool,
}

impl<R: ScoreReporter> Engine<R> {
    /// New engine sitting on the menu
    ///
    /// The tuning is validated first; a degenerate field cannot host motes or
    /// obstacles.
    pub fn new(tuning: Tuning, reporter: R, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let mut seeds = Pcg32::seed_from_u64(seed);
        let session = Session::new(tuning, seeds.next_u64(), 0.0, GamePhase::Menu);
        let ambient = Ambient::new(
            seeds.next_u64(),
            session.field(),
            session.tuning.ambient_motes,
        );

        Ok(Self {
            session,
            ambient,
            reporter,
            store: None,
            profile: Profile::default(),
            seeds,
            reported: false,
        })
    }

    /// Attach a local store and load the cached profile from it
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.profile = Profile::load(store.as_ref());
        self.store = Some(store);
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    /// Read-only view of the current run
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.session, self.ambient.motes())
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Change who future scores are reported for
    pub fn set_identity(&mut self, identifier: &str, display_name: &str) {
        self.profile.identifier = identifier.trim().to_string();
        self.profile.display_name = display_name.trim().to_string();
        self.save_profile();
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Apply a state-machine command, returning true if it changed anything
    ///
    /// Start begins a fresh run from any screen, even mid-game. Restart does
    /// the same but is ignored on the menu, and quitting to the menu is only
    /// possible from the game-over screen.
    pub fn handle_command(&mut self, command: Command, now: f64) -> bool {
        match command {
            Command::Restart if self.session.phase == GamePhase::Menu => false,
            Command::Start | Command::Restart => {
                self.begin(now, GamePhase::Playing);
                log::info!("Run started ({:?})", command);
                true
            }
            Command::QuitToMenu if self.session.phase == GamePhase::GameOver => {
                self.begin(now, GamePhase::Menu);
                log::info!("Back to menu");
                true
            }
            Command::QuitToMenu => false,
        }
    }

    fn begin(&mut self, now: f64, phase: GamePhase) {
        let tuning = self.session.tuning.clone();
        self.session = Session::new(tuning, self.seeds.next_u64(), now, phase);
        self.reported = false;
    }

    /// Advance one animation frame
    pub fn step(&mut self, input: &TickInput, now: f64) -> Vec<GameEvent> {
        match self.session.phase {
            GamePhase::Menu => {
                self.ambient.update();
                Vec::new()
            }
            GamePhase::Playing => {
                let events = tick(&mut self.session, input, now);
                if self.session.phase == GamePhase::GameOver {
                    self.report_final_score();
                }
                events
            }
            GamePhase::GameOver => Vec::new(),
        }
    }

    fn report_final_score(&mut self) {
        if self.reported {
            return;
        }
        self.reported = true;

        let score = self.session.final_score.unwrap_or(self.session.score);
        // A failed submission never blocks the game-over screen
        if let Err(e) = self.reporter.submit_score(
            &self.profile.identifier,
            score,
            &self.profile.display_name,
        ) {
            log::warn!("Score submission failed: {}", e);
        }

        self.profile.last_score = Some(score);
        self.save_profile();
    }

    fn save_profile(&mut self) {
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = self.profile.save(store.as_mut()) {
                log::warn!("Could not save profile: {}", e);
            }
        }
    }
}
