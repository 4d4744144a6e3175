//! Match decision engine and profile deck
//!
//! An accept swipe becomes a mutual match when a draw from the configured
//! [`DrawSource`] exceeds the match threshold. Every accept or reject
//! advances the deck exactly once.

use matchcall_core::{
    DomainError, DrawSource, ImageCursor, Match, Profile, ProfileSource,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::gesture::{ImageNavigation, SwipeDecision};
use super::registry::MatchRegistry;

/// Seeded or entropy-backed uniform draws in `[0, 1)`
#[derive(Debug, Clone)]
pub struct SeededDraws(StdRng);

impl SeededDraws {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Seeded when `seed` is set, entropy otherwise
    pub fn from_config(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl DrawSource for SeededDraws {
    fn draw(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Cursor over a [`ProfileSource`] with the presented profile's image cursor
pub struct Deck {
    source: Box<dyn ProfileSource>,
    current: Option<Profile>,
    cursor: usize,
    images: ImageCursor,
}

impl Deck {
    /// Wrap `source` and present its first profile
    pub fn new(source: Box<dyn ProfileSource>) -> Self {
        let mut deck = Self {
            source,
            current: None,
            cursor: 0,
            images: ImageCursor::default(),
        };
        deck.load();
        deck
    }

    pub fn current(&self) -> Option<&Profile> {
        self.current.as_ref()
    }

    /// Index of the presented profile
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    pub fn image_index(&self) -> usize {
        self.images.index()
    }

    /// Move to the next profile
    pub fn advance(&mut self) -> Option<&Profile> {
        self.cursor += 1;
        self.load();
        self.current.as_ref()
    }

    /// Start over from the first profile
    pub fn replenish(&mut self) -> Option<&Profile> {
        self.source.replenish();
        self.cursor = 0;
        self.load();
        self.current.as_ref()
    }

    /// Step through the presented profile's images; false at either end
    pub fn navigate(&mut self, direction: ImageNavigation) -> bool {
        match direction {
            ImageNavigation::Previous => self.images.previous(),
            ImageNavigation::Next => self.images.next(),
        }
    }

    fn load(&mut self) {
        self.current = self.source.next_profile().ok();
        self.images = self
            .current
            .as_ref()
            .map(ImageCursor::for_profile)
            .unwrap_or_default();
    }
}

impl std::fmt::Debug for Deck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deck")
            .field("cursor", &self.cursor)
            .field("current", &self.current.as_ref().map(|p| &p.id))
            .finish()
    }
}

/// Result of resolving one swipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The new match, when the accept was mutual
    pub matched: Option<Match>,
    pub next_index: usize,
    pub deck_exhausted: bool,
}

/// Decides whether an accepted profile matches back
pub struct MatchDecisionEngine {
    draws: Box<dyn DrawSource>,
    threshold: f64,
}

impl MatchDecisionEngine {
    pub fn new(draws: Box<dyn DrawSource>, threshold: f64) -> Self {
        Self { draws, threshold }
    }

    /// Resolve `decision` against the presented profile
    ///
    /// `SwipeDecision::None` changes nothing. Accept or reject on an
    /// exhausted deck is an error.
    pub fn evaluate(
        &mut self,
        decision: SwipeDecision,
        deck: &mut Deck,
        registry: &MatchRegistry,
    ) -> Result<Evaluation, DomainError> {
        let accepted = match decision {
            SwipeDecision::None => {
                return Ok(Evaluation {
                    matched: None,
                    next_index: deck.cursor(),
                    deck_exhausted: deck.is_exhausted(),
                })
            }
            SwipeDecision::Accept => true,
            SwipeDecision::Reject => false,
        };

        let profile = deck.current().cloned().ok_or(DomainError::DeckExhausted)?;

        let matched = if accepted {
            let draw = self.draws.draw();
            if draw > self.threshold {
                Some(registry.create(&profile))
            } else {
                debug!(profile_id = %profile.id, draw, "Accepted without a match");
                None
            }
        } else {
            debug!(profile_id = %profile.id, "Profile passed");
            None
        };

        deck.advance();
        if deck.is_exhausted() {
            info!(cursor = deck.cursor(), "Profile deck exhausted");
        }

        Ok(Evaluation {
            matched,
            next_index: deck.cursor(),
            deck_exhausted: deck.is_exhausted(),
        })
    }
}

impl std::fmt::Debug for MatchDecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchDecisionEngine")
            .field("threshold", &self.threshold)
            .finish()
    }
}
