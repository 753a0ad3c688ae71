//! Fixed-tick simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Single-threaded, synchronous event delivery in emission order
//! - No rendering or platform dependencies

pub mod bounds;
pub mod chain;
pub mod collision;
pub mod game;
pub mod machine;
pub mod pickup;
pub mod pool;
pub mod speed;
pub mod state;
pub mod tick;

pub use bounds::{BoundaryProvider, RectBounds};
pub use chain::{Segment, SegmentChain, SegmentRole};
pub use collision::{ContactVerdict, SelfCollisionDetector, SelfCollisionProbe};
pub use game::{Game, Observer, Snapshot};
pub use machine::{GameStateMachine, StateTimings};
pub use pickup::{Apple, AppleSpawner};
pub use pool::{EntityKind, EntityPool, Handle, SlotPool};
pub use speed::SpeedController;
pub use state::{GameEvent, GameState, Session};
pub use tick::{FixedTimestep, FollowAnchor, Locomotion, LocomotionReport, TickInput};
