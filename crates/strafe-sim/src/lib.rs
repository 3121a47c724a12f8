pub mod audio;
pub mod bridge;
pub mod collision;
pub mod config;
pub mod core;
pub mod entity;
pub mod error;
pub mod input;
pub mod metrics;

// Re-export key types at crate root for convenience
pub use audio::manager::{AudioManager, VoiceCommand, VoiceState};
pub use audio::registry::{AudioRegistry, SoundDef, SoundKind};
pub use audio::spatial::Listener;
pub use bridge::buffer::SnapshotBuffer;
pub use bridge::protocol::SnapshotLayout;
pub use collision::detector::{CollisionDetector, CollisionEvent};
pub use config::{PoolCapacities, SimConfig};
pub use core::runner::GameLoop;
pub use core::snapshot::{EntityView, SimState, Snapshot};
pub use core::time::FixedTimestep;
pub use entity::entity::{Entity, EntityKind, Shape};
pub use entity::pool::{EntityPool, EntityRef};
pub use entity::response::{CollisionResponse, Effect, ResponseTable};
pub use entity::spawner::{
    EntitySpawner, SimEvent, SimEventKind, SpawnOrigin, SpawnPattern, SpawnTrigger,
};
pub use error::{LoopError, SpawnError, TickError};
pub use input::bindings::{ActionMap, AxisSign, Binding, DeviceClass};
pub use input::handler::InputHandler;
pub use input::queue::{InputQueue, RawEvent, RawInput};
pub use input::state::{Action, ActionState, InputState};
pub use metrics::SimMetrics;
