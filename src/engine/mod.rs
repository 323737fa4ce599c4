//! Output side of the sequencer: the clock every event is timed against, the
//! renderer that turns events into audio, and the places that audio goes
//! (a cpal device or an in-memory buffer).

pub mod clock;
pub mod device;
pub mod offline;
pub mod renderer;

pub use clock::{FrameClock, ManualClock, OutputClock};
pub use device::OutputDevice;
pub use offline::{write_wav, OfflineRenderer};
pub use renderer::{connect, EngineHandle, EventSender, Renderer};
