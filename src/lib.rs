//! 假名读音练习的复习引擎：题库、练习范围、选题、逐键判定、间隔调度与持久化。

pub mod active_set;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod fsrs;
pub mod judge;
pub mod model;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod store;

pub use catalog::{CatalogItem, Group, KanaSet};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StoreError};
pub use fsrs::{FsrsCard, FsrsScheduler};
pub use judge::{JudgeState, Judgment};
pub use model::{MemoryState, SessionStats, Settings, SettingsPatch, ThemePreference};
pub use scheduler::{Grade, LadderScheduler, ReviewCard, Scheduler};
pub use session::{Feedback, Prompt, Session, Verdict};
pub use store::{JsonDirStore, KvStore, MemoryStore};
