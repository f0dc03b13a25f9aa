pub mod dashboard;
pub mod presentation;
pub mod refresh;
pub mod study_log;
pub mod types;

pub use dashboard::{
    load_dashboard,
    DashboardView,
    Slice,
    SrsSource,
};
pub use presentation::{
    progress_percent,
    select_banner,
    Banner,
    StreakProgress,
};
pub use refresh::{
    DashboardState,
    RefreshGate,
    RefreshTicket,
};
pub use study_log::{
    reduce_first_attempts,
    summarize,
    FirstAttempt,
    FirstAttempts,
    StudySummary,
};
