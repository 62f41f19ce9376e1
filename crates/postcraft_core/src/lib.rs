pub mod cache;
pub mod calendar;
pub mod domain;
pub mod format;
pub mod ports;
pub mod rows;
pub mod schedule;
pub mod stats;
pub mod streak;

pub use cache::TtlProfileCache;
pub use calendar::{build_calendar, build_calendar_in, Calendar, CalendarBuilder};
pub use domain::{CalendarDay, GeneratedPrompt, NewPrompt, Post, PostStatus, Profile, Prompt, Role};
pub use format::{day_name, short_display, INVALID_DATE};
pub use ports::{
    DatabaseService, PortError, PortResult, ProfileCache, PromptGenerationService,
};
pub use schedule::{
    generate_schedule, is_valid_schedule_date, next_schedule_date, validate, ScheduleDate,
    ScheduleError, Validation,
};
pub use stats::{dashboard_stats, DashboardStats};
pub use streak::day_streak;
