pub mod app;
pub mod attendance;
pub mod backup;
pub mod clock;
pub mod dashboard;
pub mod directory;
pub mod distance;
pub mod geofence;
pub mod log;
pub mod session;
pub mod store;
pub mod timer;
pub mod tracker;
