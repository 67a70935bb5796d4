pub mod company;
pub mod position;
pub mod session;
pub mod site;
pub mod state;
pub mod user;
