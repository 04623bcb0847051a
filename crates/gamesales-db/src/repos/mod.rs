//! Repository implementations

mod profile;
mod sale;
mod goal;
mod achievement;
mod mission;
mod signup;

pub use profile::ProfileRepo;
pub use sale::SaleRepo;
pub use goal::GoalRepo;
pub use achievement::AchievementRepo;
pub use mission::MissionRepo;
pub use signup::SignupRepo;
