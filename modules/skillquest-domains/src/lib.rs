pub mod employees;
pub mod skills;

pub use employees::{EmployeeService, ProfileCompletionCalculator};
pub use skills::{EmployeeSkillService, SkillService};
