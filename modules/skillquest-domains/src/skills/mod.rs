pub mod employee_skills;
pub mod service;

pub use employee_skills::EmployeeSkillService;
pub use service::SkillService;
