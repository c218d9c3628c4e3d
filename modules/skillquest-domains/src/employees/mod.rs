pub mod completion;
pub mod service;

pub use completion::ProfileCompletionCalculator;
pub use service::EmployeeService;
