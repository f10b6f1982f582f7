pub mod location;
pub mod posted;
pub mod salary;

pub use salary::AnnualSalary;
