pub mod repositories;
pub mod tabular;

pub use repositories::InMemoryPlanRepository;
pub use tabular::{load_csv_table, read_csv_table, write_records_csv};
