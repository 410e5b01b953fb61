pub mod fixtures;
pub mod temp;

pub use fixtures::{FixtureCell, ReservationRow, WorkbookFixture, RESERVATION_HEADERS};
pub use temp::TempDir;
