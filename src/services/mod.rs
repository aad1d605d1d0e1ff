pub mod error;
pub mod present_query;
pub mod reservation_engine;

pub use error::PresentError;
pub use present_query::PresentQueryService;
pub use reservation_engine::{NewPresent, ReservationEngine};
