pub mod booking;
pub mod hall;
pub mod movie;
pub mod screening;
pub mod user;

pub use booking::{Booking, BookingStatus, SeatHolder, Ticket, TicketDetails};
pub use hall::{CinemaHall, CinemaHallInput, HallType, HallTypeInput};
pub use movie::{Movie, MovieInput};
pub use screening::{Screening, ScreeningDetails, ScreeningInput};
pub use user::{Role, User, UserInput};
