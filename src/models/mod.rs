pub mod company;
pub mod event;
pub mod order;
pub mod organizer;
pub mod reports;
pub mod ticket;
pub mod ticket_type;
pub mod user;

pub use company::Company;
pub use event::{Event, EventStatus};
pub use order::{Order, OrderStatus};
pub use organizer::{EventOrganizer, OrganizerRole};
pub use ticket::{Ticket, TicketStatus, ValidationOutcome};
pub use ticket_type::TicketType;
pub use user::User;
